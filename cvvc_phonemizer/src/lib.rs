// CVVC phonemizer for Japanese singing voicebanks.
//
// Converts each sung note group's lyric (or phonetic hint) into the alias
// events a voice-rendering engine should play: the main CV/VCV alias plus,
// before a consonant-initial next note, a VC transition alias timed from the
// next alias's preutterance.
//
// Architecture:
// - note.rs: Host note model (`Note`, `PhonemeAttributes`), output
//   `PhonemeEvent`, and `NeighborContext`
// - voicebank.rs: Collaborator traits (`AliasDatabase`, `TickConverter`)
//   and in-memory implementations (`VoicebankTable`, `FixedTempo`)
// - resolver.rs: Ordered candidate resolution with strict color matching
// - sequencer.rs: Candidate selection, VC insertion, and VC timing
// - score.rs: Note grouping, neighbor context, parallel score driver
// - config.rs: JSON-loadable `PhonemizerConfig`
// - error.rs: `LoadError` for input files
//
// Phonetic classification comes from `cvvc_lang`. Output is a pure function
// of the notes, the tables, and the (read-only) voicebank.

pub mod config;
pub mod error;
pub mod note;
pub mod resolver;
pub mod score;
pub mod sequencer;
pub mod voicebank;

pub use config::PhonemizerConfig;
pub use error::LoadError;
pub use note::{NeighborContext, Note, PhonemeAttributes, PhonemeEvent};
pub use sequencer::PhonemeSequencer;
pub use voicebank::{AliasDatabase, FixedTempo, ResolvedAlias, TickConverter, VoicebankTable};
