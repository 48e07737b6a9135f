// Japanese CVVC phonetic tables.
//
// Provides the phonetic classification the phonemizer uses to address
// voicebank aliases: which vowel a mora ends on, which consonant the next
// mora starts with, and which consonant to fall back to when a voicebank
// lacks an exact VC sample. No voicebank or timing logic lives here.
//
// Architecture:
// - `types.rs`: `VowelClass`, the closed vowel alphabet used in alias names
// - `tables.rs`: grouped `class=members` definitions and `LookupTables`
// - `error.rs`: `TableError` for malformed definitions
//
// The compiled-in tables are built once per process by
// `LookupTables::builtin()` and are read-only afterwards, so they can be
// shared freely across threads.

pub mod error;
pub mod tables;
pub mod types;

// Re-export key types at crate root for convenience.
pub use error::TableError;
pub use tables::{LookupTables, TableDefs};
pub use types::VowelClass;
