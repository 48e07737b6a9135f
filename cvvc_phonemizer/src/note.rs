// Host note model as seen by the phonemizer, and its output events.
//
// A `Note` carries what the host timeline knows about one sung note: the
// lyric, an optional phonetic hint that overrides the lyric, the pitch, the
// placement in ticks, and per-phoneme attributes set by the user (voice
// color, tone shift, alternate take, consonant stretch). Attributes are
// indexed by phoneme position within the note: index 0 is the main alias,
// index 1 the VC transition.
//
// Lyrics and hints come from user input and may be in any Unicode
// normalization form; the phonemizer compares them in NFC, the form voicebank
// alias names use.
//
// The phonemizer only reads notes. Its output is a list of `PhonemeEvent`s,
// each an alias name plus an offset in ticks from the start of the note
// group.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use unicode_normalization::{UnicodeNormalization, is_nfc};

/// `text` in NFC. Borrows when it is already normalized.
pub fn nfc(text: &str) -> Cow<'_, str> {
    if is_nfc(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.nfc().collect())
    }
}

/// Per-phoneme user attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhonemeAttributes {
    /// Phoneme position within the note this record applies to.
    pub index: usize,
    /// Requested voice color (subbank). Empty selects the default color.
    pub voice_color: String,
    /// Semitone shift applied to the note's tone when resolving aliases.
    pub tone_shift: i32,
    /// Alternate take number, appended to alias text when set.
    pub alternate: Option<u32>,
    /// Multiplier on consonant length. `None` means 1.
    pub consonant_stretch_ratio: Option<f64>,
}

/// Attributes used when a note has no record for an index.
static DEFAULT_ATTRIBUTES: PhonemeAttributes = PhonemeAttributes {
    index: 0,
    voice_color: String::new(),
    tone_shift: 0,
    alternate: None,
    consonant_stretch_ratio: None,
};

impl PhonemeAttributes {
    pub fn stretch_ratio(&self) -> f64 {
        self.consonant_stretch_ratio.unwrap_or(1.0)
    }
}

/// One sung note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub lyric: String,
    #[serde(default)]
    pub phonetic_hint: Option<String>,
    /// MIDI-style pitch.
    pub tone: i32,
    /// Absolute start, in ticks.
    #[serde(default)]
    pub position: i32,
    /// Length in ticks.
    pub duration: i32,
    #[serde(default)]
    pub phoneme_attributes: Vec<PhonemeAttributes>,
}

impl Note {
    pub fn new(lyric: &str, tone: i32, position: i32, duration: i32) -> Self {
        Note {
            lyric: lyric.to_string(),
            phonetic_hint: None,
            tone,
            position,
            duration,
            phoneme_attributes: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: &str) -> Self {
        self.phonetic_hint = Some(hint.to_string());
        self
    }

    pub fn with_attributes(mut self, attributes: PhonemeAttributes) -> Self {
        self.phoneme_attributes.push(attributes);
        self
    }

    /// The phonetic hint, if set and non-empty.
    pub fn hint(&self) -> Option<&str> {
        self.phonetic_hint.as_deref().filter(|h| !h.is_empty())
    }

    /// What the note actually sings: the hint if present, else the lyric.
    pub fn sounding_text(&self) -> &str {
        self.hint().unwrap_or(&self.lyric)
    }

    /// The lyric in NFC.
    pub fn normalized_lyric(&self) -> Cow<'_, str> {
        nfc(&self.lyric)
    }

    /// The sounding text in NFC.
    pub fn normalized_sounding_text(&self) -> Cow<'_, str> {
        nfc(self.sounding_text())
    }

    /// End tick (exclusive). Saturates instead of overflowing.
    pub fn end(&self) -> i32 {
        self.position.saturating_add(self.duration)
    }

    /// Attributes for a phoneme index. Falls back to the zero-valued record
    /// when the note has none for that index.
    pub fn attributes(&self, index: usize) -> &PhonemeAttributes {
        self.phoneme_attributes
            .iter()
            .find(|attr| attr.index == index)
            .unwrap_or(&DEFAULT_ATTRIBUTES)
    }
}

/// An alias to play, `offset` ticks after the note group starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemeEvent {
    pub alias: String,
    #[serde(default)]
    pub offset: i32,
}

impl PhonemeEvent {
    pub fn new(alias: String, offset: i32) -> Self {
        PhonemeEvent { alias, offset }
    }
}

/// Notes surrounding the group being phonemized.
///
/// `prev`/`next` are the lead notes of the groups before and after;
/// `prev_neighbor`/`next_neighbor` are the same notes only when their groups
/// touch this one with no rest in between. `prev_neighbors` is the whole
/// previous group.
///
/// The sequencer itself only reads `prev_neighbor` and `next_neighbor`.
/// `prev`, `next`, and `prev_neighbors` complete the host's view of the
/// timeline and are part of the `process` interface so hosts can pass one
/// context type to any phonemizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeighborContext<'a> {
    pub prev: Option<&'a Note>,
    pub next: Option<&'a Note>,
    pub prev_neighbor: Option<&'a Note>,
    pub next_neighbor: Option<&'a Note>,
    pub prev_neighbors: &'a [Note],
}
