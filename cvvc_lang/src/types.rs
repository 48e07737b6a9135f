// Core phonetic types: abstract vowel classes used to address VCV and VC
// aliases in a Japanese CVVC voicebank.
//
// A voicebank names its transition samples by the vowel that ends the
// previous mora ("a ka", "o k"), so the only vowel information the
// phonemizer needs is this small closed alphabet. Consonant classes are an
// open set that varies between table definitions and stay plain strings.
//
// The alias text for each class is what appears verbatim in voicebank alias
// names; serde uses the same text so table definitions and JSON agree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract vowel class of a mora's trailing sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VowelClass {
    #[serde(rename = "a")]
    A,
    #[serde(rename = "i")]
    I,
    #[serde(rename = "u")]
    U,
    #[serde(rename = "e")]
    E,
    #[serde(rename = "o")]
    O,
    /// Syllabic ん.
    #[serde(rename = "n")]
    N,
    /// Katakana ン, recorded separately by some voicebanks.
    #[serde(rename = "N")]
    Nasal,
    /// Sokuon っ/ッ: a closure with no vowel color.
    #[serde(rename = "・")]
    Glottal,
}

impl VowelClass {
    /// Every class, in table order.
    pub const ALL: [VowelClass; 8] = [
        VowelClass::A,
        VowelClass::I,
        VowelClass::U,
        VowelClass::E,
        VowelClass::O,
        VowelClass::N,
        VowelClass::Nasal,
        VowelClass::Glottal,
    ];

    /// The text used for this class inside alias names.
    pub fn alias_text(self) -> &'static str {
        match self {
            VowelClass::A => "a",
            VowelClass::I => "i",
            VowelClass::U => "u",
            VowelClass::E => "e",
            VowelClass::O => "o",
            VowelClass::N => "n",
            VowelClass::Nasal => "N",
            VowelClass::Glottal => "・",
        }
    }

    /// Parse a class name as written on the left of a `class=members` group.
    pub fn from_class_name(name: &str) -> Option<VowelClass> {
        VowelClass::ALL
            .into_iter()
            .find(|class| class.alias_text() == name)
    }
}

impl fmt::Display for VowelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias_text())
    }
}
