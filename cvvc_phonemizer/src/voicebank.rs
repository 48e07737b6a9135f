// External collaborators: the voicebank alias database and tempo conversion.
//
// The phonemizer never reads voicebank files or tempo maps itself. It asks
// two questions of the host:
// - `AliasDatabase::resolve_alias`: does this alias text exist at this tone
//   and color, and what are its preutterance/overlap? A database may answer
//   with an alias of a different color than requested (when the requested
//   subbank lacks it); callers that care must check the color.
// - `TickConverter::ms_to_ticks`: how many ticks a millisecond span covers
//   near a given tick position.
//
// `VoicebankTable` and `FixedTempo` are in-memory reference implementations
// used by the CLI and tests. `VoicebankTable` models the usual subbank
// layout: each subbank maps a color and tone range to an alias
// prefix/suffix ("かC5", "かSoft").

use crate::error::{LoadError, read_file};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An alias found in the voicebank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAlias {
    /// Full alias name, including any subbank prefix/suffix.
    pub alias: String,
    /// Color of the subbank the alias came from.
    pub color: String,
    pub preutterance_ms: f64,
    pub overlap_ms: f64,
}

impl ResolvedAlias {
    /// Time the alias sounds before its nominal onset. A negative overlap
    /// starts the sample even earlier than its preutterance.
    pub fn lead_in_ms(&self) -> f64 {
        if self.overlap_ms < 0.0 {
            self.preutterance_ms - self.overlap_ms
        } else {
            self.preutterance_ms
        }
    }
}

/// Read-only alias lookup provided by the host.
pub trait AliasDatabase {
    fn resolve_alias(&self, text: &str, tone: i32, color: &str) -> Option<ResolvedAlias>;
}

/// Millisecond-to-tick conversion provided by the host.
pub trait TickConverter {
    /// Ticks covered by `ms` milliseconds around `anchor_tick`.
    fn ms_to_ticks(&self, anchor_tick: i32, ms: f64) -> i32;
}

/// Constant-tempo conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedTempo {
    pub bpm: f64,
    /// Ticks per quarter note.
    pub resolution: i32,
}

impl Default for FixedTempo {
    fn default() -> Self {
        FixedTempo {
            bpm: 120.0,
            resolution: 480,
        }
    }
}

impl TickConverter for FixedTempo {
    fn ms_to_ticks(&self, _anchor_tick: i32, ms: f64) -> i32 {
        (ms * self.bpm * f64::from(self.resolution) / 60_000.0).round() as i32
    }
}

/// Timing metadata of one recorded alias.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OtoEntry {
    pub preutterance: f64,
    #[serde(default)]
    pub overlap: f64,
}

/// Maps a color and tone range to an alias prefix/suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subbank {
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub tone_min: i32,
    #[serde(default = "default_tone_max")]
    pub tone_max: i32,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
}

fn default_tone_max() -> i32 {
    127
}

impl Subbank {
    /// A subbank covering every tone.
    pub fn new(color: &str, prefix: &str, suffix: &str) -> Self {
        Subbank {
            color: color.to_string(),
            tone_min: 0,
            tone_max: default_tone_max(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    pub fn with_tones(mut self, tone_min: i32, tone_max: i32) -> Self {
        self.tone_min = tone_min;
        self.tone_max = tone_max;
        self
    }

    pub fn covers(&self, tone: i32) -> bool {
        (self.tone_min..=self.tone_max).contains(&tone)
    }
}

/// In-memory voicebank: recorded aliases plus subbank mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoicebankTable {
    /// Subbanks in priority order.
    #[serde(default)]
    pub subbanks: Vec<Subbank>,
    pub otos: FxHashMap<String, OtoEntry>,
}

impl VoicebankTable {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        Ok(Self::from_json(&read_file(path)?)?)
    }

    pub fn with_oto(mut self, alias: &str, preutterance: f64, overlap: f64) -> Self {
        self.otos.insert(
            alias.to_string(),
            OtoEntry {
                preutterance,
                overlap,
            },
        );
        self
    }

    pub fn with_subbank(mut self, subbank: Subbank) -> Self {
        self.subbanks.push(subbank);
        self
    }

    fn lookup(&self, alias: String, color: &str) -> Option<ResolvedAlias> {
        let oto = self.otos.get(&alias)?;
        Some(ResolvedAlias {
            alias,
            color: color.to_string(),
            preutterance_ms: oto.preutterance,
            overlap_ms: oto.overlap,
        })
    }

    fn lookup_in(&self, subbank: &Subbank, text: &str) -> Option<ResolvedAlias> {
        let alias = format!("{}{}{}", subbank.prefix, text, subbank.suffix);
        self.lookup(alias, &subbank.color)
    }
}

impl AliasDatabase for VoicebankTable {
    /// Tries subbanks covering `tone` with the requested color, then any
    /// covering subbank, then the bare alias (default color).
    fn resolve_alias(&self, text: &str, tone: i32, color: &str) -> Option<ResolvedAlias> {
        let covering = || self.subbanks.iter().filter(move |s| s.covers(tone));
        covering()
            .filter(|s| s.color == color)
            .chain(covering())
            .find_map(|s| self.lookup_in(s, text))
            .or_else(|| self.lookup(text.to_string(), ""))
    }
}
