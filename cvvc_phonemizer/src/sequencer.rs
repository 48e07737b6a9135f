// Phoneme sequencing: lyric + neighbors -> timed alias events for one group.
//
// A note group is a lead note plus any extender notes ("+", "+~") that
// prolong it. For each group the sequencer emits the main alias at offset 0
// and, when the next note starts right after the group with a consonant, a
// VC transition alias ("a k") placed so that it ends where the next note's
// consonant begins.
//
// Main alias candidates, first matching case wins:
// 1. phonetic hint present: exactly the hint
// 2. no touching previous note: "- か", then "か"
// 3. bare vowel or syllabic nasal: "<prev vowel> あ", "* あ", "あ"
// 4. anything else: "* か", "か"
// The first color-matching candidate is used. If none resolves, the lyric
// itself is emitted as the alias.
//
// VC length defaults to `default_transition_ticks`. When the next note's
// lyric resolves in the voicebank, its lead-in time (preutterance, extended
// by a negative overlap) replaces the default. The length is then scaled by
// the next note's consonant stretch ratio and capped at half the group.
//
// Lyrics, hints, and the previous note's text are compared in NFC, so
// decomposed kana ("か" + U+3099) behave like their composed form ("が").
//
// Nothing here returns an error. Every miss degrades to the literal lyric
// or to leaving the VC out, and the decision is traced at debug level.

use crate::config::PhonemizerConfig;
use crate::note::{NeighborContext, Note, PhonemeEvent, nfc};
use crate::resolver::{CandidateResolver, ResolveMode, ResolveRequest};
use crate::voicebank::{AliasDatabase, TickConverter};
use cvvc_lang::LookupTables;
use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};

/// Alias prefix for a note sung from silence.
pub const PHRASE_INITIAL_MARKER: &str = "-";
/// Alias prefix matching any preceding vowel.
pub const ANY_VOWEL_MARKER: &str = "*";

/// Which rule produced a candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Hint,
    PhraseInitial,
    VowelContinuation,
    Ordinary,
}

/// Ordered alias texts to try for a note's main phoneme.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates {
    pub kind: CandidateKind,
    pub texts: SmallVec<[String; 3]>,
}

/// Turns note groups into alias events.
///
/// Holds only shared references, so one sequencer can serve many groups
/// concurrently when the collaborators are `Sync`.
pub struct PhonemeSequencer<'a, D: ?Sized, T: ?Sized> {
    tables: &'a LookupTables,
    db: &'a D,
    ticks: &'a T,
    default_transition_ticks: i32,
}

impl<'a, D, T> PhonemeSequencer<'a, D, T>
where
    D: AliasDatabase + ?Sized,
    T: TickConverter + ?Sized,
{
    pub fn new(
        tables: &'a LookupTables,
        db: &'a D,
        ticks: &'a T,
        config: &PhonemizerConfig,
    ) -> Self {
        PhonemeSequencer {
            tables,
            db,
            ticks,
            default_transition_ticks: config.default_transition_ticks,
        }
    }

    /// Candidate alias texts for `note`'s main phoneme.
    pub fn select_candidates(&self, note: &Note, prev_neighbor: Option<&Note>) -> Candidates {
        if let Some(hint) = note.hint() {
            return Candidates {
                kind: CandidateKind::Hint,
                texts: smallvec![nfc(hint).into_owned()],
            };
        }

        let lyric = note.normalized_lyric();
        let lyric: &str = &lyric;
        let Some(prev) = prev_neighbor else {
            return Candidates {
                kind: CandidateKind::PhraseInitial,
                texts: smallvec![format!("{PHRASE_INITIAL_MARKER} {lyric}"), lyric.to_string()],
            };
        };

        let any_vowel = format!("{ANY_VOWEL_MARKER} {lyric}");
        if self.tables.is_bare_mora(lyric) {
            let mut texts = SmallVec::new();
            let prev_text = prev.normalized_sounding_text();
            if let Some(vowel) = self.tables.trailing_vowel_class(&prev_text) {
                texts.push(format!("{vowel} {lyric}"));
            }
            texts.push(any_vowel);
            texts.push(lyric.to_string());
            return Candidates {
                kind: CandidateKind::VowelContinuation,
                texts,
            };
        }

        Candidates {
            kind: CandidateKind::Ordinary,
            texts: smallvec![any_vowel, lyric.to_string()],
        }
    }

    /// Alias events for one note group, ordered by offset.
    ///
    /// `group[0]` is the lead note; later notes only add to the group's
    /// duration. An empty group yields no events.
    pub fn process(&self, group: &[Note], ctx: &NeighborContext<'_>) -> Vec<PhonemeEvent> {
        let Some(note) = group.first() else {
            debug!("empty note group");
            return Vec::new();
        };

        let main = self.main_alias(note, ctx.prev_neighbor);
        let mut events = vec![PhonemeEvent::new(main, 0)];
        if let Some(vc) = ctx
            .next_neighbor
            .and_then(|next| self.transition(note, group, next))
        {
            events.push(vc);
        }
        events
    }

    fn main_alias(&self, note: &Note, prev_neighbor: Option<&Note>) -> String {
        let candidates = self.select_candidates(note, prev_neighbor);
        trace!(
            lyric = %note.lyric,
            kind = ?candidates.kind,
            texts = ?candidates.texts,
            "main candidates"
        );

        let request = ResolveRequest::for_note(note, ResolveMode::Main);
        match CandidateResolver::new(self.db).resolve(&candidates.texts, &request) {
            Some(found) => found.alias,
            None => {
                debug!(lyric = %note.lyric, "no alias resolved, using lyric");
                note.normalized_lyric().into_owned()
            }
        }
    }

    /// The VC event before `next`, if one applies.
    fn transition(&self, note: &Note, group: &[Note], next: &Note) -> Option<PhonemeEvent> {
        if next.hint().is_some() {
            return None;
        }
        let next_lyric = next.normalized_lyric();
        let next_lyric: &str = &next_lyric;
        if next_lyric.chars().count() == 1 && self.tables.is_bare_mora(next_lyric) {
            return None;
        }

        // The VC follows what the lyric ends on, not the resolved alias.
        let Some(vowel) = self.tables.trailing_vowel_class(&note.normalized_lyric()) else {
            debug!(lyric = %note.lyric, "no vowel class, skipping VC");
            return None;
        };
        let Some(consonant) = self.tables.leading_consonant_class(next_lyric) else {
            debug!(next = next_lyric, "no consonant class, skipping VC");
            return None;
        };

        let mut candidates: SmallVec<[String; 2]> = smallvec![format!("{vowel} {consonant}")];
        if let Some(substitute) = self.tables.substitute_class_of(consonant) {
            candidates.push(format!("{vowel} {substitute}"));
        }
        trace!(texts = ?candidates, "VC candidates");

        let request = ResolveRequest::for_note(note, ResolveMode::Transition);
        let Some(vc) = CandidateResolver::new(self.db).resolve(&candidates, &request) else {
            debug!(texts = ?candidates, "no VC alias resolved");
            return None;
        };

        let group_duration = group
            .iter()
            .fold(0i32, |total, n| total.saturating_add(n.duration));
        let length = self.transition_length(next, group_duration);
        if length <= 0 {
            debug!(alias = %vc.alias, group_duration, "VC has no room");
            return None;
        }
        Some(PhonemeEvent::new(vc.alias, group_duration - length))
    }

    /// VC length in ticks, in `0..=group_duration / 2`.
    pub fn transition_length(&self, next: &Note, group_duration: i32) -> i32 {
        let attr = next.attributes(0);
        let base = self
            .db
            .resolve_alias(
                &next.normalized_lyric(),
                next.tone.saturating_add(attr.tone_shift),
                &attr.voice_color,
            )
            .map_or(self.default_transition_ticks, |oto| {
                self.ticks.ms_to_ticks(next.position, oto.lead_in_ms())
            });
        let scaled = (f64::from(base) * attr.stretch_ratio()).round() as i32;
        scaled.min(group_duration / 2).max(0)
    }
}
