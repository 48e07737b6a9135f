// Candidate resolution against the alias database with strict color matching.
//
// The sequencer builds an ordered list of alias texts it would accept
// ("- か", "か", ...). The resolver queries each one, trying the
// alternate-take variant ("か2") before the plain text, and keeps at most
// one hit per candidate. It then scans the hits in candidate order and
// returns the first whose color equals the requested color. Hits of another
// color never win: a voicebank answering from the wrong subbank counts as
// no answer.
//
// Which attributes drive the request depends on the phoneme being resolved:
// the main alias reads attribute index 0, the VC transition index 1.

use crate::note::Note;
use crate::voicebank::{AliasDatabase, ResolvedAlias};
use tracing::debug;

/// Which phoneme of a note is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// The note's own CV/VCV alias.
    Main,
    /// The VC transition before the next note.
    Transition,
}

impl ResolveMode {
    /// Phoneme attribute index this mode reads.
    pub fn attribute_index(self) -> usize {
        match self {
            ResolveMode::Main => 0,
            ResolveMode::Transition => 1,
        }
    }
}

/// Tone, color, and alternate take to resolve candidates at.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveRequest<'a> {
    pub tone: i32,
    pub tone_shift: i32,
    pub color: &'a str,
    pub alternate: Option<u32>,
}

impl<'a> ResolveRequest<'a> {
    pub fn for_note(note: &'a Note, mode: ResolveMode) -> Self {
        let attr = note.attributes(mode.attribute_index());
        ResolveRequest {
            tone: note.tone,
            tone_shift: attr.tone_shift,
            color: &attr.voice_color,
            alternate: attr.alternate,
        }
    }

    pub fn shifted_tone(&self) -> i32 {
        self.tone.saturating_add(self.tone_shift)
    }
}

/// Resolves ordered candidate lists against an `AliasDatabase`.
pub struct CandidateResolver<'a, D: ?Sized> {
    db: &'a D,
}

impl<'a, D: AliasDatabase + ?Sized> CandidateResolver<'a, D> {
    pub fn new(db: &'a D) -> Self {
        CandidateResolver { db }
    }

    /// Resolve one candidate: alternate-take variant first, then plain.
    fn resolve_one(&self, text: &str, request: &ResolveRequest<'_>) -> Option<ResolvedAlias> {
        let tone = request.shifted_tone();
        request
            .alternate
            .and_then(|alt| {
                self.db
                    .resolve_alias(&format!("{text}{alt}"), tone, request.color)
            })
            .or_else(|| self.db.resolve_alias(text, tone, request.color))
    }

    /// First resolved candidate whose color matches the request, in
    /// candidate order. `None` if nothing matched, even when some candidates
    /// resolved to another color.
    pub fn resolve<S: AsRef<str>>(
        &self,
        candidates: &[S],
        request: &ResolveRequest<'_>,
    ) -> Option<ResolvedAlias> {
        let mut hits: Vec<ResolvedAlias> = candidates
            .iter()
            .filter_map(|c| self.resolve_one(c.as_ref(), request))
            .collect();

        match hits.iter().position(|hit| hit.color == request.color) {
            Some(i) => Some(hits.swap_remove(i)),
            None => {
                if !hits.is_empty() {
                    debug!(
                        color = request.color,
                        found = ?hits.iter().map(|h| h.color.as_str()).collect::<Vec<_>>(),
                        "candidates resolved only to other colors"
                    );
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::PhonemeAttributes;
    use crate::voicebank::{Subbank, VoicebankTable};

    fn request(color: &str, alternate: Option<u32>) -> ResolveRequest<'_> {
        ResolveRequest {
            tone: 60,
            tone_shift: 0,
            color,
            alternate,
        }
    }

    #[test]
    fn test_first_candidate_in_order_wins() {
        let bank = VoicebankTable::default()
            .with_oto("* か", 80.0, 20.0)
            .with_oto("か", 60.0, 10.0);
        let resolver = CandidateResolver::new(&bank);
        let hit = resolver.resolve(&["* か", "か"], &request("", None)).unwrap();
        assert_eq!(hit.alias, "* か");
    }

    #[test]
    fn test_skips_unresolved_candidates() {
        let bank = VoicebankTable::default().with_oto("か", 60.0, 10.0);
        let resolver = CandidateResolver::new(&bank);
        let hit = resolver.resolve(&["- か", "か"], &request("", None)).unwrap();
        assert_eq!(hit.alias, "か");
    }

    #[test]
    fn test_alternate_take_tried_first() {
        let bank = VoicebankTable::default()
            .with_oto("か", 60.0, 10.0)
            .with_oto("か2", 65.0, 10.0);
        let resolver = CandidateResolver::new(&bank);
        let hit = resolver.resolve(&["か"], &request("", Some(2))).unwrap();
        assert_eq!(hit.alias, "か2");

        let missing = resolver.resolve(&["か"], &request("", Some(3))).unwrap();
        assert_eq!(missing.alias, "か");
    }

    #[test]
    fn test_color_mismatch_fails() {
        // The database falls back to the default subbank, but the resolver
        // must not accept a different color.
        let bank = VoicebankTable::default()
            .with_oto("か", 60.0, 10.0)
            .with_subbank(Subbank::new("", "", ""))
            .with_subbank(Subbank::new("soft", "", "S"));
        let resolver = CandidateResolver::new(&bank);
        assert!(resolver.resolve(&["か"], &request("soft", None)).is_none());
    }

    #[test]
    fn test_later_matching_color_beats_earlier_mismatch() {
        let bank = VoicebankTable::default()
            .with_oto("* か", 60.0, 10.0)
            .with_oto("かS", 60.0, 10.0)
            .with_subbank(Subbank::new("", "", ""))
            .with_subbank(Subbank::new("soft", "", "S"));
        let resolver = CandidateResolver::new(&bank);
        let hit = resolver
            .resolve(&["* か", "か"], &request("soft", None))
            .unwrap();
        assert_eq!(hit.alias, "かS");
        assert_eq!(hit.color, "soft");
    }

    #[test]
    fn test_empty_candidates() {
        let bank = VoicebankTable::default();
        let resolver = CandidateResolver::new(&bank);
        let none: [&str; 0] = [];
        assert!(resolver.resolve(&none, &request("", None)).is_none());
    }

    #[test]
    fn test_request_reads_mode_attribute() {
        let note = Note::new("か", 60, 0, 480)
            .with_attributes(PhonemeAttributes {
                index: 0,
                tone_shift: -12,
                ..Default::default()
            })
            .with_attributes(PhonemeAttributes {
                index: 1,
                voice_color: "soft".to_string(),
                alternate: Some(2),
                ..Default::default()
            });

        let main = ResolveRequest::for_note(&note, ResolveMode::Main);
        assert_eq!(main.shifted_tone(), 48);
        assert_eq!(main.color, "");

        let vc = ResolveRequest::for_note(&note, ResolveMode::Transition);
        assert_eq!(vc.shifted_tone(), 60);
        assert_eq!(vc.color, "soft");
        assert_eq!(vc.alternate, Some(2));
    }

    #[test]
    fn test_tone_shift_selects_subbank() {
        let bank = VoicebankTable::default()
            .with_oto("かL", 60.0, 10.0)
            .with_oto("かH", 60.0, 10.0)
            .with_subbank(Subbank::new("", "", "L").with_tones(0, 59))
            .with_subbank(Subbank::new("", "", "H").with_tones(60, 127));
        let resolver = CandidateResolver::new(&bank);
        let shifted = ResolveRequest {
            tone_shift: -5,
            ..request("", None)
        };
        assert_eq!(resolver.resolve(&["か"], &shifted).unwrap().alias, "かL");
    }
}
