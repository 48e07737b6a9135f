// Score-level driver: groups notes and phonemizes every group.
//
// A score is a single voice part: notes sorted by position. Notes whose
// lyric starts with "+" ("+", "+~", "+*") extend the preceding note's
// syllable instead of starting a new one, so they are folded into the
// previous group.
//
// For each group the neighbor context is derived from the adjacent groups,
// represented by their lead notes (an extender's "+~" lyric says nothing
// about the sound). Neighbors count only when the groups touch; a rest in
// between leaves `prev_neighbor`/`next_neighbor` unset, which makes the
// group phrase-initial or phrase-final.
//
// Groups are independent once the context is built, so they are
// phonemized in parallel with rayon and collected back in score order.

use crate::error::{LoadError, read_file};
use crate::note::{NeighborContext, Note, PhonemeEvent};
use crate::sequencer::PhonemeSequencer;
use crate::voicebank::{AliasDatabase, TickConverter};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Lyric prefix marking an extender note.
pub const EXTENDER_PREFIX: &str = "+";

/// The top-level JSON structure for a score file.
#[derive(Debug, Deserialize)]
struct ScoreFile {
    notes: Vec<Note>,
}

/// One voice part, notes sorted by position.
#[derive(Debug, Clone)]
pub struct Score {
    notes: Vec<Note>,
}

impl Score {
    /// Build a score, sorting notes by position (stable for equal starts).
    pub fn new(mut notes: Vec<Note>) -> Self {
        notes.sort_by_key(|n| n.position);
        Score { notes }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: ScoreFile = serde_json::from_str(json)?;
        Ok(Score::new(file.notes))
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        Ok(Self::from_json(&read_file(path)?)?)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

pub fn is_extender(lyric: &str) -> bool {
    lyric.starts_with(EXTENDER_PREFIX)
}

/// Split sorted notes into note groups (index ranges). A leading extender
/// with nothing before it starts its own group.
pub fn group_notes(notes: &[Note]) -> Vec<Range<usize>> {
    let mut groups: Vec<Range<usize>> = Vec::new();
    for (i, note) in notes.iter().enumerate() {
        match groups.last_mut() {
            Some(last) if is_extender(&note.lyric) => last.end = i + 1,
            _ => groups.push(i..i + 1),
        }
    }
    groups
}

impl<'a> NeighborContext<'a> {
    /// Context for `groups[index]` within `notes`.
    pub fn for_group(notes: &'a [Note], groups: &[Range<usize>], index: usize) -> Self {
        let group = &notes[groups[index].clone()];
        let prev_group = index
            .checked_sub(1)
            .and_then(|i| groups.get(i))
            .map(|r| &notes[r.clone()]);
        let next_group = groups.get(index + 1).map(|r| &notes[r.clone()]);

        let start = group.first().map_or(0, |n| n.position);
        let end = group.last().map_or(0, Note::end);
        let prev = prev_group.and_then(<[Note]>::first);
        let next = next_group.and_then(<[Note]>::first);
        let prev_touches = prev_group
            .and_then(<[Note]>::last)
            .is_some_and(|last| last.end() == start);
        let next_touches = next.is_some_and(|n| n.position == end);

        NeighborContext {
            prev,
            next,
            prev_neighbor: prev.filter(|_| prev_touches),
            next_neighbor: next.filter(|_| next_touches),
            prev_neighbors: prev_group.unwrap_or(&[]),
        }
    }
}

/// Events for one note group, positioned in the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPhonemes {
    /// Absolute start of the group, in ticks.
    pub position: i32,
    /// Lyric of the group's lead note.
    pub lyric: String,
    pub events: Vec<PhonemeEvent>,
}

/// Phonemize every note group of `score`, in score order.
pub fn phonemize_score<D, T>(
    score: &Score,
    sequencer: &PhonemeSequencer<'_, D, T>,
) -> Vec<GroupPhonemes>
where
    D: AliasDatabase + Sync + ?Sized,
    T: TickConverter + Sync + ?Sized,
{
    let notes = score.notes();
    let groups = group_notes(notes);
    groups
        .par_iter()
        .enumerate()
        .map(|(i, range)| {
            let lead = &notes[range.start];
            let ctx = NeighborContext::for_group(notes, &groups, i);
            GroupPhonemes {
                position: lead.position,
                lyric: lead.lyric.clone(),
                events: sequencer.process(&notes[range.clone()], &ctx),
            }
        })
        .collect()
}
