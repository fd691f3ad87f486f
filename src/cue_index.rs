/*!
 * Point-in-interval lookup over parsed cues.
 *
 * The index is a sorted, immutable mirror of the cue sequence. Lookups use
 * half-open `[start, end)` semantics: a time equal to a cue's end never
 * matches that cue.
 *
 * `resolve` adds the fast path used during playback. Given the position
 * resolved on the previous tick, it checks the current cue, the next cue and
 * the gap between them before falling back to binary search, so steady
 * forward playback costs O(1) per tick. A missing hint means "before the
 * first cue".
 *
 * Where cues overlap, the one that started last wins on both paths.
 */

use crate::subtitle_processor::Cue;

/// One interval in the index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    /// Inclusive start in seconds
    pub start: f64,
    /// Exclusive end in seconds
    pub end: f64,
    /// Position of the cue in the source sequence
    pub index: usize,
}

/// Result of locating a time in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The time lies inside cue `i`
    Hit(usize),
    /// The time precedes the first cue, or the index is empty
    BeforeFirst,
    /// The time lies between cue `after` and the next one
    Gap {
        /// Index of the last cue starting at or before the time
        after: usize,
    },
    /// The time is at or beyond the end of the last cue
    AfterLast,
}

impl LookupOutcome {
    /// The matched cue, with every kind of miss collapsed to `None`
    pub fn index(&self) -> Option<usize> {
        match self {
            LookupOutcome::Hit(i) => Some(*i),
            _ => None,
        }
    }
}

/// Which check produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPath {
    /// Still inside the hinted cue
    Current,
    /// Advanced into the cue right after the hint
    Next,
    /// Inside the gap right after the hinted cue, or before the first cue
    Gap,
    /// Fell back to binary search
    BinarySearch,
}

/// Outcome of a hinted lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: LookupOutcome,
    pub path: LookupPath,
}

/// Sorted view over a cue sequence
#[derive(Debug, Clone, Default)]
pub struct CueIndex {
    entries: Vec<IndexEntry>,
}

impl CueIndex {
    /// Build the index from cues already sorted by start time
    ///
    /// Cues coming from anywhere but the parser should go through
    /// `SubtitleParser::normalize` first.
    pub fn build(cues: &[Cue]) -> Self {
        let entries = cues
            .iter()
            .enumerate()
            .map(|(index, cue)| IndexEntry {
                start: cue.start_time,
                end: cue.end_time,
                index,
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Locate `time` with a plain binary search over start times
    pub fn lookup(&self, time: f64) -> LookupOutcome {
        if self.entries.is_empty() || time.is_nan() {
            return LookupOutcome::BeforeFirst;
        }

        // Number of entries starting at or before `time`
        let starts_before = self.entries.partition_point(|entry| entry.start <= time);
        if starts_before == 0 {
            return LookupOutcome::BeforeFirst;
        }

        self.outcome_at(starts_before - 1, time)
    }

    /// Locate `time` starting from the previously resolved position
    pub fn resolve(&self, time: f64, hint: Option<usize>) -> Resolution {
        if !time.is_nan() {
            if let Some(resolution) = self.fast_path(time, hint) {
                return resolution;
            }
        }

        Resolution {
            outcome: self.lookup(time),
            path: LookupPath::BinarySearch,
        }
    }

    /// Position to feed back as the hint on the next tick
    ///
    /// `None` stands for "before the first cue".
    pub fn cursor(&self, outcome: LookupOutcome) -> Option<usize> {
        match outcome {
            LookupOutcome::Hit(i) | LookupOutcome::Gap { after: i } => Some(i),
            LookupOutcome::AfterLast => self.entries.len().checked_sub(1),
            LookupOutcome::BeforeFirst => None,
        }
    }

    /// Outcome once `candidate` is known to be the last entry starting at or before `time`
    fn outcome_at(&self, candidate: usize, time: f64) -> LookupOutcome {
        let entry = &self.entries[candidate];
        if time < entry.end {
            LookupOutcome::Hit(entry.index)
        } else if candidate + 1 == self.entries.len() {
            LookupOutcome::AfterLast
        } else {
            LookupOutcome::Gap { after: entry.index }
        }
    }

    /// True when no entry after `pos` has started by `time`
    fn is_last_started(&self, pos: usize, time: f64) -> bool {
        self.entries.get(pos + 1).is_none_or(|next| time < next.start)
    }

    // Picks the same candidate as `lookup`, so overlapping cues resolve alike on both paths
    fn fast_path(&self, time: f64, hint: Option<usize>) -> Option<Resolution> {
        let (candidate, path) = match hint {
            Some(cur) => {
                let current = self.entries.get(cur)?;
                // Moved backwards
                if time < current.start {
                    return None;
                }
                if self.is_last_started(cur, time) {
                    (cur, LookupPath::Current)
                } else if self.is_last_started(cur + 1, time) {
                    (cur + 1, LookupPath::Next)
                } else {
                    return None;
                }
            }
            None => {
                let first = self.entries.first()?;
                if time < first.start {
                    return Some(Resolution {
                        outcome: LookupOutcome::BeforeFirst,
                        path: LookupPath::Gap,
                    });
                }
                if !self.is_last_started(0, time) {
                    return None;
                }
                (0, LookupPath::Next)
            }
        };

        let outcome = self.outcome_at(candidate, time);
        let path = if outcome.index().is_some() { path } else { LookupPath::Gap };
        Some(Resolution { outcome, path })
    }
}
