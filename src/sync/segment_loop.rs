/*!
 * Optional loop mode replaying a single cue.
 *
 * The loop only decides *when* to restart. The controller performs the seek
 * and owns the resulting state change.
 */

use log::{debug, warn};

use crate::subtitle_processor::Cue;

/// Public view of the loop settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoopState {
    pub enabled: bool,
    pub target_cue_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct LoopTarget {
    index: usize,
    cue_id: String,
}

/// Tracks the cue being looped, if any
#[derive(Debug, Clone, Default)]
pub struct SegmentLoopController {
    target: Option<LoopTarget>,
}

impl SegmentLoopController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start looping the active cue, or the first cue when nothing is active
    ///
    /// Returns the index of the looped cue, `None` when there are no cues.
    pub fn enable(&mut self, active: Option<usize>, cues: &[Cue]) -> Option<usize> {
        let index = match active {
            Some(i) if i < cues.len() => Some(i),
            _ if !cues.is_empty() => Some(0),
            _ => None,
        };

        match index {
            Some(index) => {
                self.retarget(index, &cues[index]);
                Some(index)
            }
            None => {
                warn!("Cannot enable loop without any cues");
                None
            }
        }
    }

    pub fn disable(&mut self) {
        if let Some(target) = self.target.take() {
            debug!("Loop on cue {} disabled", target.cue_id);
        }
    }

    /// Point the loop at another cue (used when a cue is clicked while looping)
    pub fn retarget(&mut self, index: usize, cue: &Cue) {
        debug!("Looping cue {} [{:.3}, {:.3})", cue.id, cue.start_time, cue.end_time);
        self.target = Some(LoopTarget {
            index,
            cue_id: cue.id.clone(),
        });
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    pub fn target_index(&self) -> Option<usize> {
        self.target.as_ref().map(|t| t.index)
    }

    pub fn state(&self) -> LoopState {
        LoopState {
            enabled: self.is_enabled(),
            target_cue_id: self.target.as_ref().map(|t| t.cue_id.clone()),
        }
    }

    /// The cue to restart when playback just ran past the end of the target
    ///
    /// Only a forward exit counts: the target must have been active and
    /// `time` must be at or beyond its end. Seeking backwards out of the
    /// target does not restart it.
    pub fn restart_on_exit(&self, previously_active: Option<usize>, resolved: Option<usize>, time: f64, cues: &[Cue]) -> Option<usize> {
        let target = self.target_index()?;
        if previously_active != Some(target) || resolved == Some(target) {
            return None;
        }

        let cue = cues.get(target)?;
        (time >= cue.end_time).then_some(target)
    }
}
