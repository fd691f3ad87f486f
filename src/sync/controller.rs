/*!
 * The playback synchronization state machine.
 *
 * States are `Idle` and `Active(i)`. Time updates move between them through
 * the cue index fast path; clicks seek the player and activate a cue at once;
 * `ended` returns to `Idle` unless the segment loop restarts its target.
 *
 * Every handler is a synchronous function of the playback position and the
 * current state. Seeks are fire-and-forget: the controller updates its own
 * state optimistically and the next time update reconciles with the player.
 */

use std::sync::Arc;
use log::{debug, trace};

use crate::app_config::SyncConfig;
use crate::clock::Clock;
use crate::content::{ContentContainer, ElementRef};
use crate::cue_index::{CueIndex, LookupPath};
use crate::highlight::HighlightManager;
use crate::playback::PlaybackSource;
use crate::scroll::ScrollCoordinator;
use crate::subtitle_processor::Cue;
use crate::sync::segment_loop::{LoopState, SegmentLoopController};

/// Which cue, if any, is current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Active(usize),
}

impl SyncState {
    pub fn index(&self) -> Option<usize> {
        match self {
            SyncState::Idle => None,
            SyncState::Active(i) => Some(*i),
        }
    }
}

/// Effect of handling one signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed
    Unchanged,
    /// A cue became active
    Activated { from: Option<usize>, to: usize },
    /// The active cue was cleared
    Cleared { from: usize },
    /// The active cue was clicked again while paused and restarted from its start
    Restarted { cue: usize },
    /// The loop target was restarted from its start
    Looped { cue: usize },
}

/// How often each lookup path was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LookupStats {
    pub current: usize,
    pub next: usize,
    pub gap: usize,
    pub binary_searches: usize,
}

impl LookupStats {
    fn record(&mut self, path: LookupPath) {
        match path {
            LookupPath::Current => self.current += 1,
            LookupPath::Next => self.next += 1,
            LookupPath::Gap => self.gap += 1,
            LookupPath::BinarySearch => self.binary_searches += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.current + self.next + self.gap + self.binary_searches
    }
}

/// State machine tying playback time to the highlighted content node
pub struct PlaybackSyncController {
    // @field: Parsed cues, sorted by start time
    cues: Vec<Cue>,

    // @field: Derived lookup structure
    index: CueIndex,

    // @field: Current state
    state: SyncState,

    // @field: Last resolved position, used as the fast-path hint
    cursor: Option<usize>,

    highlight: HighlightManager,
    scroll: ScrollCoordinator,
    segment_loop: SegmentLoopController,

    // @field: Attribute identifying cue nodes in the container
    id_attribute: String,

    container: Arc<dyn ContentContainer>,
    playback: Arc<dyn PlaybackSource>,

    stats: LookupStats,
    disposed: bool,
}

impl PlaybackSyncController {
    pub fn new(
        cues: Vec<Cue>,
        container: Arc<dyn ContentContainer>,
        playback: Arc<dyn PlaybackSource>,
        config: &SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let index = CueIndex::build(&cues);

        Self {
            cues,
            index,
            state: SyncState::Idle,
            cursor: None,
            highlight: HighlightManager::new(&config.id_attribute, &config.id_prefix, &config.highlight_class),
            scroll: ScrollCoordinator::new(config.scroll.clone(), clock),
            segment_loop: SegmentLoopController::new(),
            id_attribute: config.id_attribute.clone(),
            container,
            playback,
            stats: LookupStats::default(),
            disposed: false,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn index(&self) -> &CueIndex {
        &self.index
    }

    pub fn active_cue(&self) -> Option<&Cue> {
        self.state.index().and_then(|i| self.cues.get(i))
    }

    pub fn highlighted_element(&self) -> Option<ElementRef> {
        self.highlight.current()
    }

    pub fn last_scroll_ms(&self) -> Option<u64> {
        self.scroll.last_scroll_ms()
    }

    pub fn lookup_stats(&self) -> LookupStats {
        self.stats
    }

    pub fn loop_state(&self) -> LoopState {
        self.segment_loop.state()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Handle a time update by reading the player's position
    pub fn on_time_update(&mut self) -> Transition {
        if self.disposed {
            return Transition::Unchanged;
        }
        let time = self.playback.current_time();
        self.advance_to(time)
    }

    /// Move the state machine to playback position `time`
    pub fn advance_to(&mut self, time: f64) -> Transition {
        if self.disposed {
            return Transition::Unchanged;
        }

        let resolution = self.index.resolve(time, self.cursor);
        self.stats.record(resolution.path);
        let resolved = resolution.outcome.index();

        if let Some(target) = self.segment_loop.restart_on_exit(self.state.index(), resolved, time, &self.cues) {
            return self.restart_loop(target);
        }

        self.cursor = self.index.cursor(resolution.outcome);

        match (self.state, resolved) {
            (SyncState::Active(current), Some(next)) if current == next => Transition::Unchanged,
            (_, Some(next)) => self.activate(next),
            (SyncState::Active(current), None) => {
                trace!("No cue at {:.3}s ({:?})", time, resolution.outcome);
                self.deactivate(current)
            }
            (SyncState::Idle, None) => Transition::Unchanged,
        }
    }

    /// Handle a click on `target`, seeking to the cue its nearest tagged ancestor names
    pub fn on_click(&mut self, target: ElementRef) -> Transition {
        if self.disposed {
            return Transition::Unchanged;
        }

        let Some(node) = self.container.closest_with_attribute(target, &self.id_attribute) else {
            return Transition::Unchanged;
        };
        let Some(value) = self.container.attribute(node, &self.id_attribute) else {
            return Transition::Unchanged;
        };

        let cue_id = self.highlight.cue_id_from_attribute(&value).to_string();
        self.seek_to_cue(&cue_id)
    }

    /// Seek the player to the cue with `cue_id` and activate it immediately
    pub fn seek_to_cue(&mut self, cue_id: &str) -> Transition {
        if self.disposed {
            return Transition::Unchanged;
        }

        let Some(index) = self.cues.iter().position(|cue| cue.id == cue_id) else {
            debug!("Clicked id {} matches no cue", cue_id);
            return Transition::Unchanged;
        };

        let already_active = self.state == SyncState::Active(index);
        if already_active && !self.playback.is_paused() {
            return Transition::Unchanged;
        }

        self.start_cue(index);

        if self.segment_loop.is_enabled() {
            self.segment_loop.retarget(index, &self.cues[index]);
        }

        if already_active {
            Transition::Restarted { cue: index }
        } else {
            self.activate(index)
        }
    }

    /// Handle the end of playback
    pub fn on_ended(&mut self) -> Transition {
        if self.disposed {
            return Transition::Unchanged;
        }

        let previous = self.state;
        self.highlight.clear(self.container.as_ref());
        self.state = SyncState::Idle;
        self.cursor = None;

        if let Some(target) = self.segment_loop.target_index() {
            return self.restart_loop(target);
        }

        match previous {
            SyncState::Active(from) => {
                debug!("Playback ended, cue {} cleared", self.cues[from].id);
                Transition::Cleared { from }
            }
            SyncState::Idle => Transition::Unchanged,
        }
    }

    /// Loop the active cue, or the first cue when idle
    pub fn enable_loop(&mut self) -> Option<&Cue> {
        if self.disposed {
            return None;
        }
        let index = self.segment_loop.enable(self.state.index(), &self.cues)?;
        self.cues.get(index)
    }

    pub fn disable_loop(&mut self) {
        self.segment_loop.disable();
    }

    /// Clear the highlight and stop reacting to signals
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.highlight.clear(self.container.as_ref());
        self.segment_loop.disable();
        self.scroll.reset();
        self.state = SyncState::Idle;
        self.cursor = None;
        self.disposed = true;
    }

    fn start_cue(&self, index: usize) {
        self.playback.set_current_time(self.cues[index].start_time);
        if self.playback.is_paused() {
            self.playback.play();
        }
    }

    fn restart_loop(&mut self, target: usize) -> Transition {
        debug!("Loop restarting cue {}", self.cues[target].id);
        self.start_cue(target);
        if self.state != SyncState::Active(target) {
            self.activate(target);
        }
        self.cursor = Some(target);
        Transition::Looped { cue: target }
    }

    fn activate(&mut self, index: usize) -> Transition {
        let from = self.state.index();
        let container = self.container.as_ref();

        if let Some(element) = self.highlight.set_active(container, self.cues.get(index)) {
            self.scroll.ensure_visible(container, element);
        }

        self.state = SyncState::Active(index);
        self.cursor = Some(index);
        debug!("Cue {} active (was {:?})", self.cues[index].id, from);
        Transition::Activated { from, to: index }
    }

    fn deactivate(&mut self, from: usize) -> Transition {
        self.highlight.clear(self.container.as_ref());
        self.state = SyncState::Idle;
        Transition::Cleared { from }
    }
}
