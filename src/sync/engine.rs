/*!
 * Engine instance: wires a controller to its collaborators and tears it down.
 *
 * `initialize` creates the three handlers (time update, ended, click) once,
 * attaches them, and keeps the very same `Arc`s so `dispose` can detach them
 * by identity. Handlers hold only a `Weak` reference to the controller and
 * check a shared disposed flag first, so a signal the host delivers after
 * `dispose` does nothing.
 *
 * Collaborator callbacks run while the controller is locked. Engine methods
 * called from inside one never block on that lock: queries give up after
 * `LOCK_WAIT`, and `dispose` leaves the controller to whoever holds it, which
 * checks the disposed flag before releasing.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::app_config::SyncConfig;
use crate::clock::{Clock, MonotonicClock};
use crate::content::{ClickHandler, ContentContainer, ElementRef};
use crate::playback::{PlaybackSignal, PlaybackSource, SignalHandler};
use crate::subtitle_processor::{Cue, SkippedBlock, SubtitleParser};
use crate::sync::controller::{LookupStats, PlaybackSyncController, SyncState, Transition};
use crate::sync::segment_loop::LoopState;

type SharedController = Arc<Mutex<PlaybackSyncController>>;

/// Longest an engine method waits for a controller another caller holds
const LOCK_WAIT: Duration = Duration::from_millis(50);

/// Everything `dispose` has to undo
struct Attachment {
    controller: SharedController,
    playback: Arc<dyn PlaybackSource>,
    container: Arc<dyn ContentContainer>,
    time_update: SignalHandler,
    ended: SignalHandler,
    click: ClickHandler,
}

/// Handle to one synchronized chapter
pub struct SyncEngine {
    attachment: Mutex<Option<Attachment>>,
    disposed: Arc<AtomicBool>,
    skipped: Vec<SkippedBlock>,
}

impl SyncEngine {
    /// Parse `subtitle_text` and start synchronizing `container` with `playback`
    pub fn initialize(
        container: Arc<dyn ContentContainer>,
        subtitle_text: &str,
        playback: Arc<dyn PlaybackSource>,
        config: &SyncConfig,
    ) -> Self {
        Self::initialize_with_clock(container, subtitle_text, playback, config, Arc::new(MonotonicClock::new()))
    }

    /// Same as `initialize` with an explicit clock for scroll rate limiting
    pub fn initialize_with_clock(
        container: Arc<dyn ContentContainer>,
        subtitle_text: &str,
        playback: Arc<dyn PlaybackSource>,
        config: &SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let report = SubtitleParser::parse_with_report(subtitle_text);
        let mut engine = Self::attach(container, report.cues, playback, config, clock);
        engine.skipped = report.skipped;
        engine
    }

    /// Start synchronizing with cues built elsewhere
    ///
    /// The cues are sorted by start time and invalid intervals are dropped
    /// before the index is built.
    pub fn from_cues(
        container: Arc<dyn ContentContainer>,
        cues: Vec<Cue>,
        playback: Arc<dyn PlaybackSource>,
        config: &SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::attach(container, SubtitleParser::normalize(cues), playback, config, clock)
    }

    fn attach(
        container: Arc<dyn ContentContainer>,
        cues: Vec<Cue>,
        playback: Arc<dyn PlaybackSource>,
        config: &SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cue_count = cues.len();
        let controller: SharedController = Arc::new(Mutex::new(PlaybackSyncController::new(
            cues,
            container.clone(),
            playback.clone(),
            config,
            clock,
        )));
        let disposed = Arc::new(AtomicBool::new(false));

        let time_update = signal_handler(&controller, &disposed, PlaybackSignal::TimeUpdate, |c| {
            c.on_time_update();
        });
        let ended = signal_handler(&controller, &disposed, PlaybackSignal::Ended, |c| {
            c.on_ended();
        });
        let click = click_handler(&controller, &disposed);

        playback.add_listener(PlaybackSignal::TimeUpdate, time_update.clone());
        playback.add_listener(PlaybackSignal::Ended, ended.clone());
        container.add_click_listener(click.clone());

        info!("Audio sync initialized with {} cues", cue_count);

        Self {
            attachment: Mutex::new(Some(Attachment {
                controller,
                playback,
                container,
                time_update,
                ended,
                click,
            })),
            disposed,
            skipped: Vec::new(),
        }
    }

    /// Detach every handler and clear the highlight; later calls do nothing
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);

        let Some(attachment) = self.attachment.lock().take() else {
            debug!("Audio sync already disposed");
            return;
        };

        attachment.playback.remove_listener(PlaybackSignal::TimeUpdate, &attachment.time_update);
        attachment.playback.remove_listener(PlaybackSignal::Ended, &attachment.ended);
        attachment.container.remove_click_listener(&attachment.click);
        match attachment.controller.try_lock_for(LOCK_WAIT) {
            Some(mut controller) => controller.dispose(),
            None => debug!("Controller busy, its current holder finishes the disposal"),
        }

        debug!("Audio sync disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Blocks the parser skipped while loading the subtitle text
    pub fn skipped_blocks(&self) -> &[SkippedBlock] {
        &self.skipped
    }

    pub fn state(&self) -> SyncState {
        self.with_controller(|c| c.state()).unwrap_or_default()
    }

    pub fn active_cue(&self) -> Option<Cue> {
        self.with_controller(|c| c.active_cue().cloned()).flatten()
    }

    pub fn highlighted_element(&self) -> Option<ElementRef> {
        self.with_controller(|c| c.highlighted_element()).flatten()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.with_controller(|c| c.cues().to_vec()).unwrap_or_default()
    }

    pub fn lookup_stats(&self) -> LookupStats {
        self.with_controller(|c| c.lookup_stats()).unwrap_or_default()
    }

    /// Seek to a cue by id, as a click on its node would
    pub fn seek_to_cue(&self, cue_id: &str) -> Transition {
        self.with_controller(|c| c.seek_to_cue(cue_id)).unwrap_or(Transition::Unchanged)
    }

    /// Loop the active cue (or the first cue); returns the looped cue's id
    pub fn enable_loop(&self) -> Option<String> {
        self.with_controller(|c| c.enable_loop().map(|cue| cue.id.clone())).flatten()
    }

    pub fn disable_loop(&self) {
        self.with_controller(|c| c.disable_loop());
    }

    pub fn loop_state(&self) -> LoopState {
        self.with_controller(|c| c.loop_state()).unwrap_or_default()
    }

    fn with_controller<R>(&self, f: impl FnOnce(&mut PlaybackSyncController) -> R) -> Option<R> {
        let attachment = self.attachment.lock();
        let controller = attachment.as_ref()?.controller.clone();
        drop(attachment);

        let Some(mut guard) = controller.try_lock_for(LOCK_WAIT) else {
            warn!("Sync controller busy, called from inside a collaborator callback?");
            return None;
        };
        let result = f(&mut guard);
        finish_if_disposed(&mut guard, &self.disposed);
        Some(result)
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Run `f` on the controller unless the engine is gone or already busy
fn dispatch(
    controller: &Weak<Mutex<PlaybackSyncController>>,
    disposed: &AtomicBool,
    signal: &str,
    f: impl FnOnce(&mut PlaybackSyncController),
) {
    if disposed.load(Ordering::Acquire) {
        return;
    }
    let Some(controller) = controller.upgrade() else {
        return;
    };

    match controller.try_lock() {
        Some(mut guard) => {
            f(&mut guard);
            finish_if_disposed(&mut guard, disposed);
        }
        None => warn!("Dropped re-entrant {} signal", signal),
    }
}

/// Complete a `dispose` that ran while this caller held the controller
fn finish_if_disposed(controller: &mut PlaybackSyncController, disposed: &AtomicBool) {
    if disposed.load(Ordering::Acquire) {
        controller.dispose();
    }
}

fn signal_handler(
    controller: &SharedController,
    disposed: &Arc<AtomicBool>,
    signal: PlaybackSignal,
    f: fn(&mut PlaybackSyncController),
) -> SignalHandler {
    let controller = Arc::downgrade(controller);
    let disposed = disposed.clone();
    let name = signal.to_string();

    Arc::new(move || dispatch(&controller, &disposed, &name, f))
}

fn click_handler(controller: &SharedController, disposed: &Arc<AtomicBool>) -> ClickHandler {
    let controller = Arc::downgrade(controller);
    let disposed = disposed.clone();

    Arc::new(move |target: ElementRef| {
        dispatch(&controller, &disposed, "click", |c| {
            c.on_click(target);
        })
    })
}
