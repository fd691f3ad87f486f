/*!
 * Boundary to the host's playback source (an audio element or equivalent).
 *
 * The engine never owns the player. It reads and sets the position, resumes
 * playback, and registers handlers for the two signals the player emits.
 * Implementations must not dispatch signals synchronously from inside
 * `set_current_time` or `play`; a signal that arrives while the engine is
 * still handling another one is dropped. Calling back into the engine from
 * those methods does not deadlock, but queries made there return defaults
 * and `dispose` completes once the current signal has been handled.
 */

use std::fmt;
use std::sync::Arc;

/// Signals emitted by a playback source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackSignal {
    /// The playback position advanced (recurring, host-defined cadence)
    TimeUpdate,
    /// Playback reached the end of the media
    Ended,
}

impl fmt::Display for PlaybackSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackSignal::TimeUpdate => write!(f, "timeupdate"),
            PlaybackSignal::Ended => write!(f, "ended"),
        }
    }
}

/// Handler attached to a playback signal
///
/// Sources detach handlers by pointer identity (`Arc::ptr_eq`), so the same
/// `Arc` given to `add_listener` must be given to `remove_listener`.
pub type SignalHandler = Arc<dyn Fn() + Send + Sync>;

/// Host playback source
pub trait PlaybackSource: Send + Sync {
    /// Current position in seconds
    fn current_time(&self) -> f64;

    /// Move the position; completion is not awaited
    fn set_current_time(&self, seconds: f64);

    /// Whether playback is paused
    fn is_paused(&self) -> bool;

    /// Resume playback
    fn play(&self);

    /// Attach a handler for `signal`
    fn add_listener(&self, signal: PlaybackSignal, handler: SignalHandler);

    /// Detach a handler previously attached for `signal`
    fn remove_listener(&self, signal: PlaybackSignal, handler: &SignalHandler);
}
