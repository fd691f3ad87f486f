/*!
 * Playback synchronization.
 *
 * - `controller`: the `Idle`/`Active(i)` state machine
 * - `segment_loop`: optional single-cue loop mode
 * - `engine`: instance handle with handler registration and disposal
 * - `session`: dispose-before-init lifecycle across chapters
 */

pub mod controller;
pub mod engine;
pub mod segment_loop;
pub mod session;

// Re-export main types
pub use controller::{LookupStats, PlaybackSyncController, SyncState, Transition};
pub use engine::SyncEngine;
pub use segment_loop::{LoopState, SegmentLoopController};
pub use session::ChapterSession;
