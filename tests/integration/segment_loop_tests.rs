/*!
 * Integration tests for single-cue loop mode
 */

use cuesync::playback::PlaybackSource;
use cuesync::sync::{LoopState, SyncState};
use crate::common::Chapter;

#[test]
fn test_enableLoop_whenIdle_shouldTargetFirstCue() {
    let chapter = Chapter::sample();

    assert_eq!(chapter.engine.loop_state(), LoopState::default());
    assert_eq!(chapter.engine.enable_loop().as_deref(), Some("1"));
    assert!(chapter.engine.loop_state().enabled);
}

#[test]
fn test_ended_withLoopOnActiveCue_shouldSeekBackToItsStart() {
    let chapter = Chapter::sample();
    chapter.player.advance_to(2.5);
    assert_eq!(chapter.engine.enable_loop().as_deref(), Some("2"));

    chapter.player.finish();

    assert_eq!(chapter.player.seeks(), vec![2.0]);
    assert_eq!(chapter.player.play_calls(), 1);
    assert_eq!(chapter.engine.state(), SyncState::Active(1));
    assert_eq!(chapter.highlighted(), vec![chapter.node("2")]);
}

#[test]
fn test_crossingTargetEnd_shouldRestartTarget() {
    let chapter = Chapter::sample();
    chapter.player.advance_to(3.0);
    chapter.engine.enable_loop();

    chapter.player.advance_to(4.5);

    assert_eq!(chapter.player.seeks(), vec![2.0]);
    assert_eq!(chapter.player.current_time(), 2.0);
    assert_eq!(chapter.engine.state(), SyncState::Active(1));
    assert_eq!(chapter.highlighted(), vec![chapter.node("2")]);

    // Skipping straight into the next cue also counts as leaving the target
    chapter.player.advance_to(5.5);
    assert_eq!(chapter.player.seeks(), vec![2.0, 2.0]);
    assert_eq!(chapter.highlighted(), vec![chapter.node("2")]);
}

#[test]
fn test_backwardSeek_shouldNotRestartTarget() {
    let chapter = Chapter::sample();
    chapter.player.advance_to(3.0);
    chapter.engine.enable_loop();

    chapter.player.advance_to(1.0);

    assert!(chapter.player.seeks().is_empty());
    assert_eq!(chapter.engine.state(), SyncState::Active(0));
    assert_eq!(chapter.engine.loop_state().target_cue_id.as_deref(), Some("2"));
}

#[test]
fn test_disableLoop_shouldSuppressRestarts() {
    let chapter = Chapter::sample();
    chapter.player.advance_to(3.0);
    chapter.engine.enable_loop();
    chapter.engine.disable_loop();

    chapter.player.advance_to(4.6);
    assert_eq!(chapter.engine.state(), SyncState::Idle);

    chapter.player.advance_to(3.0);
    chapter.player.finish();

    assert!(chapter.player.seeks().is_empty());
    assert!(chapter.highlighted().is_empty());
    assert!(!chapter.engine.loop_state().enabled);
}

#[test]
fn test_click_whileLooping_shouldRetargetLoop() {
    let chapter = Chapter::sample();
    chapter.player.advance_to(0.5);
    chapter.engine.enable_loop();

    chapter.container.click(chapter.node("3"));
    assert_eq!(chapter.engine.loop_state().target_cue_id.as_deref(), Some("3"));
    assert_eq!(chapter.player.seeks(), vec![5.0]);

    chapter.player.advance_to(7.0);
    assert_eq!(chapter.player.seeks(), vec![5.0, 5.0]);
    assert_eq!(chapter.highlighted(), vec![chapter.node("3")]);
}
