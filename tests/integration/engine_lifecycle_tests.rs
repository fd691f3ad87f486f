/*!
 * Integration tests for engine initialization, disposal and chapter switching
 */

use std::sync::{Arc, Weak};
use parking_lot::Mutex;

use cuesync::app_config::SyncConfig;
use cuesync::content::{ContentContainer, ElementRef};
use cuesync::errors::SubtitleError;
use cuesync::mock::{ManualClock, MockContainer, MockPlayer};
use cuesync::playback::{PlaybackSignal, PlaybackSource, SignalHandler};
use cuesync::subtitle_processor::Cue;
use cuesync::sync::{ChapterSession, SyncEngine, SyncState, Transition};
use crate::common::{self, Chapter};

/// Player that reports a time update synchronously from every seek
struct EchoPlayer {
    inner: MockPlayer,
}

impl PlaybackSource for EchoPlayer {
    fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.inner.set_current_time(seconds);
        self.inner.emit(PlaybackSignal::TimeUpdate);
    }

    fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }

    fn play(&self) {
        self.inner.play();
    }

    fn add_listener(&self, signal: PlaybackSignal, handler: SignalHandler) {
        self.inner.add_listener(signal, handler);
    }

    fn remove_listener(&self, signal: PlaybackSignal, handler: &SignalHandler) {
        self.inner.remove_listener(signal, handler);
    }
}

#[test]
fn test_initialize_shouldAttachOneHandlerPerSignal() {
    let chapter = Chapter::sample();

    assert_eq!(chapter.player.listener_count(PlaybackSignal::TimeUpdate), 1);
    assert_eq!(chapter.player.listener_count(PlaybackSignal::Ended), 1);
    assert_eq!(chapter.container.click_listener_count(), 1);
    assert_eq!(chapter.engine.cues().len(), 3);
    assert!(chapter.engine.skipped_blocks().is_empty());
}

#[test]
fn test_dispose_calledTwice_shouldDetachEverything() {
    let chapter = Chapter::sample();
    chapter.player.advance_to(1.0);
    assert_eq!(chapter.highlighted().len(), 1);

    chapter.engine.dispose();
    chapter.engine.dispose();

    assert!(chapter.engine.is_disposed());
    assert_eq!(chapter.player.total_listeners(), 0);
    assert_eq!(chapter.container.click_listener_count(), 0);
    assert!(chapter.highlighted().is_empty());
}

#[test]
fn test_signals_afterDispose_shouldDoNothing() {
    let chapter = Chapter::sample();
    chapter.engine.dispose();

    chapter.player.advance_to(3.0);
    chapter.container.click(chapter.node("3"));
    chapter.player.finish();

    assert!(chapter.highlighted().is_empty());
    assert!(chapter.player.seeks().is_empty());
    assert_eq!(chapter.engine.state(), SyncState::Idle);
    assert_eq!(chapter.engine.seek_to_cue("2"), Transition::Unchanged);
    assert_eq!(chapter.engine.enable_loop(), None);
}

#[test]
fn test_drop_shouldDispose() {
    common::init_logging();
    let player = Arc::new(MockPlayer::playing());
    let container = Arc::new(MockContainer::with_sentences("data-sentence-id", "s", &["1", "2", "3"]));

    {
        let engine = SyncEngine::initialize(container.clone(), common::SAMPLE_SRT, player.clone(), &SyncConfig::default());
        player.advance_to(0.5);
        assert_eq!(engine.state(), SyncState::Active(0));
    }

    assert_eq!(player.total_listeners(), 0);
    assert_eq!(container.click_listener_count(), 0);
    assert!(container.elements_with_class("highlighted-current").is_empty());
}

#[test]
fn test_initialize_withMalformedBlocks_shouldReportSkipped() {
    let srt = "1\n00:00:01,000 --> 00:00:02,000\nA\n\n2\nnot a time\nB\n\n3\n00:00:03,000 --> 00:00:04,000\nC\n";
    let chapter = Chapter::new(srt, &["1", "2", "3"]);

    let ids: Vec<String> = chapter.engine.cues().into_iter().map(|cue| cue.id).collect();
    assert_eq!(ids, vec!["1", "3"]);

    let skipped = chapter.engine.skipped_blocks();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].line, 5);
    assert!(matches!(skipped[0].error, SubtitleError::MissingTimeRange(_)));
}

#[test]
fn test_initialize_withEmptyText_shouldStayIdle() {
    let chapter = Chapter::new("", &["1"]);

    chapter.player.advance_to(1.0);
    chapter.player.finish();

    assert!(chapter.engine.cues().is_empty());
    assert_eq!(chapter.engine.state(), SyncState::Idle);
    assert_eq!(chapter.engine.enable_loop(), None);
}

#[test]
fn test_click_withSynchronousTimeUpdate_shouldNotDeadlock() {
    common::init_logging();
    let player = Arc::new(EchoPlayer { inner: MockPlayer::playing() });
    let container = Arc::new(MockContainer::with_sentences("data-sentence-id", "s", &["1", "2", "3"]));
    let engine = SyncEngine::initialize_with_clock(
        container.clone(),
        common::SAMPLE_SRT,
        player.clone(),
        &SyncConfig::default(),
        Arc::new(ManualClock::new(0)),
    );

    container.click(sentence_node(&container, "2"));

    assert_eq!(player.inner.seeks(), vec![2.0]);
    assert_eq!(engine.state(), SyncState::Active(1));
}

#[test]
fn test_chapterSession_switchingChapters_shouldKeepOneSetOfHandlers() {
    common::init_logging();
    let player = Arc::new(MockPlayer::playing());
    let first = Arc::new(MockContainer::with_sentences("data-sentence-id", "s", &["1", "2", "3"]));
    let second = Arc::new(MockContainer::with_sentences("data-sentence-id", "s", &["1"]));
    let mut session = ChapterSession::with_clock(SyncConfig::default(), Arc::new(ManualClock::new(0)));

    session.load_chapter("chap1", first.clone(), common::SAMPLE_SRT, player.clone());
    player.advance_to(1.0);
    assert_eq!(first.elements_with_class("highlighted-current").len(), 1);

    session.load_chapter("chap2", second.clone(), "1\n00:00:00,000 --> 00:00:03,000\nOnly\n", player.clone());

    assert_eq!(session.chapter_id(), Some("chap2"));
    assert_eq!(player.total_listeners(), 2);
    assert_eq!(first.click_listener_count(), 0);
    assert!(first.elements_with_class("highlighted-current").is_empty());

    player.advance_to(2.0);
    assert!(first.elements_with_class("highlighted-current").is_empty());
    assert_eq!(second.elements_with_class("highlighted-current").len(), 1);

    session.unload();
    assert!(session.engine().is_none());
    assert_eq!(player.total_listeners(), 0);
    assert_eq!(second.click_listener_count(), 0);
    assert_eq!(session.subtitle_path("chap2"), SyncConfig::default().subtitle_path("chap2"));
}

/// Paused player that disposes the engine when playback is resumed
struct DisposingPlayer {
    inner: MockPlayer,
    engine: Mutex<Option<Weak<SyncEngine>>>,
}

impl PlaybackSource for DisposingPlayer {
    fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.inner.set_current_time(seconds);
    }

    fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }

    fn play(&self) {
        self.inner.play();
        let engine = self.engine.lock().as_ref().and_then(Weak::upgrade);
        if let Some(engine) = engine {
            assert_eq!(engine.state(), SyncState::Idle);
            engine.dispose();
        }
    }

    fn add_listener(&self, signal: PlaybackSignal, handler: SignalHandler) {
        self.inner.add_listener(signal, handler);
    }

    fn remove_listener(&self, signal: PlaybackSignal, handler: &SignalHandler) {
        self.inner.remove_listener(signal, handler);
    }
}

#[test]
fn test_fromCues_withShuffledCues_shouldSortBeforeIndexing() {
    common::init_logging();
    let player = Arc::new(MockPlayer::playing());
    let container = Arc::new(MockContainer::with_sentences("data-sentence-id", "s", &["a", "b", "c"]));
    let cues = vec![
        Cue::new("c", 5.0, 7.0, "third"),
        Cue::new("a", 0.0, 2.0, "first"),
        Cue::new("b", 2.0, 4.0, "second"),
        Cue::new("x", 9.0, 8.0, "backwards"),
    ];
    let engine = SyncEngine::from_cues(container.clone(), cues, player.clone(), &SyncConfig::default(), Arc::new(ManualClock::new(0)));

    player.advance_to(1.0);
    assert_eq!(engine.active_cue().map(|cue| cue.id).as_deref(), Some("a"));

    player.advance_to(6.0);
    assert_eq!(engine.active_cue().map(|cue| cue.id).as_deref(), Some("c"));
    assert_eq!(engine.cues().len(), 3);
    assert_eq!(container.elements_with_class("highlighted-current"), vec![sentence_node(&container, "c")]);
}

#[test]
fn test_dispose_fromInsideCollaboratorCallback_shouldNotHang() {
    common::init_logging();
    let player = Arc::new(DisposingPlayer {
        inner: MockPlayer::new(),
        engine: Mutex::new(None),
    });
    let container = Arc::new(MockContainer::with_sentences("data-sentence-id", "s", &["1", "2", "3"]));
    let engine = Arc::new(SyncEngine::initialize_with_clock(
        container.clone(),
        common::SAMPLE_SRT,
        player.clone(),
        &SyncConfig::default(),
        Arc::new(ManualClock::new(0)),
    ));
    *player.engine.lock() = Some(Arc::downgrade(&engine));

    // Clicking while paused resumes playback, which disposes mid-signal
    container.click(sentence_node(&container, "2"));

    assert!(engine.is_disposed());
    assert_eq!(player.inner.seeks(), vec![2.0]);
    assert_eq!(player.inner.total_listeners(), 0);
    assert_eq!(container.click_listener_count(), 0);
    assert!(container.elements_with_class("highlighted-current").is_empty());
    assert_eq!(engine.state(), SyncState::Idle);
}

/// Node for `cue_id` in a container built outside `Chapter`
fn sentence_node(container: &MockContainer, cue_id: &str) -> ElementRef {
    container
        .query_by_attribute("data-sentence-id", &format!("s{}", cue_id))
        .expect("node for cue id")
}
