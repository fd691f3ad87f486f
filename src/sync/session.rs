use std::path::PathBuf;
use std::sync::Arc;
use log::debug;

use crate::app_config::SyncConfig;
use crate::clock::{Clock, MonotonicClock};
use crate::content::ContentContainer;
use crate::playback::PlaybackSource;
use crate::sync::engine::SyncEngine;

// @module: Chapter-to-chapter lifecycle of the sync engine

/// Holds at most one live engine, disposing it before the next chapter loads
pub struct ChapterSession {
    // @field: Settings shared by every chapter
    config: SyncConfig,

    // @field: Clock handed to each engine
    clock: Arc<dyn Clock>,

    // @field: Chapter id and its engine
    current: Option<(String, SyncEngine)>,
}

impl ChapterSession {
    pub fn new(config: SyncConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(config: SyncConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            current: None,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Where the host should fetch the subtitle text for `chapter_id`
    pub fn subtitle_path(&self, chapter_id: &str) -> PathBuf {
        self.config.subtitle_path(chapter_id)
    }

    /// Dispose the current chapter's engine, then synchronize a new chapter
    pub fn load_chapter(
        &mut self,
        chapter_id: &str,
        container: Arc<dyn ContentContainer>,
        subtitle_text: &str,
        playback: Arc<dyn PlaybackSource>,
    ) -> &SyncEngine {
        self.unload();

        debug!("Loading audio sync for chapter {}", chapter_id);
        let engine = SyncEngine::initialize_with_clock(
            container,
            subtitle_text,
            playback,
            &self.config,
            self.clock.clone(),
        );

        let (_, engine) = self.current.insert((chapter_id.to_string(), engine));
        engine
    }

    /// Dispose the current engine, e.g. when navigating to a chapter without audio
    pub fn unload(&mut self) {
        if let Some((chapter_id, engine)) = self.current.take() {
            debug!("Unloading audio sync for chapter {}", chapter_id);
            engine.dispose();
        }
    }

    pub fn engine(&self) -> Option<&SyncEngine> {
        self.current.as_ref().map(|(_, engine)| engine)
    }

    pub fn chapter_id(&self) -> Option<&str> {
        self.current.as_ref().map(|(id, _)| id.as_str())
    }
}

impl Drop for ChapterSession {
    fn drop(&mut self) {
        self.unload();
    }
}
