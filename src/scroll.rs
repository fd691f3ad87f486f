use std::sync::Arc;
use log::trace;

use crate::app_config::ScrollConfig;
use crate::clock::Clock;
use crate::content::{ContentContainer, ElementRef, ScrollOptions};

// @module: Rate-limited scrolling of the highlighted node

/// What `ensure_visible` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// A scroll was issued
    Scrolled,
    /// The node was already visible, nothing to do
    AlreadyVisible,
    /// Dropped because the previous scroll was too recent
    CoolingDown,
}

/// Brings highlighted nodes into view, at most once per cooldown window
pub struct ScrollCoordinator {
    // @field: Scroll settings
    config: ScrollConfig,

    // @field: Time source
    clock: Arc<dyn Clock>,

    // @field: Time of the last issued scroll, in clock milliseconds
    last_scroll_ms: Option<u64>,
}

impl ScrollCoordinator {
    pub fn new(config: ScrollConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            last_scroll_ms: None,
        }
    }

    pub fn last_scroll_ms(&self) -> Option<u64> {
        self.last_scroll_ms
    }

    pub fn options(&self) -> ScrollOptions {
        self.config.options()
    }

    /// Scroll `element` into view unless it is visible or a scroll just happened
    pub fn ensure_visible(&mut self, container: &dyn ContentContainer, element: ElementRef) -> ScrollOutcome {
        if self.config.only_when_offscreen && container.is_in_view(element) {
            return ScrollOutcome::AlreadyVisible;
        }

        let now = self.clock.now_ms();
        if let Some(last) = self.last_scroll_ms {
            if now.saturating_sub(last) < self.config.cooldown_ms {
                trace!("Scroll to {:?} dropped inside cooldown", element);
                return ScrollOutcome::CoolingDown;
            }
        }

        self.last_scroll_ms = Some(now);
        container.scroll_into_view(element, self.config.options());
        ScrollOutcome::Scrolled
    }

    /// Forget the last scroll time
    pub fn reset(&mut self) {
        self.last_scroll_ms = None;
    }
}
