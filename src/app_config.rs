use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::content::{ScrollAlign, ScrollBehavior, ScrollOptions};
use crate::errors::ConfigError;

/// Sync engine configuration module
/// This module holds the settings that tie the engine to a host's markup
/// and tune its scrolling behavior. Every field has a default matching the
/// reader application's markup, so an empty JSON object is a valid config.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SyncConfig {
    /// Attribute carrying the cue id on content nodes
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,

    /// Prefix in front of the cue id inside the attribute value (e.g. "s" for `s12`)
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Class toggled on the highlighted node
    #[serde(default = "default_highlight_class")]
    pub highlight_class: String,

    /// Scroll behavior settings
    #[serde(default)]
    pub scroll: ScrollConfig,

    /// Directory holding `<chapter>.srt` files, relative to the host's root
    #[serde(default = "default_subtitle_dir")]
    pub subtitle_dir: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings for bringing the highlighted node into view
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScrollConfig {
    /// Minimum interval between two scroll actions in milliseconds
    #[serde(default = "default_scroll_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Skip scrolling when the node is already visible
    #[serde(default = "default_true")]
    pub only_when_offscreen: bool,

    /// Scroll animation
    #[serde(default)]
    pub behavior: ScrollBehavior,

    /// Vertical alignment of the node after scrolling
    #[serde(default)]
    pub block: ScrollAlign,
}

impl ScrollConfig {
    // @returns: Options for the container's scroll primitive
    pub fn options(&self) -> ScrollOptions {
        ScrollOptions {
            behavior: self.behavior,
            block: self.block,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_scroll_cooldown_ms(),
            only_when_offscreen: true,
            behavior: ScrollBehavior::default(),
            block: ScrollAlign::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_id_attribute() -> String {
    "data-sentence-id".to_string()
}

fn default_id_prefix() -> String {
    "s".to_string()
}

fn default_highlight_class() -> String {
    "highlighted-current".to_string()
}

fn default_subtitle_dir() -> PathBuf {
    PathBuf::from("srt")
}

fn default_scroll_cooldown_ms() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl SyncConfig {
    /// Parse a configuration from JSON, filling in defaults for missing fields
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SyncConfig = serde_json::from_str(json)
            .context("Failed to parse sync configuration JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Serialize the configuration as pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize sync configuration")
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id_attribute.trim().is_empty() {
            return Err(ConfigError::EmptyValue("id_attribute"));
        }
        if self.id_attribute.chars().any(|c| c.is_whitespace() || c == '"' || c == '=') {
            return Err(ConfigError::InvalidValue {
                field: "id_attribute",
                reason: format!("'{}' is not a valid attribute name", self.id_attribute),
            });
        }
        if self.highlight_class.trim().is_empty() {
            return Err(ConfigError::EmptyValue("highlight_class"));
        }
        if self.highlight_class.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "highlight_class",
                reason: "a single class name cannot contain whitespace".to_string(),
            });
        }

        Ok(())
    }

    /// Path of the subtitle file for a chapter (`<subtitle_dir>/<chapter_id>.srt`)
    pub fn subtitle_path(&self, chapter_id: &str) -> PathBuf {
        self.subtitle_dir.join(format!("{}.srt", chapter_id))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            id_attribute: default_id_attribute(),
            id_prefix: default_id_prefix(),
            highlight_class: default_highlight_class(),
            scroll: ScrollConfig::default(),
            subtitle_dir: default_subtitle_dir(),
            log_level: LogLevel::default(),
        }
    }
}
