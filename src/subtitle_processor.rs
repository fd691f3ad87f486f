use std::collections::HashSet;
use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use log::{warn, debug};

use crate::errors::SubtitleError;

// @module: Subtitle parsing into timed cues

// @const: SRT time range line, hours may exceed two digits, trailing cue settings ignored
static TIME_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{3})(?:\s.*)?$").unwrap()
});

// @const: Single SRT timestamp
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})$").unwrap()
});

const ARROW: &str = "-->";

// @struct: Single timed text interval
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    // @field: Declared block index, matched against content ids
    pub id: String,

    // @field: Start time in seconds (inclusive)
    pub start_time: f64,

    // @field: End time in seconds (exclusive)
    pub end_time: f64,

    // @field: Text lines joined with newlines
    pub text: String,
}

impl Cue {
    /// Creates a cue without validation - used by tests and hosts building cues by hand
    pub fn new(id: impl Into<String>, start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Cue {
            id: id.into(),
            start_time,
            end_time,
            text: text.into(),
        }
    }

    // @creates: Validated cue
    // @validates: Time range and non-empty text
    pub fn new_validated(id: String, start_time: f64, end_time: f64, text: &str) -> Result<Self, SubtitleError> {
        if end_time <= start_time {
            return Err(SubtitleError::InvalidTimeRange {
                start: start_time,
                end: end_time,
            });
        }

        let trimmed_text = text.trim();
        if trimmed_text.is_empty() {
            return Err(SubtitleError::EmptyText(id));
        }

        Ok(Cue {
            id,
            start_time,
            end_time,
            text: trimmed_text.to_string(),
        })
    }

    /// Whether `time` falls inside the half-open interval `[start, end)`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time
    }

    /// Length of the interval in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.id)?;
        writeln!(f, "{} --> {}", format_timestamp(self.start_time), format_timestamp(self.end_time))?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// A block the parser rejected, with the line it started on
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedBlock {
    /// 1-based line number of the first line of the block
    pub line: usize,
    /// Why the block was rejected
    pub error: SubtitleError,
}

/// Parser output together with the diagnostics for rejected blocks
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    /// Accepted cues, sorted by start time
    pub cues: Vec<Cue>,
    /// Blocks that were skipped
    pub skipped: Vec<SkippedBlock>,
}

impl ParseReport {
    /// True when no block was skipped
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Parse a single `H+:MM:SS,mmm` timestamp into seconds
pub fn parse_timestamp(timestamp: &str) -> Result<f64, SubtitleError> {
    let caps = TIMESTAMP_REGEX
        .captures(timestamp.trim())
        .ok_or_else(|| SubtitleError::InvalidTimestamp(timestamp.to_string()))?;

    timestamp_from_captures(&caps, 1)
        .ok_or_else(|| SubtitleError::InvalidTimestamp(timestamp.to_string()))
}

/// Format seconds as an SRT timestamp (HH:MM:SS,mmm)
pub fn format_timestamp(seconds: f64) -> String {
    let ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Convert four captured groups starting at `start_idx` to seconds
fn timestamp_from_captures(caps: &regex::Captures, start_idx: usize) -> Option<f64> {
    let field = |offset: usize| -> Option<u64> {
        caps.get(start_idx + offset)?.as_str().parse().ok()
    };

    let hours = field(0)?;
    let minutes = field(1)?;
    let seconds = field(2)?;
    let millis = field(3)?;

    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let total_ms = hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1_000 + millis)?;

    Some(total_ms as f64 / 1000.0)
}

/// Converts subtitle text into ordered cues
pub struct SubtitleParser;

impl SubtitleParser {
    /// Parse subtitle text into cues, dropping the diagnostics
    pub fn parse(content: &str) -> Vec<Cue> {
        Self::parse_with_report(content).cues
    }

    /// Parse subtitle text, keeping a record of every skipped block
    ///
    /// Never fails. Malformed blocks are logged and skipped, and the result is
    /// sorted by start time even when the source is not.
    pub fn parse_with_report(content: &str) -> ParseReport {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut report = ParseReport::default();

        let mut block: Vec<&str> = Vec::new();
        let mut block_start_line = 0;
        let mut block_ordinal = 0;

        for (line_idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if !block.is_empty() {
                    block_ordinal += 1;
                    Self::flush_block(&block, block_start_line, block_ordinal, &mut report);
                    block.clear();
                }
                continue;
            }

            if block.is_empty() {
                block_start_line = line_idx + 1;
            }
            block.push(trimmed);
        }

        // A trailing block without a terminating blank line still counts
        if !block.is_empty() {
            block_ordinal += 1;
            Self::flush_block(&block, block_start_line, block_ordinal, &mut report);
        }

        Self::finalize(&mut report.cues);

        debug!(
            "Parsed {} cues ({} blocks skipped)",
            report.cues.len(),
            report.skipped.len()
        );

        report
    }

    fn flush_block(lines: &[&str], start_line: usize, ordinal: usize, report: &mut ParseReport) {
        match Self::parse_block(lines, ordinal) {
            Ok(cue) => report.cues.push(cue),
            Err(error) => {
                warn!("Skipping subtitle block at line {}: {}", start_line, error);
                report.skipped.push(SkippedBlock { line: start_line, error });
            }
        }
    }

    fn parse_block(lines: &[&str], ordinal: usize) -> Result<Cue, SubtitleError> {
        let mut rest = lines;

        // Optional numeric index line, only when something follows it
        let mut id = None;
        if let [first, _, ..] = rest {
            if !first.contains(ARROW) && first.chars().all(|c| c.is_ascii_digit()) {
                id = Some(first.to_string());
                rest = &rest[1..];
            }
        }
        let id = id.unwrap_or_else(|| ordinal.to_string());

        let (time_line, text_lines) = match rest.split_first() {
            Some((line, text)) if line.contains(ARROW) => (*line, text),
            _ => return Err(SubtitleError::MissingTimeRange(id)),
        };

        let caps = TIME_RANGE_REGEX
            .captures(time_line)
            .ok_or_else(|| SubtitleError::InvalidTimestamp(time_line.to_string()))?;
        let start = timestamp_from_captures(&caps, 1)
            .ok_or_else(|| SubtitleError::InvalidTimestamp(time_line.to_string()))?;
        let end = timestamp_from_captures(&caps, 5)
            .ok_or_else(|| SubtitleError::InvalidTimestamp(time_line.to_string()))?;

        Cue::new_validated(id, start, end, &text_lines.join("\n"))
    }

    /// Bring cues built outside the parser into parser-output shape
    ///
    /// Drops cues with non-finite times or `end <= start`, then sorts the
    /// rest stably by start time.
    pub fn normalize(cues: Vec<Cue>) -> Vec<Cue> {
        let mut cues: Vec<Cue> = cues
            .into_iter()
            .filter(|cue| {
                let valid = cue.start_time.is_finite() && cue.end_time.is_finite() && cue.start_time < cue.end_time;
                if !valid {
                    warn!(
                        "Dropping cue {} with invalid interval [{}, {})",
                        cue.id, cue.start_time, cue.end_time
                    );
                }
                valid
            })
            .collect();

        Self::finalize(&mut cues);
        cues
    }

    /// Sort by start time and report suspicious ordering
    fn finalize(cues: &mut [Cue]) {
        let out_of_order = cues
            .windows(2)
            .any(|pair| pair[1].start_time < pair[0].start_time);
        if out_of_order {
            warn!("Subtitle cues are not in start-time order, sorting");
            cues.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        }

        let overlap_count = cues
            .windows(2)
            .filter(|pair| pair[0].end_time > pair[1].start_time)
            .count();
        if overlap_count > 0 {
            warn!("Found {} overlapping subtitle cues", overlap_count);
        }

        let mut seen = HashSet::new();
        for cue in cues.iter() {
            if !seen.insert(cue.id.as_str()) {
                warn!("Duplicate cue id {}, clicks resolve to the first occurrence", cue.id);
            }
        }
    }
}
