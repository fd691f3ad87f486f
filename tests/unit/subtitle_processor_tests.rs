/*!
 * Tests for subtitle parsing
 */

use cuesync::errors::SubtitleError;
use cuesync::subtitle_processor::{Cue, SubtitleParser, format_timestamp, parse_timestamp};
use crate::common;

/// The reference document parses into three cues with exact times
#[test]
fn test_parse_withSampleDocument_shouldProduceThreeCues() {
    let cues = SubtitleParser::parse(common::SAMPLE_SRT);

    assert_eq!(cues.len(), 3);
    assert_eq!(cues[0], Cue::new("1", 0.0, 2.0, "Hello"));
    assert_eq!(cues[1], Cue::new("2", 2.0, 4.5, "World"));
    assert_eq!(cues[2], Cue::new("3", 5.0, 7.0, "Bye"));
}

/// Multi-line text is joined with newlines and CRLF input is accepted
#[test]
fn test_parse_withCrlfAndMultilineText_shouldJoinLines() {
    let srt = "\u{feff}1\r\n00:00:01,000 --> 00:00:03,000\r\nFirst line\r\n  Second line  \r\n\r\n";
    let cues = SubtitleParser::parse(srt);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].id, "1");
    assert_eq!(cues[0].text, "First line\nSecond line");
}

/// Several blank lines between blocks act as one separator
#[test]
fn test_parse_withRepeatedBlankLines_shouldSplitBlocks() {
    let srt = "1\n00:00:01,000 --> 00:00:02,000\nA\n\n\n   \n2\n00:00:02,000 --> 00:00:03,000\nB";
    let cues = SubtitleParser::parse(srt);

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[1].text, "B");
}

/// A trailing block without a final blank line is still flushed
#[test]
fn test_parse_withUnterminatedLastBlock_shouldKeepIt() {
    let srt = "7\n00:01:00,000 --> 00:01:01,500\nLast words";
    let cues = SubtitleParser::parse(srt);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].id, "7");
    assert_eq!(cues[0].start_time, 60.0);
    assert_eq!(cues[0].end_time, 61.5);
}

/// Blocks without the optional index line get their position as id
#[test]
fn test_parse_withoutIndexLines_shouldNumberByPosition() {
    let srt = "00:00:01,000 --> 00:00:02,000\nA\n\n00:00:02,000 --> 00:00:03,000\nB\n";
    let cues = SubtitleParser::parse(srt);

    let ids: Vec<&str> = cues.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

/// Malformed blocks are skipped with a diagnostic and never abort parsing
#[test]
fn test_parseWithReport_withMalformedBlocks_shouldSkipAndRecord() {
    let srt = "\
1
00:00:00,000 --> 00:00:01,000
ok

2
no arrow here

3
00:00:xx,000 --> 00:00:02,000
bad stamp

4
00:00:05,000 --> 00:00:04,000
backwards

5
00:00:06,000 --> 00:00:07,000

6
00:00:08,000 --> 00:00:09,000
also ok
";
    let report = SubtitleParser::parse_with_report(srt);

    let ids: Vec<&str> = report.cues.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "6"]);
    assert!(!report.is_clean());
    assert_eq!(report.skipped.len(), 4);

    assert_eq!(report.skipped[0].line, 5);
    assert_eq!(report.skipped[0].error, SubtitleError::MissingTimeRange("2".to_string()));
    assert!(matches!(report.skipped[1].error, SubtitleError::InvalidTimestamp(_)));
    assert_eq!(
        report.skipped[2].error,
        SubtitleError::InvalidTimeRange { start: 5.0, end: 4.0 }
    );
    assert!(matches!(report.skipped[3].error, SubtitleError::EmptyText(_)));
}

/// Garbage and empty input yield an empty sequence rather than an error
#[test]
fn test_parse_withNoValidBlocks_shouldReturnEmpty() {
    assert!(SubtitleParser::parse("").is_empty());
    assert!(SubtitleParser::parse("\n\n\n").is_empty());
    assert!(SubtitleParser::parse("just some text\nwith lines").is_empty());
}

/// Out-of-order input is sorted by start time
#[test]
fn test_parse_withUnsortedBlocks_shouldSortByStart() {
    let srt = "2\n00:00:05,000 --> 00:00:06,000\nLater\n\n1\n00:00:01,000 --> 00:00:02,000\nEarlier\n";
    let cues = SubtitleParser::parse(srt);

    assert_eq!(cues[0].id, "1");
    assert_eq!(cues[1].id, "2");
    assert!(cues.windows(2).all(|w| w[0].start_time <= w[1].start_time));
    assert!(cues.iter().all(|c| c.start_time < c.end_time));
}

/// Hours beyond two digits, dot separators and cue settings are tolerated
#[test]
fn test_parse_withLooseTimeLine_shouldAcceptVariants() {
    let srt = "1\n123:00:00.250 --> 123:00:01.000 align:start\nLong book\n";
    let cues = SubtitleParser::parse(srt);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].start_time, 123.0 * 3600.0 + 0.25);
    assert_eq!(cues[0].end_time, 123.0 * 3600.0 + 1.0);
}

/// Timestamps round-trip through the SRT form
#[test]
fn test_timestamp_parseAndFormat_shouldAgree() {
    let seconds = parse_timestamp("01:23:45,678").unwrap();
    assert_eq!(seconds, 5025.678);
    assert_eq!(format_timestamp(seconds), "01:23:45,678");
}

/// Cue helpers follow half-open semantics
#[test]
fn test_cue_contains_shouldExcludeEnd() {
    let cue = Cue::new("1", 1.0, 2.0, "x");
    assert!(cue.contains(1.0));
    assert!(cue.contains(1.999));
    assert!(!cue.contains(2.0));
    assert!(!cue.contains(0.999));
    assert_eq!(cue.duration(), 1.0);
}

/// Hand-built cues are sorted and invalid intervals dropped
#[test]
fn test_normalize_withShuffledAndInvalidCues_shouldSortAndFilter() {
    let cues = SubtitleParser::normalize(vec![
        Cue::new("c", 5.0, 7.0, "third"),
        Cue::new("bad", 3.0, 3.0, "empty interval"),
        Cue::new("a", 0.0, 2.0, "first"),
        Cue::new("nan", f64::NAN, 1.0, "no start"),
        Cue::new("b", 2.0, 4.0, "second"),
        Cue::new("inf", 8.0, f64::INFINITY, "open end"),
    ]);

    let ids: Vec<&str> = cues.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}
