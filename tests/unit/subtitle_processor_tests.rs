/*!
 * Tests for subtitle parsing and serialization
 */

use anyhow::Result;
use std::fmt::Write;

use crate::common;
use ytransub::errors::SubtitleError;
use ytransub::subtitle_processor::{
    self, format_timestamp, parse, parse_timestamp, Cue, SubtitleFormat, SubtitleTrack,
};

/// Deterministic pseudo-random cues with millisecond times and single-line text
fn generated_cues(count: usize, seed: u64) -> Vec<Cue> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        state >> 33
    };

    let mut start = 0u64;
    (0..count)
        .map(|i| {
            start += next() % 5_000;
            let duration = 1 + next() % 4_000;
            Cue::new(start, start + duration, format!("Line {} with text {}", i, next() % 1000))
        })
        .collect()
}

#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5_025_678);
    assert_eq!(format_timestamp(ms), ts);
}

#[test]
fn test_cue_display_withValidCue_shouldFormatCorrectly() {
    let cue = Cue::new(5_000, 10_000, "Test subtitle");
    let mut output = String::new();
    write!(output, "{}", cue).unwrap();

    assert!(output.contains("00:00:05,000 --> 00:00:10,000"));
    assert!(output.contains("Test subtitle"));
}

#[test]
fn test_cue_new_validated_withReversedRange_shouldFail() {
    assert!(Cue::new_validated(2_000, 1_000, "x").is_err());
    assert!(Cue::new_validated(1_000, 1_000, "x").is_err());
    assert!(Cue::new_validated(1_000, 1_001, "x").is_ok());
}

#[test]
fn test_cue_from_secs_withHalfSecond_shouldStoreMilliseconds() {
    let cue = Cue::from_secs(1.5, 3.25, "x");
    assert_eq!(cue.start_time_ms, 1_500);
    assert_eq!(cue.end_time_ms, 3_250);
    assert_eq!(cue.start_secs(), 1.5);
    assert_eq!(cue.duration_ms(), 1_750);
}

#[test]
fn test_roundtrip_withGeneratedTracks_shouldPreserveCues() {
    for seed in 1..=20 {
        let cues = generated_cues(50, seed);
        let srt = subtitle_processor::to_srt_string(&cues);
        let parsed = parse(&srt, SubtitleFormat::Srt);

        assert_eq!(parsed.skipped_blocks, 0, "seed {}", seed);
        assert_eq!(parsed.cues, cues, "seed {}", seed);
    }
}

#[test]
fn test_to_srt_string_withCues_shouldNumberFromOne() {
    let cues = vec![Cue::new(0, 1_000, "a"), Cue::new(1_000, 2_000, "b")];
    let srt = subtitle_processor::to_srt_string(&cues);

    assert_eq!(
        srt,
        "1\n00:00:00,000 --> 00:00:01,000\na\n\n2\n00:00:01,000 --> 00:00:02,000\nb\n\n"
    );
}

#[test]
fn test_parse_srt_withMultilineText_shouldJoinWithSpaces() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nHello\nWorld\n";
    let parsed = parse(content, SubtitleFormat::Srt);

    assert_eq!(parsed.cues.len(), 1);
    assert_eq!(parsed.cues[0].text, "Hello World");
}

#[test]
fn test_parse_srt_withMalformedBlocks_shouldSkipAndCount() {
    let content = "\
1
00:00:01,000 --> 00:00:02,000
Good

2
not a timing line
Bad timing

3
00:00:05,000 --> 00:00:04,000
End before start

4
00:00:06,000 --> 00:00:07,000

5
00:00:08,000 --> 00:00:09,000
Also good
";
    let parsed = parse(content, SubtitleFormat::Srt);

    let texts: Vec<&str> = parsed.cues.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Good", "Also good"]);
    assert_eq!(parsed.skipped_blocks, 3);
}

#[test]
fn test_parse_srt_withHugeHourField_shouldSkipBlockInsteadOfOverflowing() {
    let content = "\
1
99999999999999:00:00,000 --> 99999999999999:00:01,000
Hello

2
00:00:01,000 --> 00:00:02,000
World
";
    let parsed = parse(content, SubtitleFormat::Srt);

    assert_eq!(parsed.cues.len(), 1);
    assert_eq!(parsed.cues[0].text, "World");
    assert_eq!(parsed.skipped_blocks, 1);
}

#[test]
fn test_parse_timestamp_withOverflowingHours_shouldFail() {
    assert!(parse_timestamp("99999999999999:00:00,000").is_err());
    assert!(parse_timestamp("5124095576031:00:00,000").is_err());
    assert_eq!(parse_timestamp("100:00:00,000").unwrap(), 360_000_000);
}

#[test]
fn test_parse_srt_withCrlfAndBom_shouldParse() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nWorld\r\n";
    let parsed = parse(content, SubtitleFormat::Srt);

    assert_eq!(parsed.cues.len(), 2);
    assert_eq!(parsed.cues[1].text, "World");
}

#[test]
fn test_parse_srt_withUnorderedCues_shouldSortStably() {
    let content = "\
1
00:00:05,000 --> 00:00:06,000
late

2
00:00:01,000 --> 00:00:02,000
first

3
00:00:01,000 --> 00:00:03,000
second
";
    let parsed = parse(content, SubtitleFormat::Srt);
    let texts: Vec<&str> = parsed.cues.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "late"]);
}

#[test]
fn test_parse_vtt_withHeaderNotesAndIdentifiers_shouldReadCues() {
    let content = "\
WEBVTT
Kind: captions

NOTE a comment
spanning lines

STYLE
::cue { color: white }

cue-1
00:00:01.000 --> 00:00:02.500 align:start position:0%
<c.colorE5E5E5>Hello</c> <i>there</i>

00:03.000 --> 00:04.000
Short form
";
    let parsed = parse(content, SubtitleFormat::Vtt);

    assert_eq!(parsed.skipped_blocks, 0);
    assert_eq!(parsed.cues.len(), 2);
    assert_eq!(parsed.cues[0], Cue::new(1_000, 2_500, "Hello there"));
    assert_eq!(parsed.cues[1], Cue::new(3_000, 4_000, "Short form"));
}

#[test]
fn test_parse_vtt_withGarbageBlock_shouldCountIt() {
    let content = "WEBVTT\n\nsomething odd\nstill odd\n\n00:00:01.000 --> 00:00:02.000\nok\n";
    let parsed = parse(content, SubtitleFormat::Vtt);

    assert_eq!(parsed.cues.len(), 1);
    assert_eq!(parsed.skipped_blocks, 1);
}

#[test]
fn test_subtitle_format_from_path_withUnknownExtension_shouldFail() {
    assert_eq!(SubtitleFormat::from_path("a.SRT").unwrap(), SubtitleFormat::Srt);
    assert_eq!(SubtitleFormat::from_path("a.vtt").unwrap(), SubtitleFormat::Vtt);
    assert!(matches!(
        SubtitleFormat::from_path("a.ass"),
        Err(SubtitleError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_read_from_file_withMissingFile_shouldReturnMissingFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = SubtitleTrack::read_from_file(temp_dir.path().join("absent.srt"), "en");

    assert!(matches!(result, Err(SubtitleError::MissingFile(_))));
    Ok(())
}

#[test]
fn test_read_from_file_withVtt_shouldParseByExtension() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_vtt(temp_dir.path(), "clip.en.vtt")?;

    let track = SubtitleTrack::read_from_file(&path, "en")?;
    assert_eq!(track.len(), 2);
    assert_eq!(track.texts(), vec!["This is a test subtitle.", "It contains multiple entries."]);
    assert_eq!(track.language, "en");
    Ok(())
}

#[test]
fn test_write_to_srt_withTrack_shouldReadBackIdentically() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_subtitle(temp_dir.path(), "clip.en.srt")?;
    let track = SubtitleTrack::read_from_file(&source, "en")?;

    let copy = temp_dir.path().join("nested").join("copy.srt");
    track.write_to_srt(&copy)?;

    let reread = SubtitleTrack::read_from_file(&copy, "en")?;
    assert_eq!(reread.cues, track.cues);
    Ok(())
}
