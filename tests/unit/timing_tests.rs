/*!
 * Tests for cue alignment and overlap removal
 */

use ytransub::subtitle_processor::Cue;
use ytransub::timing::{align, deoverlap, DEFAULT_EPSILON_MS, DEFAULT_TOLERANCE_MS};

/// Cues with random starts and lengths, many of them overlapping
fn overlapping_cues(count: usize, seed: u64) -> Vec<Cue> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        state >> 33
    };

    let mut start = 0u64;
    let mut cues: Vec<Cue> = (0..count)
        .map(|i| {
            start += next() % 1_500;
            Cue::new(start, start + 100 + next() % 3_000, format!("cue {}", i))
        })
        .collect();
    cues.sort_by_key(|cue| cue.start_time_ms);
    cues
}

#[test]
fn test_deoverlap_withOverlappingPair_shouldTrimFirstEnd() {
    let cues = vec![Cue::from_secs(1.0, 3.0, "A"), Cue::from_secs(2.5, 5.0, "B")];

    let outcome = deoverlap(&cues, DEFAULT_EPSILON_MS);

    assert_eq!(outcome.adjusted, 1);
    assert_eq!(outcome.cues[0], Cue::new(1_000, 2_480, "A"));
    assert_eq!(outcome.cues[1], cues[1]);
}

#[test]
fn test_deoverlap_withNoOverlap_shouldReturnInputUnchanged() {
    let cues = vec![Cue::new(0, 900, "a"), Cue::new(1_000, 2_000, "b"), Cue::new(2_500, 3_000, "c")];

    let outcome = deoverlap(&cues, DEFAULT_EPSILON_MS);

    assert_eq!(outcome.adjusted, 0);
    assert_eq!(outcome.cues, cues);
}

#[test]
fn test_deoverlap_withGeneratedTracks_shouldBeIdempotent() {
    for seed in 1..=30 {
        let once = deoverlap(&overlapping_cues(60, seed), DEFAULT_EPSILON_MS).cues;
        let twice = deoverlap(&once, DEFAULT_EPSILON_MS);

        assert_eq!(twice.cues, once, "seed {}", seed);
        assert_eq!(twice.adjusted, 0, "seed {}", seed);
    }
}

#[test]
fn test_deoverlap_withGeneratedTracks_shouldKeepStartsOrderAndPositiveDurations() {
    for seed in 1..=30 {
        let input = overlapping_cues(60, seed);
        let output = deoverlap(&input, DEFAULT_EPSILON_MS).cues;

        assert_eq!(output.len(), input.len());
        for (out, original) in output.iter().zip(&input) {
            assert_eq!(out.start_time_ms, original.start_time_ms);
            assert!(out.end_time_ms <= original.end_time_ms);
            assert!(out.end_time_ms > out.start_time_ms);
        }
        for pair in output.windows(2) {
            let gap_ok = pair[0].end_time_ms + DEFAULT_EPSILON_MS <= pair[1].start_time_ms;
            let floored = pair[0].end_time_ms == pair[0].start_time_ms + DEFAULT_EPSILON_MS;
            let untouched = pair[0].end_time_ms <= pair[1].start_time_ms;
            assert!(gap_ok || floored || untouched, "seed {}: {:?}", seed, pair);
        }
    }
}

#[test]
fn test_align_withNearbyCues_shouldPairTexts() {
    let primary = vec![Cue::from_secs(1.0, 2.0, "你好"), Cue::from_secs(3.0, 4.0, "再见")];
    let secondary = vec![Cue::from_secs(1.2, 2.1, "Hello"), Cue::from_secs(3.0, 4.0, "Bye")];

    let aligned = align(&primary, &secondary, DEFAULT_TOLERANCE_MS);

    assert_eq!(aligned.len(), 2);
    assert_eq!(aligned[0].primary, "你好");
    assert_eq!(aligned[0].secondary, "Hello");
    assert_eq!(aligned[0].start_time_ms, 1_000);
    assert_eq!(aligned[0].end_time_ms, 2_000);
    assert_eq!(aligned[1].secondary, "Bye");
}

#[test]
fn test_align_withEndOutsideTolerance_shouldLeaveSecondaryEmpty() {
    let primary = vec![Cue::from_secs(1.0, 2.0, "你好")];
    let secondary = vec![Cue::from_secs(1.1, 2.6, "Hello")];

    let aligned = align(&primary, &secondary, DEFAULT_TOLERANCE_MS);

    assert_eq!(aligned[0].secondary, "");
    assert!(!aligned[0].has_secondary());
}

#[test]
fn test_align_withEmptySecondary_shouldKeepEveryPrimaryCue() {
    let primary = vec![Cue::new(0, 1_000, "a"), Cue::new(1_000, 2_000, "b")];

    let aligned = align(&primary, &[], DEFAULT_TOLERANCE_MS);

    assert_eq!(aligned.len(), 2);
    assert!(aligned.iter().all(|cue| cue.secondary.is_empty()));
}
