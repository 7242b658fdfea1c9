use crate::subtitle_processor::Cue;

/// Maximum start and end difference for two cues to count as the same line
pub const DEFAULT_TOLERANCE_MS: u64 = 500;

/// A primary cue with the text of its matched secondary cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedCue {
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    /// Text of the primary cue
    pub primary: String,
    /// Text of the matched secondary cue, empty when nothing matched
    pub secondary: String,
}

impl AlignedCue {
    pub fn has_secondary(&self) -> bool {
        !self.secondary.is_empty()
    }
}

/// Pair each primary cue with the first secondary cue whose start and end
/// both lie strictly within `tolerance_ms` of its own
///
/// The primary interval is kept. Unmatched primary cues get an empty
/// secondary text; unmatched secondary cues are dropped.
pub fn align(primary: &[Cue], secondary: &[Cue], tolerance_ms: u64) -> Vec<AlignedCue> {
    primary
        .iter()
        .map(|cue| {
            let matched = secondary.iter().find(|candidate| {
                cue.start_time_ms.abs_diff(candidate.start_time_ms) < tolerance_ms
                    && cue.end_time_ms.abs_diff(candidate.end_time_ms) < tolerance_ms
            });

            AlignedCue {
                start_time_ms: cue.start_time_ms,
                end_time_ms: cue.end_time_ms,
                primary: cue.text.clone(),
                secondary: matched.map(|m| m.text.clone()).unwrap_or_default(),
            }
        })
        .collect()
}
