use log::debug;

use crate::subtitle_processor::Cue;

/// Gap left between a trimmed cue and its successor
pub const DEFAULT_EPSILON_MS: u64 = 20;

/// Result of removing overlaps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeoverlapOutcome {
    /// Cues with trimmed ends, same order and count as the input
    pub cues: Vec<Cue>,
    /// Number of cues whose end changed
    pub adjusted: usize,
}

/// Trim cue ends so each cue stops `epsilon_ms` before the next one starts
///
/// Input must be ordered by start. When `next.start < current.end` the end
/// becomes `next.start - epsilon_ms`, but never less than
/// `current.start + epsilon_ms`, so every cue keeps a positive duration.
/// Starts are never moved. Applying the function twice gives the same result
/// as applying it once.
pub fn deoverlap(cues: &[Cue], epsilon_ms: u64) -> DeoverlapOutcome {
    let mut result = cues.to_vec();
    let mut adjusted = 0;

    for i in 1..result.len() {
        let next_start = result[i].start_time_ms;
        let current = &mut result[i - 1];

        if next_start < current.end_time_ms {
            let floor = current.start_time_ms.saturating_add(epsilon_ms);
            let new_end = next_start
                .saturating_sub(epsilon_ms)
                .max(floor)
                .min(current.end_time_ms);

            if new_end != current.end_time_ms {
                current.end_time_ms = new_end;
                adjusted += 1;
            }
        }
    }

    if adjusted > 0 {
        debug!("Trimmed {} overlapping cue(s)", adjusted);
    }

    DeoverlapOutcome { cues: result, adjusted }
}
