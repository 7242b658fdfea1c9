/*!
 * Temporal reconciliation of cue sequences.
 *
 * - `align`: pairs cues of two tracks whose intervals nearly coincide
 * - `overlap`: trims cue ends so no cue overlaps its successor
 *
 * Both operations are pure and return new sequences.
 */

pub mod align;
pub mod overlap;

pub use self::align::{align, AlignedCue, DEFAULT_TOLERANCE_MS};
pub use self::overlap::{deoverlap, DeoverlapOutcome, DEFAULT_EPSILON_MS};
