/*!
 * Subtitle translation through an LLM provider.
 *
 * - `prompts`: system instructions and the structured batch payload
 * - `retry`: retry budget and backoff curve
 * - `batch`: batching, the per-batch retry loop and reply validation
 * - `core`: file-level translation service
 */

// Re-export main types for easier usage
pub use self::batch::{decode_batch_response, BatchReport, BatchSettings, BatchTranslator};
pub use self::core::{TokenUsageStats, TrackTranslation, TranslationService};
pub use self::prompts::{BatchRequest, RESPONSE_FIELD};
pub use self::retry::RetryPolicy;

// Submodules
pub mod batch;
pub mod core;
pub mod prompts;
pub mod retry;
