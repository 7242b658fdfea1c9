/*!
 * Instructions and request payloads for batch translation.
 *
 * The model receives a JSON object listing the batch texts and must answer
 * with a JSON object whose `translated_subtitles` array has one entry per
 * input text, in the same order.
 */

use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;

/// Name of the array field the model must return
pub const RESPONSE_FIELD: &str = "translated_subtitles";

/// User message for one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Language the texts should be translated into
    pub target_language: String,
    /// Number of texts, repeated so the model can check itself
    pub count: usize,
    /// Source texts in presentation order
    pub subtitles: Vec<String>,
}

impl BatchRequest {
    pub fn new<S: AsRef<str>>(target_language: &str, texts: &[S]) -> Self {
        Self {
            target_language: target_language.to_string(),
            count: texts.len(),
            subtitles: texts.iter().map(|t| t.as_ref().to_string()).collect(),
        }
    }

    /// Encode as the JSON user payload
    pub fn to_payload(&self) -> Result<String, TranslationError> {
        serde_json::to_string(self).map_err(|e| TranslationError::Encode(e.to_string()))
    }
}

/// System message describing the required output contract
pub fn system_instructions(target_language_name: &str) -> String {
    format!(
        "You are a professional subtitle translator. Translate every subtitle in the \
         user's JSON object into {target}.\n\
         \n\
         Requirements:\n\
         1. Reply with a single JSON object and nothing else.\n\
         2. The object must contain the field \"{field}\", an array.\n\
         3. Each array element is an object with two string fields: \"original\" \
         (the input subtitle, unchanged) and \"translated\" (its translation).\n\
         4. The array must have exactly \"count\" elements, one per input subtitle.\n\
         5. Keep the input order. Never merge, split, drop or add subtitles.\n\
         \n\
         Example reply:\n\
         {{\"{field}\": [\n  \
         {{\"original\": \"Hello world\", \"translated\": \"你好世界\"}},\n  \
         {{\"original\": \"How are you?\", \"translated\": \"你好吗？\"}}\n\
         ]}}",
        target = target_language_name,
        field = RESPONSE_FIELD,
    )
}
