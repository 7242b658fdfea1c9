use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::app_config::{ExhaustedPolicy, TranslationConfig};
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::{CompletionRequest, Provider};
use crate::subtitle_processor::Cue;

use super::prompts::{self, BatchRequest, RESPONSE_FIELD};
use super::retry::RetryPolicy;

/// Request parameters and policies for batch translation
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
    /// Cues per request
    pub batch_size: usize,
    /// Retry budget and backoff
    pub retry: RetryPolicy,
    /// What to do once the budget is spent
    pub on_exhausted: ExhaustedPolicy,
}

impl BatchSettings {
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            model: config.get_model(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            batch_size: config.batch_size.max(1),
            retry: RetryPolicy::from_config(&config.retry),
            on_exhausted: config.on_exhausted,
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self::from_config(&TranslationConfig::default())
    }
}

/// Per-run diagnostics of the batch translator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Provider calls made for each batch, in batch order
    pub attempts: Vec<u32>,
    /// Zero-based indices of batches that kept their source text
    pub fallback_batches: Vec<usize>,
    /// Prompt tokens reported by the provider
    pub prompt_tokens: u64,
    /// Completion tokens reported by the provider
    pub completion_tokens: u64,
}

impl BatchReport {
    pub fn batch_count(&self) -> usize {
        self.attempts.len()
    }

    /// Total provider calls
    pub fn total_calls(&self) -> u32 {
        self.attempts.iter().sum()
    }
}

/// Outcome of one batch
#[derive(Debug)]
struct BatchOutcome {
    texts: Vec<String>,
    attempts: u32,
    fell_back: bool,
    prompt_tokens: u64,
    completion_tokens: u64,
}

/// Batch translator for processing cues in fixed-size groups
///
/// Batches are sent one after another. Each batch is retried until the reply
/// decodes into exactly one translation per cue, or until the retry budget is
/// spent.
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// Backend that produces the raw replies
    provider: Arc<dyn Provider>,

    /// Request parameters and policies
    settings: BatchSettings,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(provider: Arc<dyn Provider>, settings: BatchSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Ask the provider whether it is reachable, without sending a batch
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        self.provider.test_connection().await?;
        Ok(())
    }

    /// Translate cues, keeping every interval and the cue count unchanged
    ///
    /// `progress_callback` is called with `(completed, total)` batches.
    pub async fn translate_cues(
        &self,
        cues: &[Cue],
        target_language: &str,
        progress_callback: impl Fn(usize, usize),
    ) -> Result<(Vec<Cue>, BatchReport), TranslationError> {
        let mut report = BatchReport::default();
        if cues.is_empty() {
            return Ok((Vec::new(), report));
        }

        let language_name = language_utils::get_language_name(target_language)
            .unwrap_or_else(|_| target_language.to_string());
        let system = prompts::system_instructions(&language_name);

        let batches: Vec<&[Cue]> = cues.chunks(self.settings.batch_size.max(1)).collect();
        let total_batches = batches.len();
        let mut translated = Vec::with_capacity(cues.len());

        for (index, batch) in batches.into_iter().enumerate() {
            debug!("Translating batch {}/{} ({} cues)", index + 1, total_batches, batch.len());
            let outcome = self.translate_batch(index, batch, &system, target_language).await?;

            report.attempts.push(outcome.attempts);
            report.prompt_tokens += outcome.prompt_tokens;
            report.completion_tokens += outcome.completion_tokens;
            if outcome.fell_back {
                report.fallback_batches.push(index);
            }

            translated.extend(
                batch
                    .iter()
                    .zip(outcome.texts)
                    .map(|(cue, text)| cue.with_text(text)),
            );
            progress_callback(index + 1, total_batches);
        }

        Ok((translated, report))
    }

    async fn translate_batch(
        &self,
        index: usize,
        batch: &[Cue],
        system: &str,
        target_language: &str,
    ) -> Result<BatchOutcome, TranslationError> {
        let sources: Vec<&str> = batch.iter().map(|cue| cue.text.as_str()).collect();
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            system_instructions: system.to_string(),
            user_payload: BatchRequest::new(target_language, &sources).to_payload()?,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            json_mode: true,
        };

        let max_attempts = self.settings.retry.max_attempts();
        let mut attempt = 0;
        let mut prompt_tokens = 0;
        let mut completion_tokens = 0;

        loop {
            attempt += 1;
            let result = match self.provider.complete(request.clone()).await {
                Ok(response) => {
                    prompt_tokens += response.prompt_tokens.unwrap_or(0);
                    completion_tokens += response.completion_tokens.unwrap_or(0);
                    decode_batch_response(&response.text, &sources)
                }
                Err(e) => Err(TranslationError::Provider(e)),
            };

            match result {
                Ok(texts) => {
                    return Ok(BatchOutcome {
                        texts,
                        attempts: attempt,
                        fell_back: false,
                        prompt_tokens,
                        completion_tokens,
                    });
                }
                Err(error) if attempt < max_attempts => {
                    let delay = self.settings.retry.delay_for(attempt);
                    warn!(
                        "Batch {} attempt {}/{} failed: {}. Retrying in {:?}",
                        index + 1,
                        attempt,
                        max_attempts,
                        error,
                        delay
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(error) => match self.settings.on_exhausted {
                    ExhaustedPolicy::Fail => {
                        return Err(TranslationError::RetriesExhausted {
                            batch: index,
                            attempts: attempt,
                            last_error: Box::new(error),
                        });
                    }
                    ExhaustedPolicy::KeepOriginal => {
                        warn!(
                            "Batch {} failed after {} attempts ({}); keeping source text for {} cues",
                            index + 1,
                            attempt,
                            error,
                            sources.len()
                        );
                        return Ok(BatchOutcome {
                            texts: sources.iter().map(|s| s.to_string()).collect(),
                            attempts: attempt,
                            fell_back: true,
                            prompt_tokens,
                            completion_tokens,
                        });
                    }
                },
            }
        }
    }
}

/// Decode, validate and reassemble one raw model reply
///
/// Fails when the reply is not a JSON object with a `translated_subtitles`
/// array, or when the array length differs from `sources`. Missing fields in
/// individual entries fall back to `original`, then to the source text.
pub fn decode_batch_response(raw: &str, sources: &[&str]) -> Result<Vec<String>, TranslationError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TranslationError::InvalidResponse(format!("reply is not valid JSON: {}", e)))?;

    let items = value
        .as_object()
        .and_then(|object| object.get(RESPONSE_FIELD))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            TranslationError::InvalidResponse(format!("reply has no '{}' array", RESPONSE_FIELD))
        })?;

    if items.len() != sources.len() {
        return Err(TranslationError::CountMismatch {
            expected: sources.len(),
            actual: items.len(),
        });
    }

    Ok(items
        .iter()
        .zip(sources)
        .map(|(item, source)| reassemble_entry(item, source))
        .collect())
}

fn reassemble_entry(item: &Value, source: &str) -> String {
    let non_empty = |value: Option<&Value>| -> Option<String> {
        value
            .and_then(Value::as_str)
            .map(single_line)
            .filter(|text| !text.is_empty())
    };

    let chosen = match item {
        Value::String(text) => Some(single_line(text)).filter(|t| !t.is_empty()),
        Value::Object(_) => non_empty(item.get("translated")).or_else(|| non_empty(item.get("original"))),
        _ => None,
    };
    chosen.unwrap_or_else(|| source.to_string())
}

fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// Some models wrap JSON in a Markdown fence even in JSON mode
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or_default();
            body.trim_end().strip_suffix("```").unwrap_or(body).trim()
        }
        None => trimmed,
    }
}
