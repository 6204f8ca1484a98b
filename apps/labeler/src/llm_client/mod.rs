/// LLM Client: the single point of entry for talking to the local model server.
///
/// ARCHITECTURAL RULE: the pipeline only ever sees the `TextGenerator` trait.
/// `VllmClient` is the production backend (OpenAI-compatible `/completions`
/// as served by vLLM); tests swap in `mock::MockGenerator`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
mod stub_server;

const MAX_RETRIES: u32 = 3;
/// Name attached to the JSON schema in `response_format`.
const SCHEMA_NAME: &str = "voice_labels";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Model '{model}' is not served by {base_url} (available: {available:?})")]
    ModelUnavailable {
        model: String,
        base_url: String,
        available: Vec<String>,
    },

    #[error("Result count mismatch: expected {expected}, got {actual}")]
    ResultCountMismatch { expected: usize, actual: usize },
}

/// Decoding configuration sent with every batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    /// When set, the server restricts generation so the output parses under this schema.
    pub json_schema: Option<Value>,
}

/// The text generation capability. Implement this to swap the serving engine
/// without touching prompt building or response collection.
///
/// Contract: the returned vector has exactly one entry per prompt, in prompt
/// order. `None` means the engine produced nothing for that prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompts: &[String],
        params: &SamplingParams,
    ) -> Result<Vec<Option<String>>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (OpenAI-compatible completions API)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a [String],
    temperature: f32,
    max_tokens: u32,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'static str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub index: usize,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelCard>,
}

#[derive(Debug, Deserialize)]
struct ModelCard {
    id: String,
    /// vLLM extension; absent on other servers.
    #[serde(default)]
    max_model_len: Option<u32>,
}

/// vLLM answers `{"message": ...}`, OpenAI-style servers `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// VllmClient
// ────────────────────────────────────────────────────────────────────────────

/// HTTP backend for a locally hosted OpenAI-compatible server.
/// Sends prompts in fixed-size chunks, one request at a time, with retry on
/// 429/5xx and connection failures.
#[derive(Clone)]
pub struct VllmClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    chunk_size: usize,
}

impl VllmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let mut builder =
            Client::builder().timeout(Duration::from_secs(config.request_timeout_secs));
        // A server on this machine is never reached through a system proxy.
        if is_loopback(&config.llm_base_url) {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            api_key: config.llm_api_key.clone(),
            model: config.model.clone(),
            chunk_size: config.request_chunk_size.max(1),
        })
    }

    /// Checks that the configured model is served, and warns when the server's
    /// context window is smaller than the one the run was configured for.
    pub async fn verify_model(&self, max_model_len: u32) -> Result<(), LlmError> {
        let url = format!("{}/models", self.base_url);
        let response = self.authorized(self.client.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let models: ModelList = response.json().await?;
        let card = models
            .data
            .iter()
            .find(|m| m.id == self.model)
            .ok_or_else(|| LlmError::ModelUnavailable {
                model: self.model.clone(),
                base_url: self.base_url.clone(),
                available: models.data.iter().map(|m| m.id.clone()).collect(),
            })?;

        match card.max_model_len {
            Some(served) if served < max_model_len => warn!(
                "Server context window for {} is {} tokens, configured {}; long prompts may be rejected",
                self.model, served, max_model_len
            ),
            Some(served) => debug!("Server context window for {}: {} tokens", self.model, served),
            None => debug!("Server does not report a context window for {}", self.model),
        }

        info!("Model {} is available at {}", self.model, self.base_url);
        Ok(())
    }

    /// Sends one chunk of prompts. Retries on 429 (rate limit), 5xx and
    /// transport errors with exponential backoff.
    async fn complete_chunk(
        &self,
        prompts: &[String],
        params: &SamplingParams,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/completions", self.base_url);
        let request_body = build_request(&self.model, prompts, params);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Completion request attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .authorized(self.client.post(&url))
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                let message = api_error_message(body);
                warn!("Model server returned {}: {}", status, message);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
            }

            return Ok(response.json().await?);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl TextGenerator for VllmClient {
    async fn generate(
        &self,
        prompts: &[String],
        params: &SamplingParams,
    ) -> Result<Vec<Option<String>>, LlmError> {
        let total_chunks = prompts.len().div_ceil(self.chunk_size);
        let mut results = Vec::with_capacity(prompts.len());
        let mut prompt_tokens = 0u64;
        let mut completion_tokens = 0u64;

        for (i, chunk) in prompts.chunks(self.chunk_size).enumerate() {
            debug!(
                "Sending chunk {}/{} ({} prompts)",
                i + 1,
                total_chunks,
                chunk.len()
            );
            let response = self.complete_chunk(chunk, params).await?;

            if let Some(usage) = &response.usage {
                prompt_tokens += u64::from(usage.prompt_tokens);
                completion_tokens += u64::from(usage.completion_tokens);
            }

            results.extend(order_choices(response.choices, chunk.len()));
        }

        debug!(
            "Generation finished: prompt_tokens={}, completion_tokens={}",
            prompt_tokens, completion_tokens
        );

        Ok(results)
    }
}

fn build_request<'a>(
    model: &'a str,
    prompts: &'a [String],
    params: &'a SamplingParams,
) -> CompletionRequest<'a> {
    CompletionRequest {
        model,
        prompt: prompts,
        temperature: params.temperature,
        max_tokens: params.max_tokens,
        n: 1,
        response_format: params.json_schema.as_ref().map(|schema| ResponseFormat {
            format_type: "json_schema",
            json_schema: JsonSchemaFormat {
                name: SCHEMA_NAME,
                schema,
                strict: true,
            },
        }),
    }
}

/// Places each choice at its prompt index. Missing indices stay `None`;
/// out-of-range or repeated indices are dropped.
fn order_choices(choices: Vec<CompletionChoice>, expected: usize) -> Vec<Option<String>> {
    let mut ordered: Vec<Option<String>> = vec![None; expected];

    for choice in choices {
        if choice.finish_reason.as_deref() == Some("length") {
            debug!("Choice {} hit max_tokens", choice.index);
        }
        match ordered.get_mut(choice.index) {
            Some(slot) if slot.is_none() => *slot = choice.text,
            Some(_) => warn!(
                "Duplicate choice for prompt {}, keeping the first",
                choice.index
            ),
            None => warn!(
                "Choice index {} out of range for {} prompts",
                choice.index, expected
            ),
        }
    }

    ordered
}

fn api_error_message(body: String) -> String {
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(ApiErrorBody {
            error: Some(detail),
            ..
        }) => detail.message,
        Ok(ApiErrorBody {
            message: Some(message),
            ..
        }) => message,
        _ => body,
    }
}

fn is_loopback(base_url: &str) -> bool {
    let rest = base_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(base_url);
    let authority = rest.split('/').next().unwrap_or_default();
    let host = match authority.strip_prefix('[') {
        Some(v6) => v6.split(']').next().unwrap_or_default(),
        None => authority.split(':').next().unwrap_or_default(),
    };
    host.eq_ignore_ascii_case("localhost") || host == "::1" || host.starts_with("127.")
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
