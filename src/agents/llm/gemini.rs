//! Google Gemini LLM Provider

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

use super::{FinishReason, GenerateRequest, GenerateResponse, LlmProvider};
use crate::agents::config::LlmProviderConfig;
use crate::agents::domain::{Content, Part, Role};
use crate::agents::error::{LlmError, LlmResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini LLM Provider
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_retry_elapsed: Duration,
}

impl GeminiProvider {
    /// Create a new Gemini provider, reading the API key from the configured
    /// environment variable
    pub fn new(config: &LlmProviderConfig) -> LlmResult<Self> {
        let api_key = env::var(&config.api_key_env).map_err(|_| {
            LlmError::Authentication(format!(
                "Environment variable {} not set",
                config.api_key_env
            ))
        })?;

        Self::with_api_key(config, api_key)
    }

    /// Create a new Gemini provider with an explicit API key
    pub fn with_api_key(config: &LlmProviderConfig, api_key: impl Into<String>) -> LlmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retry_elapsed: Duration::from_secs(config.max_retry_elapsed_seconds),
        })
    }

    /// Build the request body for Gemini API
    fn build_request_body(&self, request: &GenerateRequest) -> Value {
        let mut body = json!({
            "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
            "contents": request.contents.iter().map(content_to_wire).collect::<Vec<_>>(),
        });

        if !request.tools.is_empty() {
            body["tools"] = json!([{
                "functionDeclarations": request.tools.iter().map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters
                    })
                }).collect::<Vec<_>>()
            }]);
        }

        let mut generation_config = json!({});

        if let Some(temp) = self.temperature {
            generation_config["temperature"] = json!(temp);
        }

        if let Some(max_tokens) = self.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }

        if request.include_thoughts {
            generation_config["thinkingConfig"] = json!({ "includeThoughts": true });
        }

        if generation_config.as_object().map_or(false, |o| !o.is_empty()) {
            body["generationConfig"] = generation_config;
        }

        body
    }

    /// Parse a non-streaming response
    fn parse_response(response: GeminiResponse) -> LlmResult<GenerateResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse("No candidates in response".to_string()))?;

        let parts: Vec<Part> = candidate
            .content
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(part_from_wire)
            .collect();

        let raw_reason = candidate.finish_reason.as_deref().unwrap_or("STOP");
        let finish_reason = match raw_reason {
            "MAX_TOKENS" => FinishReason::Length,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
                FinishReason::ContentFilter
            }
            _ => FinishReason::Stop,
        };

        if finish_reason == FinishReason::ContentFilter {
            return Err(LlmError::Blocked(raw_reason.to_string()));
        }

        // A model turn without text or a call cannot be replayed to the API
        if parts.iter().all(Part::is_thought) {
            return Err(LlmError::Parse(format!(
                "Candidate has no usable parts (finishReason {})",
                raw_reason
            )));
        }

        if finish_reason == FinishReason::Length {
            tracing::warn!("Gemini response truncated at max output tokens");
        }

        Ok(GenerateResponse {
            content: Content {
                role: Role::Model,
                parts,
            },
            finish_reason,
        })
    }

    async fn send_once(client: &reqwest::Client, url: &str, body: &Value) -> LlmResult<GeminiResponse> {
        let response = client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => LlmError::RateLimited(error_text),
                401 | 403 => LlmError::Authentication(error_text),
                code => LlmError::Api {
                    status: code,
                    message: error_text,
                },
            });
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let body = self.build_request_body(&request);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );

        tracing::debug!(
            model = %request.model,
            contents = request.contents.len(),
            "Sending Gemini generateContent request"
        );

        if self.max_retry_elapsed.is_zero() {
            return Self::parse_response(Self::send_once(&self.client, &url, &body).await?);
        }

        let policy = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(self.max_retry_elapsed))
            .build();

        let client = &self.client;
        let url = url.as_str();
        let body = &body;

        let response = backoff::future::retry(policy, move || async move {
            Self::send_once(client, url, body).await.map_err(|e| {
                if e.is_transient() {
                    tracing::warn!("Transient Gemini failure, retrying: {}", e);
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await?;

        Self::parse_response(response)
    }
}

fn content_to_wire(content: &Content) -> Value {
    json!({
        "role": content.role.to_string(),
        "parts": content.parts.iter().map(part_to_wire).collect::<Vec<_>>(),
    })
}

fn part_to_wire(part: &Part) -> Value {
    let (mut value, signature) = match part {
        Part::Text {
            text,
            thought_signature,
        } => (json!({ "text": text }), thought_signature),
        Part::Thought {
            text,
            thought_signature,
        } => (json!({ "text": text, "thought": true }), thought_signature),
        Part::FunctionCall {
            name,
            args,
            thought_signature,
        } => (
            json!({ "functionCall": { "name": name, "args": args } }),
            thought_signature,
        ),
        Part::FunctionResponse { name, response } => {
            return json!({ "functionResponse": { "name": name, "response": response } });
        }
    };

    if let Some(sig) = signature {
        value["thoughtSignature"] = json!(sig);
    }

    value
}

fn part_from_wire(part: GeminiPart) -> Option<Part> {
    if let Some(fc) = part.function_call {
        return Some(Part::FunctionCall {
            name: fc.name,
            args: fc.args.unwrap_or_else(|| json!({})),
            thought_signature: part.thought_signature,
        });
    }

    let text = part.text?;
    if part.thought.unwrap_or(false) {
        Some(Part::Thought {
            text,
            thought_signature: part.thought_signature,
        })
    } else {
        Some(Part::Text {
            text,
            thought_signature: part.thought_signature,
        })
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    thought: Option<bool>,
    thought_signature: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFunctionCall {
    name: String,
    args: Option<Value>,
}
