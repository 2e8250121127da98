//! Gemini API client (Generative Language API).

use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};

use super::{GenerateRequest, GeneratorError, prompt};
use crate::config::{GeneratorConfig, resolve_api_key, resolve_base_url};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    /// Creates a config from the `[generator]` section and environment.
    ///
    /// Authentication resolution order:
    /// 1. `api_key` from the config file
    /// 2. `GEMINI_API_KEY` environment variable
    ///
    /// `GEMINI_BASE_URL` overrides the endpoint when set.
    ///
    /// # Errors
    /// Returns an error if no API key is available or a URL is malformed.
    pub fn from_env(config: &GeneratorConfig) -> Result<Self> {
        let api_key = resolve_api_key(config.api_key.as_deref(), "GEMINI_API_KEY", "generator")?;
        let base_url = resolve_base_url(
            config.base_url.as_deref(),
            "GEMINI_BASE_URL",
            DEFAULT_BASE_URL,
            "Gemini",
        )?;

        Ok(Self {
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        })
    }
}

/// Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generates notes for a topic. Returns the raw LaTeX-flavored text.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response has no text.
    pub async fn generate_notes(
        &self,
        request: &GenerateRequest,
    ) -> Result<String, GeneratorError> {
        let prompt = prompt::build(request)
            .map_err(|e| GeneratorError::parse(format!("Failed to assemble prompt: {e}")))?;
        let body = build_request_body(&prompt, &self.config);
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let headers = build_headers(&self.config.api_key);

        let response = self
            .http
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::from_reqwest(&e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(GeneratorError::http_status(status.as_u16(), &body));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| GeneratorError::parse(format!("Invalid Gemini response JSON: {e}")))?;
        extract_text(&value)
    }
}

fn build_request_body(prompt: &str, config: &GeminiConfig) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{
                "text": prompt
            }]
        }],
        "generationConfig": {
            "temperature": config.temperature,
            "topK": config.top_k,
            "topP": config.top_p,
            "maxOutputTokens": config.max_output_tokens,
        }
    })
}

/// Concatenates the text parts of the first candidate.
fn extract_text(value: &Value) -> Result<String, GeneratorError> {
    let parts = value
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array);

    let Some(parts) = parts else {
        return Err(GeneratorError::parse("Gemini response has no candidates"));
    };

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(GeneratorError::parse("Gemini response contained no text"));
    }
    Ok(text)
}

fn build_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-goog-api-key",
        HeaderValue::from_str(api_key).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    headers.insert("accept", HeaderValue::from_static("application/json"));
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers.insert("user-agent", HeaderValue::from_static(crate::USER_AGENT));
    headers
}
