//! Gemini `generateContent` REST client.
//!
//! Sends the prompt as a single user turn with `responseMimeType` set to
//! JSON and the declared `responseSchema`, then joins the text parts of the
//! first candidate into the reply.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{ModelError, ModelProvider, ModelRequest};
use crate::config::Config;

const JSON_MIME_TYPE: &str = "application/json";

/// Gemini provider. Holds an optional key so a missing credential surfaces
/// per request rather than at construction.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    key_source: String,
}

impl GeminiProvider {
    /// Build a provider from configuration, reading the key from the environment.
    pub fn from_config(config: &Config) -> Result<Self, ModelError> {
        Self::new(
            config.resolve_api_key(),
            config.key_sources(),
            &config.model.name,
            &config.model.base_url,
            Duration::from_secs(config.model.timeout_secs),
        )
    }

    pub fn new(
        api_key: Option<String>,
        key_source: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("codementor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            key_source: key_source.into(),
        })
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig<'a> {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema", skip_serializing_if = "schema_is_null")]
    response_schema: &'a Value,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}

fn schema_is_null(schema: &&Value) -> bool {
    schema.is_null()
}

fn build_body(request: &ModelRequest) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![RequestContent {
            role: "user",
            parts: vec![RequestPart {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            response_mime_type: JSON_MIME_TYPE,
            response_schema: &request.response_schema,
        },
    }
}

/// Concatenate the text parts of the first candidate. `None` if there are none.
fn extract_text(response: GenerateResponse) -> Option<String> {
    let parts = response.candidates.into_iter().next()?.content?.parts;
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() { None } else { Some(text) }
}

fn describe_api_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => match env.error.status {
            Some(s) => format!("HTTP {status} ({s}): {}", env.error.message),
            None => format!("HTTP {status}: {}", env.error.message),
        },
        Err(_) => format!("HTTP {status}: {body}"),
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn check_credentials(&self) -> Result<(), ModelError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(ModelError::MissingCredential(self.key_source.clone())),
        }
    }

    async fn generate(&self, request: &ModelRequest) -> Result<Option<String>, ModelError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ModelError::MissingCredential(self.key_source.clone()));
        };

        let body = build_body(request);
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ModelError::Transport(describe_api_error(status, &text)));
        }

        let text = response.text().await?;
        debug!(
            kind = %request.kind,
            elapsed_ms = start.elapsed().as_millis() as u64,
            bytes = text.len(),
            "Gemini reply received"
        );
        if text.trim().is_empty() {
            return Ok(None);
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ModelError::Transport(format!("unreadable Gemini envelope: {e}")))?;
        Ok(extract_text(parsed))
    }
}
