//! Google Gemini `generateContent` client

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{ClientFactory, GenerationClient};
use crate::config::GenerationConfig;
use crate::credentials::Credential;
use crate::error::{ConfigError, GenerationError};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini REST client bound to one model and credential
pub struct GeminiClient {
    client: Client,
    credential: Credential,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    /// Create a client; the credential goes into every request header
    pub fn new(config: &GenerationConfig, credential: Credential) -> Result<Self, ConfigError> {
        let mut builder = Client::builder().user_agent(concat!("itinerai/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            credential,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            model: config.model.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    #[instrument(name = "gemini_generate", skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let start = Instant::now();
        let body = GenerateContentRequest::single_prompt(prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        debug!("Gemini responded with {} in {:.3}s", status, start.elapsed().as_secs_f64());

        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let err = status_error(status, &text);
            warn!("Gemini request failed: {}", err);
            return Err(err);
        }

        let output = extract_text(&text)?;
        info!(
            "Generated {} characters in {:.3}s",
            output.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(output)
    }
}

/// Production factory, building [`GeminiClient`]s from configuration
#[derive(Debug, Clone)]
pub struct GeminiClientFactory {
    config: GenerationConfig,
}

impl GeminiClientFactory {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for GeminiClientFactory {
    fn build(&self, credential: Credential) -> Result<Arc<dyn GenerationClient>, ConfigError> {
        Ok(Arc::new(GeminiClient::new(&self.config, credential)?))
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn single_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Join the text parts of the first candidate
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        return match response.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(GenerationError::Blocked(reason)),
            None => Err(GenerationError::EmptyResponse),
        };
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        if let Some(reason) = candidate.finish_reason.filter(|r| r == "SAFETY") {
            return Err(GenerationError::Blocked(reason));
        }
        return Err(GenerationError::EmptyResponse);
    }

    Ok(text)
}

fn status_error(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message.or(envelope.error.status))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Authentication(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GenerationError::Timeout,
        _ => GenerationError::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}

fn map_transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else if err.is_decode() {
        GenerationError::MalformedResponse(err.to_string())
    } else {
        GenerationError::Transport(err.to_string())
    }
}
