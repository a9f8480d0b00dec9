//! Generative-language client seam
//!
//! The controller only sees [`GenerationClient`]. A [`ClientFactory`] turns a
//! resolved credential into a client, so the credential is injected once at
//! construction and never looked up again mid-request.

use std::sync::Arc;

use async_trait::async_trait;

use crate::credentials::Credential;
use crate::error::{ConfigError, GenerationError};

pub mod gemini;

pub use gemini::{GeminiClient, GeminiClientFactory};

/// Single-shot text generation
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send `prompt` and wait for the full response text.
    ///
    /// One attempt, no retries. The text is returned as produced by the model.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Builds a client once the credential is known
pub trait ClientFactory: Send + Sync {
    fn build(&self, credential: Credential) -> Result<Arc<dyn GenerationClient>, ConfigError>;
}
