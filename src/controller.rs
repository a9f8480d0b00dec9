//! Form submission controller
//!
//! Runs one submission through validation, credential resolution, prompt
//! building and generation, recording the state path it took:
//!
//! ```text
//! Idle -> Validating -> Rejected
//!                    -> Resolving -> ConfigFailed
//!                                 -> Generating -> GenFailed
//!                                               -> Rendered
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AppConfig;
use crate::credentials::CredentialResolver;
use crate::error::{AppError, ConfigError};
use crate::generation::{ClientFactory, GeminiClientFactory, GenerationClient};
use crate::models::{FormInput, GenerationResult, Itinerary, TripRequest};
use crate::prompt::{build_prompt, progress_message};

/// Banner shown once the form is ready again
pub const SUCCESS_MESSAGE: &str = "Seu roteiro está pronto!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Validating,
    Rejected,
    Resolving,
    ConfigFailed,
    Generating,
    GenFailed,
    Rendered,
}

impl SubmissionState {
    /// Whether the submission has finished in this state
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::ConfigFailed | Self::GenFailed | Self::Rendered
        )
    }
}

/// Status banner above the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Banner {
    Validation(String),
    Config(String),
    Failure(String),
    Success(String),
}

impl Banner {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Banner::Validation(m) | Banner::Config(m) | Banner::Failure(m) | Banner::Success(m) => m,
        }
    }
}

/// Outcome of one submission, ready to render
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub state: SubmissionState,
    pub path: Vec<SubmissionState>,
    pub banner: Banner,
    pub itinerary: Option<Itinerary>,
}

impl Submission {
    /// Markdown to render below the banner, only present when rendered
    #[must_use]
    pub fn markdown(&self) -> Option<&str> {
        self.itinerary.as_ref().map(|i| i.markdown.as_str())
    }
}

struct Run {
    path: Vec<SubmissionState>,
}

impl Run {
    fn start() -> Self {
        Self {
            path: vec![SubmissionState::Idle],
        }
    }

    fn enter(&mut self, state: SubmissionState) {
        debug!(from = ?self.current(), to = ?state, "Submission state change");
        self.path.push(state);
    }

    fn current(&self) -> SubmissionState {
        self.path.last().copied().unwrap_or(SubmissionState::Idle)
    }

    fn finish(
        mut self,
        state: SubmissionState,
        err: Option<AppError>,
        itinerary: Option<Itinerary>,
    ) -> Submission {
        self.enter(state);
        let banner = match &err {
            None => Banner::Success(SUCCESS_MESSAGE.to_string()),
            Some(err @ AppError::Validation(_)) => Banner::Validation(err.user_message()),
            Some(err @ AppError::Config(_)) => Banner::Config(err.user_message()),
            Some(err) => Banner::Failure(err.user_message()),
        };
        Submission {
            state,
            path: self.path,
            banner,
            itinerary,
        }
    }
}

/// Orchestrates submissions. Shared across requests behind an `Arc`.
pub struct FormController {
    resolver: CredentialResolver,
    factory: Arc<dyn ClientFactory>,
    client: OnceCell<Arc<dyn GenerationClient>>,
}

impl FormController {
    pub fn new(resolver: CredentialResolver, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            resolver,
            factory,
            client: OnceCell::new(),
        }
    }

    /// Controller talking to Gemini with the configured credential source
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            CredentialResolver::from_config(&config.generation),
            Arc::new(GeminiClientFactory::new(config.generation.clone())),
        )
    }

    /// Resolve the credential and build the client ahead of the first submission
    pub async fn warm_up(&self) -> Result<(), ConfigError> {
        self.client().await.map(|_| ())
    }

    async fn client(&self) -> Result<&Arc<dyn GenerationClient>, ConfigError> {
        self.client
            .get_or_try_init(|| async {
                let credential = self.resolver.resolve()?;
                info!(secret = self.resolver.name(), "Generation client configured");
                self.factory.build(credential)
            })
            .await
    }

    /// Run one submission to completion
    #[instrument(skip_all)]
    pub async fn submit(&self, input: &FormInput) -> Submission {
        let mut run = Run::start();

        run.enter(SubmissionState::Validating);
        let request = match TripRequest::try_from(input) {
            Ok(request) => request,
            Err(err) => {
                debug!("Rejected submission: {}", err);
                return run.finish(SubmissionState::Rejected, Some(err.into()), None);
            }
        };

        run.enter(SubmissionState::Resolving);
        let client = match self.client().await {
            Ok(client) => Arc::clone(client),
            Err(err) => {
                warn!("Credential resolution failed: {}", err);
                return run.finish(SubmissionState::ConfigFailed, Some(err.into()), None);
            }
        };

        run.enter(SubmissionState::Generating);
        info!("{}", progress_message(&request));
        match generate_itinerary(client.as_ref(), &request).await {
            Ok(itinerary) => run.finish(SubmissionState::Rendered, None, Some(itinerary)),
            Err(err) => {
                // Detail stays in the log; the user gets the generic banner
                error!(error = %err, "Itinerary generation failed");
                run.finish(SubmissionState::GenFailed, Some(err.into()), None)
            }
        }
    }
}

async fn generate_itinerary(client: &dyn GenerationClient, request: &TripRequest) -> GenerationResult {
    let prompt = build_prompt(request);
    let text = client.generate(&prompt).await?;
    Itinerary::from_text(text)
}
