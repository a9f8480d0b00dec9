//! Error types and handling for the itinerary generator
//!
//! Each stage of a submission has its own error type. [`AppError`] wraps them
//! and decides what a user gets to see.

use axum::http::StatusCode;
use thiserror::Error;

/// Message shown for every generation failure, whatever the cause.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Desculpe, não foi possível gerar seu roteiro no momento.";

/// Message shown when a required form field is missing.
pub const MISSING_FIELDS_MESSAGE: &str =
    "Por favor, preencha o destino e seus interesses para um roteiro incrível!";

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Destination and/or interests were left empty
    #[error("{}", MISSING_FIELDS_MESSAGE)]
    MissingFields { fields: Vec<&'static str> },

    /// Duration outside the accepted range of days
    #[error("A duração da viagem deve estar entre {min} e {max} dias (recebido: {value}).")]
    DurationOutOfRange { value: i64, min: u32, max: u32 },
}

/// Credential and configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The API key is not present in any configured secret store
    #[error(
        "Chave de API do Google não encontrada. Configure a variável {name} ou generation.api_key na configuração."
    )]
    Missing { name: String },

    /// Any other failure while reading the credential or configuring the client
    #[error("Erro ao configurar a API: {0}")]
    Other(String),
}

/// Errors from the generative-language service call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Prompt blocked by upstream: {0}")]
    Blocked(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl AppError {
    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message.
    ///
    /// Validation and configuration problems are actionable and shown as-is.
    /// Generation failures never expose upstream detail.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(err) => err.to_string(),
            AppError::Config(err) => err.to_string(),
            AppError::Generation(_) => GENERATION_FAILED_MESSAGE.to_string(),
            AppError::Io { .. } => "File operation failed. Please check file permissions.".to_string(),
            AppError::General { message } => message.clone(),
        }
    }

    /// HTTP status used when this error ends a request
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::Io { .. } | AppError::General { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
