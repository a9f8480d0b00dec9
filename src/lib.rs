//! `itinerai` - AI travel itinerary generator
//!
//! A single-page form collects travel preferences, turns them into a prompt
//! for a generative-language model and renders the markdown itinerary it
//! returns.

pub mod api;
pub mod config;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod generation;
pub mod models;
pub mod page;
pub mod prompt;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::AppConfig;
pub use controller::{Banner, FormController, Submission, SubmissionState};
pub use credentials::{Credential, CredentialResolver, resolve_credential};
pub use error::{AppError, ConfigError, GenerationError, ValidationError};
pub use generation::{ClientFactory, GeminiClient, GenerationClient};
pub use models::{
    Budget, FormInput, GenerationResult, Itinerary, TravelStyle, TripDuration, TripRequest,
};
pub use prompt::build_prompt;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AppError>;
