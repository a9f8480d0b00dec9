//! Generated itinerary model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Markdown itinerary returned by the model, kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub markdown: String,
    pub generated_at: DateTime<Utc>,
}

impl Itinerary {
    /// Wrap model output. Blank output is an error, never an empty itinerary.
    pub fn from_text(text: String) -> Result<Self, GenerationError> {
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(Self {
            markdown: text,
            generated_at: Utc::now(),
        })
    }
}

/// Outcome of one call to the generative model
pub type GenerationResult = Result<Itinerary, GenerationError>;
