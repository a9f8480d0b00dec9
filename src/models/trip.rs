//! Trip preferences collected from the form

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Travel style offered by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelStyle {
    #[default]
    Adventure,
    Relaxation,
    Cultural,
    Gastronomic,
    Backpacking,
}

impl TravelStyle {
    pub const ALL: [TravelStyle; 5] = [
        TravelStyle::Adventure,
        TravelStyle::Relaxation,
        TravelStyle::Cultural,
        TravelStyle::Gastronomic,
        TravelStyle::Backpacking,
    ];

    /// Label shown to the user and used in the prompt
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TravelStyle::Adventure => "Aventura (Trilhas, esportes)",
            TravelStyle::Relaxation => "Tranquilo (Praias, Spas, Relaxar)",
            TravelStyle::Cultural => "Cultural (Museus, História)",
            TravelStyle::Gastronomic => "Gastronômico (Comida e bebida)",
            TravelStyle::Backpacking => "Mochilão (Econômico, flexível)",
        }
    }

    /// Form value of this option
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            TravelStyle::Adventure => "adventure",
            TravelStyle::Relaxation => "relaxation",
            TravelStyle::Cultural => "cultural",
            TravelStyle::Gastronomic => "gastronomic",
            TravelStyle::Backpacking => "backpacking",
        }
    }
}

/// Budget tier, excluding flights. Ordered from cheapest to most expensive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    Economic,
    #[default]
    Moderate,
    Comfortable,
    Luxury,
}

impl Budget {
    pub const ALL: [Budget; 4] = [
        Budget::Economic,
        Budget::Moderate,
        Budget::Comfortable,
        Budget::Luxury,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Budget::Economic => "Econômico",
            Budget::Moderate => "Moderado",
            Budget::Comfortable => "Confortável",
            Budget::Luxury => "Luxo",
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Budget::Economic => "economic",
            Budget::Moderate => "moderate",
            Budget::Comfortable => "comfortable",
            Budget::Luxury => "luxury",
        }
    }
}

/// Trip length in days, always within `MIN..=MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TripDuration(u32);

impl TripDuration {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 90;
    pub const DEFAULT: u32 = 5;

    /// Accept a raw day count from the form
    pub fn new(days: i64) -> Result<Self, ValidationError> {
        match u32::try_from(days) {
            Ok(days) if (Self::MIN..=Self::MAX).contains(&days) => Ok(Self(days)),
            _ => Err(ValidationError::DurationOutOfRange {
                value: days,
                min: Self::MIN,
                max: Self::MAX,
            }),
        }
    }

    #[must_use]
    pub fn days(self) -> u32 {
        self.0
    }
}

impl Default for TripDuration {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

fn default_duration_days() -> i64 {
    i64::from(TripDuration::DEFAULT)
}

/// Raw form payload, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    pub destination: String,
    #[serde(default = "default_duration_days")]
    pub duration_days: i64,
    #[serde(default)]
    pub style: TravelStyle,
    #[serde(default)]
    pub budget: Budget,
    #[serde(default)]
    pub interests: String,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            destination: String::new(),
            duration_days: default_duration_days(),
            style: TravelStyle::default(),
            budget: Budget::default(),
            interests: String::new(),
        }
    }
}

/// Validated travel preferences for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripRequest {
    destination: String,
    duration: TripDuration,
    style: TravelStyle,
    budget: Budget,
    interests: String,
}

impl TripRequest {
    /// Build a request, rejecting blank required fields.
    ///
    /// Missing destination and interests are reported together. Text fields
    /// are kept as typed apart from surrounding whitespace.
    pub fn new(
        destination: &str,
        duration: TripDuration,
        style: TravelStyle,
        budget: Budget,
        interests: &str,
    ) -> Result<Self, ValidationError> {
        let destination = destination.trim();
        let interests = interests.trim();

        let mut missing = Vec::new();
        if destination.is_empty() {
            missing.push("destination");
        }
        if interests.is_empty() {
            missing.push("interests");
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { fields: missing });
        }

        Ok(Self {
            destination: destination.to_string(),
            duration,
            style,
            budget,
            interests: interests.to_string(),
        })
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn duration(&self) -> TripDuration {
        self.duration
    }

    #[must_use]
    pub fn style(&self) -> TravelStyle {
        self.style
    }

    #[must_use]
    pub fn budget(&self) -> Budget {
        self.budget
    }

    #[must_use]
    pub fn interests(&self) -> &str {
        &self.interests
    }
}

impl TryFrom<&FormInput> for TripRequest {
    type Error = ValidationError;

    fn try_from(input: &FormInput) -> Result<Self, Self::Error> {
        // Required fields first so that a blank form gets the combined message
        let request = TripRequest::new(
            &input.destination,
            TripDuration::default(),
            input.style,
            input.budget,
            &input.interests,
        )?;
        let duration = TripDuration::new(input.duration_days)?;
        Ok(Self { duration, ..request })
    }
}
