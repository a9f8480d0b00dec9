//! Data models for trip requests and generated itineraries

pub mod itinerary;
pub mod trip;

pub use itinerary::{GenerationResult, Itinerary};
pub use trip::{Budget, FormInput, TravelStyle, TripDuration, TripRequest};
