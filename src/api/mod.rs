use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    controller::{Submission, SubmissionState},
    models::{Budget, FormInput, TravelStyle, TripDuration},
    page::{SelectOption, budget_options, style_options},
    web::AppState,
};

#[derive(Serialize)]
pub struct ApiOptions {
    pub styles: Vec<SelectOption>,
    pub budgets: Vec<SelectOption>,
    pub min_days: u32,
    pub max_days: u32,
    pub default_days: u32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/options", get(get_options))
        .route("/itinerary", post(create_itinerary))
}

async fn get_options() -> Json<ApiOptions> {
    Json(ApiOptions {
        styles: style_options(TravelStyle::default()),
        budgets: budget_options(Budget::default()),
        min_days: TripDuration::MIN,
        max_days: TripDuration::MAX,
        default_days: TripDuration::DEFAULT,
    })
}

async fn create_itinerary(
    State(state): State<AppState>,
    Json(input): Json<FormInput>,
) -> (StatusCode, Json<Submission>) {
    let submission = state.controller.submit(&input).await;
    (status_for(submission.state), Json(submission))
}

/// HTTP status for a finished submission
pub fn status_for(state: SubmissionState) -> StatusCode {
    match state {
        SubmissionState::Rendered => StatusCode::OK,
        SubmissionState::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
        SubmissionState::ConfigFailed => StatusCode::SERVICE_UNAVAILABLE,
        SubmissionState::GenFailed => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
