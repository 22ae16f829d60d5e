use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, warn};

use claims_core::HealthResponse;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let response = match (&state.extractor, &state.config_error) {
        (Some(_), _) => HealthResponse::healthy(&state.service_name),
        (None, error) => {
            let error = error
                .clone()
                .unwrap_or_else(|| "extraction client not configured".to_string());
            warn!(error = %error, "Reporting unhealthy service");
            HealthResponse::error(&state.service_name, error)
        }
    };

    (StatusCode::OK, Json(response))
}
