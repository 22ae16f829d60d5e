use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use claims_core::error::{ClaimsError, Result};
use claims_core::{ClaimData, ImageFormat, ImagePayload, ProcessClaimResponse};
use claims_extraction::parse_model_json;

use crate::state::AppState;

/// Largest accepted image, per file.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ProcessClaimResponse::failed(message))).into_response()
}

/// POST /process-claim/upload: extract a claim from a single image (`file`).
pub async fn upload_claim(State(state): State<AppState>, multipart: Multipart) -> Response {
    let request_id = Uuid::new_v4();
    let Some(extractor) = state.extractor.clone() else {
        return unavailable(&state);
    };

    let mut images = match read_images(multipart, &["file"]).await {
        Ok(images) => images,
        Err(e) => return rejected(request_id, e),
    };
    let Some(image) = images.remove("file") else {
        return failure(StatusCode::BAD_REQUEST, "missing multipart field 'file'");
    };

    info!(%request_id, bytes = image.bytes.len(), "Processing uploaded claim image");
    let call = async move { extractor.extract_single(&image).await };
    respond(request_id, &state, call).await
}

/// POST /process-claim/pair: extract a claim from `front` and `back` images.
pub async fn process_pair(State(state): State<AppState>, multipart: Multipart) -> Response {
    let request_id = Uuid::new_v4();
    let Some(extractor) = state.extractor.clone() else {
        return unavailable(&state);
    };

    let mut images = match read_images(multipart, &["front", "back"]).await {
        Ok(images) => images,
        Err(e) => return rejected(request_id, e),
    };
    let (Some(front), Some(back)) = (images.remove("front"), images.remove("back")) else {
        return failure(
            StatusCode::BAD_REQUEST,
            "both 'front' and 'back' multipart fields are required",
        );
    };

    info!(
        %request_id,
        front_bytes = front.bytes.len(),
        back_bytes = back.bytes.len(),
        "Processing claim statement pair"
    );
    let call = async move { extractor.extract_pair(&front, &back).await };
    respond(request_id, &state, call).await
}

fn unavailable(state: &AppState) -> Response {
    let reason = state
        .config_error
        .clone()
        .unwrap_or_else(|| "extraction client not configured".to_string());
    failure(StatusCode::SERVICE_UNAVAILABLE, reason)
}

/// An upload refused before any model call.
#[derive(Debug)]
struct UploadRejection {
    status: StatusCode,
    error: ClaimsError,
}

impl UploadRejection {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ClaimsError::InvalidUpload(message),
        }
    }

    /// Keeps axum's status, e.g. 413 once the request body limit is hit.
    fn multipart(e: MultipartError, context: String) -> Self {
        Self {
            status: e.status(),
            error: ClaimsError::InvalidUpload(format!("{context}: {}", e.body_text())),
        }
    }
}

fn rejected(request_id: Uuid, rejection: UploadRejection) -> Response {
    warn!(%request_id, status = %rejection.status, error = %rejection.error, "Rejected claim upload");
    failure(rejection.status, rejection.error.to_string())
}

async fn respond<F>(request_id: Uuid, state: &AppState, call: F) -> Response
where
    F: std::future::Future<Output = Result<String>>,
{
    let raw = match tokio::time::timeout(state.call_timeout, call).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            error!(%request_id, error = %e, "Claim extraction failed");
            return failure(StatusCode::BAD_GATEWAY, e.to_string());
        }
        Err(_) => {
            error!(%request_id, timeout_secs = state.call_timeout.as_secs(), "Claim extraction timed out");
            return failure(
                StatusCode::GATEWAY_TIMEOUT,
                format!(
                    "extraction timed out after {}s",
                    state.call_timeout.as_secs()
                ),
            );
        }
    };

    let data = match parse_model_json(&raw) {
        Ok(data) => data,
        Err(e) => return failure(StatusCode::BAD_GATEWAY, e.to_string()),
    };

    if let Ok(claim) = serde_json::from_value::<ClaimData>(data.clone()) {
        info!(
            %request_id,
            vehicle = claim.vehicle_info.is_some(),
            severity = ?claim.damage_assessment.as_ref().map(|d| d.severity_level()),
            estimated_cost = ?claim
                .damage_assessment
                .as_ref()
                .and_then(|d| d.estimated_cost_amount()),
            incident = claim.incident_info.is_some(),
            "Claim processed"
        );
    }

    (StatusCode::OK, Json(ProcessClaimResponse::ok(data))).into_response()
}

/// Collect the named image fields of a multipart body.
///
/// Unknown fields are ignored. A named field must carry a non-empty JPEG or
/// PNG no larger than `MAX_IMAGE_BYTES`.
async fn read_images(
    mut multipart: Multipart,
    wanted: &[&str],
) -> std::result::Result<HashMap<String, ImagePayload>, UploadRejection> {
    let mut images = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadRejection::multipart(e, "malformed multipart body".to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if !wanted.contains(&name.as_str()) {
            continue;
        }

        // An explicit extension decides; content type only covers bare names.
        let format = match field.file_name() {
            Some(file_name) if file_name.contains('.') => ImageFormat::from_file_name(file_name),
            _ => field.content_type().and_then(format_from_content_type),
        }
        .ok_or_else(|| {
            UploadRejection::bad_request(format!("field '{name}' must be a jpg, jpeg or png image"))
        })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| UploadRejection::multipart(e, format!("cannot read field '{name}'")))?;
        if bytes.is_empty() {
            return Err(UploadRejection::bad_request(format!("field '{name}' is empty")));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadRejection::bad_request(format!(
                "field '{name}' exceeds {} MiB",
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }

        images.insert(name, ImagePayload::new(bytes.to_vec(), format));
    }

    Ok(images)
}

fn format_from_content_type(content_type: &str) -> Option<ImageFormat> {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        _ => None,
    }
}
