//! Questionnaire submission endpoint
//!
//! Maps the submission service's outcomes onto the fixed wire contract:
//! - 200: `{"Questionnaire successfully submitted.": 1}`
//! - 404: `["Event <id> does not exist!"]`
//! - 400: array of `{"Invalid questionnaire submission": "<message>"}`
//! - 5xx: `{"error": "<what broke>"}`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::error;

use crate::questionnaire::SubmitError;
use crate::AppState;

/// POST /event/:event_id/questionnaire/submit
///
/// Body: JSON object keyed by question id, each mapping the question's
/// label to a boolean answer.
pub async fn submit_questionnaire(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, SubmitRejection> {
    state
        .service
        .submit(&event_id, &payload)
        .await
        .map_err(SubmitRejection)?;

    Ok(Json(json!({ "Questionnaire successfully submitted.": 1 })))
}

/// Wire mapping for submission failures.
pub struct SubmitRejection(pub SubmitError);

impl IntoResponse for SubmitRejection {
    fn into_response(self) -> Response {
        match self.0 {
            SubmitError::EventNotFound(event_id) => (
                StatusCode::NOT_FOUND,
                Json(json!([format!("Event {} does not exist!", event_id)])),
            )
                .into_response(),
            SubmitError::Invalid(errors) => {
                let body: Vec<Value> = errors
                    .iter()
                    .map(|e| json!({ "Invalid questionnaire submission": e.message() }))
                    .collect();
                (StatusCode::BAD_REQUEST, Json(Value::Array(body))).into_response()
            }
            SubmitError::Persistence { step, source } => {
                error!(%step, "Submission persisted partially: {}", source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": format!("Persistence failed during {}: {}", step, source) })),
                )
                    .into_response()
            }
            SubmitError::Upstream(source) => {
                error!("Storage unavailable: {}", source);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": format!("Storage unavailable: {}", source) })),
                )
                    .into_response()
            }
        }
    }
}
