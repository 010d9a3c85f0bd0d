use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AssessmentId, AssessmentSubmission, ClientId, ClientProfile, Gender};
use super::repository::{AssessmentRepository, RepositoryError};
use super::service::{AssessmentScoringService, AssessmentServiceError, OverrideRequest};

/// Router exposing assessment intake, scoring, overrides and analytics.
pub fn assessment_router<R>(service: Arc<AssessmentScoringService<R>>) -> Router
where
    R: AssessmentRepository + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(submit_handler::<R>))
        .route("/api/v1/assessments/:assessment_id", get(report_handler::<R>))
        .route(
            "/api/v1/assessments/:assessment_id/score",
            post(recompute_handler::<R>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/overrides",
            put(overrides_handler::<R>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/archive",
            post(archive_handler::<R>),
        )
        .route(
            "/api/v1/clients/:client_id/progress",
            get(progress_handler::<R>),
        )
        .route("/api/v1/percentile", post(percentile_handler::<R>))
        .with_state(service)
}

/// Ad-hoc ranking query against the loaded normative table.
#[derive(Debug, Clone, Deserialize)]
pub struct PercentileQuery {
    pub identifier: String,
    pub score: f64,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age: Option<u8>,
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
    axum::Json(submission): axum::Json<AssessmentSubmission>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.report())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    match service.get(&AssessmentId(assessment_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.report())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recompute_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    match service.recompute(&AssessmentId(assessment_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.report())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn overrides_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<OverrideRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    match service.set_overrides(&AssessmentId(assessment_id), request) {
        Ok(record) => (StatusCode::OK, axum::Json(record.report())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn archive_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    match service.archive(&AssessmentId(assessment_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.report())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn progress_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
    Path(client_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    match service.client_progress(&ClientId(client_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn percentile_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
    axum::Json(query): axum::Json<PercentileQuery>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    let client = ClientProfile {
        gender: query.gender,
        age: query.age,
    };
    let result = service.rank(&query.identifier, query.score, &client);
    (StatusCode::OK, axum::Json(result)).into_response()
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::Repository(RepositoryError::NotFound)
        | AssessmentServiceError::InsufficientHistory { .. } => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(RepositoryError::Conflict)
        | AssessmentServiceError::Archived(_) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_)) => {
            tracing::warn!(error = %error, "assessment repository unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
