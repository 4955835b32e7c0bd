use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::HouseholdDeclaration;
use super::repository::{
    AssessmentId, AssessmentQuery, AssessmentRepository, AssessmentSubmission, RepositoryError,
};
use super::service::{AssessmentService, AssessmentServiceError};

/// Router builder exposing evaluation, storage and report endpoints.
pub fn assessment_router<R>(service: Arc<AssessmentService<R>>) -> Router
where
    R: AssessmentRepository + 'static,
{
    Router::new()
        .route("/api/v1/assessments/evaluate", post(evaluate_handler::<R>))
        .route(
            "/api/v1/assessments",
            post(submit_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/assessments/:id", get(detail_handler::<R>))
        .route(
            "/api/v1/assessments/:id/report.csv",
            get(report_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn evaluate_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    axum::Json(declaration): axum::Json<HouseholdDeclaration>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    let result = service.preview(&declaration);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    axum::Json(submission): axum::Json<AssessmentSubmission>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.summary_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Query(query): Query<AssessmentQuery>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    match service.list(&query) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    match service.get(AssessmentId(id)) {
        Ok(detail) => (StatusCode::OK, axum::Json(detail)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: AssessmentRepository + 'static,
{
    match service.export_csv(AssessmentId(id)) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_))
        | AssessmentServiceError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match &error {
        AssessmentServiceError::Repository(RepositoryError::Conflict) => {
            "assessment already exists".to_string()
        }
        AssessmentServiceError::Repository(RepositoryError::NotFound) => {
            "assessment not found".to_string()
        }
        other => other.to_string(),
    };

    (status, axum::Json(json!({ "error": message }))).into_response()
}
