use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::services::JobServiceError;
use crate::domain::JobId;
use crate::presentation::handlers::error_response::{error_response, service_error_response};
use crate::presentation::handlers::job_requests::{
    CreateJobRequest, JobResponse, ListJobsQuery, StatsResponse, UpdateJobRequest,
};
use crate::presentation::state::AppState;

fn parse_job_id(raw: &str) -> Result<JobId, axum::response::Response> {
    raw.parse::<JobId>()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))
}

#[tracing::instrument(skip(state))]
pub async fn list_jobs_handler(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> impl IntoResponse {
    let status = match query.status_filter() {
        Ok(status) => status,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state.job_service.list(status).await {
        Ok(jobs) => {
            let body: Vec<JobResponse> = jobs.into_iter().map(JobResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => service_error_response(e, "Failed to fetch downloads"),
    }
}

#[tracing::instrument(skip(state))]
pub async fn get_job_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.job_service.get(id).await {
        Ok(job) => (StatusCode::OK, Json(JobResponse::from(job))).into_response(),
        Err(e) => service_error_response(e, "Failed to fetch download"),
    }
}

#[tracing::instrument(skip(state, body))]
pub async fn create_job_handler(
    State(state): State<AppState>,
    body: Result<Json<CreateJobRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match body {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected create request body");
            return error_response(StatusCode::BAD_REQUEST, e.body_text());
        }
    };

    match state.job_service.create(request.into_new_job()).await {
        Ok(job) => (StatusCode::CREATED, Json(JobResponse::from(job))).into_response(),
        Err(e) => service_error_response(e, "Failed to create download"),
    }
}

#[tracing::instrument(skip(state, body))]
pub async fn update_job_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    body: Result<Json<UpdateJobRequest>, JsonRejection>,
) -> impl IntoResponse {
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let Json(request) = match body {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected update request body");
            return error_response(StatusCode::BAD_REQUEST, e.body_text());
        }
    };

    let update = match request.into_update() {
        Ok(update) => update,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state.job_service.update(id, update).await {
        Ok(job) => (StatusCode::OK, Json(JobResponse::from(job))).into_response(),
        Err(e) => service_error_response(e, "Failed to update download"),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_job_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    // Absence is reported like any other delete failure.
    match state.job_service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(JobServiceError::NotFound(id)) => {
            tracing::error!(job_id = %id, "Failed to delete download");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete download")
        }
        Err(e) => service_error_response(e, "Failed to delete download"),
    }
}

#[tracing::instrument(skip(state))]
pub async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.job_service.stats().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(StatsResponse {
                total: stats.total,
                completed: stats.completed,
                failed: stats.failed,
                active: stats.active,
            }),
        )
            .into_response(),
        Err(e) => service_error_response(e, "Failed to fetch stats"),
    }
}
