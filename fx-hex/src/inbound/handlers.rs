//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use fx_types::{AppError, RatesQuery, Repository, SyncRequest};

use super::extract::{ApiJson, ApiQuery};
use crate::SyncService;

/// Application state shared across handlers.
pub struct AppState<R: Repository> {
    pub service: SyncService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::FetchTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::FetchUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Synchronize one currency over a date window.
#[tracing::instrument(skip(state, req), fields(country = %req.country))]
pub async fn sync<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    ApiJson(req): ApiJson<SyncRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.service.synchronize(req).await?;
    Ok(Json(response))
}

/// List the currency directory.
pub async fn list_currencies<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.list_currencies())
}

/// List the stored reference table.
#[tracing::instrument(skip(state))]
pub async fn list_reference<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.service.list_references().await?;
    Ok(Json(rows))
}

/// List stored rates, optionally for one provider code.
#[tracing::instrument(skip(state))]
pub async fn list_rates<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    ApiQuery(query): ApiQuery<RatesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.service.list_rates(query.provider_code).await?;
    Ok(Json(rows))
}

/// Serve a rendered report.
#[tracing::instrument(skip(state), fields(report_id = %id))]
pub async fn get_report<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let report_id: Uuid = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid report ID".into()))?;

    let artifact = state.service.get_report(report_id)?;
    Ok((
        [(header::CONTENT_TYPE, artifact.report.content_type)],
        artifact.report.bytes.clone(),
    ))
}
