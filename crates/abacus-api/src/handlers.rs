//! HTTP handlers

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::types::{
    ApiResponse, BatchEvaluateRequest, BatchEvaluateResponse, EvaluateRequest, HealthResponse,
    HistoryQuery,
};
use abacus_core::{EvaluationRecord, HistoryPage, PageRequest, StatsSnapshot};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use tracing::{debug, info, instrument};

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.elapsed().as_secs(),
    })
}

/// `POST /api/evaluate/single`
///
/// A failed calculation is still recorded; it is reported as a 400 with the
/// record attached.
#[instrument(skip_all)]
pub async fn evaluate_single(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<EvaluationRecord>>> {
    let Json(request) = payload?;

    let expression = request.expression.trim().to_string();
    if expression.is_empty() {
        return Err(ApiError::invalid_body("expression must not be empty"));
    }
    check_length(&expression, state.config.limits.max_expression_length)?;

    let service = state.service.clone();
    let record = tokio::task::spawn_blocking(move || service.evaluate(&expression)).await??;

    if record.error().is_some() {
        return Err(ApiError::invalid_expression(record));
    }

    debug!(id = %record.id(), "Single evaluation succeeded");
    Ok(Json(ApiResponse::ok("Expression evaluated successfully", record)))
}

/// `POST /api/evaluate/batch`
///
/// Individual failures do not fail the batch.
#[instrument(skip_all)]
pub async fn evaluate_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchEvaluateRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<BatchEvaluateResponse>>> {
    let Json(request) = payload?;
    let limits = &state.config.limits;

    if request.expressions.is_empty() {
        return Err(ApiError::invalid_body("expressions must contain at least one expression"));
    }
    if request.expressions.len() > limits.max_batch_size {
        return Err(ApiError::BatchTooLarge {
            size: request.expressions.len(),
            limit: limits.max_batch_size,
        });
    }
    for expression in &request.expressions {
        check_length(expression, limits.max_expression_length)?;
    }

    info!(expression_count = request.expressions.len(), "Received batch evaluation request");

    let service = state.service.clone();
    let expressions = request.expressions;
    let results =
        tokio::task::spawn_blocking(move || service.evaluate_batch(&expressions)).await??;

    Ok(Json(ApiResponse::ok(
        "Batch expressions evaluated successfully",
        BatchEvaluateResponse { results },
    )))
}

/// `GET /api/evaluate/history`
///
/// An unreadable query string falls back to the default page.
pub async fn history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<HistoryPage>>> {
    let query = query.map(|Query(query)| query).unwrap_or_default();
    let request = PageRequest::new(query.page(), query.page_size());

    let page = state.service.history(request)?;
    Ok(Json(ApiResponse::ok("History retrieved successfully", page)))
}

/// `GET /api/evaluate/stats`
pub async fn stats(State(state): State<AppState>) -> Json<ApiResponse<StatsSnapshot>> {
    Json(ApiResponse::ok("Statistics retrieved successfully", state.service.stats()))
}

fn check_length(expression: &str, limit: usize) -> ApiResult<()> {
    let length = expression.chars().count();
    if length > limit {
        return Err(ApiError::ExpressionTooLong { length, limit });
    }
    Ok(())
}
