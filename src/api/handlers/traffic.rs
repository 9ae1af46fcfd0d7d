//! # Traffic Handlers
//!
//! تبدیل درخواست HTTP به `TrafficOptions` و برگردوندن پاکت پاسخ

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, warn};

use crate::{
    api::extractors::RequestId,
    error::{AppError, Result},
    models::{ApiResponse, RawTrafficQuery, TrafficData, TrafficOptions},
    services::AppState,
};

// =====================================
// Get Traffic
// =====================================
/// ترافیک ریپو در یک پنجره روز
///
/// # Endpoint
/// `GET /traffic/:repo/:days?aggregate=<true|false>&sort=<asc|desc>`
///
/// # Response
/// ```json
/// {
///   "isSuccess": true,
///   "data": {
///     "viewsData": [{ "date": "2024-01-02", "count": 3, "uniques": 1 }],
///     "clonesData": []
///   },
///   "message": "Successful"
/// }
/// ```
pub async fn get_traffic_for_days(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((repo, days)): Path<(String, String)>,
    Query(query): Query<RawTrafficQuery>,
) -> Result<Json<ApiResponse<TrafficData>>> {
    respond(&state, &request_id, &repo, Some(&days), &query).await
}

/// ترافیک ریپو بدون محدودیت روز
///
/// # Endpoint
/// `GET /traffic/:repo`
pub async fn get_traffic(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(repo): Path<String>,
    Query(query): Query<RawTrafficQuery>,
) -> Result<Json<ApiResponse<TrafficData>>> {
    respond(&state, &request_id, &repo, None, &query).await
}

/// مسیر بدون اسم ریپو
///
/// # Endpoint
/// `GET /traffic`
pub async fn get_traffic_without_repo() -> Result<Json<ApiResponse<TrafficData>>> {
    Err(AppError::empty_repo())
}

async fn respond(
    state: &AppState,
    request_id: &RequestId,
    repo: &str,
    days: Option<&str>,
    query: &RawTrafficQuery,
) -> Result<Json<ApiResponse<TrafficData>>> {
    let parsed = TrafficOptions::parse(days, query);
    for note in &parsed.notes {
        warn!(request_id = %request_id.0, repo, %note, "Lenient query option");
    }

    info!(request_id = %request_id.0, repo, "Traffic requested");

    let data = state
        .traffic_service
        .get_traffic(repo, parsed.options)
        .await?;

    Ok(Json(ApiResponse::success(data)))
}
