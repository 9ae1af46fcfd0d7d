//! # Health Check Handler
//!
//! برای بررسی سلامت سرویس

use axum::{extract::State, Json};

use crate::{models::HealthResponse, services::AppState};

// =====================================
// Health Check
// =====================================
/// بررسی سلامت سرویس
///
/// دیتابیس‌ها per-request هستن، پس اینجا فقط تعداد ریپوهای مجاز گزارش میشه.
///
/// # Endpoint
/// `GET /health`
///
/// # Response
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "knownRepos": 3
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.traffic_service.known_repo_count(),
    ))
}
