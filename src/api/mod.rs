//! # لایه API
//!
//! این ماژول HTTP handlers و routing رو مدیریت میکنه.
//!
//! ## مفاهیم Rust + Axum:
//! - **Router**: تعریف مسیرها
//! - **Extractors**: استخراج داده از request
//! - **State**: اشتراک state بین handlers
//! - **Tower**: زیرساخت middleware
//!
//! ## ساختار URL‌ها (پیشوند پیش‌فرض `traffic`):
//! - `GET /traffic/:repo/:days?aggregate=true&sort=asc` - ترافیک ریپو
//! - `GET /traffic/:repo` و `/traffic/:repo/` - ترافیک ریپو بدون محدودیت روز
//! - `GET /traffic` - اسم ریپو خالی (400)
//! - `GET /health` - Health check

mod extractors;
mod handlers;
mod middleware;

pub use extractors::*;
pub use handlers::*;
pub use middleware::*;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::HEALTH_ROUTE, services::AppState};

// =====================================
// Router Builder
// =====================================
/// ساخت Router اصلی برنامه
///
/// # مثال
/// ```rust
/// use repo_traffic::{api::create_router, config::ConfigBuilder, services::AppState};
///
/// let state = AppState::new(ConfigBuilder::new().known_repos(["site"]).build());
/// let app = create_router(state);
/// ```
pub fn create_router(state: AppState) -> Router {
    let prefix = state.config.route_prefix.clone();

    Router::new()
        .merge(traffic_routes(&prefix))
        .route(&format!("/{HEALTH_ROUTE}"), get(handlers::health::health_check))
        .layer(
            ServiceBuilder::new()
                // Tracing - لاگ کردن request‌ها
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(axum_middleware::from_fn(middleware::request_timing))
                // Compression - فشرده‌سازی response
                .layer(CompressionLayer::new())
                // CORS - داشبوردها از دامنه‌های دیگه میخونن
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// Route‌های ترافیک زیر پیشوند
///
/// مسیرهای بدون اسم ریپو هم ثبت میشن تا 400 برگردونن نه 404 پیش‌فرض axum.
fn traffic_routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(
            &format!("/{prefix}/:repo/:days"),
            get(handlers::traffic::get_traffic_for_days),
        )
        .route(
            &format!("/{prefix}/:repo"),
            get(handlers::traffic::get_traffic),
        )
        .route(
            &format!("/{prefix}/:repo/"),
            get(handlers::traffic::get_traffic),
        )
        .route(
            &format!("/{prefix}"),
            get(handlers::traffic::get_traffic_without_repo),
        )
        .route(
            &format!("/{prefix}/"),
            get(handlers::traffic::get_traffic_without_repo),
        )
}
