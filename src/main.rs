//! # Repo Traffic - نقطه ورود برنامه
//!
//! ## مراحل راه‌اندازی:
//! - خوندن `.env`
//! - راه‌اندازی لاگینگ
//! - لود و اعتبارسنجی تنظیمات
//! - ساخت router و اجرای سرور

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use repo_traffic::{
    api::create_router,
    config::{Config, Environment},
    error::{AppError, Result},
    services::AppState,
};

/// نقطه ورود اصلی برنامه
///
/// # Errors
/// خطا برمیگردونه اگه:
/// - تنظیمات لود یا اعتبارسنجی نشن
/// - سرور استارت نشه
#[tokio::main]
async fn main() -> Result<()> {
    // اگه فایل .env نباشه اوکیه
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.environment);

    info!("🚀 Starting Repo Traffic Service...");

    config.validate()?;
    info!(
        known_repos = config.known_repos.len(),
        prefix = %config.route_prefix,
        timeout_secs = config.request_timeout_secs,
        "✅ Configuration loaded successfully"
    );

    if config.known_repos.is_empty() {
        warn!("No known repos configured; every traffic request will return 404");
    }

    let addr = config.server_addr();
    let app = create_router(AppState::new(config));

    let listener = TcpListener::bind(&addr).await?;
    info!("🌐 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

/// راه‌اندازی سیستم tracing برای لاگینگ
///
/// # مفاهیم:
/// - EnvFilter: فیلتر کردن لاگ‌ها بر اساس `RUST_LOG`
/// - در production خروجی JSON برای جمع‌آوری لاگ
fn init_tracing(environment: Environment) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("repo_traffic=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if environment.is_production() {
        registry
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)           // نمایش نام ماژول
                    .with_thread_ids(true)       // نمایش ID ترد
                    .with_file(true)             // نمایش نام فایل
                    .with_line_number(true)      // نمایش شماره خط
                    .with_level(true)            // نمایش سطح لاگ
                    .pretty(),
            )
            .init();
    }
}

/// صبر برای Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
