//! # ماژول سرویس‌ها (Business Logic Layer)
//!
//! ## لایه‌بندی معماری
//!
//! ```text
//! ┌─────────────────┐
//! │    API Layer    │  <-- HTTP handlers (axum)
//! ├─────────────────┤
//! │  Service Layer  │  <-- validate → connect → query → shape → release (اینجا!)
//! ├─────────────────┤
//! │ Repository Layer│  <-- ViewsRepository / ClonesRepository
//! ├─────────────────┤
//! │ Store per repo  │  <-- SQLite، یک فایل برای هر ریپو
//! └─────────────────┘
//! ```

mod traffic_service;

pub use traffic_service::*;

use std::sync::Arc;

use crate::{
    config::Config,
    database::{SqliteConnector, StoreConnector},
};

// =====================================
// Application State
// =====================================
/// وضعیت برنامه که بین همه handlers اشتراک‌گذاری میشه
///
/// همه فیلدها بعد از راه‌اندازی تغییرناپذیر هستن؛ اتصال‌های دیتابیس
/// اینجا نگه داشته نمیشن و هر درخواست اتصال خودش رو داره.
#[derive(Clone)]
pub struct AppState {
    /// تنظیمات برنامه
    pub config: Arc<Config>,

    /// سرویس ترافیک
    pub traffic_service: Arc<TrafficService>,
}

impl AppState {
    /// ساخت AppState با connector پیش‌فرض SQLite
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_connector(config, Arc::new(SqliteConnector))
    }

    /// ساخت AppState با connector دلخواه (مثلا در تست)
    #[must_use]
    pub fn with_connector(config: Config, connector: Arc<dyn StoreConnector>) -> Self {
        let config = Arc::new(config);
        let traffic_service = Arc::new(TrafficService::new(connector, config.clone()));

        Self {
            config,
            traffic_service,
        }
    }

    /// دسترسی به config
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
