//! # ماژول مدیریت خطاها (Error Handling)
//!
//! این ماژول سیستم مدیریت خطای سرویس رو تعریف میکنه.
//!
//! ## مفاهیم Rust:
//! - **Custom Error Types**: تعریف نوع خطای سفارشی
//! - **thiserror**: derive macro برای Error trait
//! - **From Trait**: تبدیل خودکار نوع‌ها
//! - **Result Type Alias**: alias برای ساده‌تر شدن کد
//!
//! ## پاسخ خطا
//! همه خطاها در یک قالب یکسان به کلاینت برمیگردن:
//!
//! ```json
//! { "isSuccess": false, "data": {}, "message": "..." }
//! ```
//!
//! خطاهای ورودی و اتصال `data: {}` دارن و بقیه `data: []`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::models::ApiResponse;

// =====================================
// Result Type Alias
// =====================================
/// نوع Result سفارشی برنامه
///
/// به جای نوشتن `Result<TrafficData, AppError>` میتونیم بنویسیم `Result<TrafficData>`
pub type Result<T, E = AppError> = std::result::Result<T, E>;

// =====================================
// Custom Error Enum
// =====================================
/// خطای اصلی برنامه
///
/// # مفاهیم:
/// - `#[error("...")]`: پیام خطا - همین متن در فیلد `message` پاسخ میاد
/// - `#[from]`: تبدیل خودکار از نوع‌های دیگه
#[derive(Debug, Error)]
pub enum AppError {
    // ----------------------------------------
    // خطاهای ورودی
    // ----------------------------------------

    /// درخواست نامعتبر - 400
    #[error("{0}")]
    BadRequest(String),

    /// ریپو در لیست مجاز نیست - 404
    #[error("Repo {0} doesn't exist in database, please check repo name and try again.")]
    UnknownRepository(String),

    // ----------------------------------------
    // خطاهای دیتابیس ریپو
    // ----------------------------------------

    /// اتصال به دیتابیس ریپو برقرار نشد - 404
    #[error("Connect {repo} failed with error: {cause}.")]
    DataStoreUnavailable { repo: String, cause: String },

    /// خطای اجرای query - 404
    #[error("{0}")]
    Query(String),

    /// خطای دیتابیس
    /// `#[from]` یعنی sqlx::Error خودکار به این تبدیل میشه
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// زمان درخواست تموم شد - 504
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    // ----------------------------------------
    // خطاهای راه‌اندازی (5xx)
    // ----------------------------------------

    /// خطای سرور
    #[error("Server error: {0}")]
    Server(String),

    /// خطای تنظیمات
    #[error("Configuration error: {0}")]
    Config(String),

    /// خطای migration
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// خطای IO
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// خطای JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// گرفتن HTTP status code متناسب با خطا
    ///
    /// خطاهای دیتابیس ریپو هم 404 برمیگردونن؛ کلاینت‌های فعلی
    /// همین رفتار رو انتظار دارن.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,

            Self::UnknownRepository(_)
            | Self::DataStoreUnavailable { .. }
            | Self::Query(_)
            | Self::Database(_) => StatusCode::NOT_FOUND,

            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,

            Self::Server(_)
            | Self::Config(_)
            | Self::Migrate(_)
            | Self::Io(_)
            | Self::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// آیا این خطا از سمت سرور یا دیتابیس هست؟
    ///
    /// این خطاها با سطح `error` لاگ میشن، حتی اگه status اونها 404 باشه.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Query(_) | Self::Database(_) | Self::Timeout(_)
        ) || self.status_code().is_server_error()
    }

    /// مقدار فیلد `data` در پاسخ خطا
    #[must_use]
    pub fn empty_data(&self) -> Value {
        match self {
            Self::BadRequest(_)
            | Self::UnknownRepository(_)
            | Self::DataStoreUnavailable { .. } => json!({}),
            _ => json!([]),
        }
    }

    /// خطای نام خالی ریپو
    #[must_use]
    pub fn empty_repo() -> Self {
        Self::BadRequest("Repo name can not be empty.".to_string())
    }
}

// =====================================
// IntoResponse Implementation
// =====================================
/// تبدیل AppError به Response HTTP
///
/// این باعث میشه بتونیم AppError رو مستقیم از handler برگردونیم
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, "Server error occurred");
        }

        let status = self.status_code();
        let body = ApiResponse::failure(self.empty_data(), self.to_string());

        (status, Json(body)).into_response()
    }
}

// =====================================
// Result Extensions
// =====================================
/// Extension trait برای Result
///
/// # مفاهیم:
/// - Extension Trait: اضافه کردن متد به نوع‌های موجود
pub trait ResultExt<T, E> {
    /// تبدیل خطا به AppError::Query
    fn map_query(self) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for std::result::Result<T, E> {
    fn map_query(self) -> Result<T> {
        self.map_err(|e| AppError::Query(e.to_string()))
    }
}
