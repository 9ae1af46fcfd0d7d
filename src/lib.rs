//! # Repo Traffic Library
//!
//! این کتابخانه یک سرویس فقط‌خواندنی برای آمار روزانه views و clones
//! ریپوهای کد ارائه میده.
//!
//! ## ساختار پروژه
//!
//! ```text
//! src/
//! ├── lib.rs          # نقطه ورود کتابخانه - اینجا!
//! ├── main.rs         # نقطه ورود باینری
//! ├── config/         # مدیریت تنظیمات و لیست ریپوهای مجاز
//! ├── error/          # تعریف خطاها و پاکت پاسخ خطا
//! ├── database/       # اتصال per-request و repository‌ها
//! ├── models/         # رکوردها، شکل خروجی، پارامترها
//! ├── services/       # مراحل درخواست ترافیک
//! ├── api/            # لایه HTTP
//! └── utils/          # توابع کمکی
//! ```
//!
//! ## مثال استفاده
//!
//! ```rust,no_run
//! use repo_traffic::{api::create_router, config::Config, services::AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().unwrap();
//!     let app = create_router(AppState::new(config));
//! }
//! ```

// =====================================
// Module Declarations
// =====================================

/// ماژول مدیریت تنظیمات برنامه
pub mod config;

/// ماژول تعریف و مدیریت خطاها
pub mod error;

/// ماژول ارتباط با دیتابیس ریپوها
pub mod database;

/// ماژول مدل‌های داده
pub mod models;

/// ماژول سرویس‌ها (Business Logic)
pub mod services;

/// ماژول API و HTTP Handlers
pub mod api;

/// ماژول توابع کمکی
pub mod utils;

// =====================================
// Re-exports
// =====================================

/// نتیجه عملیات با خطای سفارشی ما
pub use error::Result;

/// خطای اصلی برنامه
pub use error::AppError;

// =====================================
// Prelude Module
// =====================================
/// ماژول prelude برای import راحت‌تر آیتم‌های پرکاربرد
///
/// کاربرد:
/// ```rust
/// use repo_traffic::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::database::{StoreConnector, TrafficStore};
    pub use crate::error::{AppError, Result};
    pub use crate::models::*;
    pub use crate::services::*;
}
