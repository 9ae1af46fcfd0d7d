//! # Data Transfer Objects (DTOs)
//!
//! پاکت پاسخ که همه endpoint‌های ترافیک برمیگردونن

use serde::{Deserialize, Serialize};

/// پیام پاسخ موفق
pub const SUCCESS_MESSAGE: &str = "Successful";

// =====================================
// Generic API Response
// =====================================
/// پاکت عمومی پاسخ
///
/// ```json
/// { "isSuccess": true, "data": { ... }, "message": "Successful" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub is_success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// ساخت پاسخ موفق
    pub fn success(data: T) -> Self {
        Self {
            is_success: true,
            data,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    /// ساخت پاسخ ناموفق
    pub fn failure(data: T, message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            data,
            message: message.into(),
        }
    }
}

// =====================================
// Health Check
// =====================================
/// پاسخ health check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub known_repos: usize,
}

impl HealthResponse {
    #[must_use]
    pub fn healthy(known_repos: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            known_repos,
        }
    }
}
