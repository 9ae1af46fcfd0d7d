//! # Custom Extractors
//!
//! ## مفاهیم Rust + Axum:
//! - **FromRequestParts**: trait برای ساخت extractor
//! - **async_trait**: پشتیبانی از async در traits
//! - **Infallible**: extractor که هیچوقت reject نمیکنه

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

// =====================================
// Request ID Extractor
// =====================================
/// استخراج یا تولید Request ID
///
/// middleware `request_id` این header رو قبل از handler میذاره؛
/// اگه نبود (مثلا handler بدون middleware صدا زده بشه) یکی تولید میشه.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Header name برای request ID
    pub const HEADER_NAME: &'static str = "x-request-id";

    /// تولید ID جدید
    #[must_use]
    pub fn generate() -> Self {
        Self(nanoid::nanoid!(12))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(Self::HEADER_NAME)
            .and_then(|v| v.to_str().ok())
            .map(|v| RequestId(v.to_string()))
            .unwrap_or_else(RequestId::generate);

        Ok(request_id)
    }
}
