//! # Middleware
//!
//! Middleware‌های سفارشی برای پردازش request/response
//!
//! ## مفاهیم:
//! - **Middleware**: کد که قبل/بعد از handler اجرا میشه
//! - **Next**: ادامه زنجیره middleware

use std::time::Instant;

use axum::{
    body::Body,
    http::{header::HeaderValue, Request},
    middleware::Next,
    response::IntoResponse,
};
use tracing::info;

use super::extractors::RequestId;

// =====================================
// Request Timing Middleware
// =====================================
/// اندازه‌گیری زمان پردازش request
///
/// # استفاده:
/// ```rust,ignore
/// let app = Router::new()
///     .layer(axum::middleware::from_fn(request_timing));
/// ```
pub async fn request_timing(request: Request<Body>, next: Next) -> impl IntoResponse {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}

// =====================================
// Request ID Middleware
// =====================================
/// اضافه کردن Request ID به request و response
///
/// ID ورودی که header معتبری نباشه نادیده گرفته میشه و ID جدید تولید میشه.
pub async fn request_id(mut request: Request<Body>, next: Next) -> impl IntoResponse {
    let incoming = request
        .headers()
        .get(RequestId::HEADER_NAME)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| HeaderValue::from_str(v).ok());

    let value = match incoming {
        Some(value) => value,
        None => {
            let RequestId(id) = RequestId::generate();
            // nanoid فقط کاراکترهای URL-safe تولید میکنه
            HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        }
    };

    request
        .headers_mut()
        .insert(RequestId::HEADER_NAME, value.clone());

    let mut response = next.run(request).await;
    response.headers_mut().insert(RequestId::HEADER_NAME, value);

    response
}
