//! # HTTP Handlers
//!
//! در axum، هر handler یک async function هست که
//! extractor‌ها رو میگیره و چیزی برمیگردونه که `IntoResponse` باشه.

pub mod health;
pub mod traffic;
