//! # ماژول مدل‌ها (Domain Models)
//!
//! ## تفاوت انواع مدل:
//! - **Record**: داده‌ای که از دیتابیس ریپو خونده میشه (`TrafficRecord`, `AggregateRecord`)
//! - **Shaped**: خروجی API (`TrafficPoint`, `TrafficSummary`)
//! - **Options**: پارامترهای درخواست بعد از parse (`TrafficOptions`)
//! - **DTO**: پاکت پاسخ (`ApiResponse`)

mod dto;
mod options;
mod traffic;

// Re-export همه مدل‌ها
pub use dto::*;
pub use options::*;
pub use traffic::*;

use serde::{Deserialize, Serialize};

// =====================================
// Collections
// =====================================
/// دو نوع ترافیک که هر ریپو نگه میداره
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Views,
    Clones,
}

impl Collection {
    /// اسم جدول در دیتابیس ریپو
    #[must_use]
    pub fn table(&self) -> &'static str {
        match self {
            Self::Views => "views_data",
            Self::Clones => "clones_data",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

// =====================================
// Sort Direction
// =====================================
/// ترتیب مرتب‌سازی بر اساس تاریخ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// تبدیل به SQL
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    /// علامت مرتب‌سازی (`1` یا `-1`)
    #[must_use]
    pub fn sign(&self) -> i8 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }

    #[must_use]
    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Descending)
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascending => f.write_str("asc"),
            Self::Descending => f.write_str("desc"),
        }
    }
}
