//! # مدل‌های ترافیک
//!
//! ## مفاهیم:
//! - `FromRow`: تبدیل ردیف دیتابیس به struct
//! - `#[serde(rename_all = "camelCase")]`: اسم فیلدها در JSON
//! - شکل‌دهی خروجی به صورت توابع خالص تا بدون دیتابیس تست بشن

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::format_date;

// =====================================
// Stored Records
// =====================================
/// ترافیک یک روز (views یا clones)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub date: NaiveDate,
    pub count: i64,
    pub uniques: i64,
}

impl TrafficRecord {
    #[must_use]
    pub fn new(date: NaiveDate, count: i64, uniques: i64) -> Self {
        Self { date, count, uniques }
    }
}

/// خروجی خام pipeline تجمیع
///
/// `start_date` تاریخ اولین رکورد و `end_date` تاریخ آخرین رکورد
/// به ترتیب مرتب‌سازی درخواست هست، نه ترتیب تقویم.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count_total: i64,
    pub uniques_total: i64,
}

// =====================================
// Shaped Output
// =====================================
/// یک نقطه روزانه در پاسخ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficPoint {
    pub date: String,
    pub count: i64,
    pub uniques: i64,
}

impl From<TrafficRecord> for TrafficPoint {
    fn from(record: TrafficRecord) -> Self {
        Self {
            date: format_date(record.date),
            count: record.count,
            uniques: record.uniques,
        }
    }
}

/// خلاصه یک پنجره در پاسخ
///
/// همیشه `start_date <= end_date` به ترتیب تقویم.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSummary {
    pub start_date: String,
    pub end_date: String,
    pub count_total: i64,
    pub uniques_total: i64,
}

impl TrafficSummary {
    /// ساخت خلاصه از خروجی pipeline
    ///
    /// در مرتب‌سازی نزولی اولین رکورد جدیدترین روزه؛ پس مرزها
    /// به ترتیب تقویم برگردونده میشن.
    #[must_use]
    pub fn from_window(record: AggregateRecord) -> Self {
        let (start, end) = if record.start_date <= record.end_date {
            (record.start_date, record.end_date)
        } else {
            (record.end_date, record.start_date)
        };

        Self {
            start_date: format_date(start),
            end_date: format_date(end),
            count_total: record.count_total,
            uniques_total: record.uniques_total,
        }
    }
}

/// داده‌های یک نوع ترافیک در پاسخ
///
/// `untagged`: در JSON فقط آرایه دیده میشه
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrafficSeries {
    Daily(Vec<TrafficPoint>),
    Summary(Vec<TrafficSummary>),
}

impl TrafficSeries {
    /// شکل‌دهی لیست روزانه
    #[must_use]
    pub fn daily(records: Vec<TrafficRecord>) -> Self {
        Self::Daily(records.into_iter().map(TrafficPoint::from).collect())
    }

    /// شکل‌دهی خلاصه (برای مجموعه خالی، لیست خالی)
    #[must_use]
    pub fn summary(record: Option<AggregateRecord>) -> Self {
        Self::Summary(record.into_iter().map(TrafficSummary::from_window).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Daily(points) => points.len(),
            Self::Summary(summaries) => summaries.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// فیلد `data` در پاسخ موفق
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficData {
    pub views_data: TrafficSeries,
    pub clones_data: TrafficSeries,
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_shape_keeps_only_public_fields() {
        let series = TrafficSeries::daily(vec![TrafficRecord::new(date(2024, 1, 2), 3, 1)]);

        assert_eq!(
            serde_json::to_value(&series).unwrap(),
            json!([{ "date": "2024-01-02", "count": 3, "uniques": 1 }])
        );
    }

    #[test]
    fn test_summary_ascending_keeps_bounds() {
        let summary = TrafficSummary::from_window(AggregateRecord {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 2),
            count_total: 8,
            uniques_total: 3,
        });

        assert_eq!(summary.start_date, "2024-01-01");
        assert_eq!(summary.end_date, "2024-01-02");
    }

    #[test]
    fn test_summary_descending_swaps_bounds() {
        // خروجی pipeline نزولی: اول جدیدترین روز
        let summary = TrafficSummary::from_window(AggregateRecord {
            start_date: date(2024, 1, 2),
            end_date: date(2024, 1, 1),
            count_total: 8,
            uniques_total: 3,
        });

        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({
                "startDate": "2024-01-01",
                "endDate": "2024-01-02",
                "countTotal": 8,
                "uniquesTotal": 3
            })
        );
    }

    #[test]
    fn test_empty_summary() {
        let series = TrafficSeries::summary(None);
        assert!(series.is_empty());
        assert_eq!(serde_json::to_value(&series).unwrap(), json!([]));
    }

    #[test]
    fn test_traffic_data_field_names() {
        let data = TrafficData {
            views_data: TrafficSeries::daily(Vec::new()),
            clones_data: TrafficSeries::summary(None),
        };

        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({ "viewsData": [], "clonesData": [] })
        );
    }
}
