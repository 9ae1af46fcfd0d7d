//! # پارامترهای درخواست ترافیک
//!
//! ورودی‌های `days`، `aggregate` و `sort` هیچوقت درخواست رو رد نمیکنن؛
//! مقدار نامعتبر به پیش‌فرض برمیگرده و یک `ParseNote` ثبت میشه
//! تا در لاگ دیده بشه.

use serde::{Deserialize, Serialize};

use super::SortDirection;
use crate::utils;

// =====================================
// Window Limit
// =====================================
/// تعداد رکوردهای پنجره (`0` یعنی بدون محدودیت)
///
/// علامت `days` اهمیتی نداره، فقط قدر مطلقش استفاده میشه.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowLimit(u64);

impl WindowLimit {
    /// بدون محدودیت
    pub const UNLIMITED: Self = Self(0);

    /// ساخت از مقدار `days` (منفی هم قبوله)
    #[must_use]
    pub fn from_days(days: i64) -> Self {
        Self(days.unsigned_abs())
    }

    #[must_use]
    pub fn get(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.0 == 0
    }

    /// مقدار `LIMIT` در SQLite (`-1` یعنی بدون محدودیت)
    #[must_use]
    pub fn as_sql_limit(&self) -> i64 {
        if self.is_unlimited() {
            -1
        } else {
            i64::try_from(self.0).unwrap_or(i64::MAX)
        }
    }
}

impl std::fmt::Display for WindowLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unlimited() {
            f.write_str("all")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// =====================================
// Query Mode
// =====================================
/// شکل query: لیست روزانه یا خلاصه پنجره
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Raw,
    Aggregate,
}

impl QueryMode {
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Aggregate)
    }
}

// =====================================
// Raw Query String
// =====================================
/// query string خام درخواست
///
/// # Endpoint
/// `?aggregate=<true|false>&sort=<asc|desc>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrafficQuery {
    #[serde(default)]
    pub aggregate: Option<String>,

    #[serde(default)]
    pub sort: Option<String>,
}

// =====================================
// Parse Notes
// =====================================
/// مقداری که به پیش‌فرض برگشت یا فقط بخشیش استفاده شد
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNote {
    /// `days` عدد نبود، بدون محدودیت در نظر گرفته شد
    DaysNotNumeric(String),

    /// فقط عدد ابتدای `days` استفاده شد
    DaysTrailingText { raw: String, used: i64 },

    /// `sort` ناشناخته بود، `desc` در نظر گرفته شد
    UnknownSort(String),

    /// `aggregate` ناشناخته بود، `false` در نظر گرفته شد
    UnknownAggregate(String),
}

impl std::fmt::Display for ParseNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DaysNotNumeric(raw) => {
                write!(f, "days '{raw}' is not a number, returning all records")
            }
            Self::DaysTrailingText { raw, used } => {
                write!(f, "days '{raw}' has trailing text, using {used}")
            }
            Self::UnknownSort(raw) => write!(f, "sort '{raw}' is unknown, using desc"),
            Self::UnknownAggregate(raw) => {
                write!(f, "aggregate '{raw}' is not a boolean, using false")
            }
        }
    }
}

// =====================================
// Traffic Options
// =====================================
/// پارامترهای parse شده یک درخواست
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrafficOptions {
    pub limit: WindowLimit,
    pub mode: QueryMode,
    pub direction: SortDirection,
}

/// نتیجه parse به همراه یادداشت‌ها
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOptions {
    pub options: TrafficOptions,
    pub notes: Vec<ParseNote>,
}

impl TrafficOptions {
    /// ساخت مستقیم (برای تست و فراخوانی داخلی)
    #[must_use]
    pub fn new(days: i64, mode: QueryMode, direction: SortDirection) -> Self {
        Self {
            limit: WindowLimit::from_days(days),
            mode,
            direction,
        }
    }

    /// parse کردن `days` از مسیر و `aggregate`/`sort` از query string
    ///
    /// # مثال
    /// ```rust
    /// use repo_traffic::models::{QueryMode, RawTrafficQuery, SortDirection, TrafficOptions};
    ///
    /// let query = RawTrafficQuery { aggregate: Some("true".into()), sort: Some("asc".into()) };
    /// let parsed = TrafficOptions::parse(Some("-7"), &query);
    ///
    /// assert_eq!(parsed.options.limit.get(), 7);
    /// assert_eq!(parsed.options.mode, QueryMode::Aggregate);
    /// assert_eq!(parsed.options.direction, SortDirection::Ascending);
    /// assert!(parsed.notes.is_empty());
    /// ```
    #[must_use]
    pub fn parse(days: Option<&str>, query: &RawTrafficQuery) -> ParsedOptions {
        let mut notes = Vec::new();

        let days = days.map_or(0, |raw| parse_days(raw, &mut notes));
        let mode = parse_mode(query.aggregate.as_deref(), &mut notes);
        let direction = parse_direction(query.sort.as_deref(), &mut notes);

        ParsedOptions {
            options: Self::new(days, mode, direction),
            notes,
        }
    }
}

fn parse_days(raw: &str, notes: &mut Vec<ParseNote>) -> i64 {
    if let Ok(days) = raw.trim().parse::<i64>() {
        return days;
    }

    match utils::parse_leading_integer(raw) {
        Some(used) => {
            // عدد خیلی بزرگ هم اینجا میاد و محدود میشه
            if raw.trim().trim_start_matches(['+', '-']).chars().all(|c| c.is_ascii_digit()) {
                return used;
            }
            notes.push(ParseNote::DaysTrailingText {
                raw: raw.to_string(),
                used,
            });
            used
        }
        None => {
            notes.push(ParseNote::DaysNotNumeric(raw.to_string()));
            0
        }
    }
}

fn parse_mode(raw: Option<&str>, notes: &mut Vec<ParseNote>) -> QueryMode {
    match raw {
        Some("true") => QueryMode::Aggregate,
        None | Some("false") => QueryMode::Raw,
        Some(other) => {
            notes.push(ParseNote::UnknownAggregate(other.to_string()));
            QueryMode::Raw
        }
    }
}

fn parse_direction(raw: Option<&str>, notes: &mut Vec<ParseNote>) -> SortDirection {
    match raw {
        Some("asc") => SortDirection::Ascending,
        None | Some("desc") => SortDirection::Descending,
        Some(other) => {
            notes.push(ParseNote::UnknownSort(other.to_string()));
            SortDirection::Descending
        }
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn query(aggregate: Option<&str>, sort: Option<&str>) -> RawTrafficQuery {
        RawTrafficQuery {
            aggregate: aggregate.map(ToString::to_string),
            sort: sort.map(ToString::to_string),
        }
    }

    #[test]
    fn test_defaults() {
        let parsed = TrafficOptions::parse(None, &RawTrafficQuery::default());

        assert_eq!(parsed.options.limit, WindowLimit::UNLIMITED);
        assert_eq!(parsed.options.mode, QueryMode::Raw);
        assert_eq!(parsed.options.direction, SortDirection::Descending);
        assert!(parsed.notes.is_empty());
    }

    #[test]
    fn test_non_numeric_days_means_unlimited() {
        let parsed = TrafficOptions::parse(Some("week"), &RawTrafficQuery::default());

        assert!(parsed.options.limit.is_unlimited());
        assert_eq!(parsed.notes, vec![ParseNote::DaysNotNumeric("week".to_string())]);
    }

    #[test]
    fn test_days_with_trailing_text_uses_prefix() {
        let parsed = TrafficOptions::parse(Some("14d"), &RawTrafficQuery::default());

        assert_eq!(parsed.options.limit.get(), 14);
        assert_eq!(
            parsed.notes,
            vec![ParseNote::DaysTrailingText { raw: "14d".to_string(), used: 14 }]
        );
    }

    #[test]
    fn test_huge_days_saturates_without_note() {
        let parsed = TrafficOptions::parse(Some("123456789012345678901"), &RawTrafficQuery::default());

        assert_eq!(parsed.options.limit.get(), i64::MAX as u64);
        assert!(parsed.notes.is_empty());
    }

    #[test]
    fn test_unknown_sort_and_aggregate_fall_back() {
        let parsed = TrafficOptions::parse(None, &query(Some("yes"), Some("up")));

        assert_eq!(parsed.options.mode, QueryMode::Raw);
        assert_eq!(parsed.options.direction, SortDirection::Descending);
        assert_eq!(
            parsed.notes,
            vec![
                ParseNote::UnknownAggregate("yes".to_string()),
                ParseNote::UnknownSort("up".to_string()),
            ]
        );
    }

    #[test]
    fn test_aggregate_is_case_sensitive() {
        let parsed = TrafficOptions::parse(None, &query(Some("TRUE"), None));
        assert_eq!(parsed.options.mode, QueryMode::Raw);
    }

    #[test]
    fn test_sql_limit() {
        assert_eq!(WindowLimit::UNLIMITED.as_sql_limit(), -1);
        assert_eq!(WindowLimit::from_days(-3).as_sql_limit(), 3);
        assert_eq!(WindowLimit::from_days(i64::MIN).as_sql_limit(), i64::MAX);
    }

    proptest! {
        /// علامت days روی محدودیت اثری نداره
        #[test]
        fn negative_days_use_magnitude(days in 1i64..100_000) {
            let positive = TrafficOptions::parse(Some(days.to_string().as_str()), &RawTrafficQuery::default());
            let negative = TrafficOptions::parse(Some((-days).to_string().as_str()), &RawTrafficQuery::default());

            prop_assert_eq!(positive.options, negative.options);
            prop_assert_eq!(positive.options.limit.get(), days as u64);
        }

        /// هر مقدار sort به جز asc نزولی حساب میشه
        #[test]
        fn any_sort_but_asc_is_descending(sort in "[a-z]{0,6}") {
            let parsed = TrafficOptions::parse(None, &query(None, Some(sort.as_str())));
            let expected = if sort == "asc" { SortDirection::Ascending } else { SortDirection::Descending };
            prop_assert_eq!(parsed.options.direction, expected);
        }
    }
}
