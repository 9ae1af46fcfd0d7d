//! # ماژول توابع کمکی (Utilities)
//!
//! ## مفاهیم Rust:
//! - **once_cell**: مقداردهی اولیه تنبل
//! - **Regex**: عبارات منظم

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

// =====================================
// Constants
// =====================================
/// فرمت تاریخ در پاسخ‌ها
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =====================================
// Lazy Statics (Regex patterns)
// =====================================
/// عدد صحیح ابتدای رشته (مثل `12` در `12days`)
pub static LEADING_INTEGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?\d+)").expect("Invalid regex pattern")
});

/// الگوی تاریخ خروجی
pub static CALENDAR_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid regex pattern")
});

// =====================================
// Dates
// =====================================
/// تبدیل تاریخ به رشته `YYYY-MM-DD`
///
/// # مثال
/// ```rust
/// use chrono::NaiveDate;
/// use repo_traffic::utils::format_date;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// assert_eq!(format_date(date), "2024-01-02");
/// ```
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// آیا رشته یک تاریخ با فرمت خروجی هست؟
#[must_use]
pub fn is_calendar_date(text: &str) -> bool {
    CALENDAR_DATE.is_match(text) && NaiveDate::parse_from_str(text, DATE_FORMAT).is_ok()
}

// =====================================
// Integers
// =====================================
/// خوندن عدد صحیح از ابتدای رشته
///
/// اعداد خیلی بزرگ به `i64::MIN` / `i64::MAX` محدود میشن.
/// اگه رشته با عدد شروع نشه `None` برمیگرده.
#[must_use]
pub fn parse_leading_integer(text: &str) -> Option<i64> {
    let digits = LEADING_INTEGER.captures(text)?.get(1)?.as_str();

    match digits.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) if digits.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}
