//! # ماژول دیتابیس (Database Layer)
//!
//! هر ریپو دیتابیس جداگانه خودش رو داره و هر درخواست اتصال
//! خودش رو باز میکنه و در انتها میبنده. هیچ اتصالی بین درخواست‌ها
//! share نمیشه.
//!
//! ## مفاهیم Rust:
//! - **Traits**: تعریف interface برای driver دیتابیس
//! - **async_trait**: پشتیبانی از async در traits
//! - **Trait Objects**: `Box<dyn TrafficStore>` برای جایگزینی در تست
//!
//! ## الگوهای طراحی:
//! - Repository Pattern: `ViewsRepository` و `ClonesRepository` روی یک اتصال
//! - Connector: ساخت اتصال از روی آدرس

mod repository;

pub use repository::*;

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
    FromRow,
};
use tracing::debug;

use crate::{
    error::{AppError, Result},
    models::{AggregateRecord, Collection, SortDirection, TrafficRecord, WindowLimit},
};

// مسیر migration‌ها
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// تعداد اتصال‌های هر درخواست (یکی برای views، یکی برای clones)
const CONNECTIONS_PER_REQUEST: u32 = 2;

// =====================================
// Store Traits
// =====================================
/// اتصال باز شده به دیتابیس یک ریپو
///
/// # مفاهیم:
/// - `Send + Sync`: دو query همزمان روی یک اتصال اجرا میشن
/// - `close`: باید دقیقا یک بار صدا زده بشه
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrafficStore: Send + Sync {
    /// رکوردهای مرتب شده بر اساس تاریخ، حداکثر `limit` تا
    async fn list_sorted(
        &self,
        collection: Collection,
        limit: WindowLimit,
        direction: SortDirection,
    ) -> Result<Vec<TrafficRecord>>;

    /// مرتب‌سازی، محدود کردن و بعد جمع زدن
    ///
    /// برای مجموعه خالی `None` برمیگردونه.
    async fn aggregate_window(
        &self,
        collection: Collection,
        limit: WindowLimit,
        direction: SortDirection,
    ) -> Result<Option<AggregateRecord>>;

    /// بستن اتصال
    async fn close(&self);
}

/// سازنده اتصال از روی آدرس
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// باز کردن اتصال
    ///
    /// # Errors
    /// خطا برمیگردونه اگه دیتابیس در دسترس نباشه
    async fn connect(&self, url: &str) -> Result<Box<dyn TrafficStore>>;
}

// =====================================
// SQLite Connector
// =====================================
/// Connector برای دیتابیس‌های SQLite
///
/// دیتابیس ریپو باید از قبل وجود داشته باشه؛ فایل ناموجود
/// به عنوان خطای اتصال برمیگرده.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnector;

#[async_trait]
impl StoreConnector for SqliteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn TrafficStore>> {
        let options = SqliteConnectOptions::from_str(url)?;

        // `connect_with` یک اتصال واقعی باز میکنه، پس خطا همینجا دیده میشه
        let pool = SqlitePoolOptions::new()
            .max_connections(CONNECTIONS_PER_REQUEST)
            .min_connections(0)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        Ok(Box::new(SqliteTrafficStore::new(pool)))
    }
}

/// ساخت دیتابیس ریپو و اجرای migration‌ها
///
/// فقط برای ابزارهای عملیاتی و تست؛ مسیر خواندن HTTP هیچوقت دیتابیس نمیسازه.
///
/// # Errors
/// خطا برمیگردونه اگه فایل ساخته نشه یا migration fail بشه
pub async fn provision_store(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;
    Ok(pool)
}

// =====================================
// SQLite Store
// =====================================
/// اتصال یک درخواست به دیتابیس SQLite یک ریپو
#[derive(Debug, Clone)]
pub struct SqliteTrafficStore {
    pool: SqlitePool,
}

/// ردیف خام تجمیع؛ برای مجموعه خالی تاریخ‌ها NULL هستن
#[derive(Debug, FromRow)]
struct WindowRow {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    count_total: i64,
    uniques_total: i64,
    record_count: i64,
}

impl SqliteTrafficStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrafficStore for SqliteTrafficStore {
    async fn list_sorted(
        &self,
        collection: Collection,
        limit: WindowLimit,
        direction: SortDirection,
    ) -> Result<Vec<TrafficRecord>> {
        // اسم جدول و جهت از enum میان، پس format! امنه
        let sql = format!(
            r#"SELECT date, "count", uniques FROM {table} ORDER BY date {dir} LIMIT ?"#,
            table = collection.table(),
            dir = direction.as_sql(),
        );

        let records = sqlx::query_as::<_, TrafficRecord>(&sql)
            .bind(limit.as_sql_limit())
            .fetch_all(&self.pool)
            .await?;

        debug!(%collection, rows = records.len(), "Listed traffic records");
        Ok(records)
    }

    async fn aggregate_window(
        &self,
        collection: Collection,
        limit: WindowLimit,
        direction: SortDirection,
    ) -> Result<Option<AggregateRecord>> {
        // ترتیب مراحل مهمه: sort، بعد limit، بعد group
        let sql = format!(
            r#"
            WITH windowed AS (
                SELECT date, "count", uniques
                FROM {table}
                ORDER BY date {dir}
                LIMIT ?
            ),
            ordered AS (
                SELECT date, "count", uniques,
                       ROW_NUMBER() OVER (ORDER BY date {dir}) AS position
                FROM windowed
            )
            SELECT
                (SELECT date FROM ordered ORDER BY position ASC LIMIT 1) AS start_date,
                (SELECT date FROM ordered ORDER BY position DESC LIMIT 1) AS end_date,
                COALESCE(SUM("count"), 0) AS count_total,
                COALESCE(SUM(uniques), 0) AS uniques_total,
                COUNT(*) AS record_count
            FROM ordered
            "#,
            table = collection.table(),
            dir = direction.as_sql(),
        );

        let row = sqlx::query_as::<_, WindowRow>(&sql)
            .bind(limit.as_sql_limit())
            .fetch_one(&self.pool)
            .await?;

        debug!(%collection, rows = row.record_count, "Aggregated traffic window");

        if row.record_count == 0 {
            return Ok(None);
        }

        match (row.start_date, row.end_date) {
            (Some(start_date), Some(end_date)) => Ok(Some(AggregateRecord {
                start_date,
                end_date,
                count_total: row.count_total,
                uniques_total: row.uniques_total,
            })),
            _ => Err(AppError::Query(format!(
                "aggregate over {collection} returned rows without dates"
            ))),
        }
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
