//! # سرویس ترافیک
//!
//! مراحل هر درخواست:
//! validate → connect → query → shape → release
//!
//! ## مفاهیم Rust:
//! - `tokio::try_join!`: اجرای همزمان query‌های views و clones
//! - `tokio::time::timeout_at`: یک deadline برای کل درخواست
//! - بستن اتصال در همه مسیرها بعد از باز شدنش

use std::{collections::HashSet, sync::Arc};

use tokio::time::{timeout_at, Instant};
use tracing::{error, info, instrument, warn};

use crate::{
    config::Config,
    database::{ClonesRepository, StoreConnector, TrafficStore, ViewsRepository},
    error::{AppError, Result},
    models::{QueryMode, TrafficData, TrafficOptions, TrafficSeries},
};

// =====================================
// Traffic Service
// =====================================
/// سرویس خواندن ترافیک ریپوها
///
/// # مسئولیت‌ها:
/// - بررسی اسم ریپو با لیست مجاز
/// - باز کردن اتصال مخصوص همین درخواست
/// - اجرای query خام یا تجمیعی
/// - بستن اتصال، حتی در صورت خطا یا timeout
pub struct TrafficService {
    connector: Arc<dyn StoreConnector>,
    config: Arc<Config>,
    known_repos: HashSet<String>,
}

impl TrafficService {
    /// ساخت سرویس جدید
    #[must_use]
    pub fn new(connector: Arc<dyn StoreConnector>, config: Arc<Config>) -> Self {
        let known_repos = config.repo_allowlist();

        Self {
            connector,
            config,
            known_repos,
        }
    }

    /// تعداد ریپوهای مجاز
    #[must_use]
    pub fn known_repo_count(&self) -> usize {
        self.known_repos.len()
    }

    /// گرفتن ترافیک یک ریپو
    ///
    /// # Errors
    /// - `BadRequest`: اسم ریپو خالی
    /// - `UnknownRepository`: ریپو در لیست مجاز نیست
    /// - `DataStoreUnavailable`: اتصال برقرار نشد
    /// - `Query` / `Database`: خطای query
    /// - `Timeout`: درخواست از سقف زمان گذشت
    #[instrument(skip(self, options))]
    pub async fn get_traffic(&self, repo: &str, options: TrafficOptions) -> Result<TrafficData> {
        // Step 1: اعتبارسنجی
        if repo.is_empty() {
            return Err(AppError::empty_repo());
        }

        if !self.known_repos.contains(repo) {
            warn!("Rejected unknown repo");
            return Err(AppError::UnknownRepository(repo.to_string()));
        }

        info!(
            days = %options.limit,
            aggregate = options.mode.is_aggregate(),
            sort = options.direction.sign(),
            "Fetching repo traffic"
        );

        let timeout = self.config.request_timeout();
        let deadline = Instant::now() + timeout;

        // Step 2: اتصال
        let url = self.config.connect_string_for(repo);
        let store = match timeout_at(deadline, self.connector.connect(&url)).await {
            Ok(Ok(store)) => store,
            Ok(Err(e)) => {
                error!(error = %e, "Connecting store failed");
                return Err(AppError::DataStoreUnavailable {
                    repo: repo.to_string(),
                    cause: e.to_string(),
                });
            }
            Err(_) => return Err(AppError::Timeout(timeout.as_secs())),
        };
        info!("Connected store");

        // Step 3 و 4: query و شکل‌دهی
        let outcome = match timeout_at(deadline, fetch(store.as_ref(), options)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(timeout.as_secs())),
        };

        // Step 5: آزاد کردن اتصال در همه حالت‌ها
        store.close().await;
        info!("Store connection closed");

        if outcome.is_ok() {
            info!("Fetching repo traffic successful");
        }
        outcome
    }
}

/// اجرای query روی یک اتصال باز
async fn fetch(store: &dyn TrafficStore, options: TrafficOptions) -> Result<TrafficData> {
    let views = ViewsRepository::new(store);
    let clones = ClonesRepository::new(store);
    let TrafficOptions {
        limit,
        mode,
        direction,
    } = options;

    match mode {
        QueryMode::Raw => {
            let (views_data, clones_data) = tokio::try_join!(
                views.list_sorted(limit, direction),
                clones.list_sorted(limit, direction),
            )?;

            Ok(TrafficData {
                views_data: TrafficSeries::daily(views_data),
                clones_data: TrafficSeries::daily(clones_data),
            })
        }
        QueryMode::Aggregate => {
            let (views_window, clones_window) = tokio::try_join!(
                views.aggregate_window(limit, direction),
                clones.aggregate_window(limit, direction),
            )?;

            Ok(TrafficData {
                views_data: TrafficSeries::summary(views_window),
                clones_data: TrafficSeries::summary(clones_window),
            })
        }
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ConfigBuilder,
        database::{MockStoreConnector, MockTrafficStore},
        models::{
            AggregateRecord, Collection, SortDirection, TrafficPoint, TrafficRecord,
            TrafficSummary, WindowLimit,
        },
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> Arc<Config> {
        Arc::new(
            ConfigBuilder::new()
                .connect_string("sqlite://data/{database}.db")
                .known_repos(["site", "docs"])
                .request_timeout_secs(1)
                .build(),
        )
    }

    fn service_with(store: impl TrafficStore + 'static) -> TrafficService {
        let mut connector = MockStoreConnector::new();
        connector
            .expect_connect()
            .times(1)
            .return_once(move |_| Ok(Box::new(store)));

        TrafficService::new(Arc::new(connector), config())
    }

    // -------------------------------------
    // In-memory store
    // -------------------------------------
    /// store حافظه‌ای که مراحل pipeline رو مثل دیتابیس اجرا میکنه
    #[derive(Default)]
    struct MemoryStore {
        views: Vec<TrafficRecord>,
        clones: Vec<TrafficRecord>,
        closed: Arc<AtomicUsize>,
    }

    impl MemoryStore {
        fn window(
            &self,
            collection: Collection,
            limit: WindowLimit,
            direction: SortDirection,
        ) -> Vec<TrafficRecord> {
            let mut records = match collection {
                Collection::Views => self.views.clone(),
                Collection::Clones => self.clones.clone(),
            };
            records.sort_by_key(|r| r.date);
            if direction.is_descending() {
                records.reverse();
            }
            if !limit.is_unlimited() {
                records.truncate(limit.get() as usize);
            }
            records
        }
    }

    #[async_trait]
    impl TrafficStore for MemoryStore {
        async fn list_sorted(
            &self,
            collection: Collection,
            limit: WindowLimit,
            direction: SortDirection,
        ) -> Result<Vec<TrafficRecord>> {
            Ok(self.window(collection, limit, direction))
        }

        async fn aggregate_window(
            &self,
            collection: Collection,
            limit: WindowLimit,
            direction: SortDirection,
        ) -> Result<Option<AggregateRecord>> {
            let records = self.window(collection, limit, direction);
            let (Some(first), Some(last)) = (records.first(), records.last()) else {
                return Ok(None);
            };

            Ok(Some(AggregateRecord {
                start_date: first.date,
                end_date: last.date,
                count_total: records.iter().map(|r| r.count).sum(),
                uniques_total: records.iter().map(|r| r.uniques).sum(),
            }))
        }

        async fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// store که هیچوقت جواب نمیده
    struct StalledStore {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TrafficStore for StalledStore {
        async fn list_sorted(
            &self,
            _collection: Collection,
            _limit: WindowLimit,
            _direction: SortDirection,
        ) -> Result<Vec<TrafficRecord>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }

        async fn aggregate_window(
            &self,
            _collection: Collection,
            _limit: WindowLimit,
            _direction: SortDirection,
        ) -> Result<Option<AggregateRecord>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// connector که اتصال رو هیچوقت برقرار نمیکنه
    struct StalledConnector {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StoreConnector for StalledConnector {
        async fn connect(&self, _url: &str) -> Result<Box<dyn TrafficStore>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Box::new(MemoryStore {
                closed: self.closed.clone(),
                ..Default::default()
            }))
        }
    }

    fn fixture() -> Vec<TrafficRecord> {
        vec![
            TrafficRecord::new(date(2024, 1, 1), 5, 2),
            TrafficRecord::new(date(2024, 1, 2), 3, 1),
        ]
    }

    // -------------------------------------
    // Validation
    // -------------------------------------
    #[tokio::test]
    async fn test_empty_repo_is_bad_request() {
        let connector = MockStoreConnector::new();
        let service = TrafficService::new(Arc::new(connector), config());

        let err = service.get_traffic("", TrafficOptions::default()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_unknown_repo_never_connects() {
        // هیچ expect_connect ثبت نشده؛ صدا زدنش panic میکنه
        let connector = MockStoreConnector::new();
        let service = TrafficService::new(Arc::new(connector), config());

        let err = service
            .get_traffic("not-a-real-repo", TrafficOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnknownRepository(_)));
        assert!(err.to_string().contains("not-a-real-repo"));
    }

    // -------------------------------------
    // Connection lifecycle
    // -------------------------------------
    #[tokio::test]
    async fn test_connects_with_substituted_url() {
        let mut connector = MockStoreConnector::new();
        connector
            .expect_connect()
            .withf(|url| url.to_string() == "sqlite://data/docs.db")
            .times(1)
            .return_once(|_| Ok(Box::new(MemoryStore::default())));
        let service = TrafficService::new(Arc::new(connector), config());

        assert!(service.get_traffic("docs", TrafficOptions::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_failure_carries_cause() {
        let mut connector = MockStoreConnector::new();
        connector
            .expect_connect()
            .times(1)
            .return_once(|_| Err(AppError::Query("connection refused".to_string())));
        let service = TrafficService::new(Arc::new(connector), config());

        let err = service.get_traffic("site", TrafficOptions::default()).await.unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
        assert_eq!(
            err.to_string(),
            "Connect site failed with error: connection refused."
        );
    }

    #[tokio::test]
    async fn test_query_failure_still_closes_once() {
        let mut store = MockTrafficStore::new();
        store
            .expect_list_sorted()
            .returning(|_, _, _| Err(AppError::Query("no such table: views_data".to_string())));
        store.expect_close().times(1).return_const(());

        let service = service_with(store);
        let err = service.get_traffic("site", TrafficOptions::default()).await.unwrap_err();

        assert!(matches!(err, AppError::Query(ref m) if m.contains("views_data")));
    }

    #[tokio::test]
    async fn test_aggregate_failure_still_closes_once() {
        let mut store = MockTrafficStore::new();
        store
            .expect_aggregate_window()
            .returning(|_, _, _| Err(AppError::Query("no such table: clones_data".to_string())));
        store.expect_list_sorted().never();
        store.expect_close().times(1).return_const(());

        let service = service_with(store);
        let options = TrafficOptions::new(7, QueryMode::Aggregate, SortDirection::Ascending);
        let err = service.get_traffic("site", options).await.unwrap_err();

        assert!(matches!(err, AppError::Query(ref m) if m.contains("clones_data")));
        assert_eq!(err.empty_data(), serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_connect_timeout_never_closes() {
        let closed = Arc::new(AtomicUsize::new(0));
        let connector = StalledConnector {
            closed: closed.clone(),
        };
        let service = TrafficService::new(Arc::new(connector), config());

        let err = service.get_traffic("site", TrafficOptions::default()).await.unwrap_err();

        assert!(matches!(err, AppError::Timeout(1)));
        assert_eq!(err.status_code(), axum::http::StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(closed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_closes_once() {
        let closed = Arc::new(AtomicUsize::new(0));
        let store = MemoryStore {
            views: fixture(),
            clones: fixture(),
            closed: closed.clone(),
        };

        let service = service_with(store);
        service.get_traffic("site", TrafficOptions::default()).await.unwrap();

        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_closes_once() {
        let closed = Arc::new(AtomicUsize::new(0));
        let service = service_with(StalledStore {
            closed: closed.clone(),
        });

        let err = service.get_traffic("site", TrafficOptions::default()).await.unwrap_err();

        assert!(matches!(err, AppError::Timeout(1)));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    // -------------------------------------
    // Query shapes
    // -------------------------------------
    #[tokio::test]
    async fn test_raw_mode_shapes_points() {
        let store = MemoryStore {
            views: fixture(),
            ..Default::default()
        };
        let service = service_with(store);

        let data = service
            .get_traffic("site", TrafficOptions::new(1, QueryMode::Raw, SortDirection::Descending))
            .await
            .unwrap();

        assert_eq!(
            data.views_data,
            TrafficSeries::Daily(vec![TrafficPoint {
                date: "2024-01-02".to_string(),
                count: 3,
                uniques: 1,
            }])
        );
        assert!(data.clones_data.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_mode_bounds_are_chronological_in_both_directions() {
        let expected = TrafficSeries::Summary(vec![TrafficSummary {
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-02".to_string(),
            count_total: 8,
            uniques_total: 3,
        }]);

        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let store = MemoryStore {
                views: fixture(),
                clones: fixture(),
                ..Default::default()
            };
            let service = service_with(store);

            let data = service
                .get_traffic("site", TrafficOptions::new(0, QueryMode::Aggregate, direction))
                .await
                .unwrap();

            assert_eq!(data.views_data, expected);
            assert_eq!(data.clones_data, expected);
        }
    }

    proptest! {
        /// days و -days نتیجه یکسان دارن
        #[test]
        fn negative_days_match_positive(days in 1i64..6, aggregate: bool, ascending: bool) {
            let records: Vec<TrafficRecord> = (1..=4)
                .map(|d| TrafficRecord::new(date(2024, 2, d), i64::from(d), 1))
                .collect();
            let mode = if aggregate { QueryMode::Aggregate } else { QueryMode::Raw };
            let direction = if ascending { SortDirection::Ascending } else { SortDirection::Descending };

            let run = |days: i64| {
                let store = MemoryStore { views: records.clone(), clones: records.clone(), ..Default::default() };
                let service = service_with(store);
                tokio_test::block_on(service.get_traffic("site", TrafficOptions::new(days, mode, direction)))
                    .unwrap()
            };

            let positive = run(days);
            let negative = run(-days);

            prop_assert_eq!(&positive, &negative);
            if !aggregate {
                prop_assert!(positive.views_data.len() <= days as usize);
            }
        }
    }
}
