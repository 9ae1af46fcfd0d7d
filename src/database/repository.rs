//! # Repository Pattern
//!
//! دو repository نوع‌دار روی یک اتصال: `ViewsRepository` و `ClonesRepository`.
//! منطق سرویس فقط با این دو کار میکنه و اسم جدول‌ها رو نمیدونه.
//!
//! ## مفاهیم Rust:
//! - **Lifetimes**: repository فقط اتصال رو قرض میگیره (`&'a dyn TrafficStore`)
//! - **Copy**: repository‌ها سبک هستن و کپی میشن

use super::TrafficStore;
use crate::{
    error::Result,
    models::{AggregateRecord, Collection, SortDirection, TrafficRecord, WindowLimit},
};

// =====================================
// Base Repository
// =====================================
/// دسترسی به یک collection ترافیک روی اتصال قرض گرفته شده
#[derive(Clone, Copy)]
struct CollectionRepository<'a> {
    store: &'a dyn TrafficStore,
    collection: Collection,
}

impl<'a> CollectionRepository<'a> {
    async fn list_sorted(
        &self,
        limit: WindowLimit,
        direction: SortDirection,
    ) -> Result<Vec<TrafficRecord>> {
        self.store.list_sorted(self.collection, limit, direction).await
    }

    async fn aggregate_window(
        &self,
        limit: WindowLimit,
        direction: SortDirection,
    ) -> Result<Option<AggregateRecord>> {
        self.store
            .aggregate_window(self.collection, limit, direction)
            .await
    }
}

// =====================================
// Views Repository
// =====================================
/// Repository بازدیدهای روزانه (`views_data`)
#[derive(Clone, Copy)]
pub struct ViewsRepository<'a> {
    inner: CollectionRepository<'a>,
}

impl<'a> ViewsRepository<'a> {
    #[must_use]
    pub fn new(store: &'a dyn TrafficStore) -> Self {
        Self {
            inner: CollectionRepository {
                store,
                collection: Collection::Views,
            },
        }
    }

    /// بازدیدهای روزانه مرتب شده
    pub async fn list_sorted(
        &self,
        limit: WindowLimit,
        direction: SortDirection,
    ) -> Result<Vec<TrafficRecord>> {
        self.inner.list_sorted(limit, direction).await
    }

    /// خلاصه بازدیدهای پنجره
    pub async fn aggregate_window(
        &self,
        limit: WindowLimit,
        direction: SortDirection,
    ) -> Result<Option<AggregateRecord>> {
        self.inner.aggregate_window(limit, direction).await
    }
}

// =====================================
// Clones Repository
// =====================================
/// Repository کلون‌های روزانه (`clones_data`)
#[derive(Clone, Copy)]
pub struct ClonesRepository<'a> {
    inner: CollectionRepository<'a>,
}

impl<'a> ClonesRepository<'a> {
    #[must_use]
    pub fn new(store: &'a dyn TrafficStore) -> Self {
        Self {
            inner: CollectionRepository {
                store,
                collection: Collection::Clones,
            },
        }
    }

    /// کلون‌های روزانه مرتب شده
    pub async fn list_sorted(
        &self,
        limit: WindowLimit,
        direction: SortDirection,
    ) -> Result<Vec<TrafficRecord>> {
        self.inner.list_sorted(limit, direction).await
    }

    /// خلاصه کلون‌های پنجره
    pub async fn aggregate_window(
        &self,
        limit: WindowLimit,
        direction: SortDirection,
    ) -> Result<Option<AggregateRecord>> {
        self.inner.aggregate_window(limit, direction).await
    }
}
