//! In-memory mock implementations of `SubscriptionRepo`.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::subscription::SubscriptionRepo,
    domain::entities::{
        month_year::MonthYear,
        subscription::{CostQuery, NewSubscription, Subscription, SubscriptionChanges},
    },
};

/// In-memory implementation of `SubscriptionRepo` for testing.
///
/// Rows are keyed by id, so `get_all` and `list` come back in id order like
/// the Postgres implementation.
#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    pub subscriptions: Mutex<BTreeMap<i64, Subscription>>,
    next_id: Mutex<i64>,
    start_dates_missing: bool,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo. New rows get ids after the highest seeded one.
    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        let map: BTreeMap<i64, Subscription> =
            subscriptions.into_iter().map(|s| (s.id, s)).collect();
        let next_id = map.keys().next_back().copied().unwrap_or(0);
        Self {
            subscriptions: Mutex::new(map),
            next_id: Mutex::new(next_id),
            start_dates_missing: false,
        }
    }

    /// Makes `get_start_date` report nothing, as if the row vanished between
    /// the existence check and the read.
    pub fn without_start_dates(mut self) -> Self {
        self.start_dates_missing = true;
        self
    }

    /// Get all subscriptions ordered by id (for test assertions).
    pub fn get_all(&self) -> Vec<Subscription> {
        self.subscriptions.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn create(&self, sub: &NewSubscription) -> AppResult<Subscription> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;

        let stored = Subscription {
            id: *next_id,
            service_name: sub.service_name.clone(),
            price: sub.price,
            user_id: sub.user_id,
            start_date: sub.start_date,
            end_date: sub.end_date,
        };
        self.subscriptions
            .lock()
            .unwrap()
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Subscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn update(&self, id: i64, changes: &SubscriptionChanges) -> AppResult<Subscription> {
        if changes.is_empty() {
            return Err(AppError::NothingToUpdate);
        }

        let mut subscriptions = self.subscriptions.lock().unwrap();
        let sub = subscriptions.get_mut(&id).ok_or(AppError::NotFound)?;

        if let Some(service_name) = &changes.service_name {
            sub.service_name = service_name.clone();
        }
        if let Some(price) = changes.price {
            sub.price = price;
        }
        if let Some(end_date) = changes.end_date {
            sub.end_date = Some(end_date);
        }

        Ok(sub.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.subscriptions
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }

    async fn list(&self, user_id: Uuid, service_name: &str) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id && s.service_name == service_name)
            .cloned()
            .collect())
    }

    async fn total_cost(&self, query: &CostQuery) -> AppResult<i64> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| query.matches(s))
            .map(|s| i64::from(s.price))
            .sum())
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.subscriptions.lock().unwrap().contains_key(&id))
    }

    async fn has_active(
        &self,
        user_id: Uuid,
        service_name: &str,
        today: NaiveDate,
    ) -> AppResult<bool> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .any(|s| {
                s.user_id == user_id && s.service_name == service_name && s.is_active_on(today)
            }))
    }

    async fn get_start_date(&self, id: i64) -> AppResult<Option<MonthYear>> {
        if self.start_dates_missing {
            return Ok(None);
        }
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .get(&id)
            .map(|s| s.start_date))
    }
}

/// Repo whose every call fails like an unreachable database.
pub struct FailingSubscriptionRepo;

fn unavailable<T>() -> AppResult<T> {
    Err(AppError::Database("storage unavailable".into()))
}

#[async_trait]
impl SubscriptionRepo for FailingSubscriptionRepo {
    async fn create(&self, _sub: &NewSubscription) -> AppResult<Subscription> {
        unavailable()
    }

    async fn get_by_id(&self, _id: i64) -> AppResult<Subscription> {
        unavailable()
    }

    async fn update(&self, _id: i64, _changes: &SubscriptionChanges) -> AppResult<Subscription> {
        unavailable()
    }

    async fn delete(&self, _id: i64) -> AppResult<()> {
        unavailable()
    }

    async fn list(&self, _user_id: Uuid, _service_name: &str) -> AppResult<Vec<Subscription>> {
        unavailable()
    }

    async fn total_cost(&self, _query: &CostQuery) -> AppResult<i64> {
        unavailable()
    }

    async fn exists(&self, _id: i64) -> AppResult<bool> {
        unavailable()
    }

    async fn has_active(
        &self,
        _user_id: Uuid,
        _service_name: &str,
        _today: NaiveDate,
    ) -> AppResult<bool> {
        unavailable()
    }

    async fn get_start_date(&self, _id: i64) -> AppResult<Option<MonthYear>> {
        unavailable()
    }
}

/// Repo whose every call hangs, for exercising request timeouts.
pub struct StalledSubscriptionRepo;

async fn stall<T>() -> AppResult<T> {
    std::future::pending().await
}

#[async_trait]
impl SubscriptionRepo for StalledSubscriptionRepo {
    async fn create(&self, _sub: &NewSubscription) -> AppResult<Subscription> {
        stall().await
    }

    async fn get_by_id(&self, _id: i64) -> AppResult<Subscription> {
        stall().await
    }

    async fn update(&self, _id: i64, _changes: &SubscriptionChanges) -> AppResult<Subscription> {
        stall().await
    }

    async fn delete(&self, _id: i64) -> AppResult<()> {
        stall().await
    }

    async fn list(&self, _user_id: Uuid, _service_name: &str) -> AppResult<Vec<Subscription>> {
        stall().await
    }

    async fn total_cost(&self, _query: &CostQuery) -> AppResult<i64> {
        stall().await
    }

    async fn exists(&self, _id: i64) -> AppResult<bool> {
        stall().await
    }

    async fn has_active(
        &self,
        _user_id: Uuid,
        _service_name: &str,
        _today: NaiveDate,
    ) -> AppResult<bool> {
        stall().await
    }

    async fn get_start_date(&self, _id: i64) -> AppResult<Option<MonthYear>> {
        stall().await
    }
}
