use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::validators::{collect_changes, validate_subscription},
    domain::entities::{
        month_year::MonthYear,
        subscription::{CostQuery, NewSubscription, Subscription, SubscriptionChanges},
    },
};

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn create(&self, sub: &NewSubscription) -> AppResult<Subscription>;

    async fn get_by_id(&self, id: i64) -> AppResult<Subscription>;

    /// Applies only the supplied fields. Fails with `NothingToUpdate` when
    /// `changes` is empty.
    async fn update(&self, id: i64, changes: &SubscriptionChanges) -> AppResult<Subscription>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    async fn list(&self, user_id: Uuid, service_name: &str) -> AppResult<Vec<Subscription>>;

    async fn total_cost(&self, query: &CostQuery) -> AppResult<i64>;

    async fn exists(&self, id: i64) -> AppResult<bool>;

    /// Whether `user_id` already holds a subscription to `service_name` that
    /// covers `today`.
    async fn has_active(&self, user_id: Uuid, service_name: &str, today: NaiveDate)
    -> AppResult<bool>;

    async fn get_start_date(&self, id: i64) -> AppResult<Option<MonthYear>>;
}

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSubscriptionInput {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub price: i32,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Partial update payload. `user_id` and `start_date` are not updatable and
/// are ignored if sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubscriptionInput {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub end_date: Option<String>,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct SubscriptionUseCases {
    repo: Arc<dyn SubscriptionRepo>,
}

impl SubscriptionUseCases {
    pub fn new(repo: Arc<dyn SubscriptionRepo>) -> Self {
        Self { repo }
    }

    /// Rejects the payload if invalid, or with a conflict if the user already
    /// has an active subscription to the same service. Nothing is written in
    /// either case.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, service_name = %input.service_name))]
    pub async fn create_subscription(
        &self,
        input: CreateSubscriptionInput,
    ) -> AppResult<Subscription> {
        let new_sub = validate_subscription(&input)?;

        let today = Utc::now().date_naive();
        if self
            .repo
            .has_active(new_sub.user_id, &new_sub.service_name, today)
            .await?
        {
            return Err(AppError::Conflict("subscription already active".into()));
        }

        let sub = self.repo.create(&new_sub).await?;
        tracing::info!(id = sub.id, "Subscription created");
        Ok(sub)
    }

    #[instrument(skip(self))]
    pub async fn get_subscription(&self, id: i64) -> AppResult<Subscription> {
        self.ensure_exists(id).await?;
        self.repo.get_by_id(id).await
    }

    /// Merges the supplied fields into the stored subscription. An end period,
    /// if given, must fall strictly after the start period currently stored.
    #[instrument(skip(self, input))]
    pub async fn update_subscription(
        &self,
        id: i64,
        input: UpdateSubscriptionInput,
    ) -> AppResult<Subscription> {
        self.ensure_exists(id).await?;

        let changes = collect_changes(&input)?;

        if let Some(end_date) = changes.end_date {
            // The row can disappear between the existence check and this read.
            let start_date = self
                .repo
                .get_start_date(id)
                .await?
                .ok_or(AppError::NotFound)?;
            if end_date <= start_date {
                return Err(AppError::InvalidInput(
                    "end_date must be after start_date".into(),
                ));
            }
        }

        let sub = self.repo.update(id, &changes).await?;
        tracing::info!("Subscription updated");
        Ok(sub)
    }

    #[instrument(skip(self))]
    pub async fn delete_subscription(&self, id: i64) -> AppResult<()> {
        self.ensure_exists(id).await?;
        self.repo.delete(id).await?;
        tracing::info!("Subscription deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_subscriptions(
        &self,
        user_id: Uuid,
        service_name: &str,
    ) -> AppResult<Vec<Subscription>> {
        self.repo.list(user_id, service_name).await
    }

    #[instrument(skip(self))]
    pub async fn total_cost(&self, query: &CostQuery) -> AppResult<i64> {
        self.repo.total_cost(query).await
    }

    async fn ensure_exists(&self, id: i64) -> AppResult<()> {
        if !self.repo.exists(id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
