use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder, Row, Transaction};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription::SubscriptionRepo,
    domain::entities::{
        month_year::MonthYear,
        subscription::{CostQuery, NewSubscription, Subscription, SubscriptionChanges},
    },
};

const SELECT_COLS: &str = "id, service_name, price, user_id, start_date, end_date";

fn row_to_subscription(row: sqlx::postgres::PgRow) -> Subscription {
    let start_date: NaiveDate = row.get("start_date");
    let end_date: Option<NaiveDate> = row.get("end_date");
    Subscription {
        id: row.get("id"),
        service_name: row.get("service_name"),
        price: row.get("price"),
        user_id: row.get("user_id"),
        start_date: MonthYear::from_date(start_date),
        end_date: end_date.map(MonthYear::from_date),
    }
}

/// Builds `UPDATE ... SET` over the supplied fields only.
/// Returns `None` when there is nothing to set.
fn build_update_query(
    id: i64,
    changes: &SubscriptionChanges,
) -> Option<QueryBuilder<'static, Postgres>> {
    if changes.is_empty() {
        return None;
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE subscriptions SET ");
    {
        let mut set = builder.separated(", ");
        if let Some(service_name) = &changes.service_name {
            set.push("service_name = ")
                .push_bind_unseparated(service_name.clone());
        }
        if let Some(price) = changes.price {
            set.push("price = ").push_bind_unseparated(price);
        }
        if let Some(end_date) = changes.end_date {
            set.push("end_date = ")
                .push_bind_unseparated(end_date.first_day());
        }
    }
    builder.push(" WHERE id = ").push_bind(id);
    builder.push(format!(" RETURNING {SELECT_COLS}"));

    Some(builder)
}

async fn begin(
    persistence: &PostgresPersistence,
    op: &'static str,
) -> AppResult<Transaction<'static, Postgres>> {
    persistence.pool.begin().await.map_err(|err| {
        tracing::error!(op, error = %err, "failed to begin transaction");
        AppError::from(err)
    })
}

// Dropping an uncommitted transaction rolls it back, so early returns need no cleanup.
async fn commit(tx: Transaction<'static, Postgres>, op: &'static str) -> AppResult<()> {
    tx.commit().await.map_err(|err| {
        tracing::error!(op, error = %err, "failed to commit transaction");
        AppError::from(err)
    })
}

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn create(&self, sub: &NewSubscription) -> AppResult<Subscription> {
        let mut tx = begin(self, "subscription.create").await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SELECT_COLS}
            "#
        ))
        .bind(&sub.service_name)
        .bind(sub.price)
        .bind(sub.user_id)
        .bind(sub.start_date.first_day())
        .bind(sub.end_date.map(|d| d.first_day()))
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        commit(tx, "subscription.create").await?;
        Ok(row_to_subscription(row))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Subscription> {
        let mut tx = begin(self, "subscription.get_by_id").await?;

        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM subscriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        commit(tx, "subscription.get_by_id").await?;
        Ok(row_to_subscription(row))
    }

    async fn update(&self, id: i64, changes: &SubscriptionChanges) -> AppResult<Subscription> {
        let Some(mut builder) = build_update_query(id, changes) else {
            return Err(AppError::NothingToUpdate);
        };

        let mut tx = begin(self, "subscription.update").await?;

        let row = builder
            .build()
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::NotFound)?;

        commit(tx, "subscription.update").await?;
        Ok(row_to_subscription(row))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = begin(self, "subscription.delete").await?;

        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        commit(tx, "subscription.delete").await
    }

    async fn list(&self, user_id: Uuid, service_name: &str) -> AppResult<Vec<Subscription>> {
        let mut tx = begin(self, "subscription.list").await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_COLS}
            FROM subscriptions
            WHERE user_id = $1 AND service_name = $2
            ORDER BY id ASC
            "#
        ))
        .bind(user_id)
        .bind(service_name)
        .fetch_all(&mut *tx)
        .await
        .map_err(AppError::from)?;

        commit(tx, "subscription.list").await?;
        Ok(rows.into_iter().map(row_to_subscription).collect())
    }

    async fn total_cost(&self, query: &CostQuery) -> AppResult<i64> {
        let mut tx = begin(self, "subscription.total_cost").await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(price), 0)::BIGINT
            FROM subscriptions
            WHERE user_id = $1
              AND service_name = $2
              AND start_date >= $3
              AND start_date <= $4
              AND (end_date IS NULL OR end_date <= $4)
            "#,
        )
        .bind(query.user_id)
        .bind(&query.service_name)
        .bind(query.start.first_day())
        .bind(query.end.first_day())
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        commit(tx, "subscription.total_cost").await?;
        Ok(total)
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        let mut tx = begin(self, "subscription.exists").await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subscriptions WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::from)?;

        commit(tx, "subscription.exists").await?;
        Ok(exists)
    }

    async fn has_active(
        &self,
        user_id: Uuid,
        service_name: &str,
        today: NaiveDate,
    ) -> AppResult<bool> {
        let mut tx = begin(self, "subscription.has_active").await?;

        let active: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM subscriptions
                WHERE user_id = $1
                  AND service_name = $2
                  AND start_date <= $3
                  AND (end_date IS NULL OR end_date > $3)
            )
            "#,
        )
        .bind(user_id)
        .bind(service_name)
        .bind(today)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        commit(tx, "subscription.has_active").await?;
        Ok(active)
    }

    async fn get_start_date(&self, id: i64) -> AppResult<Option<MonthYear>> {
        let mut tx = begin(self, "subscription.get_start_date").await?;

        let start: Option<NaiveDate> =
            sqlx::query_scalar("SELECT start_date FROM subscriptions WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::from)?;

        commit(tx, "subscription.get_start_date").await?;
        Ok(start.map(MonthYear::from_date))
    }
}
