use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::month_year::MonthYear;

/// A subscription as stored, addressed by its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub id: i64,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<MonthYear>,
}

impl Subscription {
    /// Whether the subscription covers `today`: started on or before it and
    /// either open-ended or ending after it.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.start_date.first_day() <= today
            && self.end_date.is_none_or(|end| end.first_day() > today)
    }
}

/// A validated subscription that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    pub end_date: Option<MonthYear>,
}

/// The fields a partial update may overwrite. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionChanges {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub end_date: Option<MonthYear>,
}

impl SubscriptionChanges {
    pub fn is_empty(&self) -> bool {
        self.service_name.is_none() && self.price.is_none() && self.end_date.is_none()
    }
}

/// Filter for the cost aggregation. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostQuery {
    pub service_name: String,
    pub user_id: Uuid,
    pub start: MonthYear,
    pub end: MonthYear,
}

impl CostQuery {
    /// Whether `sub` contributes to the total: same user and service, started
    /// within the window, and ended within it or still open.
    pub fn matches(&self, sub: &Subscription) -> bool {
        sub.user_id == self.user_id
            && sub.service_name == self.service_name
            && sub.start_date >= self.start
            && sub.start_date <= self.end
            && sub.end_date.is_none_or(|end| end <= self.end)
    }
}
