//! Path and query parameter extraction.
//!
//! Query fields are all optional at the serde level so that a missing
//! parameter becomes an `INVALID_INPUT` response with a useful message
//! instead of a bare extractor rejection.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::validators::{parse_month_year, parse_user_id},
    domain::entities::subscription::CostQuery,
};

pub fn parse_subscription_id(raw: &str) -> AppResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 0 => Ok(id),
        _ => Err(AppError::InvalidInput("invalid subscription ID".into())),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

impl ListParams {
    pub fn into_filter(self) -> AppResult<(Uuid, String)> {
        let user_id = parse_user_id(self.user_id.as_deref().unwrap_or_default())?;
        let service_name = required("service_name", self.service_name)?;
        Ok((user_id, service_name))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CostParams {
    pub service_name: Option<String>,
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl CostParams {
    pub fn into_query(self) -> AppResult<CostQuery> {
        let service_name = required("service_name", self.service_name)?;
        let user_id = parse_user_id(self.user_id.as_deref().unwrap_or_default())?;
        let start = parse_month_year("start_date", self.start_date.as_deref().unwrap_or_default())?;
        let end = parse_month_year("end_date", self.end_date.as_deref().unwrap_or_default())?;

        Ok(CostQuery {
            service_name,
            user_id,
            start,
            end,
        })
    }
}

// Trimmed the same way create trims service names, so filters match stored rows.
fn required(field: &str, value: Option<String>) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("{field} is required")))
}
