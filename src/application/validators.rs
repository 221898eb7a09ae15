use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{CreateSubscriptionInput, UpdateSubscriptionInput},
    domain::entities::{
        month_year::MonthYear,
        subscription::{NewSubscription, SubscriptionChanges},
    },
};

/// Boolean form of [`validate_subscription`], for callers that only need a
/// yes/no answer. The create path uses `validate_subscription` directly.
pub fn is_valid_subscription(input: &CreateSubscriptionInput) -> bool {
    validate_subscription(input).is_ok()
}

/// Validates a subscription payload: non-empty service name, positive price,
/// a parseable user UUID and start period, and, when an end period is given,
/// an end strictly after the start. Returns the typed subscription or the
/// first rule that failed.
pub fn validate_subscription(input: &CreateSubscriptionInput) -> AppResult<NewSubscription> {
    let service_name = input.service_name.trim();
    if service_name.is_empty() {
        return Err(AppError::InvalidInput("service_name is required".into()));
    }
    if input.price <= 0 {
        return Err(AppError::InvalidInput("price must be positive".into()));
    }

    let user_id = parse_user_id(&input.user_id)?;
    let start_date = parse_month_year("start_date", &input.start_date)?;

    let end_date = match input.end_date.as_deref() {
        None | Some("") => None,
        Some(raw) => {
            let end = parse_month_year("end_date", raw)?;
            if end <= start_date {
                return Err(AppError::InvalidInput(
                    "end_date must be after start_date".into(),
                ));
            }
            Some(end)
        }
    };

    Ok(NewSubscription {
        service_name: service_name.to_string(),
        price: input.price,
        user_id,
        start_date,
        end_date,
    })
}

/// Collapses a partial payload into the fields that will actually be written:
/// a non-empty service name, a positive price, a non-empty end period.
///
/// A negative price is rejected outright; zero means "not supplied".
pub fn collect_changes(input: &UpdateSubscriptionInput) -> AppResult<SubscriptionChanges> {
    let price = match input.price {
        Some(price) if price < 0 => {
            return Err(AppError::InvalidInput("price cannot be negative".into()));
        }
        Some(price) if price > 0 => Some(price),
        _ => None,
    };

    let service_name = input
        .service_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let end_date = match input.end_date.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_month_year("end_date", raw)?),
    };

    Ok(SubscriptionChanges {
        service_name,
        price,
        end_date,
    })
}

pub fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    if raw.is_empty() {
        return Err(AppError::InvalidInput("user_id is required".into()));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput("user_id must be a valid UUID".into()))
}

pub fn parse_month_year(field: &str, raw: &str) -> AppResult<MonthYear> {
    if raw.is_empty() {
        return Err(AppError::InvalidInput(format!("{field} is required")));
    }
    raw.parse()
        .map_err(|_| AppError::InvalidInput(format!("{field} must be in MM-YYYY format")))
}
