use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    adapters::http::{
        app_state::AppState,
        params::{CostParams, ListParams, parse_subscription_id},
    },
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{CreateSubscriptionInput, UpdateSubscriptionInput},
    domain::entities::{month_year::MonthYear, subscription::Subscription},
};

#[derive(Serialize)]
struct ListResponse {
    subscriptions: Vec<Subscription>,
    total: usize,
}

#[derive(Serialize)]
struct CostResponse {
    service_name: String,
    start_period: MonthYear,
    end_period: MonthYear,
    total_cost: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions",
            post(create_subscription).get(list_subscriptions),
        )
        .route("/subscriptions/cost", get(subscriptions_cost))
        .route(
            "/subscriptions/{id}",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
}

async fn create_subscription(
    State(app_state): State<AppState>,
    body: Result<Json<CreateSubscriptionInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input = json_body(body)?;

    let sub = app_state
        .subscription_use_cases
        .create_subscription(input)
        .await?;

    Ok((StatusCode::CREATED, Json(sub)))
}

async fn get_subscription(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_subscription_id(&id)?;
    let sub = app_state.subscription_use_cases.get_subscription(id).await?;
    Ok(Json(sub))
}

async fn update_subscription(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateSubscriptionInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let id = parse_subscription_id(&id)?;
    let input = json_body(body)?;

    let sub = app_state
        .subscription_use_cases
        .update_subscription(id, input)
        .await?;

    Ok((StatusCode::OK, Json(sub)))
}

async fn delete_subscription(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_subscription_id(&id)?;
    app_state
        .subscription_use_cases
        .delete_subscription(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_subscriptions(
    State(app_state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let (user_id, service_name) = params.into_filter()?;

    let subscriptions = app_state
        .subscription_use_cases
        .list_subscriptions(user_id, &service_name)
        .await?;

    Ok(Json(ListResponse {
        total: subscriptions.len(),
        subscriptions,
    }))
}

async fn subscriptions_cost(
    State(app_state): State<AppState>,
    Query(params): Query<CostParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.into_query()?;

    let total_cost = app_state.subscription_use_cases.total_cost(&query).await?;

    Ok(Json(CostResponse {
        service_name: query.service_name,
        start_period: query.start,
        end_period: query.end,
        total_cost,
    }))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(input)| input)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}
