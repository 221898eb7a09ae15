use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{http::app_state::AppState, persistence::PostgresPersistence},
    application::use_cases::subscription::{SubscriptionRepo, SubscriptionUseCases},
    infra::config::{AppConfig, AppEnv},
};

pub fn init_app_state(config: AppConfig, persistence: Arc<PostgresPersistence>) -> AppState {
    let subscription_repo = persistence as Arc<dyn SubscriptionRepo>;

    AppState {
        config: Arc::new(config),
        subscription_use_cases: Arc::new(SubscriptionUseCases::new(subscription_repo)),
    }
}

fn default_filter(env: AppEnv) -> &'static str {
    match env {
        AppEnv::Local | AppEnv::Dev => "subscription_api=debug,tower_http=debug",
        AppEnv::Prod => "subscription_api=info,tower_http=info",
    }
}

/// Pretty console output locally, JSON lines everywhere else. `RUST_LOG`
/// overrides the level.
pub fn init_tracing(env: AppEnv) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(env).into());

    let console_layer = (env == AppEnv::Local).then(|| {
        fmt::layer()
            .with_target(false)
            .with_level(true)
            .pretty()
    });

    let json_layer = (env != AppEnv::Local).then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
