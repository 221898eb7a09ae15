//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` creates an `AppState` backed by an in-memory
//! subscription repo (or any repo you hand it).

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::subscription::{SubscriptionRepo, SubscriptionUseCases},
    domain::entities::subscription::Subscription,
    infra::config::{AppConfig, AppEnv},
    test_utils::InMemorySubscriptionRepo,
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let sub = create_test_subscription(|s| s.price = 100);
///
/// let (app_state, repo) = TestAppStateBuilder::new()
///     .with_subscription(sub)
///     .build_with_repo();
/// ```
pub struct TestAppStateBuilder {
    subscriptions: Vec<Subscription>,
    repo: Option<Arc<dyn SubscriptionRepo>>,
    request_timeout: Duration,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            subscriptions: vec![],
            repo: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Seed a subscription into the default in-memory repo.
    pub fn with_subscription(mut self, sub: Subscription) -> Self {
        self.subscriptions.push(sub);
        self
    }

    pub fn with_subscriptions(mut self, subs: Vec<Subscription>) -> Self {
        self.subscriptions.extend(subs);
        self
    }

    /// Replace the in-memory repo (e.g. with a failing one). Seeded
    /// subscriptions are ignored.
    pub fn with_repo(mut self, repo: Arc<dyn SubscriptionRepo>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build with the in-memory repo and return it for assertions.
    pub fn build_with_repo(self) -> (AppState, Arc<InMemorySubscriptionRepo>) {
        let repo = Arc::new(InMemorySubscriptionRepo::with_subscriptions(
            self.subscriptions,
        ));
        let app_state = Self {
            subscriptions: vec![],
            repo: Some(repo.clone()),
            request_timeout: self.request_timeout,
        }
        .build();
        (app_state, repo)
    }

    pub fn build(self) -> AppState {
        let repo: Arc<dyn SubscriptionRepo> = match self.repo {
            Some(repo) => repo,
            None => Arc::new(InMemorySubscriptionRepo::with_subscriptions(
                self.subscriptions,
            )),
        };

        let config = Arc::new(AppConfig {
            app_env: AppEnv::Local,
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            database_url: SecretString::new("postgres://test".into()),
            db_max_connections: 1,
            db_connect_retries: 0,
            db_retry_delay: Duration::from_secs(0),
            db_connect_timeout: Duration::from_secs(1),
            request_timeout: self.request_timeout,
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
        });

        AppState {
            config,
            subscription_use_cases: Arc::new(SubscriptionUseCases::new(repo)),
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
