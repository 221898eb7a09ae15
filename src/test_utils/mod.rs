//! Test utilities for HTTP and use case tests.
//!
//! This module provides:
//! - Test data factories for creating valid fixtures
//! - In-memory repository implementations standing in for Postgres
//! - A builder for `AppState` wired to those repositories

mod app_state_builder;
mod subscription_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use subscription_mocks::*;
