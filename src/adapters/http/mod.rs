pub mod app_error_impl;
pub mod app_state;
pub mod params;
pub mod routes;
