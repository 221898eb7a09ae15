use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db};

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod setup;
pub mod shutdown;

pub async fn postgres_persistence(
    config: &config::AppConfig,
) -> Result<PostgresPersistence, error::InfraError> {
    let pool = init_db(config).await?;
    Ok(PostgresPersistence::new(pool))
}
