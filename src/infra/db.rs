use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{info, warn};

use crate::infra::{config::AppConfig, error::InfraError};

/// Connects to Postgres, retrying a bounded number of times, then applies
/// pending migrations.
pub async fn init_db(config: &AppConfig) -> Result<PgPool, InfraError> {
    let pool = connect_with_retry(config).await?;
    info!("Connected to database!");

    sqlx::migrate!().run(&pool).await?;
    info!("Migrations applied");

    Ok(pool)
}

// sqlx keeps retrying a refused connection until its acquire timeout (30s by
// default), so each attempt is capped here instead.
async fn connect_with_retry(config: &AppConfig) -> Result<PgPool, InfraError> {
    let options = PgPoolOptions::new().max_connections(config.db_max_connections);

    let mut retries = 0;
    loop {
        let attempt = tokio::time::timeout(
            config.db_connect_timeout,
            options
                .clone()
                .connect(config.database_url.expose_secret()),
        )
        .await
        .unwrap_or_else(|_elapsed| Err(sqlx::Error::PoolTimedOut));

        match attempt {
            Ok(pool) => return Ok(pool),
            Err(err) if retries < config.db_connect_retries => {
                retries += 1;
                warn!(
                    retry = retries,
                    of = config.db_connect_retries,
                    error = %err,
                    "Postgres not reachable, retrying"
                );
                tokio::time::sleep(config.db_retry_delay).await;
            }
            Err(err) => return Err(InfraError::DatabaseConnection(err)),
        }
    }
}
