use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;

use subscription_api::infra::{
    app::create_app,
    config::AppConfig,
    error::InfraError,
    postgres_persistence,
    setup::{init_app_state, init_tracing},
    shutdown::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(config.app_env);
    info!(env = %config.app_env, "Starting subscription API");

    let persistence = Arc::new(postgres_persistence(&config).await?);

    let bind_addr = config.bind_addr;
    let app = create_app(init_app_state(config, persistence.clone()));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(InfraError::TcpBind)?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InfraError::Server)?;

    persistence.pool().close().await;
    info!("Server stopped");

    Ok(())
}
