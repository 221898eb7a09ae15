use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;

/// Deployment flavour; selects the log format and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Local,
    Dev,
    Prod,
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(AppEnv::Local),
            "dev" => Ok(AppEnv::Dev),
            "prod" => Ok(AppEnv::Prod),
            other => Err(format!("unknown APP_ENV '{other}' (expected local, dev or prod)")),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnv::Local => "local",
            AppEnv::Dev => "dev",
            AppEnv::Prod => "prod",
        };
        f.write_str(s)
    }
}

pub struct AppConfig {
    pub app_env: AppEnv,
    pub bind_addr: SocketAddr,
    pub database_url: SecretString,
    pub db_max_connections: u32,
    /// Extra connection attempts after the first one fails.
    pub db_connect_retries: u32,
    pub db_retry_delay: Duration,
    /// Upper bound on a single connection attempt.
    pub db_connect_timeout: Duration,
    pub request_timeout: Duration,
    pub cors_origin: HeaderValue,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let app_env: AppEnv = get_env_default("APP_ENV", String::from("local"))
            .parse()
            .expect("APP_ENV must be one of local, dev, prod");

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "0.0.0.0:8080".parse().unwrap());
        let database_url = SecretString::new(get_env::<String>("DATABASE_URL").into());
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);
        let db_connect_retries: u32 = get_env_default("DB_CONNECT_RETRIES", 3);
        let db_retry_delay_secs: u64 = get_env_default("DB_RETRY_DELAY_SECS", 1);
        let db_connect_timeout_secs: u64 = get_env_default("DB_CONNECT_TIMEOUT_SECS", 1);
        let request_timeout_secs: u64 = get_env_default("REQUEST_TIMEOUT_SECS", 10);
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        Self {
            app_env,
            bind_addr,
            database_url,
            db_max_connections,
            db_connect_retries,
            db_retry_delay: Duration::from_secs(db_retry_delay_secs),
            db_connect_timeout: Duration::from_secs(db_connect_timeout_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
            cors_origin,
        }
    }
}
