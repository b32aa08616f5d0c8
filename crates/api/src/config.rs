use std::str::FromStr;
use std::time::Duration;

use webs_core::reconnect::ReconnectPolicy;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL and the JWT key have defaults
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds for non-streaming requests (default: `30`).
    pub request_timeout_secs: u64,
    /// Workflow engine connection settings.
    pub mastra: MastraConfig,
    /// TTL of entries in the in-memory run registry (default: `3600`).
    pub run_registry_ttl_secs: u64,
    /// Shared secret for `x-mastra-signature`. Unsigned webhooks are
    /// accepted when unset.
    pub webhook_secret: Option<String>,
    /// Session token verification.
    pub jwt: JwtConfig,
}

/// Settings for talking to the remote workflow engine.
#[derive(Debug, Clone)]
pub struct MastraConfig {
    /// Base URL, e.g. `http://localhost:4111`.
    pub base_url: String,
    /// Bound on trigger calls and on opening the watch stream.
    pub timeout: Duration,
    /// The watch stream is considered dead if no record arrives within this window.
    pub stream_idle_timeout: Duration,
    /// Reconnect policy shared by every relay connection.
    pub reconnect: ReconnectPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `HOST`                           | `0.0.0.0`               |
    /// | `PORT`                           | `3000`                  |
    /// | `CORS_ORIGINS`                   | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                    |
    /// | `NEXT_PUBLIC_AI_URL` / `MASTRA_URL` | `http://localhost:4111` |
    /// | `MASTRA_TIMEOUT_SECS`            | `30`                    |
    /// | `STREAM_IDLE_TIMEOUT_SECS`       | `120`                   |
    /// | `STREAM_RECONNECT_DELAY_MS`      | `3000`                  |
    /// | `STREAM_RECONNECT_MAX_ATTEMPTS`  | `5`                     |
    /// | `RUN_REGISTRY_TTL_SECS`          | `3600`                  |
    /// | `MASTRA_WEBHOOK_SECRET`          | unset                   |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable does not parse.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_parse("PORT", 3000);

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", 30);

        let base_url = std::env::var("NEXT_PUBLIC_AI_URL")
            .or_else(|_| std::env::var("MASTRA_URL"))
            .unwrap_or_else(|_| "http://localhost:4111".into());

        let mastra = MastraConfig {
            base_url,
            timeout: Duration::from_secs(env_parse("MASTRA_TIMEOUT_SECS", 30)),
            stream_idle_timeout: Duration::from_secs(env_parse("STREAM_IDLE_TIMEOUT_SECS", 120)),
            reconnect: ReconnectPolicy::new(
                Duration::from_millis(env_parse("STREAM_RECONNECT_DELAY_MS", 3000)),
                env_parse("STREAM_RECONNECT_MAX_ATTEMPTS", 5),
            ),
        };

        let run_registry_ttl_secs: u64 = env_parse("RUN_REGISTRY_TTL_SECS", 3600);

        let webhook_secret = std::env::var("MASTRA_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());
        if webhook_secret.is_none() {
            tracing::warn!("MASTRA_WEBHOOK_SECRET is not set; webhook signatures will not be checked");
        }

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            mastra,
            run_registry_ttl_secs,
            webhook_secret,
            jwt,
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset.
fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid {}: {e}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
