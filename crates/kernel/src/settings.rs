use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSHELF_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSHELF_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSHELF";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay
    /// and `BOOKSHELF__*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let cfg = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings = Self::from_config(cfg)?;
        settings.environment = Environment::parse(&environment)?;

        Ok(settings)
    }

    /// Deserialize settings from an already assembled configuration.
    pub fn from_config(cfg: config::Config) -> anyhow::Result<Self> {
        cfg.try_deserialize()
            .with_context(|| "failed to deserialize configuration")
    }

    /// Reject settings the process cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            bail!("auth.jwt_secret must be set (BOOKSHELF__AUTH__JWT_SECRET)");
        }
        if self.cache.ttl_secs == 0 {
            bail!("cache.ttl_secs must be greater than zero");
        }
        Ok(())
    }
}

/// Bounds for [`load_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Run `load` until it succeeds or `policy.max_attempts` is reached.
///
/// The closure receives the 1-based attempt number. When every attempt fails
/// the last error is returned, annotated with the number of attempts made.
pub fn load_with_retry<T, F>(policy: RetryPolicy, mut load: F) -> anyhow::Result<T>
where
    F: FnMut(u32) -> anyhow::Result<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    let mut last_error = None;

    while attempt < max_attempts {
        attempt += 1;
        match load(attempt) {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "configuration loaded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                tracing::warn!(attempt, max_attempts, error = %err, "configuration load failed");
                last_error = Some(err);
                if attempt < max_attempts && !policy.delay.is_zero() {
                    std::thread::sleep(policy.delay);
                }
            }
        }
    }

    let err = last_error.unwrap_or_else(|| anyhow!("configuration loader never ran"));
    Err(err.context(format!(
        "failed to load configuration after {} attempts",
        max_attempts
    )))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Book-list cache backend.
///
/// With `enabled = false` the process keeps an in-memory cache, which is
/// enough for a single instance.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "CacheSettings::default_url")]
    pub url: String,
    #[serde(default = "CacheSettings::default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "CacheSettings::default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "CacheSettings::default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "CacheSettings::default_invalidate_timeout_ms")]
    pub invalidate_timeout_ms: u64,
}

impl CacheSettings {
    fn default_url() -> String {
        "redis://127.0.0.1:6379".to_string()
    }

    fn default_pool_size() -> usize {
        8
    }

    fn default_timeout_ms() -> u64 {
        250
    }

    fn default_ttl_secs() -> u64 {
        60
    }

    fn default_invalidate_timeout_ms() -> u64 {
        300
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn invalidate_timeout(&self) -> Duration {
        Duration::from_millis(self.invalidate_timeout_ms)
    }

    /// Deadline for one cache read or write, and for taking a pooled
    /// connection.
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            url: Self::default_url(),
            pool_size: Self::default_pool_size(),
            timeout_ms: Self::default_timeout_ms(),
            ttl_secs: Self::default_ttl_secs(),
            invalidate_timeout_ms: Self::default_invalidate_timeout_ms(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct AuthSettings {
    /// HMAC secret used to sign session tokens.
    #[serde(default)]
    pub jwt_secret: String,
    /// Where the cookie guard sends unauthenticated browsers.
    #[serde(default = "AuthSettings::default_login_path")]
    pub login_path: String,
}

impl AuthSettings {
    fn default_login_path() -> String {
        "/login".to_string()
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            login_path: Self::default_login_path(),
        }
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("login_path", &self.login_path)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_log_level")]
    pub log_level: String,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: Self::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn from_toml(source: &str) -> anyhow::Result<Settings> {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Settings::from_config(cfg)
    }

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_cache_matches_book_list_contract() {
        let settings = Settings::default();
        assert_eq!(settings.cache.ttl(), Duration::from_secs(60));
        assert_eq!(settings.cache.invalidate_timeout(), Duration::from_millis(300));
        assert_eq!(settings.cache.op_timeout(), Duration::from_millis(250));
        assert!(!settings.cache.enabled);
    }

    #[test]
    fn missing_secret_fails_validation() {
        let settings = Settings::default();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));
    }

    #[test]
    fn toml_sections_override_defaults() {
        let settings = from_toml(
            r#"
            [server]
            port = 9090

            [cache]
            enabled = true
            url = "redis://cache:6379"

            [auth]
            jwt_secret = "s3cret"

            [telemetry]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.url, "redis://cache:6379");
        assert_eq!(settings.cache.ttl_secs, 60);
        assert_eq!(settings.telemetry.log_format, LogFormat::Json);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn debug_output_hides_secret() {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "do-not-print".to_string();
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("do-not-print"));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(Environment::parse("qa").is_err());
        assert_eq!(Environment::parse("staging").unwrap(), Environment::Staging);
    }

    #[test]
    fn retry_returns_first_success() {
        let calls = Cell::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        };

        let value = load_with_retry(policy, |attempt| {
            calls.set(calls.get() + 1);
            if attempt < 2 {
                Err(anyhow!("transient"))
            } else {
                Ok(attempt)
            }
        })
        .unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn retry_stops_at_bound_with_last_error() {
        let calls = Cell::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        };

        let err = load_with_retry::<(), _>(policy, |attempt| {
            calls.set(calls.get() + 1);
            Err(anyhow!("attempt {} failed", attempt))
        })
        .unwrap_err();

        assert_eq!(calls.get(), 3);
        let chain = format!("{:#}", err);
        assert!(chain.contains("after 3 attempts"));
        assert!(chain.contains("attempt 3 failed"));
    }

    #[test]
    fn retry_runs_at_least_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            delay: Duration::ZERO,
        };
        assert_eq!(load_with_retry(policy, |_| Ok(7)).unwrap(), 7);
    }
}
