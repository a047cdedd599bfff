//! Client configuration: environment profiles, env-var overrides and YAML files.

use crate::client::policy::RetryConfig;
use crate::client::validation::UploadLimits;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Deployment profile the client is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Profile selected by `APP_ENV`; debug builds default to development.
    ///
    /// An unrecognized value is logged and the build default is used.
    pub fn current() -> Self {
        Self::try_current().unwrap_or_else(|e| {
            warn!(variable = "APP_ENV", error = %e, "ignoring unknown environment");
            Self::build_default()
        })
    }

    /// Like [`Environment::current`], but an unrecognized `APP_ENV` is an error.
    pub fn try_current() -> Result<Self> {
        Self::resolve(std::env::var("APP_ENV").ok().as_deref())
    }

    fn resolve(app_env: Option<&str>) -> Result<Self> {
        match app_env {
            Some(raw) if !raw.trim().is_empty() => raw.parse(),
            _ => Ok(Self::build_default()),
        }
    }

    fn build_default() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Development => "http://localhost:8080",
            Environment::Staging => "https://staging-api.englishapp.com",
            Environment::Production => "https://api.englishapp.com",
        }
    }

    /// Longer timeout for development and debugging sessions.
    pub fn default_request_timeout(&self) -> Duration {
        match self {
            Environment::Development => Duration::from_secs(30),
            Environment::Staging | Environment::Production => Duration::from_secs(15),
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(Error::configuration_with_context(
                format!("unknown environment '{}'", other),
                ErrorContext::new()
                    .with_field_path("APP_ENV")
                    .with_details("expected development, staging or production")
                    .with_source("config"),
            )),
        }
    }
}

/// Everything needed to construct an [`crate::ApiClient`].
///
/// Immutable once the client is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    /// Time allowed for response headers to arrive.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Total time allowed for one attempt including the body; twice the
    /// request timeout when unset.
    #[serde(default)]
    pub resource_timeout_ms: Option<u64>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub upload: UploadLimits,
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_pool_max_idle_per_host() -> usize {
    32
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_ms: default_request_timeout_ms(),
            resource_timeout_ms: None,
            retry: RetryConfig::default(),
            upload: UploadLimits::default(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            user_agent: None,
        }
    }

    pub fn for_environment(env: Environment) -> Self {
        let base_url = match env {
            Environment::Development => std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| env.default_base_url().to_string()),
            _ => env.default_base_url().to_string(),
        };
        Self::new(base_url).with_request_timeout(env.default_request_timeout())
    }

    /// Profile from `APP_ENV`, then overrides from the process environment:
    /// `API_BASE_URL`, `API_REQUEST_TIMEOUT_SECS`, `API_RESOURCE_TIMEOUT_SECS`,
    /// `API_RETRY_LIMIT`. An unknown `APP_ENV` is a configuration error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::for_environment(Environment::try_current()?);

        if let Ok(url) = std::env::var("API_BASE_URL") {
            config.base_url = url;
        }
        if let Some(secs) = env_parse::<u64>("API_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_ms = secs.saturating_mul(1000);
        }
        if let Some(secs) = env_parse::<u64>("API_RESOURCE_TIMEOUT_SECS") {
            config.resource_timeout_ms = Some(secs.saturating_mul(1000));
        }
        if let Some(limit) = env_parse::<u32>("API_RETRY_LIMIT") {
            config.retry.retry_limit = limit;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid client config: {}", e),
                ErrorContext::new().with_source("config_yaml"),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub async fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config_yaml"),
            )
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_resource_timeout(mut self, timeout: Duration) -> Self {
        self.resource_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_upload_limits(mut self, upload: UploadLimits) -> Self {
        self.upload = upload;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn resource_timeout(&self) -> Duration {
        Duration::from_millis(
            self.resource_timeout_ms
                .unwrap_or_else(|| self.request_timeout_ms.saturating_mul(2)),
        )
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL '{}': {}", self.base_url, e),
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_source("config_validator"),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(Error::configuration_with_context(
                format!("base URL must be an http(s) URL with a host, got '{}'", self.base_url),
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_source("config_validator"),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::configuration_with_context(
                "request timeout must be greater than zero",
                ErrorContext::new()
                    .with_field_path("config.request_timeout_ms")
                    .with_source("config_validator"),
            ));
        }
        if self.resource_timeout() < self.request_timeout() {
            return Err(Error::configuration_with_context(
                "resource timeout must not be shorter than the request timeout",
                ErrorContext::new()
                    .with_field_path("config.resource_timeout_ms")
                    .with_details(format!(
                        "request={}ms resource={}ms",
                        self.request_timeout_ms,
                        self.resource_timeout().as_millis()
                    ))
                    .with_source("config_validator"),
            ));
        }
        self.retry.validate()
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(variable = name, value = raw.as_str(), "ignoring unparsable override");
            None
        }
    }
}
