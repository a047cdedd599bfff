use crate::client::core::ApiClient;
use crate::client::execution::Executor;
use crate::client::policy::{RetryConfig, RetryPolicy, RetryStrategy};
use crate::client::validation::{UploadLimits, UploadValidator};
use crate::config::{ClientConfig, Environment};
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Builder for creating clients with custom configuration.
///
/// Starts from the production profile unless a config or base URL is given.
pub struct ApiClientBuilder {
    config: ClientConfig,
    /// Override base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
    strategy: Option<Arc<dyn RetryStrategy>>,
    cancel: Option<CancellationToken>,
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::for_environment(Environment::Production),
            base_url_override: None,
            strategy: None,
            cancel: None,
        }
    }

    /// Replace the whole configuration; later setters still apply on top.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn environment(mut self, env: Environment) -> Self {
        self.config = ClientConfig::for_environment(env);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_request_timeout(timeout);
        self
    }

    pub fn resource_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_resource_timeout(timeout);
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config = self.config.with_retry(retry);
        self
    }

    pub fn upload_limits(mut self, limits: UploadLimits) -> Self {
        self.config = self.config.with_upload_limits(limits);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    /// Replace the default [`RetryPolicy`]; the `retry` config is then only validated.
    pub fn retry_strategy(mut self, strategy: Arc<dyn RetryStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient> {
        let mut config = self.config;
        if let Some(url) = self.base_url_override {
            config.base_url = url;
        }

        let transport = Arc::new(HttpTransport::new(&config)?);
        let strategy = self
            .strategy
            .unwrap_or_else(|| Arc::new(RetryPolicy::new(config.retry.clone())));
        let validator = Arc::new(UploadValidator::new(config.upload.clone()));

        debug!(
            base_url = config.base_url.as_str(),
            request_timeout_ms = config.request_timeout_ms,
            retry_limit = config.retry.retry_limit,
            "api client built"
        );

        Ok(ApiClient {
            config: Arc::new(config),
            executor: Executor::new(transport, strategy),
            validator,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
