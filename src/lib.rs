//! # englishapp-api
//!
//! Typed, resilient HTTP client for the EnglishApp speaking-practice backend.
//!
//! ## Overview
//!
//! Every remote operation goes through the same path: an optional local upload
//! check, a bounded retry loop around single transport attempts, and decoding of
//! the `{"data": ...}` / `{"error": {"code", "message"}}` envelopes into typed
//! results. Callers see either a payload or one [`Error`] variant, never a panic.
//!
//! ## Key Features
//!
//! - **Facade**: [`ApiClient`] exposes one async method per backend operation
//! - **Retry policy**: pure, swappable [`client::RetryStrategy`] with exponential backoff
//! - **Uploads**: pre-flight validation and streamed multipart with progress callbacks
//! - **Cancellation**: scoped handles via [`ApiClient::with_cancellation`]
//! - **Configuration**: environment profiles, env-var overrides and YAML via [`config`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use englishapp_api::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> englishapp_api::Result<()> {
//!     let client = ApiClient::builder()
//!         .base_url("https://api.englishapp.com")
//!         .build()?;
//!
//!     for topic in client.list_topics().await? {
//!         println!("{}: {}", topic.id, topic.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Facade, retry policy, executor, decoder and upload validation |
//! | [`transport`] | Pooled reqwest transport and transport error classification |
//! | [`config`] | Client configuration and environment profiles |
//! | [`types`] | Backend payload models |
//! | [`session`] | Credential store and recorded-answer lookup |
//! | [`error`] | The unified error type |

pub mod client;
pub mod config;
pub mod session;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{ApiClient, ApiClientBuilder, CallStats, Endpoint};
pub use config::{ClientConfig, Environment};
pub use transport::{ProgressFn, TransportError, TransportErrorKind};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{ApiError, Error, ErrorContext};
