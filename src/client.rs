//! # Client Module
//!
//! The request path of the API client, bottom-up:
//!
//! | Module | Role |
//! |--------|------|
//! | `validation` | Local pre-flight checks for uploads |
//! | `endpoint` | Typed request descriptors |
//! | `policy` | Retry decisions from an outcome and attempt number |
//! | `execution` | The attempt loop with backoff and cancellation |
//! | `decode` | Success and error envelopes into typed results |
//! | `core` | The [`ApiClient`] facade |

pub mod builder;
pub mod core;
pub mod decode;
pub mod endpoint;
pub mod execution;
pub mod policy;
pub mod validation;

pub use builder::ApiClientBuilder;
pub use core::ApiClient;
pub use endpoint::{Endpoint, RequestBody, RequestSpec};
pub use execution::{CallStats, Executor};
pub use policy::{Decision, Jitter, Outcome, RetryConfig, RetryPolicy, RetryStrategy};
pub use validation::{
    FileFacts, FileStat, LocalFs, UploadDescriptor, UploadLimits, UploadValidator,
    ValidatedUpload,
};
