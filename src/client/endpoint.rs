//! Endpoint descriptors: what to send and which payload type to expect back.

use crate::client::validation::ValidatedUpload;
use crate::{Error, ErrorContext, Result};
use reqwest::Method;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// Request body variants understood by the transport.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// Streamed from disk on every attempt; only constructible from a validated upload.
    Multipart(ValidatedUpload),
}

/// Untyped half of an endpoint: everything the transport needs to issue one attempt.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestSpec {
    pub fn is_upload(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

impl fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A call site's request plus the type its `data` payload decodes into.
///
/// The error envelope is fixed for the whole backend (`{"error": {"code", "message"}}`).
pub struct Endpoint<T> {
    spec: RequestSpec,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Endpoint<T> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            spec: RequestSpec {
                method,
                path: path.into(),
                query: Vec::new(),
                body: RequestBody::Empty,
            },
            _payload: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Multipart POST to the upload's destination route.
    pub fn upload(upload: ValidatedUpload) -> Self {
        let mut endpoint = Self::post(upload.descriptor().route.clone());
        endpoint.spec.body = RequestBody::Multipart(upload);
        endpoint
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.spec.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            Error::configuration_with_context(
                format!("request body is not serializable: {}", e),
                ErrorContext::new()
                    .with_field_path(self.spec.path.clone())
                    .with_source("endpoint"),
            )
        })?;
        self.spec.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("spec", &self.spec)
            .field("payload", &std::any::type_name::<T>())
            .finish()
    }
}
