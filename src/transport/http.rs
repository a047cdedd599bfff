use crate::client::endpoint::{RequestBody, RequestSpec};
use crate::client::validation::ValidatedUpload;
use crate::config::ClientConfig;
use crate::transport::{TransportError, TransportErrorKind};
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Upload progress callback; receives the sent fraction in `[0.0, 1.0]`.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// One HTTP response, fully read. The executor never looks inside `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
    /// Server-assigned request id, if the response carried one.
    pub upstream_request_id: Option<String>,
}

impl RawResponse {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self {
            status,
            body,
            upstream_request_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Pooled HTTP transport shared by every call of one client.
///
/// Two timeouts bound each attempt: `request_timeout` for the response headers
/// and the client-wide `resource_timeout` for the whole exchange including the body.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    resource_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .timeout(config.resource_timeout())
            .connect_timeout(config.request_timeout())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                format!("failed to create HTTP client: {}", e),
                ErrorContext::new().with_source("http_transport"),
            )
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
            resource_timeout: config.resource_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn resource_timeout(&self) -> Duration {
        self.resource_timeout
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issue a single attempt and read the full body.
    ///
    /// Uploads are bounded by the resource timeout only: sending a large body
    /// legitimately takes longer than waiting for headers.
    pub async fn send(
        &self,
        spec: &RequestSpec,
        progress: Option<ProgressFn>,
        client_request_id: &str,
    ) -> std::result::Result<RawResponse, TransportError> {
        let url = self.url_for(&spec.path);
        let mut req = self
            .client
            .request(spec.method.clone(), &url)
            .header("accept", "application/json")
            .header("x-client-request-id", client_request_id);

        if !spec.query.is_empty() {
            req = req.query(&spec.query);
        }

        req = match &spec.body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(value),
            RequestBody::Multipart(upload) => req.multipart(multipart_form(upload, progress).await?),
        };

        let resp = if spec.is_upload() {
            req.send().await?
        } else {
            match tokio::time::timeout(self.request_timeout, req.send()).await {
                Ok(sent) => sent?,
                Err(_) => {
                    return Err(TransportError::timeout(format!(
                        "no response headers from {} within {:?}",
                        spec.path, self.request_timeout
                    )))
                }
            }
        };

        let status = resp.status().as_u16();
        let upstream_request_id = header_first(resp.headers(), &["x-request-id", "request-id"]);
        let body = resp.bytes().await?;

        Ok(RawResponse {
            status,
            body,
            upstream_request_id,
        })
    }
}

/// Build a fresh multipart form; the file is reopened and streamed on every call.
async fn multipart_form(
    upload: &ValidatedUpload,
    progress: Option<ProgressFn>,
) -> std::result::Result<Form, TransportError> {
    let descriptor = upload.descriptor();
    let file = tokio::fs::File::open(&descriptor.path).await.map_err(|e| {
        TransportError::new(
            TransportErrorKind::Other,
            format!(
                "upload source {} unavailable: {}",
                descriptor.path.display(),
                e
            ),
        )
    })?;

    let total = upload.size();
    if total == 0 {
        if let Some(cb) = &progress {
            cb(1.0);
        }
    }

    let mut sent: u64 = 0;
    let mut last_reported_decile = 0u64;
    let path = descriptor.path.clone();
    let chunks = ReaderStream::new(file).map(move |chunk| {
        if let Ok(bytes) = &chunk {
            sent = sent.saturating_add(bytes.len() as u64);
            let fraction = if total == 0 {
                1.0
            } else {
                (sent as f64 / total as f64).min(1.0)
            };
            if let Some(cb) = &progress {
                cb(fraction);
            }
            let decile = (fraction * 10.0) as u64;
            if decile > last_reported_decile {
                last_reported_decile = decile;
                debug!(path = %path.display(), percent = decile * 10, "upload progress");
            }
        }
        chunk
    });

    let part = Part::stream_with_length(reqwest::Body::wrap_stream(chunks), total)
        .file_name(descriptor.file_name.clone())
        .mime_str(&descriptor.mime_type)
        .map_err(TransportError::from)?;

    let mut form = Form::new().part(descriptor.field_name.clone(), part);
    for (name, value) in &descriptor.fields {
        form = form.text(name.clone(), value.clone());
    }
    Ok(form)
}

/// Extract the first non-empty header value from a list of header names.
fn header_first(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    for name in names {
        if let Some(v) = headers.get(*name) {
            if let Ok(s) = v.to_str() {
                let s = s.trim();
                if !s.is_empty() {
                    return Some(s.to_string());
                }
            }
        }
    }
    None
}
