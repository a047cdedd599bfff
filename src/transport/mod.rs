//! HTTP transport: a pooled reqwest client plus the transport-level error taxonomy.

mod http;

pub use http::{HttpTransport, ProgressFn, RawResponse};

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Why no HTTP response reached the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// Per-request or total-resource timeout elapsed.
    Timeout,
    /// The device has no usable network.
    NoConnection,
    /// An established connection was reset or closed mid-exchange.
    ConnectionLost,
    /// The host refused or could not accept the connection.
    CannotConnectToHost,
    DnsLookupFailed,
    /// The caller cancelled the request.
    Cancelled,
    /// Any other transport failure; the underlying cause is kept as the error source.
    Other,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::NoConnection => "no_connection",
            Self::ConnectionLost => "connection_lost",
            Self::CannotConnectToHost => "cannot_connect_to_host",
            Self::DnsLookupFailed => "dns_lookup_failed",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct TransportError {
    kind: TransportErrorKind,
    detail: String,
    #[source]
    source: Option<reqwest::Error>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            source: None,
        }
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, detail)
    }

    pub fn cancelled() -> Self {
        Self::new(TransportErrorKind::Cancelled, "request cancelled by caller")
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            kind: classify(&err),
            detail: err.to_string(),
            source: Some(err),
        }
    }
}

/// Map a reqwest failure onto a transport kind by walking its source chain.
fn classify(err: &reqwest::Error) -> TransportErrorKind {
    if err.is_timeout() {
        return TransportErrorKind::Timeout;
    }

    let root: &(dyn StdError + 'static) = err;
    let chain = || std::iter::successors(Some(root), |e| (*e).source());
    let io_kind = chain().find_map(|e| e.downcast_ref::<io::Error>().map(|io| io.kind()));

    if err.is_connect() {
        let dns = chain().any(|e| {
            let msg = e.to_string().to_lowercase();
            msg.contains("dns error") || msg.contains("failed to lookup address")
        });
        if dns {
            return TransportErrorKind::DnsLookupFailed;
        }
        return match io_kind {
            Some(io::ErrorKind::NotConnected) => TransportErrorKind::NoConnection,
            Some(io::ErrorKind::TimedOut) => TransportErrorKind::Timeout,
            _ => TransportErrorKind::CannotConnectToHost,
        };
    }

    match io_kind {
        Some(
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof,
        ) => TransportErrorKind::ConnectionLost,
        Some(io::ErrorKind::NotConnected) => TransportErrorKind::NoConnection,
        Some(io::ErrorKind::TimedOut) => TransportErrorKind::Timeout,
        _ => {
            let closed = chain().any(|e| {
                e.to_string()
                    .to_lowercase()
                    .contains("connection closed before message completed")
            });
            if closed {
                TransportErrorKind::ConnectionLost
            } else {
                TransportErrorKind::Other
            }
        }
    }
}
