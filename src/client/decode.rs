//! Response decoding: raw status + body into a typed payload or a typed error.
//!
//! Pure functions; no I/O. Any byte sequence with any status yields either a
//! payload or one of the error variants, never a panic.

use crate::error::ErrorEnvelope;
use crate::transport::RawResponse;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Wire shape of a 2xx response body.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Decode a response whose success body is `{"data": T}`.
pub fn decode<T: DeserializeOwned>(raw: &RawResponse) -> Result<T> {
    if !raw.is_success() {
        return Err(decode_failure(raw));
    }
    serde_json::from_slice::<DataEnvelope<T>>(&raw.body)
        .map(|envelope| envelope.data)
        .map_err(Error::DecodingFailed)
}

/// Decode a response where any 2xx counts as success regardless of body.
pub fn decode_empty(raw: &RawResponse) -> Result<()> {
    if raw.is_success() {
        Ok(())
    } else {
        Err(decode_failure(raw))
    }
}

/// Map a non-2xx response to `Api` when the body carries a structured error,
/// otherwise to `HttpStatus`.
pub fn decode_failure(raw: &RawResponse) -> Error {
    match serde_json::from_slice::<ErrorEnvelope>(&raw.body) {
        Ok(envelope) => Error::Api(envelope.error),
        Err(_) => Error::HttpStatus { status: raw.status },
    }
}
