//! Integration tests with mock HTTP server

pub mod cancellation;
pub mod mock_server;
pub mod payloads;
pub mod retries;
