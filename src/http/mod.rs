//! HTTP client layer: `MonitorHttp` with retry policies.

pub mod client;
pub mod retry;

pub use client::MonitorHttp;
pub use retry::{RetryConfig, RetryPolicy};
