//! API client for the reseller gateway.
//!
//! One [`ApiClient`] per application: constructed once at start-up from an immutable
//! [`ClientConfig`], then cloned (cheaply) into whatever needs it.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
mod execution;

pub use builder::{ApiClientBuilder, ClientConfig};
pub use self::core::ApiClient;
