//! # reseller-api
//!
//! Authenticated API access layer shared by the virtualization-reseller admin and user consoles.
//!
//! Every network call the consoles make goes through one [`ApiClient`]. The client:
//!
//! - pulls the current bearer token from a [`CredentialSupplier`] once per request and attaches
//!   it as `Authorization: Bearer <token>` to that request only,
//! - passes 2xx bodies through unchanged as [`Envelope`] / [`PaginatedEnvelope`] (or any type
//!   the caller asks for),
//! - turns every other status into [`Error::Remote`] carrying the raw body and the parsed
//!   [`ApiError`], and
//! - on HTTP 401 notifies the [`UnauthorizedHandler`] once before returning the failure.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reseller_api::types::{PageRequest, VirtualMachine};
//! use reseller_api::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> reseller_api::Result<()> {
//!     let client = ApiClient::builder()
//!         .base_url("https://gateway.example.com")
//!         .credential_supplier(|| std::env::var("RESELLER_ACCESS_TOKEN").ok())
//!         .on_unauthorized(|| eprintln!("session expired, sign in again"))
//!         .build()?;
//!
//!     let page = client
//!         .list::<VirtualMachine>("/v1/vms", PageRequest::default())
//!         .await?;
//!     println!("{} of {} instances", page.data.len(), page.pagination.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client construction, dispatch and response classification |
//! | [`interceptors`] | Ordered request/response steps (credential attachment, 401 notification) |
//! | [`transport`] | Configured HTTP transport (timeout, default headers) |
//! | [`session`] | Session provider contract and in-memory provider |
//! | [`types`] | Wire contracts: envelopes, error body, domain payloads |
//! | [`config`] | Start-up configuration from environment or YAML |
//! | [`app`] | Per-console application context |

pub mod app;
pub mod client;
pub mod config;
pub mod interceptors;
pub mod session;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use app::AppContext;
pub use client::{ApiClient, ApiClientBuilder, ClientConfig};
pub use config::{AppConfig, Console, OidcAppConfig};
pub use session::{AuthState, AuthUser, CredentialSupplier, Session, UnauthorizedHandler};
pub use types::{ApiError, Envelope, PageRequest, PaginatedEnvelope};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
