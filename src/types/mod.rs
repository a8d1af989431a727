//! # Types Module
//!
//! Wire-level contracts shared by the admin and user consoles and the backend gateway.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Envelope`] | Standard wrapper around a successful, non-paginated payload |
//! | [`PaginatedEnvelope`] | Standard wrapper around one page of a collection |
//! | [`ApiError`] | Normalized error body of any non-2xx response |
//! | [`PageRequest`] | `page` / `perPage` query parameters for list endpoints |
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`envelope`] | Success and paginated envelopes with response metadata |
//! | [`api_error`] | Error body shape |
//! | [`resources`] | Domain payloads (virtual machines, billing, users, metrics) |
//!
//! ## Example
//!
//! ```rust
//! use reseller_api::types::{Envelope, VirtualMachine};
//!
//! let body = r#"{"data":{"id":"vm-1","vmId":101,"name":"web","tenantId":"t1","nodeId":"n1",
//!   "status":"running","type":"qemu","config":{"cores":2,"memory":2048,"disk":20,"os":"debian",
//!   "template":"debian-12"},"ipAddresses":["10.0.0.5"],"createdAt":"2025-01-01T00:00:00Z",
//!   "updatedAt":"2025-01-01T00:00:00Z"},"meta":{"requestId":"r1","timestamp":"2025-01-01T00:00:00Z"}}"#;
//! let vm: Envelope<VirtualMachine> = serde_json::from_str(body).unwrap();
//! assert_eq!(vm.data.vm_id, 101);
//! ```

pub mod api_error;
pub mod envelope;
pub mod resources;

pub use api_error::ApiError;
pub use envelope::{Envelope, PageRequest, PaginatedEnvelope, Pagination, ResponseMeta};
pub use resources::{
    BillingPlan, CreateVmConfig, CreateVmRequest, Invoice, InvoiceLineItem, InvoiceStatus,
    NodeMetrics, PlanLimits, PlanPricing, ReadWrite, Throughput, Usage, User, VirtualMachine,
    VmConfig, VmKind, VmMetrics, VmStatus,
};
