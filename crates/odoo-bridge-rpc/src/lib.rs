//! # Odoo record-store client
//!
//! JSON-RPC 2.0 client for an Odoo instance, exposed behind the
//! [`RecordStore`] trait so the provisioning engine never depends on the
//! transport directly.
//!
//! ## Crate organization
//!
//! - [`credentials`] - Environment-sourced credentials and the target-host guard
//! - [`client`] - The `OdooClient` JSON-RPC transport
//! - [`store`] - The `RecordStore` trait and typed search domains
//! - [`schema`] - Per-run cached field introspection
//! - [`error`] - Error types

pub mod client;
pub mod credentials;
pub mod error;
pub mod schema;
pub mod store;

pub use client::OdooClient;
pub use credentials::{HostGuard, OdooCredentials};
pub use error::{RpcError, RpcResult};
pub use schema::SchemaCache;
pub use store::{Condition, Domain, RecordStore, Row};
