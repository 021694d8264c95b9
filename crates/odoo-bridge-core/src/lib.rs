//! # Provisioning engine
//!
//! Idempotent reconciliation of Odoo configuration artifacts: a backend UI
//! theme view, server actions, config parameters and addenda reference
//! records. Desired state comes from local assets and embedded payloads;
//! each artifact is keyed by a natural key and upserted only when its remote
//! value drifts, so re-running a completed provisioning pass issues zero
//! writes.
//!
//! ## Crate organization
//!
//! - [`upsert`] - The upsert primitive and resolve-with-fallback
//! - [`payload`] - Strict/lenient unknown-field filtering
//! - [`outcome`] - The aggregate run result
//! - [`invoice_api`] - Invoice API bridge runner (token, modules, discovery,
//!   addenda sync, server actions)
//! - [`app_ui`] - Backend UI theme runner (asset composition, view upsert)
//! - [`catalog`] - JSON/YAML catalog file I/O

pub mod app_ui;
pub mod catalog;
pub mod error;
pub mod invoice_api;
pub mod outcome;
pub mod payload;
pub mod token;
pub mod upsert;

pub use error::{CoreError, CoreResult};
pub use outcome::{RunOutcome, RunStatus};
pub use payload::PayloadMode;
