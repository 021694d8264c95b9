//! Invoice API bridge: token, baseline, module checks, complement
//! discovery, addenda catalog sync and server actions.

pub mod config;
pub mod manager;
pub mod payloads;

pub use config::InvoiceApiConfig;
pub use manager::InvoiceApiRunner;
