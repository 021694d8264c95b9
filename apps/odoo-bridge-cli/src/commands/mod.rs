//! Subcommand implementations and the shared connection path.

pub mod app_ui;
pub mod invoice_api;

use clap::Args;

use odoo_bridge_core::RunOutcome;
use odoo_bridge_rpc::{HostGuard, OdooClient, OdooCredentials};

use crate::error::CliResult;

/// Connection flags shared by every subcommand.
#[derive(Args)]
pub struct ConnectionArgs {
    /// Remote host this run is allowed to touch
    #[arg(long, default_value = "example.odoo.com")]
    pub allow_host: String,

    /// Disable the host guard (use with care)
    #[arg(long)]
    pub allow_any_host: bool,
}

/// Build an authenticated client from the environment. The host guard
/// runs before any network traffic.
pub async fn connect(connection: &ConnectionArgs) -> CliResult<OdooClient> {
    let credentials = OdooCredentials::from_env()?;
    let guard = if connection.allow_any_host {
        HostGuard::allow_any()
    } else {
        HostGuard::new(&connection.allow_host, false)
    };
    let client = OdooClient::new(credentials, &guard)?;
    client.authenticate().await?;
    Ok(client)
}

/// Print the outcome as pretty JSON and report whether it ended in a
/// successful terminal status.
pub fn emit(outcome: &RunOutcome) -> CliResult<bool> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(outcome.is_success())
}
