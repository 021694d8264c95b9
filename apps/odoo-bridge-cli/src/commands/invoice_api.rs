//! Invoice API subcommand - provision, inspect or roll back the bridge

use std::path::PathBuf;

use clap::Args;

use odoo_bridge_core::invoice_api::{InvoiceApiConfig, InvoiceApiRunner};
use odoo_bridge_core::PayloadMode;

use crate::error::CliResult;

use super::{connect, emit, ConnectionArgs};

/// Arguments for the invoice-api command
#[derive(Args)]
pub struct InvoiceApiArgs {
    /// Project root holding the local data/ assets
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    /// Report owned artifacts without writing anything
    #[arg(long, group = "mode")]
    pub status: bool,

    /// Delete owned artifacts
    #[arg(long, group = "mode")]
    pub rollback: bool,

    /// Drop unknown catalog fields instead of failing
    #[arg(long)]
    pub lenient_payload: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Execute the invoice-api command, returning whether the pass succeeded.
pub async fn execute(args: InvoiceApiArgs) -> CliResult<bool> {
    let client = connect(&args.connection).await?;
    let payload_mode = if args.lenient_payload {
        PayloadMode::Lenient
    } else {
        PayloadMode::Strict
    };
    let runner = InvoiceApiRunner::new(
        &client,
        args.project_root,
        InvoiceApiConfig::default(),
        payload_mode,
    );

    let outcome = if args.status {
        runner.status().await?
    } else if args.rollback {
        runner.rollback().await?
    } else {
        runner.run().await
    };
    emit(&outcome)
}
