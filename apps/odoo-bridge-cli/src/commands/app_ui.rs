//! App UI subcommand - apply, inspect or roll back the backend theme

use std::path::PathBuf;

use clap::Args;

use odoo_bridge_core::app_ui::{AppUiConfig, AppUiRunner};

use crate::error::CliResult;

use super::{connect, emit, ConnectionArgs};

/// Arguments for the app-ui command
#[derive(Args)]
pub struct AppUiArgs {
    /// Project root holding the local data/ assets
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    /// Theme variant to deploy (classic, unocss)
    #[arg(long, default_value = "classic")]
    pub variant: String,

    /// Report owned artifacts without writing anything
    #[arg(long, group = "mode")]
    pub status: bool,

    /// Deactivate the view and delete owned parameters
    #[arg(long, group = "mode")]
    pub rollback: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Execute the app-ui command, returning whether the pass succeeded.
pub async fn execute(args: AppUiArgs) -> CliResult<bool> {
    let config = AppUiConfig::for_variant(&args.variant)?;
    let client = connect(&args.connection).await?;
    let runner = AppUiRunner::new(&client, args.project_root, config);

    let outcome = if args.status {
        runner.status().await?
    } else if args.rollback {
        runner.rollback().await?
    } else {
        runner.apply().await
    };
    emit(&outcome)
}
