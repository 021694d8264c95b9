//! odoo-bridge CLI - idempotent provisioning of Odoo configuration artifacts
//!
//! Each subcommand runs one pass (provision, status or rollback) against
//! the instance named by the ODOO_URL/ODOO_DB/ODOO_USER/ODOO_PASS
//! environment variables, prints its outcome as pretty JSON on stdout and
//! exits zero exactly when the pass ended in a successful terminal status.

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod logging;

use error::CliResult;

/// odoo-bridge - remote instance provisioning
#[derive(Parser)]
#[command(name = "odoo-bridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the invoice API bridge (token, parameters, server actions)
    InvoiceApi(commands::invoice_api::InvoiceApiArgs),

    /// Deploy the backend UI theme view
    AppUi(commands::app_ui::AppUiArgs),
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<bool> {
    match cli.command {
        Commands::InvoiceApi(args) => commands::invoice_api::execute(args).await,
        Commands::AppUi(args) => commands::app_ui::execute(args).await,
    }
}
