//! CLI error types and exit codes
//!
//! - 0: success (including a successful status or rollback pass)
//! - 1: provisioning failed or configuration error
//! - 2: authentication failed
//! - 3: network error

use thiserror::Error;

use odoo_bridge_core::CoreError;
use odoo_bridge_rpc::RpcError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Rpc(rpc) | CliError::Core(CoreError::Rpc(rpc)) => match rpc {
                RpcError::AuthenticationFailed { .. } => 2,
                RpcError::Transport(_) => 3,
                _ => 1,
            },
            CliError::Core(_) => 1,
            CliError::Output(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        if std::env::var("NO_COLOR").is_err() {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }
    }
}
