//! Connection credentials and the target-host safety guard.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RpcError, RpcResult};

/// Credentials for one Odoo instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdooCredentials {
    pub url: String,
    pub db: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl OdooCredentials {
    /// Read credentials from `ODOO_URL`, `ODOO_DB`, `ODOO_USER` and
    /// `ODOO_PASS`. Any unset or blank variable is a fatal configuration
    /// error, surfaced before any connection attempt.
    pub fn from_env() -> RpcResult<Self> {
        Ok(Self {
            url: required_env("ODOO_URL")?,
            db: required_env("ODOO_DB")?,
            username: required_env("ODOO_USER")?,
            password: required_env("ODOO_PASS")?,
        })
    }

    /// Lowercased hostname of the endpoint URL.
    pub fn host(&self) -> RpcResult<String> {
        let parsed = Url::parse(&self.url).map_err(|e| RpcError::InvalidUrl {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        let host = parsed.host_str().ok_or_else(|| RpcError::InvalidUrl {
            url: self.url.clone(),
            message: "URL has no host".to_string(),
        })?;
        Ok(host.trim().to_lowercase())
    }
}

fn required_env(name: &'static str) -> RpcResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(RpcError::MissingEnv(name)),
    }
}

/// Guard against accidental writes to the wrong tenant.
///
/// Checked at client construction, before any network activity.
#[derive(Debug, Clone)]
pub struct HostGuard {
    expected_host: String,
    allow_any_host: bool,
}

impl HostGuard {
    pub fn new(expected_host: impl Into<String>, allow_any_host: bool) -> Self {
        Self {
            expected_host: expected_host.into().trim().to_lowercase(),
            allow_any_host,
        }
    }

    /// Permit any target host (explicit operator override).
    pub fn allow_any() -> Self {
        Self::new("", true)
    }

    pub fn check(&self, credentials: &OdooCredentials) -> RpcResult<()> {
        if self.allow_any_host || self.expected_host.is_empty() {
            return Ok(());
        }
        let host = credentials.host()?;
        if host != self.expected_host {
            return Err(RpcError::HostBlocked {
                host,
                expected: self.expected_host.clone(),
            });
        }
        Ok(())
    }
}
