//! JSON-RPC client for the Odoo `common` and `object` services.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::credentials::{HostGuard, OdooCredentials};
use crate::error::{RpcError, RpcResult};
use crate::store::{Domain, RecordStore, Row};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client for one Odoo instance.
///
/// Authentication happens once per client lifetime: the uid is established
/// on [`OdooClient::authenticate`] or transparently on the first model call,
/// then cached.
pub struct OdooClient {
    http: Client,
    endpoint: String,
    credentials: OdooCredentials,
    uid: RwLock<Option<i64>>,
    next_request_id: AtomicU64,
}

impl std::fmt::Debug for OdooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdooClient")
            .field("endpoint", &self.endpoint)
            .field("db", &self.credentials.db)
            .field("username", &self.credentials.username)
            .finish()
    }
}

impl OdooClient {
    /// Build a client, enforcing the host guard before anything else.
    pub fn new(credentials: OdooCredentials, guard: &HostGuard) -> RpcResult<Self> {
        guard.check(&credentials)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        let endpoint = format!("{}/jsonrpc", credentials.url.trim_end_matches('/'));

        Ok(Self {
            http,
            endpoint,
            credentials,
            uid: RwLock::new(None),
            next_request_id: AtomicU64::new(1),
        })
    }

    /// Issue one JSON-RPC call against a named service.
    async fn call(&self, service: &str, method: &str, args: Value) -> RpcResult<Value> {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {
                "service": service,
                "method": method,
                "args": args,
            },
            "id": id,
        });

        debug!(service, method, id, "jsonrpc call");
        let response = self.http.post(&self.endpoint).json(&body).send().await?;
        let payload: Value = response.error_for_status()?.json().await?;

        if let Some(fault) = payload.get("error") {
            return Err(RpcError::Fault {
                message: fault_message(fault),
            });
        }
        payload
            .get("result")
            .cloned()
            .ok_or_else(|| RpcError::UnexpectedPayload("response has neither result nor error".to_string()))
    }

    /// Authenticate against the `common` service, caching the uid.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> RpcResult<i64> {
        if let Some(uid) = *self.uid.read().await {
            return Ok(uid);
        }

        let result = self
            .call(
                "common",
                "authenticate",
                json!([
                    self.credentials.db,
                    self.credentials.username,
                    self.credentials.password,
                    {},
                ]),
            )
            .await?;

        // A failed login comes back as `false`, not as a fault.
        let uid = result.as_i64().filter(|uid| *uid > 0).ok_or_else(|| {
            RpcError::AuthenticationFailed {
                db: self.credentials.db.clone(),
            }
        })?;

        *self.uid.write().await = Some(uid);
        debug!(uid, "authenticated");
        Ok(uid)
    }

    /// `execute_kw` against the `object` service, authenticating lazily.
    pub async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> RpcResult<Value> {
        let uid = self.authenticate().await?;
        self.call(
            "object",
            "execute_kw",
            json!([
                self.credentials.db,
                uid,
                self.credentials.password,
                model,
                method,
                args,
                kwargs,
            ]),
        )
        .await
    }
}

fn fault_message(fault: &Value) -> String {
    fault
        .pointer("/data/message")
        .or_else(|| fault.get("message"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .unwrap_or_else(|| fault.to_string())
}

#[async_trait]
impl RecordStore for OdooClient {
    async fn find(
        &self,
        model: &str,
        domain: &Domain,
        fields: &[&str],
        limit: Option<u32>,
        order: Option<&str>,
    ) -> RpcResult<Vec<Row>> {
        let mut kwargs = serde_json::Map::new();
        if !fields.is_empty() {
            kwargs.insert("fields".to_string(), json!(fields));
        }
        if let Some(limit) = limit {
            kwargs.insert("limit".to_string(), json!(limit));
        }
        if let Some(order) = order {
            kwargs.insert("order".to_string(), json!(order));
        }

        let result = self
            .execute_kw(
                model,
                "search_read",
                json!([domain.to_value()]),
                Value::Object(kwargs),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::UnexpectedPayload(format!("search_read on {model}: {e}")))
    }

    async fn search(&self, model: &str, domain: &Domain, limit: Option<u32>) -> RpcResult<Vec<i64>> {
        let mut kwargs = serde_json::Map::new();
        if let Some(limit) = limit {
            kwargs.insert("limit".to_string(), json!(limit));
        }

        let result = self
            .execute_kw(
                model,
                "search",
                json!([domain.to_value()]),
                Value::Object(kwargs),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::UnexpectedPayload(format!("search on {model}: {e}")))
    }

    async fn create(&self, model: &str, values: Row) -> RpcResult<i64> {
        let result = self
            .execute_kw(model, "create", json!([values]), json!({}))
            .await?;
        result
            .as_i64()
            .ok_or_else(|| RpcError::UnexpectedPayload(format!("create on {model} returned non-id: {result}")))
    }

    async fn update(&self, model: &str, ids: &[i64], values: Row) -> RpcResult<bool> {
        let result = self
            .execute_kw(model, "write", json!([ids, values]), json!({}))
            .await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    async fn invoke(&self, model: &str, method: &str, args: Vec<Value>) -> RpcResult<Value> {
        self.execute_kw(model, method, Value::Array(args), json!({}))
            .await
    }
}
