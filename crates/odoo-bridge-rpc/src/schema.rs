//! Cached field introspection against `ir.model.fields`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::RpcResult;
use crate::store::{Domain, RecordStore};

/// Per-run cache of valid field names per model.
///
/// Each model is queried at most once per cache lifetime; a provisioning run
/// owns exactly one `SchemaCache`, so the snapshot is stable for that run.
#[derive(Debug, Default)]
pub struct SchemaCache {
    by_model: Mutex<HashMap<String, Arc<HashSet<String>>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field names defined on `model`, from cache or one remote query.
    pub async fn fields_of(
        &self,
        store: &dyn RecordStore,
        model: &str,
    ) -> RpcResult<Arc<HashSet<String>>> {
        let mut cache = self.by_model.lock().await;
        if let Some(fields) = cache.get(model) {
            return Ok(Arc::clone(fields));
        }

        let rows = store
            .find(
                "ir.model.fields",
                &Domain::eq("model", model),
                &["name"],
                None,
                None,
            )
            .await?;
        let fields: HashSet<String> = rows
            .iter()
            .filter_map(|row| row.get("name").and_then(|v| v.as_str()))
            .map(ToString::to_string)
            .collect();

        let fields = Arc::new(fields);
        cache.insert(model.to_string(), Arc::clone(&fields));
        Ok(fields)
    }
}
