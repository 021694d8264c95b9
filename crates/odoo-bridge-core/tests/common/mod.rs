//! In-memory `RecordStore` fake for runner tests.
//!
//! Supports the domain operators the engine uses (`=`, `in`, `ilike`) and
//! the invoked methods it relies on (`unlink`, `button_immediate_install`),
//! and counts writes so tests can assert zero-write idempotence.

// Each test binary exercises a different subset of the helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use odoo_bridge_rpc::{Domain, RecordStore, Row, RpcResult};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    next_id: AtomicI64,
    creates: AtomicUsize,
    updates: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    /// Seed rows, assigning ids to rows that lack one.
    pub fn seed(&self, model: &str, rows: Vec<Value>) {
        let mut tables = self.tables.lock().unwrap();
        let table = tables.entry(model.to_string()).or_default();
        for row in rows {
            let Value::Object(mut row) = row else {
                panic!("seed rows must be objects");
            };
            if !row.contains_key("id") {
                row.insert("id".to_string(), json!(self.allocate_id()));
            }
            table.push(row);
        }
    }

    pub fn rows(&self, model: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(model)
            .cloned()
            .unwrap_or_default()
    }

    pub fn row_by(&self, model: &str, field: &str, value: &str) -> Option<Row> {
        self.rows(model)
            .into_iter()
            .find(|row| row.get(field).and_then(Value::as_str) == Some(value))
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::Relaxed)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::Relaxed)
    }

    pub fn write_count(&self) -> usize {
        self.create_count() + self.update_count()
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

fn matches(row: &Row, domain: &Domain) -> bool {
    domain.conditions().iter().all(|condition| {
        let current = row.get(&condition.field).unwrap_or(&Value::Null);
        match condition.operator.as_str() {
            "=" => current == &condition.value,
            "in" => condition
                .value
                .as_array()
                .map(|candidates| candidates.contains(current))
                .unwrap_or(false),
            "ilike" => {
                let pattern = condition.value.as_str().unwrap_or("").to_lowercase();
                let text = current.as_str().unwrap_or("").to_lowercase();
                match pattern.strip_suffix('%') {
                    Some(prefix) => text.starts_with(prefix),
                    None => text.contains(&pattern),
                }
            }
            other => panic!("MemoryStore: unsupported operator {other}"),
        }
    })
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(
        &self,
        model: &str,
        domain: &Domain,
        _fields: &[&str],
        limit: Option<u32>,
        _order: Option<&str>,
    ) -> RpcResult<Vec<Row>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Row> = tables
            .get(model)
            .map(|table| {
                table
                    .iter()
                    .filter(|row| matches(row, domain))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn search(&self, model: &str, domain: &Domain, limit: Option<u32>) -> RpcResult<Vec<i64>> {
        let rows = self.find(model, domain, &[], limit, None).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_i64))
            .collect())
    }

    async fn create(&self, model: &str, values: Row) -> RpcResult<i64> {
        self.creates.fetch_add(1, Ordering::Relaxed);
        let id = self.allocate_id();
        let mut row = values;
        row.insert("id".to_string(), json!(id));
        self.tables
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push(row);
        Ok(id)
    }

    async fn update(&self, model: &str, ids: &[i64], values: Row) -> RpcResult<bool> {
        self.updates.fetch_add(1, Ordering::Relaxed);
        let mut tables = self.tables.lock().unwrap();
        if let Some(table) = tables.get_mut(model) {
            for row in table.iter_mut() {
                let id = row.get("id").and_then(Value::as_i64).unwrap_or_default();
                if ids.contains(&id) {
                    for (field, value) in &values {
                        row.insert(field.clone(), value.clone());
                    }
                }
            }
        }
        Ok(true)
    }

    async fn invoke(&self, model: &str, method: &str, args: Vec<Value>) -> RpcResult<Value> {
        let ids: Vec<i64> = args
            .first()
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();

        match method {
            "unlink" => {
                let mut tables = self.tables.lock().unwrap();
                if let Some(table) = tables.get_mut(model) {
                    table.retain(|row| {
                        row.get("id")
                            .and_then(Value::as_i64)
                            .map(|id| !ids.contains(&id))
                            .unwrap_or(true)
                    });
                }
                Ok(json!(true))
            }
            "button_immediate_install" => {
                let mut tables = self.tables.lock().unwrap();
                if let Some(table) = tables.get_mut(model) {
                    for row in table.iter_mut() {
                        let id = row.get("id").and_then(Value::as_i64).unwrap_or_default();
                        if ids.contains(&id) {
                            row.insert("state".to_string(), json!("installed"));
                        }
                    }
                }
                Ok(json!(true))
            }
            other => panic!("MemoryStore: unsupported method {other}"),
        }
    }
}
