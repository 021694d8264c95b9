//! The `RecordStore` trait and typed search domains.
//!
//! `RecordStore` is the seam between the reconciliation engine and the
//! remote system: the engine only ever sees find/create/update/invoke.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::RpcResult;

/// One remote row: field name to value.
pub type Row = Map<String, Value>;

/// A single `(field, operator, value)` search condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

/// Conjunction of conditions, serialized as Odoo triple arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain {
    conditions: Vec<Condition>,
}

impl Domain {
    /// Empty domain matching every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::all().and("=", field, value.into())
    }

    pub fn in_(field: &str, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        let items: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::all().and("in", field, Value::Array(items))
    }

    pub fn ilike(field: &str, pattern: &str) -> Self {
        Self::all().and("ilike", field, pattern.into())
    }

    pub fn and_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.and("=", field, value.into())
    }

    fn and(mut self, operator: &str, field: &str, value: Value) -> Self {
        self.conditions.push(Condition {
            field: field.to_string(),
            operator: operator.to_string(),
            value,
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Wire form: `[[field, operator, value], ...]`.
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.conditions
                .iter()
                .map(|c| {
                    Value::Array(vec![
                        c.field.clone().into(),
                        c.operator.clone().into(),
                        c.value.clone(),
                    ])
                })
                .collect(),
        )
    }
}

/// Opaque capability for remote CRUD.
///
/// Implemented by [`crate::OdooClient`] and by in-memory fakes in tests.
/// All business logic lives above this trait.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `search_read`: rows matching `domain`, restricted to `fields`.
    async fn find(
        &self,
        model: &str,
        domain: &Domain,
        fields: &[&str],
        limit: Option<u32>,
        order: Option<&str>,
    ) -> RpcResult<Vec<Row>>;

    /// `search`: matching row ids only.
    async fn search(&self, model: &str, domain: &Domain, limit: Option<u32>) -> RpcResult<Vec<i64>>;

    /// Create one row, returning its id.
    async fn create(&self, model: &str, values: Row) -> RpcResult<i64>;

    /// Write `values` onto every row in `ids`.
    async fn update(&self, model: &str, ids: &[i64], values: Row) -> RpcResult<bool>;

    /// Call an arbitrary model method (e.g. `unlink`).
    async fn invoke(&self, model: &str, method: &str, args: Vec<Value>) -> RpcResult<Value>;
}

/// Row id, when present and numeric.
pub fn row_id(row: &Row) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

/// Text value of a field, treating Odoo's `false` (absent char field) as empty.
pub fn row_text<'a>(row: &'a Row, field: &str) -> &'a str {
    row.get(field).and_then(Value::as_str).unwrap_or("")
}
