//! The upsert primitive: create-or-update-in-place keyed by natural key.

use serde::Serialize;
use serde_json::Value;

use odoo_bridge_rpc::store::{row_id, row_text};
use odoo_bridge_rpc::{Domain, RecordStore, Row, RpcError};

use crate::error::{CoreError, CoreResult};

pub const PARAMETER_MODEL: &str = "ir.config_parameter";

/// Result of one upsert: the row id and whether a write was issued.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Upsert {
    pub id: i64,
    pub changed: bool,
}

/// Build a value set from field/value pairs.
pub fn field_values<const N: usize>(pairs: [(&str, Value); N]) -> Row {
    pairs
        .into_iter()
        .map(|(field, value)| (field.to_string(), value))
        .collect()
}

/// Find at most one row by `key_domain`; update it only if any desired field
/// drifts, or create it with `desired` merged over `key_values`.
///
/// Writes are all-or-nothing: a drifted row receives the full desired set in
/// a single update.
pub async fn upsert_record(
    store: &dyn RecordStore,
    model: &str,
    key_domain: &Domain,
    key_values: &Row,
    desired: &Row,
) -> CoreResult<Upsert> {
    let mut fields: Vec<&str> = Vec::with_capacity(desired.len() + 1);
    fields.push("id");
    fields.extend(desired.keys().map(String::as_str));

    let rows = store.find(model, key_domain, &fields, Some(1), None).await?;
    if let Some(current) = rows.first() {
        let id = row_id(current).ok_or_else(|| {
            CoreError::Rpc(RpcError::UnexpectedPayload(format!(
                "{model} row without id"
            )))
        })?;
        let drifted = desired_differs(current, desired);
        if drifted {
            store.update(model, &[id], desired.clone()).await?;
        }
        return Ok(Upsert { id, changed: drifted });
    }

    let mut values = key_values.clone();
    for (field, value) in desired {
        values.insert(field.clone(), value.clone());
    }
    let id = store.create(model, values).await?;
    Ok(Upsert { id, changed: true })
}

/// Upsert one `ir.config_parameter` by key.
pub async fn upsert_param(store: &dyn RecordStore, key: &str, value: &str) -> CoreResult<Upsert> {
    upsert_record(
        store,
        PARAMETER_MODEL,
        &Domain::eq("key", key),
        &field_values([("key", key.into())]),
        &field_values([("value", value.into())]),
    )
    .await
}

/// True if any desired field differs from the row's current value.
pub fn desired_differs(current: &Row, desired: &Row) -> bool {
    desired
        .iter()
        .any(|(field, want)| !value_matches(current.get(field), want))
}

fn value_matches(current: Option<&Value>, desired: &Value) -> bool {
    let Some(current) = current else {
        return false;
    };
    if current == desired {
        return true;
    }
    // Relational fields read back as [id, display_name].
    if let (Value::Array(pair), Value::Number(_)) = (current, desired) {
        return pair.first() == Some(desired);
    }
    // Absent char fields read back as `false`.
    if current == &Value::Bool(false) {
        return matches!(desired, Value::String(s) if s.is_empty()) || desired.is_null();
    }
    false
}

/// A parameter value resolved through the current/legacy key chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParam {
    pub value: String,
    /// True if the value came from a fallback key and was written forward.
    pub migrated: bool,
}

/// Return the first non-empty value among `primary` and `fallbacks`.
///
/// A value found under a fallback key is copied forward to the primary key;
/// the fallback row itself is left untouched.
pub async fn resolve_param_with_fallback(
    store: &dyn RecordStore,
    primary: &str,
    fallbacks: &[&str],
) -> CoreResult<Option<ResolvedParam>> {
    let mut keys: Vec<&str> = Vec::with_capacity(fallbacks.len() + 1);
    keys.push(primary);
    keys.extend(fallbacks);

    let rows = store
        .find(
            PARAMETER_MODEL,
            &Domain::in_("key", keys.iter().copied()),
            &["id", "key", "value"],
            Some(keys.len() as u32),
            None,
        )
        .await?;

    let value_of = |key: &str| -> Option<String> {
        rows.iter()
            .find(|row| row_text(row, "key") == key)
            .map(|row| row_text(row, "value").trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(value) = value_of(primary) {
        return Ok(Some(ResolvedParam {
            value,
            migrated: false,
        }));
    }
    for fallback in fallbacks {
        if let Some(value) = value_of(fallback) {
            upsert_param(store, primary, &value).await?;
            return Ok(Some(ResolvedParam {
                value,
                migrated: true,
            }));
        }
    }
    Ok(None)
}
