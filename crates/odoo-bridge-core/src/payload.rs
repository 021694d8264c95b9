//! Unknown-field filtering for caller-supplied record payloads.

use std::collections::HashSet;

use odoo_bridge_rpc::Row;

use crate::error::{CoreError, CoreResult};

/// Per-invocation policy for field names absent from the target schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadMode {
    /// Unknown field names abort the run.
    #[default]
    Strict,
    /// Unknown field names are silently dropped.
    Lenient,
}

/// Split `payload` against the schema's field set.
///
/// Strict mode fails listing exactly the unrecognized names; lenient mode
/// returns the recognized subset.
pub fn filter_payload(
    model: &str,
    known_fields: &HashSet<String>,
    payload: &Row,
    mode: PayloadMode,
) -> CoreResult<Row> {
    let mut kept = Row::new();
    let mut unknown = Vec::new();
    for (field, value) in payload {
        if known_fields.contains(field) {
            kept.insert(field.clone(), value.clone());
        } else {
            unknown.push(field.clone());
        }
    }

    if !unknown.is_empty() && mode == PayloadMode::Strict {
        return Err(CoreError::UnknownFields {
            model: model.to_string(),
            fields: unknown,
        });
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> HashSet<String> {
        ["name", "arch", "country_id"]
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    fn payload() -> Row {
        serde_json::from_value(json!({
            "arch": "<t/>",
            "bogus_a": 1,
            "bogus_b": "x",
            "name": "Autozone",
        }))
        .unwrap()
    }

    #[test]
    fn test_strict_rejects_listing_unknown_names() {
        let err = filter_payload("l10n_mx_edi.addenda", &schema(), &payload(), PayloadMode::Strict)
            .unwrap_err();
        match err {
            CoreError::UnknownFields { model, fields } => {
                assert_eq!(model, "l10n_mx_edi.addenda");
                assert_eq!(fields, vec!["bogus_a", "bogus_b"]);
            }
            other => panic!("expected UnknownFields, got {other:?}"),
        }
    }

    #[test]
    fn test_lenient_keeps_recognized_subset() {
        let kept = filter_payload("l10n_mx_edi.addenda", &schema(), &payload(), PayloadMode::Lenient)
            .unwrap();
        assert_eq!(kept.len(), 2);
        assert!(kept.contains_key("name"));
        assert!(kept.contains_key("arch"));
        assert!(!kept.contains_key("bogus_a"));
    }

    #[test]
    fn test_fully_known_payload_passes_strict() {
        let payload: Row = serde_json::from_value(json!({"name": "Bosh"})).unwrap();
        let kept =
            filter_payload("l10n_mx_edi.addenda", &schema(), &payload, PayloadMode::Strict).unwrap();
        assert_eq!(kept, payload);
    }
}
