//! Catalog file I/O: the addenda JSON catalog and YAML message catalogs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use odoo_bridge_rpc::Row;

use crate::error::{CoreError, CoreResult};

/// One known addenda: business key, tracked markup, optional extra fields
/// passed through to the remote record (subject to payload filtering).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddendaEntry {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default, flatten)]
    pub extra: Row,
}

/// Load the addenda catalog, seeding it with the built-in entries (and
/// persisting the seed) when the file does not exist yet.
pub fn load_or_seed_addenda_catalog(path: &Path) -> CoreResult<Vec<AddendaEntry>> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        return serde_json::from_str(&content).map_err(|e| CoreError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        });
    }

    let seed = seed_entries();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(&seed).map_err(|e| CoreError::Catalog {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    fs::write(path, content)?;
    Ok(seed)
}

fn seed_entries() -> Vec<AddendaEntry> {
    vec![
        AddendaEntry {
            name: "Autozone".to_string(),
            version: "latest-known".to_string(),
            arch: "<?xml version=\"1.0\"?><t t-xml-node=\"addenda\"><ADDENDA10 VERSION=\"1.0\"/></t>"
                .to_string(),
            extra: Row::new(),
        },
        AddendaEntry {
            name: "Bosh".to_string(),
            version: "latest-known".to_string(),
            arch: "<?xml version=\"1.0\"?><t t-xml-node=\"addenda\"><customized/></t>".to_string(),
            extra: Row::new(),
        },
    ]
}

/// Load a YAML catalog with a strict mapping root.
///
/// An empty file yields an empty mapping; a missing file is a missing
/// required asset.
pub fn load_yaml_mapping(path: &Path) -> CoreResult<Map<String, Value>> {
    if !path.exists() {
        return Err(CoreError::MissingAsset(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let parsed: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| CoreError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    match serde_json::to_value(parsed).map_err(|e| CoreError::Catalog {
        path: path.to_path_buf(),
        message: e.to_string(),
    })? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(CoreError::YamlRoot(path.to_path_buf())),
    }
}
