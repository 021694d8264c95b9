//! Provisioning error types.

use std::path::PathBuf;

use thiserror::Error;

use odoo_bridge_rpc::RpcError;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// A required local asset file is absent.
    #[error("required asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    /// A required remote module is not present on the instance.
    #[error("required module missing: {0}")]
    MissingModule(String),

    /// A required remote model is not present on the instance.
    #[error("required models not found: {0}")]
    MissingModel(String),

    /// The base view the theme extends does not exist.
    #[error("base view not found: {0}")]
    MissingBaseView(String),

    /// Strict payload mode rejected field names absent from the schema.
    #[error("unknown {model} fields: {}", .fields.join(", "))]
    UnknownFields { model: String, fields: Vec<String> },

    #[error("unsupported app UI variant: {0}")]
    UnsupportedVariant(String),

    /// A catalog file exists but could not be parsed.
    #[error("catalog error at {}: {message}", .path.display())]
    Catalog { path: PathBuf, message: String },

    /// A YAML catalog whose root is not a mapping.
    #[error("YAML catalog root must be a mapping: {}", .0.display())]
    YamlRoot(PathBuf),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_lists_names() {
        let err = CoreError::UnknownFields {
            model: "account.move".to_string(),
            fields: vec!["bogus_a".to_string(), "bogus_b".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown account.move fields: bogus_a, bogus_b"
        );
    }
}
