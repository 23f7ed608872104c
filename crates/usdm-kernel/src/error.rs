//! Error types for kernel construction.
//!
//! Findings about a document are never errors: they are accumulated as
//! [`Issue`](crate::issue::Issue)s. The only failure the kernel raises is an
//! input that cannot be traversed at all.

use serde_json::Value;

/// Errors raised before any traversal can start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The document root must be an object.
    #[error("document root must be an object, found {found}")]
    RootNotObject { found: &'static str },
}

/// Human-readable JSON kind name, used in error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
