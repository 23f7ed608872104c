//! Reference extraction.
//!
//! A field holds a reference when its name follows the `*Id` / `*Ids`
//! convention. The convention is declared once here so it can be tested on
//! its own:
//!
//! | field name          | value            | references                |
//! |---------------------|------------------|---------------------------|
//! | `id`                | any              | none (identity field)     |
//! | ends with `Id`      | non-null string  | one                       |
//! | ends with `Ids`     | array            | one per string element    |

use crate::identity::ID_FIELD;
use crate::tree::{Visit, field_path, index_path};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SINGULAR_REFERENCE_SUFFIX: &str = "Id";
pub const PLURAL_REFERENCE_SUFFIX: &str = "Ids";

/// How a field name participates in referencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Singular,
    Plural,
}

/// Classify a field name by the reference naming convention.
pub fn reference_kind(field_name: &str) -> Option<ReferenceKind> {
    if field_name == ID_FIELD {
        None
    } else if field_name.ends_with(SINGULAR_REFERENCE_SUFFIX) {
        Some(ReferenceKind::Singular)
    } else if field_name.ends_with(PLURAL_REFERENCE_SUFFIX) {
        Some(ReferenceKind::Plural)
    } else {
        None
    }
}

/// One id-valued pointer found in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub target_id: String,
    /// Location of the referencing value (`root.x.armId`, `root.x.armIds[2]`).
    pub path: String,
    pub field_name: String,
}

/// Collect every reference of every object, in traversal order.
///
/// Objects are taken in depth-first order and their fields in document
/// order. Nested containers are still walked whether or not their field
/// produced a reference.
pub fn extract_references(nodes: Visit<'_>) -> Vec<Reference> {
    let mut references = Vec::new();

    for node in nodes {
        for (field, value) in node.object {
            match (reference_kind(field), value) {
                (Some(ReferenceKind::Singular), Value::String(target)) => {
                    references.push(Reference {
                        target_id: target.clone(),
                        path: field_path(&node.path, field),
                        field_name: field.clone(),
                    });
                }
                (Some(ReferenceKind::Plural), Value::Array(items)) => {
                    let base = field_path(&node.path, field);
                    for (index, item) in items.iter().enumerate() {
                        if let Value::String(target) = item {
                            references.push(Reference {
                                target_id: target.clone(),
                                path: index_path(&base, index),
                                field_name: field.clone(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }

    tracing::debug!(references = references.len(), "references extracted");
    references
}
