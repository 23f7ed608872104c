//! Identity index: every object's `id`, mapped to where it was first seen.

use crate::issue::{CLASS_IDENTITY_DUPLICATE, CLASS_IDENTITY_NON_STRING, Issue};
use crate::tree::Visit;
use serde_json::Value;
use std::collections::BTreeMap;

/// The identity field name.
pub const ID_FIELD: &str = "id";

/// Mapping id → path of its first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityIndex {
    paths: BTreeMap<String, String>,
}

impl IdentityIndex {
    pub fn contains(&self, id: &str) -> bool {
        self.paths.contains_key(id)
    }

    /// Path of the first object that declared `id`.
    pub fn path_of(&self, id: &str) -> Option<&str> {
        self.paths.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Output of one identity pass.
#[derive(Debug, Clone, Default)]
pub struct IndexBuild {
    pub index: IdentityIndex,
    pub issues: Vec<Issue>,
}

/// Walk every object once and index its `id`.
///
/// The first occurrence wins; later occurrences never overwrite it and are
/// reported as advisory duplicates naming both paths.
pub fn build_index(nodes: Visit<'_>) -> IndexBuild {
    let mut build = IndexBuild::default();

    for node in nodes {
        let id = match node.get(ID_FIELD) {
            None | Some(Value::Null) => continue,
            Some(Value::String(id)) => id,
            Some(_) => {
                build.issues.push(
                    Issue::advisory(
                        CLASS_IDENTITY_NON_STRING,
                        format!("object at {} has a non-string 'id'", node.path),
                    )
                    .at(node.path.clone()),
                );
                continue;
            }
        };

        match build.index.paths.get(id) {
            Some(first_path) => {
                build.issues.push(
                    Issue::advisory(
                        CLASS_IDENTITY_DUPLICATE,
                        format!(
                            "duplicate id '{id}' at {} (first seen at {first_path})",
                            node.path
                        ),
                    )
                    .at(node.path.clone()),
                );
            }
            None => {
                build.index.paths.insert(id.clone(), node.path);
            }
        }
    }

    tracing::debug!(
        identities = build.index.len(),
        duplicates = build.issues.len(),
        "identity index built"
    );
    build
}
