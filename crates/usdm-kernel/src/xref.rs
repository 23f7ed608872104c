//! Cross-reference validation: every reference must name a known identity.

use crate::identity::IdentityIndex;
use crate::issue::{CLASS_REFERENCE_ORPHAN, Issue};
use crate::reference::Reference;

/// One blocking issue per reference whose target is not indexed, in
/// extraction order.
pub fn find_orphans(index: &IdentityIndex, references: &[Reference]) -> Vec<Issue> {
    references
        .iter()
        .filter(|reference| !index.contains(&reference.target_id))
        .map(|reference| {
            Issue::blocking(
                CLASS_REFERENCE_ORPHAN,
                format!(
                    "broken reference at {}: '{}' not found",
                    reference.path, reference.target_id
                ),
            )
            .at(reference.path.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::build_index;
    use crate::reference::extract_references;
    use crate::tree::{ROOT_PATH, visit};
    use serde_json::json;

    #[test]
    fn resolved_references_produce_nothing() {
        let tree = json!({
            "arms": [{"id": "A1"}],
            "cells": [{"id": "C1", "armId": "A1"}]
        });
        let index = build_index(visit(&tree, ROOT_PATH)).index;
        let refs = extract_references(visit(&tree, ROOT_PATH));
        assert!(find_orphans(&index, &refs).is_empty());
    }

    #[test]
    fn missing_target_is_blocking_with_reference_path() {
        let tree = json!({"cells": [{"id": "C1", "armId": "a9"}]});
        let index = build_index(visit(&tree, ROOT_PATH)).index;
        let refs = extract_references(visit(&tree, ROOT_PATH));
        let orphans = find_orphans(&index, &refs);
        assert_eq!(orphans.len(), 1);
        assert!(orphans[0].is_blocking());
        assert!(orphans[0].message().contains("a9"));
        assert_eq!(orphans[0].path(), Some("root.cells[0].armId"));
    }
}
