//! Schema drift: legacy field names still present in a document.
//!
//! Rules come from the caller. A rule fires on an object in its scope that
//! exposes the legacy field (present, non-null) while not exposing the
//! current one (key absent). Rules without a current field fire on the
//! legacy field alone. Drift is always advisory.

use crate::issue::{CLASS_DRIFT_LEGACY_FIELD, Issue};
use crate::tree::{Node, Visit, field_path};
use serde::{Deserialize, Serialize};

/// Which objects a drift rule applies to.
///
/// An object is in scope when its `instanceType` matches one of
/// `instance_types` (a leading `*` means suffix match) or when it sits under
/// one of `containers`. An empty scope matches every object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriftScope {
    pub instance_types: Vec<String>,
    pub containers: Vec<String>,
}

impl DriftScope {
    pub fn instance_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            instance_types: types.into_iter().map(Into::into).collect(),
            containers: Vec::new(),
        }
    }

    pub fn with_containers<I, S>(mut self, containers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.containers = containers.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.instance_types.is_empty() && self.containers.is_empty()
    }

    pub fn matches(&self, node: &Node<'_>) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        let type_match = node.instance_type().is_some_and(|instance_type| {
            self.instance_types
                .iter()
                .any(|pattern| instance_type_matches(pattern, instance_type))
        });
        let container_match = node
            .container
            .is_some_and(|container| self.containers.iter().any(|c| c == container));
        type_match || container_match
    }
}

fn instance_type_matches(pattern: &str, instance_type: &str) -> bool {
    match pattern.strip_prefix('*') {
        Some(suffix) => instance_type.ends_with(suffix),
        None => pattern == instance_type,
    }
}

/// One legacy → current field mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftRule {
    pub legacy: String,
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub scope: DriftScope,
    /// Remediation hint appended to the message.
    #[serde(default)]
    pub note: Option<String>,
}

impl DriftRule {
    pub fn renamed(legacy: &str, current: &str, scope: DriftScope) -> Self {
        Self {
            legacy: legacy.to_string(),
            current: Some(current.to_string()),
            scope,
            note: None,
        }
    }

    pub fn retired(legacy: &str, scope: DriftScope, note: &str) -> Self {
        Self {
            legacy: legacy.to_string(),
            current: None,
            scope,
            note: Some(note.to_string()),
        }
    }

    fn fires_on(&self, node: &Node<'_>) -> bool {
        let legacy_exposed = matches!(node.get(&self.legacy), Some(value) if !value.is_null());
        let current_exposed = self
            .current
            .as_deref()
            .is_some_and(|current| node.get(current).is_some());
        legacy_exposed && !current_exposed && self.scope.matches(node)
    }

    fn message(&self, node: &Node<'_>) -> String {
        let subject = node
            .instance_type()
            .or(node.container)
            .unwrap_or("object");
        let mut message = match &self.current {
            Some(current) => format!(
                "{subject} at {} uses legacy '{}'; should use '{current}'",
                node.path, self.legacy
            ),
            None => format!(
                "{subject} at {} uses legacy '{}'",
                node.path, self.legacy
            ),
        };
        if let Some(note) = &self.note {
            message.push_str("; ");
            message.push_str(note);
        }
        message
    }
}

/// Walk the tree and report every object that still exposes a legacy field.
///
/// Issues follow traversal order, then rule order within one object.
pub fn detect_drift(nodes: Visit<'_>, rules: &[DriftRule]) -> Vec<Issue> {
    let mut issues = Vec::new();
    if rules.is_empty() {
        return issues;
    }

    for node in nodes {
        for rule in rules.iter().filter(|rule| rule.fires_on(&node)) {
            issues.push(
                Issue::advisory(CLASS_DRIFT_LEGACY_FIELD, rule.message(&node))
                    .at(field_path(&node.path, &rule.legacy)),
            );
        }
    }

    tracing::debug!(findings = issues.len(), rules = rules.len(), "drift detected");
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ROOT_PATH, visit};
    use serde_json::{Value, json};

    fn design_scope() -> DriftScope {
        DriftScope::instance_types(["*StudyDesign"]).with_containers(["studyDesigns"])
    }

    fn detect(tree: &Value, rules: &[DriftRule]) -> Vec<Issue> {
        detect_drift(visit(tree, ROOT_PATH), rules)
    }

    #[test]
    fn legacy_without_current_is_advisory() {
        let tree = json!({
            "studyDesigns": [{"instanceType": "InterventionalStudyDesign", "studyArms": []}]
        });
        let rules = [DriftRule::renamed("studyArms", "arms", design_scope())];
        let issues = detect(&tree, &rules);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].class(), CLASS_DRIFT_LEGACY_FIELD);
        assert!(!issues[0].is_blocking());
        assert_eq!(issues[0].path(), Some("root.studyDesigns[0].studyArms"));
        assert!(issues[0].message().contains("'arms'"));
    }

    #[test]
    fn current_field_suppresses_rule() {
        let tree = json!({
            "studyDesigns": [{"studyArms": [{"id": "a"}], "arms": [{"id": "a"}]}]
        });
        let rules = [DriftRule::renamed("studyArms", "arms", design_scope())];
        assert!(detect(&tree, &rules).is_empty());
    }

    #[test]
    fn empty_current_field_still_counts_as_present() {
        let tree = json!({
            "studyDesigns": [{"studyArms": [{"id": "a"}], "arms": []}]
        });
        let rules = [DriftRule::renamed("studyArms", "arms", design_scope())];
        assert!(detect(&tree, &rules).is_empty());
    }

    #[test]
    fn empty_legacy_array_is_exposed() {
        let tree = json!({"studyDesigns": [{"studyArms": []}]});
        let rules = [DriftRule::renamed("studyArms", "arms", design_scope())];
        let issues = detect(&tree, &rules);
        let paths: Vec<Option<&str>> = issues.iter().map(Issue::path).collect();
        assert_eq!(paths, vec![Some("root.studyDesigns[0].studyArms")]);
    }

    #[test]
    fn null_legacy_value_is_not_exposed() {
        let tree = json!({"studyDesigns": [{"studyArms": null}]});
        let rules = [DriftRule::renamed("studyArms", "arms", design_scope())];
        assert!(detect(&tree, &rules).is_empty());
    }

    #[test]
    fn out_of_scope_objects_are_ignored() {
        let tree = json!({
            "arms": [{"instanceType": "StudyArm", "armType": {"decode": "x"}}],
            "other": {"instanceType": "Encounter", "armType": "y"}
        });
        let rules = [DriftRule::renamed(
            "armType",
            "type",
            DriftScope::instance_types(["StudyArm"]),
        )];
        let issues = detect(&tree, &rules);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path(), Some("root.arms[0].armType"));
    }

    #[test]
    fn retired_field_fires_on_presence_and_carries_note() {
        let tree = json!({"objectives": [{"id": "o1", "endpointIds": ["ep1"]}]});
        let rules = [DriftRule::retired(
            "endpointIds",
            DriftScope::default().with_containers(["objectives"]),
            "endpoints should be embedded directly",
        )];
        let issues = detect(&tree, &rules);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message().ends_with("endpoints should be embedded directly"));
    }

    #[test]
    fn suffix_pattern_matches_design_subtypes() {
        assert!(instance_type_matches("*StudyDesign", "ObservationalStudyDesign"));
        assert!(instance_type_matches("StudyArm", "StudyArm"));
        assert!(!instance_type_matches("StudyArm", "StudyArmX"));
    }

    #[test]
    fn rules_deserialize_from_camel_case() {
        let rule: DriftRule = serde_json::from_value(json!({
            "legacy": "studyEpochs",
            "current": "epochs",
            "scope": {"instanceTypes": ["*StudyDesign"]}
        }))
        .expect("rule should parse");
        assert_eq!(rule.current.as_deref(), Some("epochs"));
        assert!(rule.scope.containers.is_empty());
    }
}
