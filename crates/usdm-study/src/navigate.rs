//! Navigation through the study envelope:
//! `study → versions[0] → studyDesigns[i]`.

use crate::profile::CollectionSpec;
use serde_json::Value;
use usdm_kernel::Collection;
use usdm_kernel::tree::{ROOT_PATH, array_field, field_path, index_path, lookup_dotted};

/// The study version a profile check is about, with its designs.
#[derive(Debug, Clone)]
pub struct VersionView<'a> {
    pub value: &'a Value,
    pub path: String,
    pub designs: Vec<DesignView<'a>>,
}

#[derive(Debug, Clone)]
pub struct DesignView<'a> {
    pub index: usize,
    pub value: &'a Value,
    pub path: String,
}

impl<'a> DesignView<'a> {
    /// Short label used in messages: `studyDesigns[0]`.
    pub fn label(&self) -> String {
        index_path("studyDesigns", self.index)
    }
}

/// First study version, when the envelope is intact.
pub fn first_version(root: &Value) -> Option<VersionView<'_>> {
    let version = array_field(root.get("study")?, "versions").first()?;
    let path = index_path(&field_path(&field_path(ROOT_PATH, "study"), "versions"), 0);
    let designs = array_field(version, "studyDesigns")
        .iter()
        .enumerate()
        .map(|(index, value)| DesignView {
            index,
            value,
            path: index_path(&field_path(&path, "studyDesigns"), index),
        })
        .collect();
    Some(VersionView {
        value: version,
        path,
        designs,
    })
}

/// Read `field`, falling back to `legacy` only when `field` is absent.
///
/// Returns the field name actually read and its items.
pub fn field_or_legacy<'a, 'f>(
    object: &'a Value,
    field: &'f str,
    legacy: Option<&'f str>,
) -> (&'f str, &'a [Value]) {
    match (object.get(field), legacy) {
        (None, Some(legacy)) if object.get(legacy).is_some() => {
            (legacy, array_field(object, legacy))
        }
        _ => (field, array_field(object, field)),
    }
}

/// Group item indices by the string at `key`, in order of first
/// appearance. Items without the key form one trailing segment.
pub fn segment(items: &[Value], key: &str) -> Vec<Vec<usize>> {
    let mut keyed: Vec<(&str, Vec<usize>)> = Vec::new();
    let mut unkeyed = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match lookup_dotted(item, key).and_then(Value::as_str) {
            Some(value) => match keyed.iter_mut().find(|(existing, _)| *existing == value) {
                Some((_, members)) => members.push(index),
                None => keyed.push((value, vec![index])),
            },
            None => unkeyed.push(index),
        }
    }

    let mut segments: Vec<Vec<usize>> = keyed.into_iter().map(|(_, members)| members).collect();
    if !unkeyed.is_empty() {
        segments.push(unkeyed);
    }
    segments
}

/// The ordered collection `spec` names inside one design, if the design has
/// it at all.
pub fn design_collection<'a>(design: &DesignView<'a>, spec: &CollectionSpec) -> Option<Collection<'a>> {
    let (field, items) = field_or_legacy(design.value, &spec.field, spec.legacy_field.as_deref());
    design.value.get(field)?;
    let name = field_path(&design.path, field);
    let members = items.iter().collect();
    Some(match spec.segment_by.as_deref() {
        Some(key) => Collection::segmented(name, members, segment(items, key)),
        None => Collection::new(name, members),
    })
}

/// Every configured collection of every design of the version.
pub fn discover_collections<'a>(
    version: &VersionView<'a>,
    specs: &[CollectionSpec],
) -> Vec<Collection<'a>> {
    let collections: Vec<Collection<'a>> = version
        .designs
        .iter()
        .flat_map(|design| specs.iter().filter_map(move |spec| design_collection(design, spec)))
        .collect();
    tracing::debug!(collections = collections.len(), "collections discovered");
    collections
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope() -> Value {
        json!({
            "study": {
                "versions": [{
                    "studyDesigns": [
                        {"id": "D1", "studyEpochs": [{"id": "e1"}]},
                        {"id": "D2", "epochs": [], "studyEpochs": [{"id": "x"}]}
                    ]
                }]
            }
        })
    }

    #[test]
    fn first_version_exposes_designs_with_paths() {
        let tree = envelope();
        let version = first_version(&tree).expect("version present");
        assert_eq!(version.path, "root.study.versions[0]");
        assert_eq!(version.designs.len(), 2);
        assert_eq!(version.designs[1].path, "root.study.versions[0].studyDesigns[1]");
        assert_eq!(version.designs[1].label(), "studyDesigns[1]");
    }

    #[test]
    fn missing_envelope_has_no_version() {
        assert!(first_version(&json!({"study": {"versions": []}})).is_none());
        assert!(first_version(&json!({})).is_none());
    }

    #[test]
    fn legacy_field_is_read_only_when_current_is_absent() {
        let tree = envelope();
        let version = first_version(&tree).expect("version present");
        let spec = CollectionSpec::plain("epochs").with_legacy("studyEpochs");

        let first = design_collection(&version.designs[0], &spec).expect("legacy epochs");
        assert_eq!(first.name, "root.study.versions[0].studyDesigns[0].studyEpochs");
        assert_eq!(first.items.len(), 1);

        let second = design_collection(&version.designs[1], &spec).expect("current epochs");
        assert_eq!(second.name, "root.study.versions[0].studyDesigns[1].epochs");
        assert!(second.items.is_empty());
    }

    #[test]
    fn absent_collection_is_skipped() {
        let tree = envelope();
        let version = first_version(&tree).expect("version present");
        let spec = CollectionSpec::plain("encounters");
        assert!(design_collection(&version.designs[0], &spec).is_none());
    }

    #[test]
    fn segments_keep_first_appearance_order() {
        let items = vec![
            json!({"id": "x1", "category": {"decode": "Exclusion Criteria"}}),
            json!({"id": "n1"}),
            json!({"id": "i1", "category": {"decode": "Inclusion Criteria"}}),
            json!({"id": "x2", "category": {"decode": "Exclusion Criteria"}}),
        ];
        assert_eq!(
            segment(&items, "category.decode"),
            vec![vec![0, 3], vec![2], vec![1]]
        );
    }
}
