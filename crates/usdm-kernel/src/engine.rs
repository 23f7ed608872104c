//! The validation pipeline.
//!
//! ```text
//!            ┌── identity index ──┐
//! Document ──┼── references ──────┼── orphans ──┐
//!            └── drift ───────────┘             │
//! Collections ── order + check (each alone) ────┼── Report
//! ```
//!
//! The three tree passes only read the document, so they run on scoped
//! threads. Issues are assembled in a fixed order regardless of which pass
//! finishes first: identity, orphans, collections (request order), drift.

use crate::drift::{DriftRule, detect_drift};
use crate::identity::{IdentityIndex, build_index};
use crate::issue::{CLASS_LIST_NO_HEAD, CLASS_SUMMARY, Issue};
use crate::linked_list::{check_list, order};
use crate::reference::{Reference, extract_references};
use crate::report::Report;
use crate::tree::{Document, index_path};
use crate::xref::find_orphans;
use serde_json::Value;
use std::collections::BTreeMap;
use std::thread;

/// One group of same-kind linked items to order.
///
/// `items` stay in document order, so issue paths index the document
/// array. A collection may be partitioned into segments (index lists into
/// `items`) that each form their own list, for example inclusion and
/// exclusion criteria. Segments are ordered one by one and concatenated;
/// pointer integrity is checked over the whole collection.
#[derive(Debug, Clone)]
pub struct Collection<'a> {
    pub name: String,
    pub items: Vec<&'a Value>,
    pub segments: Vec<Vec<usize>>,
}

impl<'a> Collection<'a> {
    pub fn new(name: impl Into<String>, items: Vec<&'a Value>) -> Self {
        let segments = vec![(0..items.len()).collect()];
        Self {
            name: name.into(),
            items,
            segments,
        }
    }

    /// Out-of-range indices are ignored; items no segment names form a
    /// trailing segment.
    pub fn segmented(
        name: impl Into<String>,
        items: Vec<&'a Value>,
        segments: Vec<Vec<usize>>,
    ) -> Self {
        let mut covered = vec![false; items.len()];
        let mut segments: Vec<Vec<usize>> = segments
            .into_iter()
            .map(|segment| {
                segment
                    .into_iter()
                    .filter(|&index| index < items.len() && !std::mem::replace(&mut covered[index], true))
                    .collect::<Vec<_>>()
            })
            .filter(|segment| !segment.is_empty())
            .collect();
        let rest: Vec<usize> = (0..items.len()).filter(|&index| !covered[index]).collect();
        if !rest.is_empty() {
            segments.push(rest);
        }
        Self {
            name: name.into(),
            items,
            segments,
        }
    }

    /// Items of each segment, in document order within the segment.
    pub fn segment_items(&self) -> Vec<Vec<&'a Value>> {
        self.segments
            .iter()
            .map(|segment| segment.iter().map(|&index| self.items[index]).collect())
            .collect()
    }
}

/// Result of ordering one collection.
#[derive(Debug, Clone)]
pub struct OrderedCollection<'a> {
    pub name: String,
    pub items: Vec<&'a Value>,
}

impl OrderedCollection<'_> {
    pub fn ids(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| crate::linked_list::item_id(item))
            .collect()
    }
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct EngineOutcome<'a> {
    pub report: Report,
    pub index: IdentityIndex,
    pub references: Vec<Reference>,
    pub collections: Vec<OrderedCollection<'a>>,
}

impl<'a> EngineOutcome<'a> {
    pub fn collection(&self, name: &str) -> Option<&OrderedCollection<'a>> {
        self.collections
            .iter()
            .find(|collection| collection.name == name)
    }

    /// Ordered ids keyed by collection name.
    pub fn ordered_ids(&self) -> BTreeMap<&str, Vec<&str>> {
        self.collections
            .iter()
            .map(|collection| (collection.name.as_str(), collection.ids()))
            .collect()
    }
}

/// Stateless pipeline configured with a drift table.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    drift_rules: Vec<DriftRule>,
}

impl Engine {
    pub fn new(drift_rules: Vec<DriftRule>) -> Self {
        Self { drift_rules }
    }

    pub fn run<'a>(
        &self,
        document: &Document<'a>,
        collections: &[Collection<'a>],
    ) -> EngineOutcome<'a> {
        let (identity, references, drift) = thread::scope(|scope| {
            let identity = scope.spawn(|| build_index(document.visit()));
            let references = scope.spawn(|| extract_references(document.visit()));
            let drift = scope.spawn(|| detect_drift(document.visit(), &self.drift_rules));
            (
                join_pass(identity),
                join_pass(references),
                join_pass(drift),
            )
        });

        let orphans = find_orphans(&identity.index, &references);

        let mut report = Report::new();
        report.push(Issue::info(
            CLASS_SUMMARY,
            format!("{} identities indexed", identity.index.len()),
        ));
        report.extend(identity.issues);

        if orphans.is_empty() {
            report.push(Issue::info(
                CLASS_SUMMARY,
                format!("all {} cross-references are valid", references.len()),
            ));
        } else {
            report.push(Issue::info(
                CLASS_SUMMARY,
                format!(
                    "{} of {} cross-references are broken",
                    orphans.len(),
                    references.len()
                ),
            ));
        }
        report.extend(orphans);

        let mut ordered = Vec::with_capacity(collections.len());
        for collection in collections {
            let (result, issues) = run_collection(collection);
            report.extend(issues);
            ordered.push(result);
        }

        report.extend(drift);

        tracing::debug!(
            issues = report.len(),
            acceptable = report.is_acceptable(),
            "engine run complete"
        );
        EngineOutcome {
            report,
            index: identity.index,
            references,
            collections: ordered,
        }
    }
}

fn join_pass<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(value) => value,
        // A pass only reads the tree; a panic there is a bug, surface it.
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

/// Order and check one collection.
///
/// The integrity check runs over the whole collection in document order;
/// ordering runs per segment. A collection without any head gets one
/// advisory from the integrity check. Otherwise each segment that lacks its
/// own head gets one, pointing at the segment's first item.
fn run_collection<'a>(collection: &Collection<'a>) -> (OrderedCollection<'a>, Vec<Issue>) {
    let mut issues = check_list(&collection.name, &collection.items);
    let collection_headless = issues
        .iter()
        .any(|issue| issue.class() == CLASS_LIST_NO_HEAD);

    let mut items = Vec::with_capacity(collection.items.len());
    for (number, segment) in collection.segments.iter().enumerate() {
        let members: Vec<&'a Value> = segment.iter().map(|&index| collection.items[index]).collect();
        let segment_order = order(&collection.name, &members);
        if !collection_headless
            && !segment_order.issues.is_empty()
            && let Some(&first) = segment.first()
        {
            issues.push(
                Issue::advisory(
                    CLASS_LIST_NO_HEAD,
                    format!(
                        "{}: segment {number} has no linked-list head (no item with previousId=null)",
                        collection.name
                    ),
                )
                .at(index_path(&collection.name, first)),
            );
        }
        items.extend(segment_order.items);
    }

    (
        OrderedCollection {
            name: collection.name.clone(),
            items,
        },
        issues,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::DriftScope;
    use crate::issue::{CLASS_LIST_DANGLING_NEXT, Severity};
    use serde_json::json;

    #[test]
    fn collection_failures_do_not_block_other_collections() {
        let tree = json!({
            "epochs": [
                {"id": "e2", "previousId": "e1"},
                {"id": "e1", "nextId": "e2"}
            ],
            "encounters": [
                {"id": "v1", "previousId": "v9", "nextId": "v9"}
            ]
        });
        let document = Document::new(&tree).expect("object root");
        let epochs: Vec<&Value> = tree["epochs"].as_array().expect("array").iter().collect();
        let encounters: Vec<&Value> = tree["encounters"]
            .as_array()
            .expect("array")
            .iter()
            .collect();
        let outcome = Engine::default().run(
            &document,
            &[
                Collection::new("epochs", epochs),
                Collection::new("encounters", encounters),
            ],
        );

        assert_eq!(outcome.ordered_ids()["epochs"], vec!["e1", "e2"]);
        assert_eq!(outcome.ordered_ids()["encounters"], vec!["v1"]);
        assert!(!outcome.report.is_acceptable());
    }

    #[test]
    fn unsegmented_no_head_is_reported_once() {
        let tree = json!({"items": [{"id": "a", "previousId": "b"}, {"id": "b", "previousId": "a"}]});
        let document = Document::new(&tree).expect("object root");
        let items: Vec<&Value> = tree["items"].as_array().expect("array").iter().collect();
        let outcome = Engine::default().run(&document, &[Collection::new("items", items)]);
        let no_head = outcome
            .report
            .issues()
            .iter()
            .filter(|issue| issue.class() == CLASS_LIST_NO_HEAD)
            .count();
        assert_eq!(no_head, 1);
    }

    fn no_head_count(outcome: &EngineOutcome<'_>) -> usize {
        outcome
            .report
            .issues()
            .iter()
            .filter(|issue| issue.class() == CLASS_LIST_NO_HEAD)
            .count()
    }

    #[test]
    fn segments_are_ordered_independently() {
        let tree = json!({"criteria": [
            {"id": "x2", "previousId": "x1", "kind": "exc"},
            {"id": "i2", "previousId": "i1", "kind": "inc"},
            {"id": "x1", "nextId": "x2", "kind": "exc"},
            {"id": "i1", "nextId": "i2", "kind": "inc"}
        ]});
        let document = Document::new(&tree).expect("object root");
        let all: Vec<&Value> = tree["criteria"].as_array().expect("array").iter().collect();
        let outcome = Engine::default().run(
            &document,
            &[Collection::segmented("criteria", all, vec![vec![1, 3], vec![0, 2]])],
        );
        assert_eq!(
            outcome.ordered_ids()["criteria"],
            vec!["i1", "i2", "x1", "x2"]
        );
        assert!(outcome.report.is_acceptable());
    }

    #[test]
    fn segmented_pointer_issues_use_document_index() {
        let tree = json!({"criteria": [
            {"id": "IN1", "nextId": "IN2"},
            {"id": "EX1"},
            {"id": "IN2", "previousId": "IN1", "nextId": "GONE"}
        ]});
        let document = Document::new(&tree).expect("object root");
        let all: Vec<&Value> = tree["criteria"].as_array().expect("array").iter().collect();
        let outcome = Engine::default().run(
            &document,
            &[Collection::segmented("criteria", all, vec![vec![0, 2], vec![1]])],
        );
        let dangling: Vec<Option<&str>> = outcome
            .report
            .issues()
            .iter()
            .filter(|issue| issue.class() == CLASS_LIST_DANGLING_NEXT)
            .map(|issue| issue.path())
            .collect();
        assert_eq!(dangling, vec![Some("criteria[2].nextId")]);
        assert_eq!(outcome.ordered_ids()["criteria"], vec!["IN1", "IN2", "EX1"]);
    }

    #[test]
    fn headless_collection_gets_one_advisory_segmented_or_not() {
        let tree = json!({"criteria": [
            {"id": "A", "previousId": "B"},
            {"id": "B", "previousId": "A"}
        ]});
        let document = Document::new(&tree).expect("object root");
        let all: Vec<&Value> = tree["criteria"].as_array().expect("array").iter().collect();

        let plain = Engine::default().run(&document, &[Collection::new("criteria", all.clone())]);
        let split = Engine::default().run(
            &document,
            &[Collection::segmented("criteria", all, vec![vec![0], vec![1]])],
        );
        assert_eq!(no_head_count(&plain), 1);
        assert_eq!(no_head_count(&split), 1);
    }

    #[test]
    fn headless_segment_is_reported_at_its_first_item() {
        let tree = json!({"criteria": [
            {"id": "I1", "nextId": "I2"},
            {"id": "X1", "previousId": "X2"},
            {"id": "I2", "previousId": "I1"},
            {"id": "X2", "previousId": "X1"}
        ]});
        let document = Document::new(&tree).expect("object root");
        let all: Vec<&Value> = tree["criteria"].as_array().expect("array").iter().collect();
        let outcome = Engine::default().run(
            &document,
            &[Collection::segmented("criteria", all, vec![vec![0, 2], vec![1, 3]])],
        );
        let no_head: Vec<Option<&str>> = outcome
            .report
            .issues()
            .iter()
            .filter(|issue| issue.class() == CLASS_LIST_NO_HEAD)
            .map(|issue| issue.path())
            .collect();
        assert_eq!(no_head, vec![Some("criteria[1]")]);
    }

    #[test]
    fn segments_cover_every_item_once() {
        let tree = json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]);
        let all: Vec<&Value> = tree.as_array().expect("array").iter().collect();
        let collection = Collection::segmented("c", all, vec![vec![2, 2, 9], vec![]]);
        assert_eq!(collection.segments, vec![vec![2], vec![0, 1]]);
    }

    #[test]
    fn pipeline_order_is_identity_orphans_collections_drift() {
        let tree = json!({
            "id": "S1",
            "dup": [{"id": "S1"}],
            "legacy": {"oldName": 1},
            "ref": {"armId": "missing"},
            "list": [{"id": "l1", "previousId": "l0"}]
        });
        let document = Document::new(&tree).expect("object root");
        let list: Vec<&Value> = tree["list"].as_array().expect("array").iter().collect();
        let engine = Engine::new(vec![DriftRule::renamed(
            "oldName",
            "newName",
            DriftScope::default(),
        )]);
        let outcome = engine.run(&document, &[Collection::new("list", list)]);

        let classes: Vec<&str> = outcome
            .report
            .issues()
            .iter()
            .filter(|issue| issue.severity() != Severity::Informational)
            .map(|issue| issue.class())
            .collect();
        assert_eq!(
            classes,
            vec![
                "identity.duplicate",
                "reference.orphan",
                "reference.orphan",
                "list.no_head",
                "list.dangling_previous",
                "drift.legacy_field",
            ]
        );
    }
}
