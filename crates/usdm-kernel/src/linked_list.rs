//! Distributed linked lists: order encoded by `previousId` / `nextId`.
//!
//! Sibling objects of one kind sit in an array whose position carries no
//! meaning. Each item names its neighbours instead. Ordering and integrity
//! checking are separate operations so a collection can still be ordered
//! when its pointers are broken.
//!
//! A pointer is *unset* when it is absent, null, not a string, or empty.

use crate::issue::{
    CLASS_LIST_DANGLING_NEXT, CLASS_LIST_DANGLING_PREVIOUS, CLASS_LIST_NO_HEAD, Issue,
};
use crate::tree::index_path;
use serde_json::Value;
use std::collections::HashMap;

pub const PREVIOUS_FIELD: &str = "previousId";
pub const NEXT_FIELD: &str = "nextId";

fn pointer<'a>(item: &'a Value, field: &str) -> Option<&'a str> {
    item.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

pub fn item_id(item: &Value) -> Option<&str> {
    pointer(item, "id")
}

pub fn previous_id(item: &Value) -> Option<&str> {
    pointer(item, PREVIOUS_FIELD)
}

pub fn next_id(item: &Value) -> Option<&str> {
    pointer(item, NEXT_FIELD)
}

/// Whether an item starts a list.
pub fn is_head(item: &Value) -> bool {
    previous_id(item).is_none()
}

/// Display label for an item in messages.
fn item_label(item: &Value, position: usize) -> String {
    match item_id(item) {
        Some(id) => format!("'{id}'"),
        None => format!("#{position}"),
    }
}

/// id → position of its first occurrence within the collection.
fn positions_by_id<'a>(items: &[&'a Value]) -> HashMap<&'a str, usize> {
    let mut positions = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().copied().enumerate() {
        if let Some(id) = item_id(item) {
            positions.entry(id).or_insert(position);
        }
    }
    positions
}

fn no_head_issue(name: &str) -> Issue {
    Issue::advisory(
        CLASS_LIST_NO_HEAD,
        format!("{name}: no linked-list head found (no item with previousId=null)"),
    )
    .at(name.to_string())
}

/// Best-effort visiting order of one collection.
#[derive(Debug, Clone, Default)]
pub struct ListOrder<'a> {
    pub items: Vec<&'a Value>,
    pub issues: Vec<Issue>,
}

impl ListOrder<'_> {
    /// Ids of the ordered items; items without an id are skipped.
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().filter_map(|item| item_id(item)).collect()
    }
}

/// Reconstruct the visiting order of `items`.
///
/// Starts at the first head in input order and follows `nextId` until the
/// pointer is unset, unresolvable, or revisits an item. Items the walk never
/// reached follow in input order. The output is always a permutation of the
/// input. With no head at all, the input order is returned unchanged along
/// with an advisory.
pub fn order<'a>(name: &str, items: &[&'a Value]) -> ListOrder<'a> {
    if items.is_empty() {
        return ListOrder::default();
    }

    let Some(start) = items.iter().position(|item| is_head(item)) else {
        tracing::warn!(collection = name, items = items.len(), "no list head");
        return ListOrder {
            items: items.to_vec(),
            issues: vec![no_head_issue(name)],
        };
    };

    let positions = positions_by_id(items);
    let mut visited = vec![false; items.len()];
    let mut ordered = Vec::with_capacity(items.len());
    let mut cursor = Some(start);

    while let Some(position) = cursor {
        if visited[position] {
            break;
        }
        visited[position] = true;
        ordered.push(items[position]);
        cursor = next_id(items[position]).and_then(|next| positions.get(next).copied());
    }

    let reached = ordered.len();
    ordered.extend(
        items
            .iter()
            .zip(&visited)
            .filter(|(_, seen)| !**seen)
            .map(|(item, _)| *item),
    );

    tracing::debug!(
        collection = name,
        items = items.len(),
        reached,
        "collection ordered"
    );
    ListOrder {
        items: ordered,
        issues: Vec::new(),
    }
}

/// Pointer integrity of one collection, independent of ordering.
///
/// Every set pointer must resolve to an item of the same collection; a
/// dangling pointer is blocking. A collection without any head gets the
/// same advisory `order` reports.
pub fn check_list(name: &str, items: &[&Value]) -> Vec<Issue> {
    let mut issues = Vec::new();
    if items.is_empty() {
        return issues;
    }

    let positions = positions_by_id(items);
    if !items.iter().any(|item| is_head(item)) {
        issues.push(no_head_issue(name));
    }

    for (position, item) in items.iter().enumerate() {
        let label = item_label(item, position);
        let path = index_path(name, position);
        if let Some(next) = next_id(item)
            && !positions.contains_key(next)
        {
            issues.push(
                Issue::blocking(
                    CLASS_LIST_DANGLING_NEXT,
                    format!("{name}: item {label} has nextId '{next}' that doesn't exist"),
                )
                .at(format!("{path}.{NEXT_FIELD}")),
            );
        }
        if let Some(previous) = previous_id(item)
            && !positions.contains_key(previous)
        {
            issues.push(
                Issue::blocking(
                    CLASS_LIST_DANGLING_PREVIOUS,
                    format!("{name}: item {label} has previousId '{previous}' that doesn't exist"),
                )
                .at(format!("{path}.{PREVIOUS_FIELD}")),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn refs(values: &[Value]) -> Vec<&Value> {
        values.iter().collect()
    }

    #[test]
    fn empty_collection_orders_to_empty() {
        let result = order("epochs", &[]);
        assert!(result.items.is_empty());
        assert!(result.issues.is_empty());
        assert!(check_list("epochs", &[]).is_empty());
    }

    #[test]
    fn reversed_input_orders_head_to_tail() {
        let values = vec![
            json!({"id": "e2", "previousId": "e1", "nextId": null}),
            json!({"id": "e1", "previousId": null, "nextId": "e2"}),
        ];
        let items = refs(&values);
        let result = order("epochs", &items);
        assert_eq!(result.ids(), vec!["e1", "e2"]);
        assert!(result.issues.is_empty());
        assert!(check_list("epochs", &items).is_empty());
    }

    #[test]
    fn cycle_terminates_and_keeps_each_item_once() {
        let values = vec![
            json!({"id": "A", "nextId": "B"}),
            json!({"id": "B", "previousId": "A", "nextId": "A"}),
        ];
        let result = order("loop", &refs(&values));
        assert_eq!(result.ids(), vec!["A", "B"]);
    }

    #[test]
    fn pure_cycle_without_head_falls_back_to_input_order() {
        let values = vec![
            json!({"id": "B", "previousId": "A", "nextId": "A"}),
            json!({"id": "A", "previousId": "B", "nextId": "B"}),
        ];
        let items = refs(&values);
        let result = order("loop", &items);
        assert_eq!(result.ids(), vec!["B", "A"]);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].class(), CLASS_LIST_NO_HEAD);

        let checked = check_list("loop", &items);
        assert_eq!(checked.len(), 1);
        assert_eq!(checked[0].class(), CLASS_LIST_NO_HEAD);
    }

    #[test]
    fn multiple_heads_start_at_first_and_keep_everything() {
        let values = vec![
            json!({"id": "x1", "previousId": null, "nextId": "x2"}),
            json!({"id": "y1", "previousId": null, "nextId": "y2"}),
            json!({"id": "y2", "previousId": "y1"}),
            json!({"id": "x2", "previousId": "x1"}),
        ];
        let items = refs(&values);
        let result = order("criteria", &items);
        assert_eq!(result.ids(), vec!["x1", "x2", "y1", "y2"]);
        assert!(result.issues.is_empty());
        assert!(check_list("criteria", &items).is_empty());
    }

    #[test]
    fn dangling_next_stops_walk_and_is_blocking() {
        let values = vec![
            json!({"id": "e1", "nextId": "missing"}),
            json!({"id": "e2", "previousId": "e1"}),
        ];
        let items = refs(&values);
        let result = order("epochs", &items);
        assert_eq!(result.ids(), vec!["e1", "e2"]);

        let issues = check_list("epochs", &items);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].class(), CLASS_LIST_DANGLING_NEXT);
        assert!(issues[0].is_blocking());
        assert_eq!(issues[0].path(), Some("epochs[0].nextId"));
    }

    #[test]
    fn dangling_previous_is_blocking() {
        let values = vec![
            json!({"id": "e1", "nextId": "e2"}),
            json!({"id": "e2", "previousId": "gone"}),
        ];
        let issues = check_list("epochs", &refs(&values));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].class(), CLASS_LIST_DANGLING_PREVIOUS);
        assert!(issues[0].message().contains("'e2'"));
    }

    #[test]
    fn empty_string_pointers_are_unset() {
        let values = vec![
            json!({"id": "e1", "previousId": "", "nextId": ""}),
            json!({"id": "e0", "previousId": "", "nextId": "e1"}),
        ];
        let items = refs(&values);
        assert_eq!(order("epochs", &items).ids(), vec!["e1", "e0"]);
        assert!(check_list("epochs", &items).is_empty());
    }

    #[test]
    fn items_without_ids_survive_ordering() {
        let values = vec![json!({"name": "anonymous"}), json!({"id": "e1"})];
        let result = order("epochs", &refs(&values));
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0], &values[0]);
    }
}
