//! Eligibility criterion text in list order.

use crate::navigate::{DesignView, VersionView, design_collection};
use crate::profile::{CRITERIA_FIELD, CollectionSpec, DEFAULT_SEGMENT_KEY, StudyProfile};
use serde::Serialize;
use serde_json::Value;
use usdm_kernel::linked_list::item_id;
use usdm_kernel::tree::{array_field, lookup_dotted};
use usdm_kernel::{order, resolve_text};

pub const CRITERION_ITEMS_FIELD: &str = "eligibilityCriterionItems";
pub const CRITERION_ITEM_POINTER: &str = "criterionItemId";
pub const CRITERION_ITEM_TEXT: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionText {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub text: String,
}

/// Criteria of one design, ordered segment by segment, with their display
/// text resolved through the version's criterion items.
pub fn criterion_texts(
    version: &VersionView<'_>,
    design: &DesignView<'_>,
    profile: &StudyProfile,
) -> Vec<CriterionText> {
    let fallback = CollectionSpec::plain(CRITERIA_FIELD).segmented_by(DEFAULT_SEGMENT_KEY);
    let spec = profile.collection(CRITERIA_FIELD).unwrap_or(&fallback);
    let Some(collection) = design_collection(design, spec) else {
        return Vec::new();
    };
    let lookup = array_field(version.value, CRITERION_ITEMS_FIELD);

    collection
        .segment_items()
        .iter()
        .flat_map(|segment| order(&collection.name, segment).items)
        .map(|criterion| describe(criterion, lookup))
        .collect()
}

fn describe(criterion: &Value, lookup: &[Value]) -> CriterionText {
    let pointer = criterion
        .get(CRITERION_ITEM_POINTER)
        .and_then(Value::as_str);
    CriterionText {
        id: item_id(criterion).map(String::from),
        category: lookup_dotted(criterion, DEFAULT_SEGMENT_KEY)
            .and_then(Value::as_str)
            .map(String::from),
        text: resolve_text(pointer, lookup, criterion, CRITERION_ITEM_TEXT),
    }
}
