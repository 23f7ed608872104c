//! Display text indirected through an id pointer.
//!
//! Some objects keep their displayable text on a separate item they point
//! to. The item text may carry template markup; placeholders become a
//! literal `[...]` and every other tag is dropped.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

pub const PLACEHOLDER: &str = "[...]";

/// Owner fields tried, in order, when the pointer does not resolve.
pub const FALLBACK_FIELDS: [&str; 3] = ["description", "label", "name"];

fn placeholder_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<usdm:tag[^/]*/?>").expect("placeholder regex must compile"))
}

fn markup_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("markup regex must compile"))
}

/// Replace placeholder tags with `[...]`, drop other markup, trim.
pub fn strip_markup(text: &str) -> String {
    let with_placeholders = placeholder_tag_re().replace_all(text, PLACEHOLDER);
    markup_tag_re()
        .replace_all(&with_placeholders, "")
        .trim()
        .to_string()
}

fn non_empty_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// Resolve display text for `owner`.
///
/// When `pointer` names an item in `lookup` whose `text_field` is a
/// non-empty string, that text (markup stripped) wins. Otherwise the first
/// non-empty of the owner's description, label and name, else "".
pub fn resolve_text(
    pointer: Option<&str>,
    lookup: &[Value],
    owner: &Value,
    text_field: &str,
) -> String {
    let resolved = pointer
        .filter(|id| !id.is_empty())
        .and_then(|id| {
            lookup
                .iter()
                .find(|item| item.get("id").and_then(Value::as_str) == Some(id))
        })
        .and_then(|item| non_empty_str(item, text_field));

    if let Some(text) = resolved {
        return strip_markup(text);
    }

    FALLBACK_FIELDS
        .iter()
        .find_map(|field| non_empty_str(owner, field))
        .unwrap_or_default()
        .to_string()
}
