//! Structural checks of the study envelope and per-design content.
//!
//! These run before the kernel pipeline. Missing envelope levels stop the
//! structural checks (nothing below them can be located) but never the
//! kernel passes, which work on the raw tree.

use crate::navigate::{DesignView, VersionView, field_or_legacy, first_version};
use crate::profile::{CRITERIA_FIELD, StudyProfile};
use serde_json::Value;
use usdm_kernel::tree::{array_field, is_populated};
use usdm_kernel::{Document, Issue, Report};

pub const CLASS_ENVELOPE_FIELD_MISSING: &str = "profile.envelope_field_missing";
pub const CLASS_STUDY_MISSING: &str = "profile.study_missing";
pub const CLASS_STUDY_INSTANCE_TYPE: &str = "profile.study_instance_type";
pub const CLASS_VERSIONS_MISSING: &str = "profile.versions_missing";
pub const CLASS_DESIGNS_MISSING: &str = "profile.designs_missing";
pub const CLASS_DESIGN_INSTANCE_TYPE: &str = "profile.design_instance_type";
pub const CLASS_COLLECTION_MISSING: &str = "profile.collection_missing";
pub const CLASS_PRIMARY_OBJECTIVE_MISSING: &str = "profile.primary_objective_missing";
pub const CLASS_POPULATION_MISSING: &str = "profile.population_missing";
pub const CLASS_INSTANCE_TYPE_MISSING: &str = "profile.instance_type_missing";
pub const CLASS_EXTENSION_ATTRIBUTES_MISSING: &str = "profile.extension_attributes_missing";
pub const CLASS_CODE_FIELD_MISSING: &str = "profile.code_field_missing";
pub const CLASS_STRUCTURE: &str = "profile.structure";

const STUDY_INSTANCE_TYPE: &str = "Study";
const BASE_DESIGN_INSTANCE_TYPE: &str = "StudyDesign";
const CODE_INSTANCE_TYPE: &str = "Code";

fn info(report: &mut Report, message: String) {
    report.push(Issue::info(CLASS_STRUCTURE, message));
}

fn decode_of<'a>(value: &'a Value, field: &str) -> &'a str {
    value
        .get(field)
        .and_then(|code| code.get("decode"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn decode_contains(value: &Value, field: &str, needle: &str) -> bool {
    decode_of(value, field).to_lowercase().contains(needle)
}

/// Envelope, version and design checks; returns the version they ran on.
pub fn check_structure<'a>(document: &Document<'a>, report: &mut Report) -> Option<VersionView<'a>> {
    let root = document.root();
    check_envelope(root, report);

    let Some(study) = root.get("study") else {
        report.push(Issue::blocking(CLASS_STUDY_MISSING, "missing root 'study' object").at("root"));
        return None;
    };

    let instance_type = study.get("instanceType").and_then(Value::as_str);
    if instance_type != Some(STUDY_INSTANCE_TYPE) {
        report.push(
            Issue::blocking(
                CLASS_STUDY_INSTANCE_TYPE,
                format!(
                    "study instanceType should be 'Study', got '{}'",
                    instance_type.unwrap_or("")
                ),
            )
            .at("root.study"),
        );
    }

    let versions = array_field(study, "versions");
    let Some(version) = first_version(root) else {
        report.push(
            Issue::blocking(
                CLASS_VERSIONS_MISSING,
                "study has no 'versions' array (required in v4.0.0)",
            )
            .at("root.study"),
        );
        return None;
    };
    info(report, format!("found {} study version(s)", versions.len()));

    check_version_metadata(&version, report);

    if version.designs.is_empty() {
        report.push(
            Issue::blocking(CLASS_DESIGNS_MISSING, "version has no studyDesigns")
                .at(version.path.clone()),
        );
        return None;
    }
    info(report, format!("found {} study design(s)", version.designs.len()));

    for design in &version.designs {
        check_design(design, report);
    }

    check_version_inventory(&version, report);
    Some(version)
}

fn check_envelope(root: &Value, report: &mut Report) {
    match root.get("usdmVersion").and_then(Value::as_str).filter(|v| !v.is_empty()) {
        Some(version) => info(report, format!("USDM version: {version}")),
        None => report.push(
            Issue::advisory(CLASS_ENVELOPE_FIELD_MISSING, "missing root 'usdmVersion' field")
                .at("root"),
        ),
    }

    match root.get("systemName").and_then(Value::as_str).filter(|v| !v.is_empty()) {
        Some(name) => {
            let system_version = root
                .get("systemVersion")
                .and_then(Value::as_str)
                .unwrap_or("");
            info(report, format!("system: {name} {system_version}").trim_end().to_string());
        }
        None => report.push(
            Issue::advisory(CLASS_ENVELOPE_FIELD_MISSING, "missing root 'systemName' field")
                .at("root"),
        ),
    }
}

fn check_version_metadata(version: &VersionView<'_>, report: &mut Report) {
    let identifiers = array_field(version.value, "studyIdentifiers");
    if identifiers.is_empty() {
        report.push(
            Issue::advisory(CLASS_COLLECTION_MISSING, "version has no studyIdentifiers")
                .at(version.path.clone()),
        );
    } else {
        info(report, format!("found {} study identifier(s)", identifiers.len()));
    }

    let titles = array_field(version.value, "titles");
    if titles.is_empty() {
        report.push(
            Issue::advisory(
                CLASS_COLLECTION_MISSING,
                "version has no titles (expected StudyTitle objects)",
            )
            .at(version.path.clone()),
        );
    } else {
        info(report, format!("found {} title(s)", titles.len()));
        let types: Vec<&str> = titles.iter().map(|title| decode_of(title, "type")).collect();
        info(report, format!("title types: {}", types.join(", ")));
    }

    let organizations = array_field(version.value, "organizations");
    if !organizations.is_empty() {
        info(report, format!("found {} organization(s)", organizations.len()));
    }
}

fn check_design(design: &DesignView<'_>, report: &mut Report) {
    let prefix = design.label();
    let value = design.value;

    let instance_type = value
        .get("instanceType")
        .and_then(Value::as_str)
        .unwrap_or("");
    if instance_type == BASE_DESIGN_INSTANCE_TYPE {
        report.push(
            Issue::advisory(
                CLASS_DESIGN_INSTANCE_TYPE,
                format!(
                    "{prefix}: instanceType is 'StudyDesign'; should be 'InterventionalStudyDesign' (or other subtype)"
                ),
            )
            .at(design.path.clone()),
        );
    } else if instance_type.contains(BASE_DESIGN_INSTANCE_TYPE) {
        info(report, format!("{prefix}: instanceType = '{instance_type}'"));
    } else {
        report.push(
            Issue::advisory(
                CLASS_DESIGN_INSTANCE_TYPE,
                format!("{prefix}: unexpected instanceType '{instance_type}'"),
            )
            .at(design.path.clone()),
        );
    }

    for (field, legacy, required) in [
        ("arms", Some("studyArms"), true),
        ("epochs", Some("studyEpochs"), true),
        ("elements", Some("studyElements"), false),
        ("studyCells", None, false),
        ("encounters", None, false),
        ("activities", None, false),
        ("indications", None, false),
        ("scheduleTimelines", None, false),
    ] {
        let (_, items) = field_or_legacy(value, field, legacy);
        info(report, format!("{prefix}: {} {field}", items.len()));
        if required && items.is_empty() {
            report.push(
                Issue::advisory(CLASS_COLLECTION_MISSING, format!("{prefix}: no {field} defined"))
                    .at(design.path.clone()),
            );
        }
    }

    let model = match value.get("model") {
        Some(model) => Some(model),
        None => value.get("interventionModel"),
    };
    if let Some(model) = model.filter(|model| is_populated(model)) {
        let decode = model.get("decode").and_then(Value::as_str).unwrap_or("");
        info(report, format!("{prefix}: model = '{decode}'"));
    }

    let objectives = array_field(value, "objectives");
    let primary = objectives
        .iter()
        .filter(|objective| decode_contains(objective, "level", "primary"))
        .count();
    info(
        report,
        format!("{prefix}: {} objective(s) ({primary} primary)", objectives.len()),
    );
    if primary == 0 {
        report.push(
            Issue::advisory(
                CLASS_PRIMARY_OBJECTIVE_MISSING,
                format!("{prefix}: no primary objective defined"),
            )
            .at(design.path.clone()),
        );
    }

    if value.get("population").is_some_and(is_populated) {
        info(report, format!("{prefix}: population defined"));
    } else {
        report.push(
            Issue::advisory(
                CLASS_POPULATION_MISSING,
                format!("{prefix}: no population defined"),
            )
            .at(design.path.clone()),
        );
    }

    let criteria = array_field(value, CRITERIA_FIELD);
    let inclusion = criteria
        .iter()
        .filter(|criterion| decode_contains(criterion, "category", "inclusion"))
        .count();
    let exclusion = criteria
        .iter()
        .filter(|criterion| decode_contains(criterion, "category", "exclusion"))
        .count();
    info(
        report,
        format!("{prefix}: {inclusion} inclusion, {exclusion} exclusion criteria"),
    );
}

fn check_version_inventory(version: &VersionView<'_>, report: &mut Report) {
    let criterion_items = array_field(version.value, "eligibilityCriterionItems");
    if !criterion_items.is_empty() {
        info(
            report,
            format!("found {} eligibilityCriterionItem(s)", criterion_items.len()),
        );
    }
    info(
        report,
        format!(
            "version-level: {} intervention(s)",
            array_field(version.value, "studyInterventions").len()
        ),
    );
    info(
        report,
        format!(
            "version-level: {} biomedical concept(s)",
            array_field(version.value, "biomedicalConcepts").len()
        ),
    );
}

/// Whole-tree shape checks: instanceType / extensionAttributes presence and
/// required `Code` fields.
pub fn check_shapes(document: &Document<'_>, profile: &StudyProfile, report: &mut Report) {
    let checks = profile.shape_checks;
    for node in document.visit() {
        let has_id_key = node.object.contains_key("id");
        let has_id = node.get("id").is_some_and(|id| !id.is_null());

        if checks.instance_type && has_id_key && !node.object.contains_key("instanceType") {
            report.push(
                Issue::advisory(
                    CLASS_INSTANCE_TYPE_MISSING,
                    format!("object at {} has 'id' but no 'instanceType'", node.path),
                )
                .at(node.path.clone()),
            );
        }

        if checks.extension_attributes && has_id && !node.object.contains_key("extensionAttributes")
        {
            report.push(
                Issue::advisory(
                    CLASS_EXTENSION_ATTRIBUTES_MISSING,
                    format!("object at {} missing 'extensionAttributes'", node.path),
                )
                .at(node.path.clone()),
            );
        }

        if checks.code_fields && node.instance_type() == Some(CODE_INSTANCE_TYPE) {
            for field in &profile.required_code_fields {
                if !node.get(field).is_some_and(is_populated) {
                    report.push(
                        Issue::blocking(
                            CLASS_CODE_FIELD_MISSING,
                            format!("Code at {} missing required field '{field}'", node.path),
                        )
                        .at(node.path.clone()),
                    );
                }
            }
        }
    }
}
