//! Study profile: which collections are ordered, which legacy fields are
//! flagged, and which shape checks run.
//!
//! The built-in profile targets USDM v4.0.0. A TOML file can replace any
//! top-level section:
//!
//! ```toml
//! requiredCodeFields = ["code", "decode"]
//!
//! [shapeChecks]
//! extensionAttributes = false
//!
//! [[collections]]
//! field = "epochs"
//! legacyField = "studyEpochs"
//!
//! [[driftRules]]
//! legacy = "studyArms"
//! current = "arms"
//! scope = { instanceTypes = ["*StudyDesign"], containers = ["studyDesigns"] }
//! ```

use crate::error::StudyError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use usdm_kernel::{DriftRule, DriftScope};

pub const CRITERIA_FIELD: &str = "eligibilityCriteria";
pub const DEFAULT_SEGMENT_KEY: &str = "category.decode";

/// One per-design array whose items form a linked list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSpec {
    pub field: String,
    /// Field read instead when `field` is absent.
    #[serde(default)]
    pub legacy_field: Option<String>,
    /// Dotted path whose value splits the collection into separate lists.
    #[serde(default)]
    pub segment_by: Option<String>,
}

impl CollectionSpec {
    pub fn plain(field: &str) -> Self {
        Self {
            field: field.to_string(),
            legacy_field: None,
            segment_by: None,
        }
    }

    pub fn with_legacy(mut self, legacy_field: &str) -> Self {
        self.legacy_field = Some(legacy_field.to_string());
        self
    }

    pub fn segmented_by(mut self, key: &str) -> Self {
        self.segment_by = Some(key.to_string());
        self
    }
}

/// Whole-tree shape checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeChecks {
    /// Objects with an `id` must carry `instanceType`.
    pub instance_type: bool,
    /// Objects with a non-null `id` must carry `extensionAttributes`.
    pub extension_attributes: bool,
    /// `Code` objects must populate every required code field.
    pub code_fields: bool,
}

impl Default for ShapeChecks {
    fn default() -> Self {
        Self {
            instance_type: true,
            extension_attributes: true,
            code_fields: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyProfile {
    pub drift_rules: Vec<DriftRule>,
    pub collections: Vec<CollectionSpec>,
    pub required_code_fields: Vec<String>,
    pub shape_checks: ShapeChecks,
}

impl Default for StudyProfile {
    fn default() -> Self {
        Self {
            drift_rules: default_drift_rules(),
            collections: default_collections(),
            required_code_fields: ["code", "codeSystem", "decode"]
                .into_iter()
                .map(String::from)
                .collect(),
            shape_checks: ShapeChecks::default(),
        }
    }
}

impl StudyProfile {
    pub fn from_toml_str(text: &str) -> Result<Self, StudyError> {
        Self::parse_toml(text, "<inline>")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StudyError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StudyError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_toml(&text, &path.display().to_string())
    }

    fn parse_toml(text: &str, origin: &str) -> Result<Self, StudyError> {
        let profile: Self = toml::from_str(text).map_err(|source| StudyError::ParseToml {
            path: origin.to_string(),
            source,
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reject rules and collections that could never match anything.
    pub fn validate(&self) -> Result<(), StudyError> {
        for (index, rule) in self.drift_rules.iter().enumerate() {
            if rule.legacy.trim().is_empty() {
                return Err(StudyError::InvalidProfile(format!(
                    "driftRules[{index}].legacy must be non-empty"
                )));
            }
            if rule.current.as_deref() == Some(rule.legacy.as_str()) {
                return Err(StudyError::InvalidProfile(format!(
                    "driftRules[{index}] maps '{}' onto itself",
                    rule.legacy
                )));
            }
        }
        for (index, collection) in self.collections.iter().enumerate() {
            if collection.field.trim().is_empty() {
                return Err(StudyError::InvalidProfile(format!(
                    "collections[{index}].field must be non-empty"
                )));
            }
        }
        Ok(())
    }

    pub fn collection(&self, field: &str) -> Option<&CollectionSpec> {
        self.collections
            .iter()
            .find(|collection| collection.field == field)
    }
}

pub fn default_collections() -> Vec<CollectionSpec> {
    vec![
        CollectionSpec::plain("epochs").with_legacy("studyEpochs"),
        CollectionSpec::plain("encounters"),
        CollectionSpec::plain("activities"),
        CollectionSpec::plain(CRITERIA_FIELD).segmented_by(DEFAULT_SEGMENT_KEY),
    ]
}

fn design_scope() -> DriftScope {
    DriftScope::instance_types(["*StudyDesign"]).with_containers(["studyDesigns"])
}

/// Legacy field names of earlier study-definition revisions.
pub fn default_drift_rules() -> Vec<DriftRule> {
    let identifier = DriftScope::instance_types(["StudyIdentifier"])
        .with_containers(["studyIdentifiers"]);
    let arm = DriftScope::instance_types(["StudyArm"]).with_containers(["arms", "studyArms"]);
    let encounter = DriftScope::instance_types(["Encounter"]).with_containers(["encounters"]);
    let epoch = DriftScope::instance_types(["StudyEpoch"]).with_containers(["epochs", "studyEpochs"]);
    let objective = DriftScope::instance_types(["Objective"]).with_containers(["objectives"]);
    let criterion = DriftScope::instance_types(["EligibilityCriterion"])
        .with_containers([CRITERIA_FIELD]);

    vec![
        DriftRule::renamed("studyArms", "arms", design_scope()),
        DriftRule::renamed("studyEpochs", "epochs", design_scope()),
        DriftRule::renamed("studyElements", "elements", design_scope()),
        DriftRule::renamed("interventionModel", "model", design_scope()),
        DriftRule::renamed("trialIntentTypes", "intentTypes", design_scope()),
        DriftRule::renamed("trialTypes", "subTypes", design_scope()),
        DriftRule::renamed("populations", "population", design_scope()),
        DriftRule::retired(
            "studyInterventions",
            design_scope(),
            "interventions belong on the study version",
        ),
        DriftRule::retired(
            "endpoints",
            design_scope(),
            "endpoints should be embedded in objectives",
        ),
        DriftRule::renamed("studyIdentifier", "text", identifier.clone()),
        DriftRule::renamed("studyIdentifierScope", "scopeId", identifier),
        DriftRule::renamed("armType", "type", arm),
        DriftRule::renamed("encounterType", "type", encounter),
        DriftRule::retired(
            "sequenceNumber",
            epoch,
            "order epochs with the previousId/nextId linked list",
        ),
        DriftRule::retired(
            "endpointIds",
            objective,
            "endpoints should be embedded directly",
        ),
        DriftRule::renamed("text", "criterionItemId", criterion),
    ]
}
