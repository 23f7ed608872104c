//! Findings about a document.

use serde::{Deserialize, Serialize};

pub const CLASS_IDENTITY_DUPLICATE: &str = "identity.duplicate";
pub const CLASS_IDENTITY_NON_STRING: &str = "identity.non_string";
pub const CLASS_REFERENCE_ORPHAN: &str = "reference.orphan";
pub const CLASS_LIST_NO_HEAD: &str = "list.no_head";
pub const CLASS_LIST_DANGLING_NEXT: &str = "list.dangling_next";
pub const CLASS_LIST_DANGLING_PREVIOUS: &str = "list.dangling_previous";
pub const CLASS_DRIFT_LEGACY_FIELD: &str = "drift.legacy_field";
pub const CLASS_SUMMARY: &str = "summary";

/// How much a finding matters for acceptance.
///
/// Declared in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The document must be rejected.
    Blocking,
    /// Usable but non-conformant.
    Advisory,
    /// Counts and discovered structure.
    Informational,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blocking => "blocking",
            Severity::Advisory => "advisory",
            Severity::Informational => "informational",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Blocking => "BLOCK",
            Severity::Advisory => "WARN",
            Severity::Informational => "INFO",
        }
    }
}

/// One finding. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    severity: Severity,
    class: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl Issue {
    pub fn new(severity: Severity, class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            class: class.into(),
            message: message.into(),
            path: None,
        }
    }

    pub fn blocking(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Blocking, class, message)
    }

    pub fn advisory(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Advisory, class, message)
    }

    pub fn info(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Informational, class, message)
    }

    /// Attach the document location the finding is about.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}
