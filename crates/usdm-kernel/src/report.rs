//! Deterministic issue accumulation and rendering.

use crate::issue::{Issue, Severity};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;

pub const CHECK_KIND: &str = "usdm.integrity.check.v1";

const RESULT_ACCEPTED: &str = "accepted";
const RESULT_REJECTED: &str = "rejected";

/// Ordered collection of findings for one validation run.
///
/// Detection order is kept; rendering groups by severity without reordering
/// within a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    issues: Vec<Issue>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub blocking_count: usize,
    pub advisory_count: usize,
    pub informational_count: usize,
}

/// Serializable projection of a [`Report`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub check_kind: String,
    pub result: String,
    pub blocking_classes: Vec<String>,
    pub advisory_classes: Vec<String>,
    pub summary: ReportSummary,
    pub blocking: Vec<Issue>,
    pub advisory: Vec<Issue>,
    pub informational: Vec<Issue>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    /// Append every issue of `other`, keeping its order.
    pub fn merge(&mut self, other: Report) {
        self.issues.extend(other.issues);
    }

    /// All issues in detection order.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity() == severity)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.with_severity(severity).count()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            blocking_count: self.count(Severity::Blocking),
            advisory_count: self.count(Severity::Advisory),
            informational_count: self.count(Severity::Informational),
        }
    }

    /// Acceptable exactly when nothing blocks.
    pub fn is_acceptable(&self) -> bool {
        !self.issues.iter().any(Issue::is_blocking)
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    fn classes(&self, severity: Severity) -> Vec<String> {
        self.with_severity(severity)
            .map(|issue| issue.class().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn collect(&self, severity: Severity) -> Vec<Issue> {
        self.with_severity(severity).cloned().collect()
    }

    pub fn to_check_report(&self) -> CheckReport {
        CheckReport {
            check_kind: CHECK_KIND.to_string(),
            result: if self.is_acceptable() {
                RESULT_ACCEPTED.to_string()
            } else {
                RESULT_REJECTED.to_string()
            },
            blocking_classes: self.classes(Severity::Blocking),
            advisory_classes: self.classes(Severity::Advisory),
            summary: self.summary(),
            blocking: self.collect(Severity::Blocking),
            advisory: self.collect(Severity::Advisory),
            informational: self.collect(Severity::Informational),
        }
    }

    /// Stable text rendering: header line, then blocking, advisory and
    /// informational issues, each in detection order.
    pub fn render(&self) -> String {
        let summary = self.summary();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "[usdm-check] {} (blocking={}, advisory={}, informational={})",
            if self.is_acceptable() { "OK" } else { "FAIL" },
            summary.blocking_count,
            summary.advisory_count,
            summary.informational_count
        );
        for severity in [
            Severity::Blocking,
            Severity::Advisory,
            Severity::Informational,
        ] {
            for issue in self.with_severity(severity) {
                let _ = write!(
                    out,
                    "  - {} {}: {}",
                    severity.label(),
                    issue.class(),
                    issue.message()
                );
                if let Some(path) = issue.path() {
                    let _ = write!(out, " (at {path})");
                }
                out.push('\n');
            }
        }
        out
    }
}

impl FromIterator<Issue> for Report {
    fn from_iter<I: IntoIterator<Item = Issue>>(iter: I) -> Self {
        Self {
            issues: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{CLASS_IDENTITY_DUPLICATE, CLASS_REFERENCE_ORPHAN, CLASS_SUMMARY};

    fn sample() -> Report {
        let mut report = Report::new();
        report.push(Issue::info(CLASS_SUMMARY, "3 identities"));
        report.push(Issue::advisory(CLASS_IDENTITY_DUPLICATE, "duplicate id 'E1'").at("root.b"));
        report.push(Issue::blocking(CLASS_REFERENCE_ORPHAN, "'a9' not found").at("root.armId"));
        report.push(Issue::info(CLASS_SUMMARY, "1 reference"));
        report
    }

    #[test]
    fn acceptance_tracks_blocking_issues() {
        let mut report = Report::new();
        report.push(Issue::advisory(CLASS_IDENTITY_DUPLICATE, "dup"));
        assert!(report.is_acceptable());
        report.push(Issue::blocking(CLASS_REFERENCE_ORPHAN, "orphan"));
        assert!(!report.is_acceptable());
    }

    #[test]
    fn summary_counts_each_severity() {
        let summary = sample().summary();
        assert_eq!(summary.blocking_count, 1);
        assert_eq!(summary.advisory_count, 1);
        assert_eq!(summary.informational_count, 2);
    }

    #[test]
    fn check_report_lists_distinct_classes() {
        let check = sample().to_check_report();
        assert_eq!(check.result, "rejected");
        assert_eq!(check.blocking_classes, vec![CLASS_REFERENCE_ORPHAN]);
        assert_eq!(check.advisory_classes, vec![CLASS_IDENTITY_DUPLICATE]);
        assert_eq!(check.informational.len(), 2);
    }

    #[test]
    fn render_groups_by_severity_in_detection_order() {
        insta::assert_snapshot!(sample().render(), @r"
        [usdm-check] FAIL (blocking=1, advisory=1, informational=2)
          - BLOCK reference.orphan: 'a9' not found (at root.armId)
          - WARN identity.duplicate: duplicate id 'E1' (at root.b)
          - INFO summary: 3 identities
          - INFO summary: 1 reference
        ");
    }
}
