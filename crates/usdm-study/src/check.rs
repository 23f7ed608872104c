//! One full study check: structural checks, then the integrity pipeline.

use crate::checks::{check_shapes, check_structure};
use crate::navigate::discover_collections;
use crate::profile::StudyProfile;
use serde_json::Value;
use usdm_kernel::{Document, DocumentError, Engine, OrderedCollection, Report};

#[derive(Debug, Clone)]
pub struct StudyCheck<'a> {
    pub report: Report,
    /// Ordered collections of every design, in design then profile order.
    pub collections: Vec<OrderedCollection<'a>>,
}

impl<'a> StudyCheck<'a> {
    pub fn is_acceptable(&self) -> bool {
        self.report.is_acceptable()
    }

    /// Collections whose name ends in `.field`.
    pub fn collections_named<'s>(
        &'s self,
        field: &'s str,
    ) -> impl Iterator<Item = &'s OrderedCollection<'a>> + 's {
        self.collections.iter().filter(move |collection| {
            collection
                .name
                .rsplit_once('.')
                .is_some_and(|(_, last)| last == field)
        })
    }
}

/// Check a parsed study document against `profile`.
///
/// Profile issues come first, then the engine's issues in pipeline order.
/// Only a non-object root fails.
pub fn check_study<'a>(
    root: &'a Value,
    profile: &StudyProfile,
) -> Result<StudyCheck<'a>, DocumentError> {
    let document = Document::new(root)?;

    let mut report = Report::new();
    let version = check_structure(&document, &mut report);
    check_shapes(&document, profile, &mut report);

    let collections = version
        .as_ref()
        .map(|version| discover_collections(version, &profile.collections))
        .unwrap_or_default();

    let outcome = Engine::new(profile.drift_rules.clone()).run(&document, &collections);
    report.merge(outcome.report);

    tracing::debug!(
        blocking = report.summary().blocking_count,
        advisory = report.summary().advisory_count,
        collections = outcome.collections.len(),
        "study check complete"
    );
    Ok(StudyCheck {
        report,
        collections: outcome.collections,
    })
}
