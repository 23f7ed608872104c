//! # usdm-study
//!
//! The study-definition profile on top of `usdm-kernel`: where the ordered
//! collections live (`study → versions[0] → studyDesigns[i]`), which field
//! names are legacy, and the structural checks a USDM v4 document must pass.
//!
//! ```text
//! load_document ─→ check_study ─┬─ check_structure / check_shapes (profile)
//!                               └─ Engine::run (kernel) ─→ StudyCheck
//! ```

pub mod check;
pub mod checks;
pub mod criteria;
pub mod error;
pub mod loader;
pub mod navigate;
pub mod profile;

pub use check::{StudyCheck, check_study};
pub use criteria::{CriterionText, criterion_texts};
pub use error::StudyError;
pub use loader::{load_document, parse_document};
pub use navigate::{DesignView, VersionView, discover_collections, first_version};
pub use profile::{CollectionSpec, ShapeChecks, StudyProfile};
