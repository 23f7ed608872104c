//! # usdm-kernel
//!
//! Integrity validation and order reconstruction for large, nested,
//! semi-structured documents where:
//!
//! - identity is a locally unique `id` field scattered through the tree,
//! - references are `*Id` / `*Ids` fields pointing anywhere in the tree,
//! - sibling order is a distributed linked list (`previousId` / `nextId`)
//!   rather than array position.
//!
//! This crate is **ontology-agnostic**: it does not know what the objects
//! mean. Domain profiles supply the drift table and decide which arrays are
//! ordered collections.
//!
//! ## Architecture
//!
//! ```text
//! Document / visit      ← Read-only object enumeration with paths
//!     │
//! IdentityIndex         ← id → first path, duplicate findings
//! Reference             ← every *Id / *Ids value with its path
//!     │
//! find_orphans          ← references with no identity (blocking)
//! order / check_list    ← linked-list reconstruction + pointer integrity
//! detect_drift          ← legacy field names (advisory)
//!     │
//! Report                ← ordered issues, acceptance, rendering
//! ```
//!
//! Findings never abort a run. The only error is a root that is not an
//! object, raised by [`Document::new`].

pub mod drift;
pub mod engine;
pub mod error;
pub mod identity;
pub mod issue;
pub mod linked_list;
pub mod reference;
pub mod report;
pub mod text;
pub mod tree;
pub mod xref;

pub use drift::{DriftRule, DriftScope, detect_drift};
pub use engine::{Collection, Engine, EngineOutcome, OrderedCollection};
pub use error::DocumentError;
pub use identity::{IdentityIndex, IndexBuild, build_index};
pub use issue::{Issue, Severity};
pub use linked_list::{ListOrder, check_list, order};
pub use reference::{Reference, ReferenceKind, extract_references, reference_kind};
pub use report::{CHECK_KIND, CheckReport, Report, ReportSummary};
pub use text::{resolve_text, strip_markup};
pub use tree::{Document, Node, ROOT_PATH, Visit, visit};
pub use xref::find_orphans;
