//! Competency catalog and evidence data model.
//!
//! - [`CompetencyCatalog`]: the immutable set of areas and sub-competencies
//!   evidence is mapped against (the UK-SPEC reference catalog by default)
//! - [`EvidenceItem`] / [`EvidenceCollection`]: user evidence keyed by
//!   sub-competency code, in the persisted wire format
//! - [`RagStatus`]: the Red/Amber/Green/NotAssessed traffic light
//!
//! # Example
//!
//! ```
//! use competency::{CompetencyCatalog, CompetencyAreaCode};
//!
//! let catalog = CompetencyCatalog::reference();
//! let codes: Vec<_> = catalog
//!     .in_area(CompetencyAreaCode::A)
//!     .map(|sc| sc.code.as_str())
//!     .collect();
//! assert_eq!(codes, ["A1", "A2"]);
//! ```

pub mod catalog;
mod reference;
pub mod types;

// Re-export main types
pub use catalog::{CatalogError, CompetencyCatalog};
pub use types::*;
