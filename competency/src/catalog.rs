//! Read-only competency catalog.
//!
//! Every other component looks competencies up here; nothing mutates a catalog
//! once built.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{CompetencyArea, CompetencyAreaCode, SubCompetency};

/// Errors from building a custom catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two areas share a code
    #[error("Duplicate area code: {0}")]
    DuplicateArea(CompetencyAreaCode),

    /// Two sub-competencies share a code
    #[error("Duplicate sub-competency code: {0}")]
    DuplicateSubCompetency(String),

    /// Sub-competency refers to an area not in the catalog
    #[error("Sub-competency {code} refers to unknown area {area}")]
    UnknownArea {
        code: String,
        area: CompetencyAreaCode,
    },
}

/// Immutable set of competency areas and their sub-competencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyCatalog {
    areas: Vec<CompetencyArea>,
    entries: Vec<SubCompetency>,
}

impl CompetencyCatalog {
    /// The UK-SPEC reference catalog (5 areas, 17 sub-competencies).
    pub fn reference() -> Self {
        crate::reference::reference_catalog()
    }

    /// Build a validated catalog. Areas are ordered A to E; entries keep the given order.
    pub fn new(
        mut areas: Vec<CompetencyArea>,
        entries: Vec<SubCompetency>,
    ) -> Result<Self, CatalogError> {
        let mut area_codes = HashSet::new();
        for area in &areas {
            if !area_codes.insert(area.code) {
                return Err(CatalogError::DuplicateArea(area.code));
            }
        }

        let mut sub_codes = HashSet::new();
        for entry in &entries {
            if !area_codes.contains(&entry.area_code) {
                return Err(CatalogError::UnknownArea {
                    code: entry.code.clone(),
                    area: entry.area_code,
                });
            }
            if !sub_codes.insert(entry.code.as_str()) {
                return Err(CatalogError::DuplicateSubCompetency(entry.code.clone()));
            }
        }

        areas.sort_by_key(|area| area.code);
        debug!(
            areas = areas.len(),
            sub_competencies = entries.len(),
            "Built competency catalog"
        );

        Ok(Self::from_parts(areas, entries))
    }

    pub(crate) fn from_parts(areas: Vec<CompetencyArea>, entries: Vec<SubCompetency>) -> Self {
        Self { areas, entries }
    }

    /// Areas in order.
    pub fn areas(&self) -> &[CompetencyArea] {
        &self.areas
    }

    /// All sub-competencies in catalog order.
    pub fn sub_competencies(&self) -> &[SubCompetency] {
        &self.entries
    }

    /// Look up a sub-competency by code.
    pub fn get(&self, code: &str) -> Option<&SubCompetency> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Look up an area by code.
    pub fn area(&self, code: CompetencyAreaCode) -> Option<&CompetencyArea> {
        self.areas.iter().find(|area| area.code == code)
    }

    /// Sub-competencies belonging to an area, in catalog order.
    pub fn in_area(&self, code: CompetencyAreaCode) -> impl Iterator<Item = &SubCompetency> {
        self.entries.iter().filter(move |entry| entry.area_code == code)
    }

    /// Number of sub-competencies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CompetencyCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_catalog_shape() {
        let catalog = CompetencyCatalog::reference();

        assert_eq!(catalog.areas().len(), 5);
        assert_eq!(catalog.len(), 17);

        let per_area: Vec<usize> = CompetencyAreaCode::ALL
            .iter()
            .map(|code| catalog.in_area(*code).count())
            .collect();
        assert_eq!(per_area, vec![2, 3, 4, 3, 5]);
    }

    #[test]
    fn test_reference_catalog_is_valid() {
        let catalog = CompetencyCatalog::reference();
        let rebuilt = CompetencyCatalog::new(
            catalog.areas().to_vec(),
            catalog.sub_competencies().to_vec(),
        )
        .unwrap();
        assert_eq!(rebuilt, catalog);
    }

    #[test]
    fn test_lookup() {
        let catalog = CompetencyCatalog::reference();
        let b2 = catalog.get("B2").unwrap();

        assert_eq!(b2.area_code, CompetencyAreaCode::B);
        assert_eq!(
            b2.area_title,
            "Design and development of processes, systems, services and products"
        );
        assert!(b2.keywords.iter().any(|k| k == "carry out tests"));
        assert!(catalog.get("Z9").is_none());
        assert_eq!(
            catalog.area(CompetencyAreaCode::E).unwrap().title,
            "Professional Commitment"
        );
    }

    #[test]
    fn test_rejects_unknown_area() {
        let catalog = CompetencyCatalog::reference();
        let areas = catalog.areas()[..1].to_vec();
        let result = CompetencyCatalog::new(areas, catalog.sub_competencies().to_vec());

        assert!(matches!(result, Err(CatalogError::UnknownArea { .. })));
    }

    #[test]
    fn test_rejects_duplicate_code() {
        let catalog = CompetencyCatalog::reference();
        let mut entries = catalog.sub_competencies().to_vec();
        entries.push(entries[0].clone());

        let result = CompetencyCatalog::new(catalog.areas().to_vec(), entries);
        assert_eq!(
            result,
            Err(CatalogError::DuplicateSubCompetency("A1".to_string()))
        );
    }
}
