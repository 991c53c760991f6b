//! Aggregation / readiness engine
//!
//! Pure functions over a catalog and an evidence collection. Nothing here
//! mutates or persists.

use serde::{Deserialize, Serialize};

use competency::{
    CompetencyAreaCode, CompetencyCatalog, EvidenceCollection, EvidenceItem, RagStatus,
};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// How many next steps a consumer should surface.
pub const NEXT_STEPS_SURFACED: usize = 4;

/// Always appended to the next steps.
pub const CPD_REMINDER: &str = "Regularly review and update your CPD log (feature coming soon).";

/// Roll-up classification of one sub-competency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub enum RollupBucket {
    Red,
    Green,
    Amber,
    NotAssessed,
}

/// Classify a sub-competency from its items.
///
/// Red beats Green beats Amber: one Red item marks the whole sub-competency
/// Red regardless of any Green items alongside it.
pub fn rollup(items: &[EvidenceItem]) -> RollupBucket {
    let has = |status: RagStatus| items.iter().any(|item| item.rag_status == status);

    if has(RagStatus::Red) {
        RollupBucket::Red
    } else if has(RagStatus::Green) {
        RollupBucket::Green
    } else if has(RagStatus::Amber) {
        RollupBucket::Amber
    } else {
        RollupBucket::NotAssessed
    }
}

/// Per-area distribution of sub-competency buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AreaProgressSnapshot {
    pub area_code: CompetencyAreaCode,
    pub title: String,
    pub green_count: usize,
    pub amber_count: usize,
    pub red_count: usize,
    pub not_assessed_count: usize,
    pub total_sub_competencies: usize,
}

/// One snapshot per catalog area, in area order.
pub fn compute_area_progress(
    catalog: &CompetencyCatalog,
    evidence: &EvidenceCollection,
) -> Vec<AreaProgressSnapshot> {
    catalog
        .areas()
        .iter()
        .map(|area| {
            let mut snapshot = AreaProgressSnapshot {
                area_code: area.code,
                title: area.title.clone(),
                green_count: 0,
                amber_count: 0,
                red_count: 0,
                not_assessed_count: 0,
                total_sub_competencies: 0,
            };

            for sub in catalog.in_area(area.code) {
                snapshot.total_sub_competencies += 1;
                match rollup(evidence.items_for(&sub.code)) {
                    RollupBucket::Red => snapshot.red_count += 1,
                    RollupBucket::Green => snapshot.green_count += 1,
                    RollupBucket::Amber => snapshot.amber_count += 1,
                    RollupBucket::NotAssessed => snapshot.not_assessed_count += 1,
                }
            }

            snapshot
        })
        .collect()
}

/// Whether the full application can be generated, and why not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ReadinessSnapshot {
    /// Catalog codes with no evidence at all, in catalog order
    pub sub_competencies_with_no_evidence: Vec<String>,
    /// Individual Red items across the whole collection
    pub total_red_items: usize,
    pub is_ready_to_generate_full_application: bool,
}

impl ReadinessSnapshot {
    /// Human-readable reasons the application is not ready; empty when ready.
    pub fn not_ready_reasons(&self, catalog_size: usize) -> Vec<String> {
        let mut reasons = Vec::new();
        let uncovered = self.sub_competencies_with_no_evidence.len();
        if uncovered > 0 {
            reasons.push(format!(
                "All {} sub-competencies have at least one piece of evidence submitted (you still have {} to cover).",
                catalog_size, uncovered
            ));
        }
        if self.total_red_items > 0 {
            reasons.push(format!(
                "No evidence items are marked as 'Red' (you have {} item(s) to address).",
                self.total_red_items
            ));
        }
        reasons
    }
}

/// Readiness ignores Amber: full coverage with no Red items is enough.
pub fn compute_readiness(
    catalog: &CompetencyCatalog,
    evidence: &EvidenceCollection,
) -> ReadinessSnapshot {
    let uncovered: Vec<String> = catalog
        .sub_competencies()
        .iter()
        .filter(|sub| evidence.items_for(&sub.code).is_empty())
        .map(|sub| sub.code.clone())
        .collect();

    let red_items = evidence
        .iter_items()
        .filter(|item| item.rag_status == RagStatus::Red)
        .count();

    ReadinessSnapshot {
        is_ready_to_generate_full_application: uncovered.is_empty() && red_items == 0,
        sub_competencies_with_no_evidence: uncovered,
        total_red_items: red_items,
    }
}

/// Item totals per status plus the awaiting-assessment count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct EvidenceCounts {
    pub green_items: usize,
    pub amber_items: usize,
    pub red_items: usize,
    pub not_assessed_items: usize,
    /// Sub-competencies with no evidence or only unassessed evidence
    pub awaiting_assessment: usize,
}

impl EvidenceCounts {
    pub fn total_items(&self) -> usize {
        self.green_items + self.amber_items + self.red_items + self.not_assessed_items
    }
}

pub fn count_items(catalog: &CompetencyCatalog, evidence: &EvidenceCollection) -> EvidenceCounts {
    let mut counts = EvidenceCounts::default();

    for item in evidence.iter_items() {
        match item.rag_status {
            RagStatus::Green => counts.green_items += 1,
            RagStatus::Amber => counts.amber_items += 1,
            RagStatus::Red => counts.red_items += 1,
            RagStatus::NotAssessed => counts.not_assessed_items += 1,
        }
    }

    counts.awaiting_assessment = catalog
        .sub_competencies()
        .iter()
        .filter(|sub| {
            evidence
                .items_for(&sub.code)
                .iter()
                .all(|item| !item.rag_status.is_assessed())
        })
        .count();

    counts
}

/// Suggestions in fixed order; consumers show the first [`NEXT_STEPS_SURFACED`].
pub fn suggest_next_steps(readiness: &ReadinessSnapshot, counts: &EvidenceCounts) -> Vec<String> {
    let uncovered = readiness.sub_competencies_with_no_evidence.len();
    let red = readiness.total_red_items;
    let mut steps = Vec::new();

    if uncovered > 0 {
        steps.push(format!(
            "Start by adding evidence for {} remaining sub-competencies.",
            uncovered
        ));
    }
    if red > 0 {
        steps.push("Review and improve evidence marked 'Red'.".to_string());
    }
    if counts.amber_items > 0 && red == 0 && uncovered == 0 {
        steps.push(
            "Address feedback for evidence marked 'Amber' to strengthen your application."
                .to_string(),
        );
    }
    if readiness.is_ready_to_generate_full_application && counts.green_items > 0 {
        steps.push(
            "Your evidence is looking good! You can now generate a full application draft."
                .to_string(),
        );
    }
    steps.push(CPD_REMINDER.to_string());

    steps
}

/// Everything the dashboard shows, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub areas: Vec<AreaProgressSnapshot>,
    pub readiness: ReadinessSnapshot,
    pub counts: EvidenceCounts,
    pub next_steps: Vec<String>,
}

impl DashboardSummary {
    pub fn compute(catalog: &CompetencyCatalog, evidence: &EvidenceCollection) -> Self {
        let readiness = compute_readiness(catalog, evidence);
        let counts = count_items(catalog, evidence);
        let next_steps = suggest_next_steps(&readiness, &counts);
        Self {
            areas: compute_area_progress(catalog, evidence),
            readiness,
            counts,
            next_steps,
        }
    }

    /// The next steps a consumer should display.
    pub fn surfaced_steps(&self) -> &[String] {
        &self.next_steps[..self.next_steps.len().min(NEXT_STEPS_SURFACED)]
    }
}
