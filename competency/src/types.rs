//! Core types for competency evidence.
//!
//! Persisted types serialize with the field names the browser client stores
//! (`subCompetencyCode`, `ragStatus`, `aiFeedback`, ...), so a collection saved
//! by either side loads in the other.
//!
//! With the `typescript` feature enabled, these types can be exported to TypeScript
//! using ts-rs for the web front end.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Code of one of the five competency areas, ordered A to E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum CompetencyAreaCode {
    A,
    B,
    C,
    D,
    E,
}

impl CompetencyAreaCode {
    /// All area codes in display order.
    pub const ALL: [CompetencyAreaCode; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }

    /// Parse an area code, accepting either case.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "A" | "a" => Some(Self::A),
            "B" | "b" => Some(Self::B),
            "C" | "c" => Some(Self::C),
            "D" | "d" => Some(Self::D),
            "E" | "e" => Some(Self::E),
            _ => None,
        }
    }
}

impl fmt::Display for CompetencyAreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A competency area grouping several sub-competencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CompetencyArea {
    pub code: CompetencyAreaCode,
    pub title: String,
}

/// The finest-grained unit of the catalog. Evidence is always filed against exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SubCompetency {
    /// Area this sub-competency belongs to
    pub area_code: CompetencyAreaCode,
    /// Title of that area
    pub area_title: String,
    /// Unique code, e.g. "A1"
    pub code: String,
    /// Short title
    pub title: String,
    /// Full descriptive text
    pub full_description: String,
    /// Illustrative keyword hints, in catalog order
    pub keywords: Vec<String>,
}

impl SubCompetency {
    /// Keywords joined for use in prompts.
    pub fn keyword_hint(&self) -> String {
        self.keywords.join(", ")
    }
}

/// Traffic-light classification of how well evidence meets a competency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum RagStatus {
    Red,
    Amber,
    Green,
    NotAssessed,
}

impl RagStatus {
    /// Every status, including `NotAssessed`.
    pub const ALL: [RagStatus; 4] = [Self::Red, Self::Amber, Self::Green, Self::NotAssessed];

    /// Get string representation (matches the serialized form).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Amber => "Amber",
            Self::Green => "Green",
            Self::NotAssessed => "NotAssessed",
        }
    }

    /// Exact, case-sensitive match against the serialized names.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Whether an assessment has been recorded.
    pub fn is_assessed(&self) -> bool {
        !matches!(self, Self::NotAssessed)
    }
}

impl fmt::Display for RagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a piece of evidence was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    /// Narrative typed by the user
    Text,
    /// Text extracted from (or placeholder for) an uploaded document
    File,
    /// A URL; stored and assessed as its text
    Link,
}

/// One user-submitted piece of proof, tied to one sub-competency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    /// Unique identifier, immutable once assigned
    pub id: String,
    /// Catalog code this evidence is filed against
    pub sub_competency_code: String,
    /// Owner of the evidence
    #[serde(rename = "userId")]
    pub owner_id: String,
    /// Submission kind
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    /// Narrative or extracted document text
    pub content: String,
    /// Name of the uploaded file, for file evidence
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
    /// Why this evidence maps to its sub-competency, when given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    /// Current assessment
    pub rag_status: RagStatus,
    /// Feedback from the last assessment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvidenceItem {
    /// Create a new, unassessed item with a fresh id.
    pub fn new(
        sub_competency_code: impl Into<String>,
        owner_id: impl Into<String>,
        kind: EvidenceKind,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: format!("eid-{}", uuid::Uuid::new_v4()),
            sub_competency_code: sub_competency_code.into(),
            owner_id: owner_id.into(),
            kind,
            content: content.into(),
            original_file_name: None,
            justification: None,
            rag_status: RagStatus::NotAssessed,
            ai_feedback: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create text evidence.
    pub fn text(
        sub_competency_code: impl Into<String>,
        owner_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(sub_competency_code, owner_id, EvidenceKind::Text, content)
    }

    /// Create file evidence from extracted content.
    pub fn file(
        sub_competency_code: impl Into<String>,
        owner_id: impl Into<String>,
        content: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        let mut item = Self::new(sub_competency_code, owner_id, EvidenceKind::File, content);
        item.original_file_name = Some(file_name.into());
        item
    }

    /// Set a fixed id (used when re-submitting an existing item).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Record an assessment. `updated_at` never moves before `created_at`.
    pub fn apply_assessment(
        &mut self,
        status: RagStatus,
        feedback: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.rag_status = status;
        self.ai_feedback = feedback;
        self.updated_at = at.max(self.created_at);
    }

    /// Builder form of [`apply_assessment`](Self::apply_assessment) stamped now.
    pub fn with_assessment(mut self, status: RagStatus, feedback: impl Into<String>) -> Self {
        self.apply_assessment(status, Some(feedback.into()), Utc::now());
        self
    }
}

/// Result of inserting an item into a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert {
    /// Appended as a new item
    Inserted,
    /// Replaced the item with the same id
    Replaced(EvidenceItem),
}

/// All evidence, keyed by sub-competency code, each list in submission order.
///
/// An absent key and an empty list are equivalent: readers get an empty slice
/// for both, and equality ignores empty lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(transparent)]
pub struct EvidenceCollection {
    entries: BTreeMap<String, Vec<EvidenceItem>>,
}

impl EvidenceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items for a sub-competency; empty when none were submitted.
    pub fn items_for(&self, code: &str) -> &[EvidenceItem] {
        self.entries.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append, or replace the item with the same id in place.
    pub fn upsert(&mut self, item: EvidenceItem) -> Upsert {
        let list = self.entries.entry(item.sub_competency_code.clone()).or_default();
        match list.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => Upsert::Replaced(std::mem::replace(existing, item)),
            None => {
                list.push(item);
                Upsert::Inserted
            }
        }
    }

    pub fn find(&self, code: &str, item_id: &str) -> Option<&EvidenceItem> {
        self.items_for(code).iter().find(|item| item.id == item_id)
    }

    /// Code currently holding the item with this id, anywhere in the collection.
    pub fn code_of(&self, item_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, items)| items.iter().any(|item| item.id == item_id))
            .map(|(code, _)| code.as_str())
    }

    pub fn find_mut(&mut self, code: &str, item_id: &str) -> Option<&mut EvidenceItem> {
        self.entries
            .get_mut(code)?
            .iter_mut()
            .find(|item| item.id == item_id)
    }

    /// Remove an item; the key is dropped once its list is empty.
    pub fn remove(&mut self, code: &str, item_id: &str) -> Option<EvidenceItem> {
        let list = self.entries.get_mut(code)?;
        let index = list.iter().position(|item| item.id == item_id)?;
        let removed = list.remove(index);
        if list.is_empty() {
            self.entries.remove(code);
        }
        Some(removed)
    }

    /// Every item across all sub-competencies.
    pub fn iter_items(&self) -> impl Iterator<Item = &EvidenceItem> {
        self.entries.values().flatten()
    }

    /// Codes that currently hold at least one item.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(code, _)| code.as_str())
    }

    /// Total number of items.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for EvidenceCollection {
    fn eq(&self, other: &Self) -> bool {
        let populated = |c: &Self| {
            c.entries
                .iter()
                .filter(|(_, items)| !items.is_empty())
                .map(|(code, items)| (code.clone(), items.clone()))
                .collect::<BTreeMap<_, _>>()
        };
        populated(self) == populated(other)
    }
}
