//! Prompt construction for assessment and drafting.
//!
//! Prompts embed catalog text and user evidence verbatim; evidence inside the
//! assessment prompt is JSON-quoted so stray quotes cannot end the block early.

use competency::{CompetencyArea, EvidenceCollection, EvidenceItem, EvidenceKind, RagStatus, SubCompetency};

use crate::markup;

/// Builds the prompts sent to the text-generation service.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt asking for a JSON `{ragStatus, feedback}` rating of one piece of evidence.
    pub fn assessment(
        content: &str,
        sub: &SubCompetency,
        file_name: Option<&str>,
        feedback_word_limit: u32,
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str("You are assessing evidence for a Chartered Engineer (CEng) application against UK-SPEC.\n\n");
        prompt.push_str("## SUB-COMPETENCY\n\n");
        prompt.push_str(&format!("Code: {}\n", sub.code));
        prompt.push_str(&format!("Title: {}\n", sub.title));
        prompt.push_str(&format!("Description: {}\n", sub.full_description));
        prompt.push_str(&format!("Illustrative keywords: {}\n\n", sub.keyword_hint()));

        match file_name {
            Some(name) => prompt.push_str(&format!("## EVIDENCE (from file: {})\n\n", name)),
            None => prompt.push_str("## EVIDENCE\n\n"),
        }
        prompt.push_str(&quote(content));
        prompt.push_str("\n\n");

        prompt.push_str("## TASK\n\n");
        prompt.push_str("Judge the evidence only on how well it demonstrates this sub-competency.\n");
        prompt.push_str("1. Choose a RAG status: \"Green\" (strong alignment, clear personal contribution to significant work), ");
        prompt.push_str("\"Amber\" (partial alignment, generic, or short on detail, scale or complexity) or ");
        prompt.push_str("\"Red\" (little or no alignment).\n");
        prompt.push_str(&format!(
            "2. Give actionable feedback of at most {} words explaining the status and, for Amber or Red, what is missing.\n\n",
            feedback_word_limit
        ));
        prompt.push_str("Reply with a JSON object with exactly two fields and nothing else:\n");
        prompt.push_str("{\"ragStatus\": \"Green\" | \"Amber\" | \"Red\", \"feedback\": \"...\"}\n");

        prompt
    }

    /// Prompt drafting a narrative for a whole area.
    ///
    /// Sub-competencies with no Green or Amber evidence carry an instruction to
    /// emit the fixed "more information needed" marker verbatim.
    pub fn area_draft<'a>(
        area: &CompetencyArea,
        subs: impl IntoIterator<Item = &'a SubCompetency>,
        evidence: &EvidenceCollection,
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are helping a UK engineer draft the \"{} ({})\" section of a CEng Professional Review Report.\n\n",
            area.title, area.code
        ));
        prompt.push_str("## INSTRUCTIONS\n\n");
        prompt.push_str("Write one continuous narrative for the whole area, delineating each sub-competency below.\n");
        prompt.push_str("1. Where evidence is given, weave it into the narrative using first-person statements (\"I designed\", \"I managed\").\n");
        prompt.push_str("   Where the user should add depth, insert a placeholder in square brackets, e.g. [Elaborate on the outcome].\n");
        prompt.push_str("2. Where a sub-competency has an INSTRUCTION_FOR_AI, follow it exactly: output the given text verbatim as that section and draft nothing else for it.\n");
        prompt.push_str("3. Keep a professional, formal tone. Do NOT invent evidence beyond what is given.\n");
        prompt.push_str("4. Output only the draft: no preamble and no heading such as \"Draft for Area X\".\n\n");

        prompt.push_str(&format!("## SUB-COMPETENCIES AND EVIDENCE FOR AREA {}\n", area.code));

        for sub in subs {
            prompt.push_str(&format!(
                "\n### Sub-Competency {}: {}\nDescription: {}\n",
                sub.code, sub.title, sub.full_description
            ));

            let usable: Vec<&EvidenceItem> = evidence
                .items_for(&sub.code)
                .iter()
                .filter(|item| is_draftable(item.rag_status))
                .collect();

            if usable.is_empty() {
                prompt.push_str(&format!(
                    "INSTRUCTION_FOR_AI: No Green or Amber evidence exists for {}. Output exactly this text as its section: \"{}\"\n",
                    sub.code,
                    markup::more_info_placeholder(sub)
                ));
                continue;
            }

            prompt.push_str(&format!("Evidence for {}:\n", sub.code));
            let blocks: Vec<String> = usable
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    format!(
                        "Evidence Piece {}{}:\n{}\n(Previous assessment: {} - {})",
                        idx + 1,
                        file_note(item),
                        item.content,
                        item.rag_status,
                        item.ai_feedback.as_deref().unwrap_or("N/A")
                    )
                })
                .collect();
            prompt.push_str(&blocks.join("\n---\n"));
            prompt.push('\n');
        }

        prompt.push_str(&format!("\nBegin the draft for Competency Area {}:\n", area.code));
        prompt
    }

    /// Prompt drafting one report section from a hand-picked set of items.
    pub fn section_draft(
        area_title: &str,
        representative_code: &str,
        items: &[EvidenceItem],
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are helping a UK engineer draft the \"{}\" section of a CEng Professional Review Report, focusing on evidence for sub-competencies such as {}.\n\n",
            area_title, representative_code
        ));

        prompt.push_str("## VALIDATED EVIDENCE\n\n");
        for (idx, item) in items.iter().enumerate() {
            prompt.push_str(&format!(
                "Evidence {} (for {}){}:\n{}\nPrevious assessment: {} - {}\n\n",
                idx + 1,
                item.sub_competency_code,
                file_note(item),
                item.content,
                item.rag_status,
                item.ai_feedback.as_deref().unwrap_or("N/A")
            ));
        }

        prompt.push_str("## INSTRUCTIONS\n\n");
        prompt.push_str("1. Weave the evidence into a coherent narrative for this competency area, grouped by project or theme.\n");
        prompt.push_str("2. Emphasise personal contribution with first-person statements.\n");
        prompt.push_str("3. Insert placeholders in square brackets where the user must add context, reflection, scale or outcomes, e.g. [Reflect on what you learned].\n");
        prompt.push_str("4. Keep a professional, formal tone. Do NOT invent evidence.\n");
        prompt.push_str("5. Output only the draft, ready to refine.\n\n");
        prompt.push_str("Draft the section now:\n");

        prompt
    }
}

/// Statuses whose evidence may be drafted from.
pub fn is_draftable(status: RagStatus) -> bool {
    matches!(status, RagStatus::Green | RagStatus::Amber)
}

fn file_note(item: &EvidenceItem) -> String {
    match (&item.kind, &item.original_file_name) {
        (EvidenceKind::File, Some(name)) => format!(" (from file: {})", name),
        _ => String::new(),
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}
