//! HTML markers around drafted narrative.

use once_cell::sync::Lazy;
use regex::Regex;

use competency::SubCompetency;

/// Class on placeholders the model inserted for the user to elaborate.
pub const ELABORATE_PLACEHOLDER_CLASS: &str = "font-semibold text-indigo-600 dark:text-indigo-400";

/// Class on "more information needed" placeholders for uncovered sub-competencies.
pub const MORE_INFO_PLACEHOLDER_CLASS: &str = "font-semibold text-amber-600 dark:text-amber-400";

/// Heading of the generated application report.
pub const REPORT_TITLE: &str = "Chartered Engineer Application Draft";

/// Shown in place of a section draft when there is no evidence.
pub const NO_SECTION_EVIDENCE: &str = "No evidence provided for this section.";

/// Shown in place of a section draft when the call fails.
pub const SECTION_DRAFT_ERROR: &str =
    "Error generating draft content with AI. Please try again later.";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*?)\]").expect("placeholder pattern"));
static BLOCK_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(p|h[1-6]|div|li)>|<br\s*/?>").expect("block pattern"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank pattern"));

/// Wrap every `[bracketed]` span in the elaboration marker.
pub fn style_placeholders(text: &str) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!(
                "<span class=\"{}\">[{}]</span>",
                ELABORATE_PLACEHOLDER_CLASS,
                caps[1].trim()
            )
        })
        .into_owned()
}

/// The fixed marker a draft must carry for a sub-competency without usable evidence.
pub fn more_info_placeholder(sub: &SubCompetency) -> String {
    format!(
        "<p><span class=\"{}\">[More information is needed for {}: {}]</span></p>",
        MORE_INFO_PLACEHOLDER_CLASS, sub.code, sub.title
    )
}

/// Displayable error for a failed area draft.
pub fn area_draft_error(area_code: &str) -> String {
    format!(
        "<p>Error generating draft content for Area {} with AI. Please try again later.</p>",
        area_code
    )
}

/// Convert drafted HTML to plain text.
pub fn strip_markup(html: &str) -> String {
    let with_breaks = BLOCK_END.replace_all(html, "\n");
    let text = TAG.replace_all(&with_breaks, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    BLANK_RUNS.replace_all(text.trim(), "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use competency::CompetencyCatalog;

    #[test]
    fn test_style_placeholders() {
        let styled = style_placeholders("I led the team. [ Elaborate on scale ] Then [reflect].");

        assert!(styled.contains(&format!(
            "<span class=\"{}\">[Elaborate on scale]</span>",
            ELABORATE_PLACEHOLDER_CLASS
        )));
        assert!(styled.contains("[reflect]</span>"));
        assert!(styled.starts_with("I led the team. "));
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(style_placeholders("No brackets here."), "No brackets here.");
    }

    #[test]
    fn test_more_info_placeholder() {
        let catalog = CompetencyCatalog::reference();
        let marker = more_info_placeholder(catalog.get("D2").unwrap());

        assert!(marker.contains("[More information is needed for D2: Present and discuss proposals.]"));
        assert!(marker.contains(MORE_INFO_PLACEHOLDER_CLASS));
    }

    #[test]
    fn test_strip_markup() {
        let text = strip_markup("<h1>Title</h1><p>I designed &amp; built it.</p><div><span>[Add detail]</span></div>");
        assert_eq!(text, "Title\nI designed & built it.\n[Add detail]");
    }
}
