//! Parsing of free-form assessment replies.
//!
//! Replies are expected to be a JSON object `{"ragStatus": ..., "feedback": ...}`,
//! possibly wrapped in a markdown code fence or cut off mid-object. Anything
//! else falls back to a keyword heuristic over the raw text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use competency::RagStatus;

use crate::response::{Assessment, AssessmentOutcome, UNPARSEABLE_FEEDBACK};

/// Raw replies at or above this length are never used directly as feedback.
const RAW_FEEDBACK_MAX_LEN: usize = 150;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").expect("fence pattern"));
static FEEDBACK_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""feedback"\s*:\s*"(.*?)""#).expect("feedback pattern"));

/// Remove a surrounding ```` ``` ```` fence (with optional language tag).
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match CODE_FENCE.captures(trimmed).and_then(|caps| caps.get(2)) {
        Some(body) if !body.as_str().is_empty() => body.as_str().trim(),
        _ => trimmed,
    }
}

/// Parse a reply as JSON after fence stripping.
///
/// A reply that opens an object but never closes it is cut back to its last
/// `}` and parsed once more.
pub fn parse_json_reply(reply: &str) -> Option<Value> {
    let clean = strip_code_fence(reply);
    match serde_json::from_str(clean) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(error = %err, "Reply is not valid JSON");
            if clean.starts_with('{') && !clean.ends_with('}') {
                let end = clean.rfind('}')?;
                return serde_json::from_str(&clean[..=end]).ok();
            }
            None
        }
    }
}

/// Guess a status from reply text: "green" wins over "red", otherwise Amber.
pub fn heuristic_status(reply: &str) -> RagStatus {
    let lower = reply.to_lowercase();
    if lower.contains("green") {
        RagStatus::Green
    } else if lower.contains("red") {
        RagStatus::Red
    } else {
        RagStatus::Amber
    }
}

fn heuristic_feedback(reply: &str, parsed_feedback: Option<&str>) -> String {
    if let Some(feedback) = parsed_feedback.filter(|f| !f.is_empty()) {
        return feedback.to_string();
    }
    if let Some(caps) = FEEDBACK_FIELD.captures(reply) {
        if !caps[1].is_empty() {
            return caps[1].to_string();
        }
    }
    let trimmed = reply.trim();
    if !trimmed.is_empty() && reply.chars().count() < RAW_FEEDBACK_MAX_LEN && !reply.contains('{') {
        return trimmed.to_string();
    }
    UNPARSEABLE_FEEDBACK.to_string()
}

/// Turn a raw assessment reply into a typed outcome.
pub fn interpret_assessment(reply: &str) -> AssessmentOutcome {
    let Some(value) = parse_json_reply(reply) else {
        warn!(reply_len = reply.len(), "Falling back to keyword heuristic");
        return AssessmentOutcome::Unparseable {
            assessment: Assessment::new(heuristic_status(reply), heuristic_feedback(reply, None)),
            raw: reply.to_string(),
        };
    };

    let reported = value.get("ragStatus").and_then(Value::as_str);
    let feedback = value.get("feedback").and_then(Value::as_str);

    match reported.and_then(RagStatus::parse) {
        Some(status) => AssessmentOutcome::Parsed {
            assessment: Assessment::new(status, feedback.unwrap_or_default()),
        },
        None => {
            warn!(reported_status = ?reported, "Reply carried no recognised status");
            AssessmentOutcome::LowConfidence {
                assessment: Assessment::new(
                    heuristic_status(reply),
                    heuristic_feedback(reply, feedback),
                ),
                reported_status: reported.map(String::from),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_json() {
        let outcome =
            interpret_assessment("```json\n{\"ragStatus\":\"Green\",\"feedback\":\"Good.\"}\n```");

        assert_eq!(
            outcome,
            AssessmentOutcome::Parsed {
                assessment: Assessment::new(RagStatus::Green, "Good.")
            }
        );
    }

    #[test]
    fn test_fence_without_language_tag() {
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_truncated_object_is_salvaged() {
        let reply = r#"{"ragStatus":"Amber","feedback":"Add scale.","extra":{"x":1}, "trail"#;
        let value = parse_json_reply(reply);
        // cut back to the last brace, which closes the nested object only
        assert!(value.is_none());

        let reply = r#"{"ragStatus":"Amber","feedback":"Add scale."} trailing words"#;
        let outcome = interpret_assessment(reply);
        assert_eq!(outcome.rag_status(), RagStatus::Amber);
        assert!(outcome.is_confident());
        assert_eq!(outcome.assessment().feedback, "Add scale.");
    }

    #[test]
    fn test_plain_text_heuristic() {
        let outcome = interpret_assessment("This looks green but no json");

        assert!(matches!(outcome, AssessmentOutcome::Unparseable { .. }));
        assert_eq!(outcome.rag_status(), RagStatus::Green);
        assert_eq!(outcome.assessment().feedback, "This looks green but no json");
    }

    #[test]
    fn test_invalid_status_is_low_confidence() {
        let outcome = interpret_assessment(r#"{"ragStatus":"Purple","feedback":"Mostly red flags."}"#);

        match &outcome {
            AssessmentOutcome::LowConfidence {
                assessment,
                reported_status,
            } => {
                assert_eq!(assessment.rag_status, RagStatus::Red);
                assert_eq!(assessment.feedback, "Mostly red flags.");
                assert_eq!(reported_status.as_deref(), Some("Purple"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_feedback_extracted_from_broken_json() {
        let reply = r#"{"ragStatus": Amber, "feedback": "Quantify the budget you managed."#;
        let outcome = interpret_assessment(reply);

        assert!(matches!(outcome, AssessmentOutcome::Unparseable { .. }));
        assert_eq!(outcome.rag_status(), RagStatus::Amber);
        assert_eq!(
            outcome.assessment().feedback,
            UNPARSEABLE_FEEDBACK,
            "unterminated feedback string cannot be matched"
        );

        let reply = r#"{"ragStatus": Amber, "feedback": "Quantify the budget."}"#;
        let outcome = interpret_assessment(reply);
        assert_eq!(outcome.assessment().feedback, "Quantify the budget.");
    }

    #[test]
    fn test_long_raw_text_not_used_as_feedback() {
        let reply = "word ".repeat(40);
        let outcome = interpret_assessment(&reply);

        assert_eq!(outcome.rag_status(), RagStatus::Amber);
        assert_eq!(outcome.assessment().feedback, UNPARSEABLE_FEEDBACK);
    }

    #[test]
    fn test_short_non_ascii_reply_kept_as_feedback() {
        let reply = format!("Précisez votre rôle: {}", "é".repeat(80));
        assert!(reply.len() >= RAW_FEEDBACK_MAX_LEN);
        assert!(reply.chars().count() < RAW_FEEDBACK_MAX_LEN);

        let outcome = interpret_assessment(&reply);
        assert_eq!(outcome.rag_status(), RagStatus::Amber);
        assert_eq!(outcome.assessment().feedback, reply);
    }
}
