//! Document text extraction for file evidence.
//!
//! Plain text is read directly, DOCX runs are pulled out of
//! `word/document.xml`, PDFs are read page by page. Other office formats are
//! accepted as attachments and replaced with a fixed note saying no content
//! analysis took place.

use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static TEXT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|</w:p>|<w:tab/>|<w:br/>").expect("run pattern"));

const DOCX_BODY: &str = "word/document.xml";

/// Errors from reading an uploaded document. Each names the file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Invalid file type for \"{file_name}\". Please upload one of: {accepted}.")]
    UnsupportedType { file_name: String, accepted: String },

    #[error("Could not process file \"{file_name}\": {message}")]
    Corrupt { file_name: String, message: String },
}

/// How a file's content is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `.txt`, `.md`
    PlainText,
    /// `.docx`
    WordProcessor,
    /// `.pdf`
    Pdf,
    /// `.doc`, `.xls`, `.xlsx`, `.ppt`, `.pptx`: attached without analysis
    AttachOnly,
}

impl DocumentKind {
    /// Extensions whose text is extracted.
    pub const EXTRACTED: [&'static str; 4] = [".txt", ".md", ".docx", ".pdf"];

    /// Extensions accepted without extraction.
    pub const ATTACH_ONLY: [&'static str; 5] = [".doc", ".xls", ".xlsx", ".ppt", ".pptx"];

    /// Classify by extension, case-insensitively.
    pub fn classify(file_name: &str) -> Option<Self> {
        match extension(file_name)?.as_str() {
            ".txt" | ".md" => Some(Self::PlainText),
            ".docx" => Some(Self::WordProcessor),
            ".pdf" => Some(Self::Pdf),
            ".doc" | ".xls" | ".xlsx" | ".ppt" | ".pptx" => Some(Self::AttachOnly),
            _ => None,
        }
    }

    /// Every accepted extension, for messages.
    pub fn accepted_extensions() -> String {
        Self::EXTRACTED
            .iter()
            .chain(Self::ATTACH_ONLY.iter())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Lowercase extension including the dot, e.g. ".pdf".
pub fn extension(file_name: &str) -> Option<String> {
    let dot = file_name.rfind('.')?;
    Some(file_name[dot..].to_lowercase())
}

/// Text standing in for a file whose content is not analysed.
pub fn attach_only_placeholder(file_name: &str) -> String {
    let ext = extension(file_name).unwrap_or_default();
    format!(
        "File \"{}\" (type: {}) has been uploaded and attached.\n\
         Direct content analysis for this file type is not currently supported, so no content analysis occurred.\n\
         If feedback on its content is desired, summarize the key points in a text entry, or convert the file to .txt, .md, .docx or .pdf.",
        file_name, ext
    )
}

/// Produce the evidence text for an uploaded file.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let kind = DocumentKind::classify(file_name).ok_or_else(|| ExtractionError::UnsupportedType {
        file_name: file_name.to_string(),
        accepted: DocumentKind::accepted_extensions(),
    })?;

    debug!(file = %file_name, ?kind, bytes = bytes.len(), "Extracting document text");

    let corrupt = |message: String| ExtractionError::Corrupt {
        file_name: file_name.to_string(),
        message,
    };

    match kind {
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
        DocumentKind::WordProcessor => extract_docx(bytes).map_err(corrupt),
        DocumentKind::Pdf => extract_pdf(bytes).map_err(corrupt),
        DocumentKind::AttachOnly => Ok(attach_only_placeholder(file_name)),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| format!("{}: {}", DOCX_BODY, e))?
        .read_to_string(&mut xml)
        .map_err(|e| e.to_string())?;

    let mut text = String::new();
    for caps in TEXT_RUN.captures_iter(&xml) {
        match caps.get(1) {
            Some(run) => text.push_str(&unescape_xml(run.as_str())),
            None => match &caps[0] {
                "<w:tab/>" => text.push('\t'),
                _ => text.push('\n'),
            },
        }
    }

    Ok(text.trim_end().to_string())
}

fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;

    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => pages.push(text.trim_end().to_string()),
            Err(e) => {
                warn!(page = page_number, error = %e, "Skipping unreadable PDF page");
                pages.push(String::new());
            }
        }
    }

    Ok(pages.join("\n"))
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx(body: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file(DOCX_BODY, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_classify() {
        assert_eq!(DocumentKind::classify("notes.MD"), Some(DocumentKind::PlainText));
        assert_eq!(DocumentKind::classify("cv.docx"), Some(DocumentKind::WordProcessor));
        assert_eq!(DocumentKind::classify("report.final.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::classify("budget.xlsx"), Some(DocumentKind::AttachOnly));
        assert_eq!(DocumentKind::classify("photo.png"), None);
        assert_eq!(DocumentKind::classify("Makefile"), None);
    }

    #[test]
    fn test_plain_text_is_lossy() {
        let text = extract_text("log.txt", b"Led the HAZOP \xff review").unwrap();
        assert!(text.starts_with("Led the HAZOP"));
        assert!(text.ends_with("review"));
    }

    #[test]
    fn test_docx_runs_and_paragraphs() {
        let body = r#"<w:document><w:body>
            <w:p><w:r><w:t>I designed</w:t></w:r><w:r><w:t xml:space="preserve"> the pump &amp; valve.</w:t></w:r></w:p>
            <w:p><w:r><w:t>Second paragraph.</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let text = extract_text("design.docx", &docx(body)).unwrap();
        assert_eq!(text, "I designed the pump & valve.\nSecond paragraph.");
    }

    #[test]
    fn test_corrupt_docx_names_file() {
        let err = extract_text("broken.docx", b"not a zip").unwrap_err();
        match &err {
            ExtractionError::Corrupt { file_name, .. } => assert_eq!(file_name, "broken.docx"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("broken.docx"));
    }

    #[test]
    fn test_corrupt_pdf_names_file() {
        let err = extract_text("scan.pdf", b"%PDF-garbage").unwrap_err();
        assert!(matches!(err, ExtractionError::Corrupt { .. }));
    }

    #[test]
    fn test_attach_only_placeholder() {
        let text = extract_text("plan.pptx", b"binary").unwrap();
        assert!(text.contains("\"plan.pptx\""));
        assert!(text.contains("(type: .pptx)"));
        assert!(text.contains("no content analysis occurred"));
    }

    #[test]
    fn test_unsupported_type() {
        let err = extract_text("photo.png", b"").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedType { .. }));
        assert!(err.to_string().contains(".pdf"));
    }
}
