//! Text extraction for uploaded documents.
//!
//! PDFs go through `pdf-extract`; anything else is read as UTF-8 text. A
//! best-effort cleanup pass strips lines matching known PDF metadata
//! patterns before the text is handed to the model rewrite step. This is
//! not a general-purpose sanitizer.

use std::sync::OnceLock;

use neurobot_core::models::SourceType;
use neurobot_core::NeurobotError;
use regex::Regex;

/// Classify an upload by media type (extension as fallback).
pub fn detect_source_type(file_name: &str, media_type: &str) -> SourceType {
    if media_type.contains("pdf") || file_name.to_lowercase().ends_with(".pdf") {
        SourceType::Pdf
    } else {
        SourceType::Doc
    }
}

/// Extract plain text from an uploaded file and clean it up.
///
/// Fails with `Extraction` when the cleaned text is shorter than
/// `min_chars` — the document has no usable text.
pub fn extract_file_text(
    bytes: &[u8],
    file_name: &str,
    media_type: &str,
    min_chars: usize,
) -> Result<String, NeurobotError> {
    let raw = match detect_source_type(file_name, media_type) {
        SourceType::Pdf => pdf_text(bytes, file_name)?,
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    let cleaned = strip_metadata_lines(&raw, file_name);
    let cleaned = cleaned.trim().to_string();

    if cleaned.chars().count() < min_chars {
        return Err(NeurobotError::Extraction(format!(
            "'{}' yielded {} characters of text (minimum {})",
            file_name,
            cleaned.chars().count(),
            min_chars
        )));
    }

    Ok(cleaned)
}

fn pdf_text(bytes: &[u8], file_name: &str) -> Result<String, NeurobotError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        NeurobotError::Extraction(format!("could not parse PDF '{}': {}", file_name, e))
    })
}

fn metadata_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Tool metadata echoed into the text layer by some producers.
            r"(?i)^\s*(creator|producer|author|title|subject|keywords)\s*:",
            r"(?i)^\s*(creationdate|moddate|creation date|modification date)\s*:",
            // Page furniture.
            r"(?i)^\s*page\s+\d+\s+of\s+\d+\s*$",
            r"(?i)^\s*-\s*\d+\s*-\s*$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static pattern"))
        .collect()
    })
}

/// Drop lines matching the fixed metadata patterns, plus lines that merely
/// echo the file name.
fn strip_metadata_lines(text: &str, file_name: &str) -> String {
    let stem = file_name.trim();
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            if !stem.is_empty() && trimmed == stem {
                return false;
            }
            !metadata_patterns().iter().any(|p| p.is_match(trimmed))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_source_type_by_media_type_and_extension() {
        assert_eq!(detect_source_type("a.pdf", "application/pdf"), SourceType::Pdf);
        assert_eq!(detect_source_type("a.PDF", "application/octet-stream"), SourceType::Pdf);
        assert_eq!(detect_source_type("notes.txt", "text/plain"), SourceType::Doc);
        assert_eq!(detect_source_type("manual.docx", ""), SourceType::Doc);
    }

    #[test]
    fn test_plain_text_passthrough() {
        let text = extract_file_text(b"Shipping takes five business days.", "faq.txt", "text/plain", 10)
            .expect("extract");
        assert_eq!(text, "Shipping takes five business days.");
    }

    #[test]
    fn test_empty_file_fails_extraction() {
        let err = extract_file_text(b"", "empty.txt", "text/plain", 10).expect_err("must fail");
        assert!(matches!(err, NeurobotError::Extraction(_)));
    }

    #[test]
    fn test_short_text_fails_extraction() {
        let err = extract_file_text(b"hi", "tiny.txt", "text/plain", 10).expect_err("must fail");
        assert!(matches!(err, NeurobotError::Extraction(_)));
    }

    #[test]
    fn test_metadata_lines_are_stripped() {
        let raw = b"Creator: Microsoft Word\n\
                    Producer: Acrobat Distiller\n\
                    CreationDate: D:20240115\n\
                    Our return policy allows refunds within 30 days.\n\
                    Page 1 of 12\n\
                    Contact support for exceptions.";
        let text = extract_file_text(raw, "policy.txt", "text/plain", 10).expect("extract");
        assert!(text.contains("return policy"));
        assert!(text.contains("Contact support"));
        assert!(!text.contains("Creator"));
        assert!(!text.contains("Distiller"));
        assert!(!text.to_lowercase().contains("page 1 of 12"));
    }

    #[test]
    fn test_file_name_echo_is_stripped() {
        let raw = b"manual.txt\nThe warranty covers parts and labor for one year.";
        let text = extract_file_text(raw, "manual.txt", "text/plain", 10).expect("extract");
        assert!(!text.starts_with("manual.txt"));
        assert!(text.contains("warranty"));
    }

    #[test]
    fn test_unusable_after_cleanup_fails() {
        // Everything is metadata; nothing usable remains.
        let raw = b"Creator: Word\nProducer: Distiller\nPage 1 of 1";
        let err = extract_file_text(raw, "meta.txt", "text/plain", 10).expect_err("must fail");
        assert!(matches!(err, NeurobotError::Extraction(_)));
    }

    #[test]
    fn test_garbage_pdf_bytes_fail_extraction() {
        let err = extract_file_text(b"not a pdf at all", "broken.pdf", "application/pdf", 10)
            .expect_err("must fail");
        assert!(matches!(err, NeurobotError::Extraction(_)));
    }
}
