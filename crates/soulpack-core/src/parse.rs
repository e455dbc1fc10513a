//! Format parsers for pack artifacts.
//!
//! Two normalized representations come out of here:
//! - [`StructuredDocument`] for sectioned `#`-headed text artifacts
//! - [`EventLog`] for one-JSON-record-per-line observation logs
//!
//! Neither parser fails. Malformed event-log lines are recorded per line
//! with the serde diagnostic and parsing continues; a document without any
//! header is a downstream warning, not a parse error.

use regex::Regex;

/// Normalized view of a sectioned text artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredDocument {
    /// Header texts in document order (marker characters stripped).
    pub headers: Vec<String>,
    /// Whitespace-delimited word count of the raw content.
    pub word_count: usize,
    /// Line count with splitlines semantics (a trailing newline adds no line).
    pub line_count: usize,
    /// Whether the trimmed content begins with a header marker.
    pub has_leading_header: bool,
}

/// Parse a structured document. Never fails.
pub fn parse_structured_document(content: &str) -> StructuredDocument {
    // One or more markers, whitespace, then the header text.
    let header_re = Regex::new(r"(?m)^#+[ \t]+(.+)$").expect("static header pattern");

    let headers = header_re
        .captures_iter(content)
        .map(|c| c[1].trim_end().to_string())
        .collect();

    StructuredDocument {
        headers,
        word_count: content.split_whitespace().count(),
        line_count: content.lines().count(),
        has_leading_header: content.trim_start().starts_with('#'),
    }
}

/// One malformed event-log line, identified by 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLine {
    pub line_number: usize,
    /// Parser diagnostic for the failed line.
    pub message: String,
}

/// Normalized view of an append-only JSON-per-line observation log.
///
/// Invariant: `valid_record_count + invalid_lines.len()` equals the number
/// of non-blank lines. Blank lines are skipped, not counted as invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    /// Total line count of the content.
    pub total_lines: usize,
    /// Lines that parsed as a single JSON value.
    pub valid_record_count: usize,
    /// Malformed lines in document order.
    pub invalid_lines: Vec<InvalidLine>,
}

impl EventLog {
    /// A log is structurally sound when no line failed to parse.
    /// Zero non-blank lines is vacuously sound.
    pub fn is_sound(&self) -> bool {
        self.invalid_lines.is_empty()
    }
}

/// Parse an event log, line by line. Never aborts on a malformed line.
pub fn parse_event_log(content: &str) -> EventLog {
    let mut valid_record_count = 0;
    let mut invalid_lines = Vec::new();
    let mut total_lines = 0;

    for (idx, line) in content.lines().enumerate() {
        total_lines += 1;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(_) => valid_record_count += 1,
            Err(e) => invalid_lines.push(InvalidLine {
                line_number: idx + 1,
                message: e.to_string(),
            }),
        }
    }

    EventLog {
        total_lines,
        valid_record_count,
        invalid_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_headers_preserve_order() {
        let doc = parse_structured_document("# Top\n\ntext\n\n## Second\n\n### Third\n");
        assert_eq!(doc.headers, vec!["Top", "Second", "Third"]);
        assert!(doc.has_leading_header);
    }

    #[test]
    fn document_without_headers() {
        let doc = parse_structured_document("just prose, no sections at all\n");
        assert!(doc.headers.is_empty());
        assert!(!doc.has_leading_header);
        assert_eq!(doc.word_count, 6);
    }

    #[test]
    fn marker_without_text_is_not_a_header() {
        let doc = parse_structured_document("#\n#no-space\n# Real\n");
        assert_eq!(doc.headers, vec!["Real"]);
    }

    #[test]
    fn line_count_uses_splitlines_semantics() {
        assert_eq!(parse_structured_document("a\nb\nc\n").line_count, 3);
        assert_eq!(parse_structured_document("a\nb\nc").line_count, 3);
        assert_eq!(parse_structured_document("").line_count, 0);
    }

    #[test]
    fn event_log_counts_valid_records() {
        let log = parse_event_log("{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(log.valid_record_count, 2);
        assert!(log.invalid_lines.is_empty());
        assert!(log.is_sound());
    }

    #[test]
    fn event_log_records_invalid_lines_and_continues() {
        let log = parse_event_log("{\"ok\":1}\n{\"bad\":}\n{\"ok\":2}\n");
        assert_eq!(log.valid_record_count, 2);
        assert_eq!(log.invalid_lines.len(), 1);
        assert_eq!(log.invalid_lines[0].line_number, 2);
        assert!(!log.is_sound());
    }

    #[test]
    fn event_log_skips_blank_lines() {
        let log = parse_event_log("{\"a\":1}\n\n   \n{\"b\":2}\n");
        assert_eq!(log.total_lines, 4);
        assert_eq!(log.valid_record_count, 2);
        assert!(log.invalid_lines.is_empty());
    }

    #[test]
    fn empty_event_log_is_vacuously_sound() {
        let log = parse_event_log("");
        assert_eq!(log.total_lines, 0);
        assert_eq!(log.valid_record_count, 0);
        assert!(log.is_sound());
    }

    #[test]
    fn invariant_valid_plus_invalid_equals_non_blank() {
        let content = "{\"a\":1}\n\nnot json\n{\"b\":2}\n \n{oops\n";
        let log = parse_event_log(content);
        let non_blank = content.lines().filter(|l| !l.trim().is_empty()).count();
        assert_eq!(log.valid_record_count + log.invalid_lines.len(), non_blank);
    }
}
