//! Schema validator log parsing.
//!
//! Schema validation runs as an external program that prints one finding
//! per line in the xmllint layout:
//!
//! ```text
//! invoice.xml:21: element Name: Schemas validity error : Element '{urn:x}Name': This element is not expected.
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use xtrace_model::{IssueSource, Severity, ValidationIssue};

static LOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>.+?):(?P<line>-?\d+):\s*(?:element\s*(?P<element>[^:]*):\s*)?(?:Schemas validity|parser)\s+(?P<level>error|warning)\s*:\s*(?P<message>.*)$",
    )
    .expect("Invalid schema log regex")
});

/// Parse schema validator output into issues against the validated document.
///
/// Lines that are not findings (summaries such as `doc.xml fails to
/// validate`, blank lines, echoed source) are skipped.
pub fn parse_schema_log(text: &str) -> Vec<ValidationIssue> {
    let issues: Vec<ValidationIssue> = text.lines().filter_map(parse_log_line).collect();
    info!(issues = issues.len(), "parsed schema validation log");
    issues
}

fn parse_log_line(raw: &str) -> Option<ValidationIssue> {
    let caps = LOG_LINE.captures(raw.trim_end())?;
    let line = caps["line"].parse::<i64>().unwrap_or(1).max(1);
    let severity = match &caps["level"] {
        "warning" => Severity::Warning,
        _ => Severity::Error,
    };
    let message = caps["message"].trim().to_string();
    debug!(
        line,
        element = caps.name("element").map_or("", |m| m.as_str().trim()),
        "schema finding"
    );
    Some(ValidationIssue {
        line: usize::try_from(line).unwrap_or(1),
        column: 0,
        message,
        severity,
        rule_id: None,
        source: IssueSource::Schema,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_xmllint_findings() {
        let log = "\
out.xml:21: element Name: Schemas validity error : Element '{urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2}Name': This element is not expected.
out.xml:7: element IssueDate: Schemas validity warning : Element 'IssueDate': deprecated.
out.xml fails to validate
";
        let issues = parse_schema_log(log);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].line, 21);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].source, IssueSource::Schema);
        assert!(issues[0].message.starts_with("Element '{urn:"));
        assert_eq!(issues[1].severity, Severity::Warning);
        assert_eq!(issues[1].line, 7);
    }

    #[test]
    fn accepts_unnamed_element_and_parser_errors() {
        let log = "\
/tmp/out.xml:-1: element: Schemas validity error : cvc-elt.1.a: Cannot find the declaration of element 'Invoice'.
C:\\work\\out.xml:3: parser error : Opening and ending tag mismatch: ID line 2 and Note
";
        let issues = parse_schema_log(log);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].line, 1);
        assert!(issues[0].message.starts_with("cvc-elt.1.a"));
        assert_eq!(issues[1].line, 3);
        assert_eq!(
            issues[1].message,
            "Opening and ending tag mismatch: ID line 2 and Note"
        );
    }

    #[test]
    fn blank_and_unrelated_lines_are_skipped() {
        assert!(parse_schema_log("").is_empty());
        assert!(parse_schema_log("\n\nvalidates\n").is_empty());
    }
}
