//! Placing violation records on lines of the clean output.

use tracing::debug;

use xtrace_locate::{LocationResolver, buffer_lines};
use xtrace_model::{IssueSource, ValidationIssue, ViolationRecord};

use crate::error::ReportError;
use crate::svrl::parse_report;

/// Convert records into issues, resolving each location path against
/// `buffer` (the clean output the report was produced for).
pub fn to_issues<R>(
    records: &[ViolationRecord],
    source: IssueSource,
    buffer: &str,
    resolver: &R,
) -> Vec<ValidationIssue>
where
    R: LocationResolver + ?Sized,
{
    let lines = buffer_lines(buffer);
    records
        .iter()
        .map(|record| {
            let line = resolver.resolve(&record.location_path, &lines);
            debug!(
                rule_id = record.rule_id.as_deref().unwrap_or(""),
                location = %record.location_path,
                line,
                "resolved report location"
            );
            ValidationIssue {
                line,
                column: 0,
                message: record.message_text.clone(),
                severity: record.severity(),
                rule_id: record.rule_id.clone(),
                source,
            }
        })
        .collect()
}

/// Parse an SVRL report and place its records on `buffer`.
pub fn parse_report_issues<R>(
    report_text: &str,
    source: IssueSource,
    buffer: &str,
    resolver: &R,
) -> Result<Vec<ValidationIssue>, ReportError>
where
    R: LocationResolver + ?Sized,
{
    let records = parse_report(report_text)?;
    Ok(to_issues(&records, source, buffer, resolver))
}

#[cfg(test)]
mod tests {
    use xtrace_locate::LineScanResolver;
    use xtrace_model::Severity;

    use super::*;

    struct FixedLine(usize);

    impl LocationResolver for FixedLine {
        fn resolve(&self, _location_path: &str, _lines: &[&str]) -> usize {
            self.0
        }
    }

    fn record(flag: &str, location: &str) -> ViolationRecord {
        ViolationRecord {
            rule_id: Some("BR-02".to_string()),
            severity_flag: flag.to_string(),
            location_path: location.to_string(),
            message_text: "An Invoice shall have an Invoice number (BT-1).".to_string(),
        }
    }

    #[test]
    fn issues_take_resolver_line_and_flag_severity() {
        let issues = to_issues(
            &[record("fatal", "/Invoice[1]"), record("warning", "")],
            IssueSource::BusinessRules,
            "<Invoice/>",
            &FixedLine(9),
        );
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].line, 9);
        assert_eq!(issues[0].column, 0);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].rule_id.as_deref(), Some("BR-02"));
        assert_eq!(issues[1].severity, Severity::Warning);
        assert_eq!(issues[1].source, IssueSource::BusinessRules);
    }

    #[test]
    fn resolver_can_be_a_trait_object() {
        let resolver: &dyn LocationResolver = &LineScanResolver;
        let buffer = "<Invoice>\n  <ID>1</ID>\n</Invoice>";
        let issues = to_issues(
            &[record("error", "/Invoice[1]/ID[1]")],
            IssueSource::ProfileRules,
            buffer,
            resolver,
        );
        assert_eq!(issues[0].line, 2);
    }
}
