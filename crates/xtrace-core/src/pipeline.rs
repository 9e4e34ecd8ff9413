use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use xtrace_instrument::{InstrumentError, MarkerFormat, instrument_file};
use xtrace_locate::{LineScanResolver, LocationResolver};
use xtrace_map::{MapperOptions, map_issues};
use xtrace_model::{IssueSource, Severity, TraceEntry, TracedIssue, ValidationIssue};
use xtrace_report::{ReportError, parse_report_issues, parse_schema_log};
use xtrace_split::split_traced_output;

/// Validator output to place on the clean output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportInput {
    /// SVRL report text from a rule-set validator.
    Structured { text: String, source: IssueSource },
    /// Line log from a schema validator.
    SchemaLog { text: String },
}

impl ReportInput {
    pub fn source(&self) -> IssueSource {
        match self {
            Self::Structured { source, .. } => *source,
            Self::SchemaLog { .. } => IssueSource::Schema,
        }
    }
}

/// Result of one pipeline run over one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub clean_text: String,
    pub entries: Vec<TraceEntry>,
    pub issues: Vec<TracedIssue>,
}

impl PipelineRun {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|traced| traced.issue.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

/// Stage configuration plus the location resolver to use.
#[derive(Debug, Clone)]
pub struct Pipeline<R = LineScanResolver> {
    marker: MarkerFormat,
    mapper: MapperOptions,
    resolver: R,
}

impl Pipeline<LineScanResolver> {
    pub fn new(marker: MarkerFormat, mapper: MapperOptions) -> Self {
        Self {
            marker,
            mapper,
            resolver: LineScanResolver,
        }
    }
}

impl Default for Pipeline<LineScanResolver> {
    fn default() -> Self {
        Self::new(MarkerFormat::default(), MapperOptions::default())
    }
}

impl<R: LocationResolver> Pipeline<R> {
    /// Swap in a different location resolver.
    pub fn with_resolver<S: LocationResolver>(self, resolver: S) -> Pipeline<S> {
        Pipeline {
            marker: self.marker,
            mapper: self.mapper,
            resolver,
        }
    }

    pub fn marker_format(&self) -> &MarkerFormat {
        &self.marker
    }

    pub fn mapper_options(&self) -> &MapperOptions {
        &self.mapper
    }

    /// Instrument a program file with this pipeline's marker format.
    pub fn instrument(&self, program: &Path) -> Result<String, InstrumentError> {
        instrument_file(program, &self.marker)
    }

    /// Run the in-memory stages over the raw traced output of one
    /// execution and the reports produced for its clean output.
    ///
    /// A malformed structured report aborts the run; everything else
    /// degrades to less precise locations.
    pub fn run(&self, raw_output: &str, reports: &[ReportInput]) -> Result<PipelineRun, ReportError> {
        let start = Instant::now();
        let split = info_span!("split").in_scope(|| split_traced_output(raw_output, &self.marker));

        let mut issues: Vec<ValidationIssue> = Vec::new();
        for report in reports {
            let _guard = info_span!("report", source = report.source().label()).entered();
            match report {
                ReportInput::Structured { text, source } => issues.extend(parse_report_issues(
                    text,
                    *source,
                    &split.clean_text,
                    &self.resolver,
                )?),
                ReportInput::SchemaLog { text } => issues.extend(parse_schema_log(text)),
            }
        }

        let traced = info_span!("map")
            .in_scope(|| map_issues(&issues, &split.entries, &split.clean_text, &self.mapper));

        let run = PipelineRun {
            clean_text: split.clean_text,
            entries: split.entries,
            issues: traced,
        };
        info!(
            reports = reports.len(),
            issues = run.issues.len(),
            errors = run.count(Severity::Error),
            duration_ms = start.elapsed().as_millis(),
            "pipeline run complete"
        );
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FirstLine;

    fn pipeline() -> Pipeline {
        Pipeline::default()
    }

    impl LocationResolver for FirstLine {
        fn resolve(&self, _location_path: &str, _lines: &[&str]) -> usize {
            1
        }
    }

    const RAW: &str = "<!--XTRACE|/work/map.xsl|4|Invoice-->\n<Invoice>\n  <!--XTRACE|/work/map.xsl|5|cbc:ID-->\n  <cbc:ID>1</cbc:ID>\n</Invoice>";

    #[test]
    fn run_without_reports_only_splits() {
        let run = pipeline().run(RAW, &[]).unwrap();
        assert_eq!(run.clean_text, "<Invoice>\n  <cbc:ID>1</cbc:ID>\n</Invoice>");
        assert_eq!(run.entries.len(), 2);
        assert!(run.issues.is_empty());
        assert!(!run.has_errors());
    }

    #[test]
    fn resolver_is_replaceable() {
        let report = ReportInput::Structured {
            text: r#"<svrl:schematron-output xmlns:svrl="http://purl.oclc.org/dsdl/svrl">
  <svrl:failed-assert flag="warning" location="/Invoice[1]/ID[1]"><svrl:text>odd</svrl:text></svrl:failed-assert>
</svrl:schematron-output>"#
                .to_string(),
            source: IssueSource::ProfileRules,
        };
        let located = pipeline().run(RAW, std::slice::from_ref(&report)).unwrap();
        assert_eq!(located.issues[0].issue.line, 2);

        let pinned = pipeline()
            .with_resolver(FirstLine)
            .run(RAW, &[report])
            .unwrap();
        assert_eq!(pinned.issues[0].issue.line, 1);
        assert_eq!(pinned.count(Severity::Warning), 1);
    }

    #[test]
    fn run_serializes_for_editor_collaborators() {
        let run = pipeline().run(RAW, &[]).unwrap();
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["entries"][1]["elementName"], "cbc:ID");
        assert_eq!(json["entries"][1]["outputLine"], 2);
        assert!(json["cleanText"].as_str().unwrap().starts_with("<Invoice>"));
    }

    #[test]
    fn malformed_structured_report_aborts() {
        let report = ReportInput::Structured {
            text: "<svrl:schematron-output><svrl:failed-assert></oops>".to_string(),
            source: IssueSource::BusinessRules,
        };
        let err = pipeline().run(RAW, &[report]).unwrap_err();
        assert!(matches!(err, ReportError::Xml { .. }));
    }
}
