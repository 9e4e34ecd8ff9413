use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};

use xtrace_core::{Pipeline, PipelineRun, ReportInput, TraceSession};
use xtrace_locate::{LineScanResolver, LocationResolver, buffer_lines};
use xtrace_model::{ProducingLocation, read_text};
use xtrace_split::split_traced_output;

use crate::cli::{CauseArgs, InstrumentArgs, MapArgs, OutputFormatArg, ResolveArgs, SplitArgs};

/// What `map` produced, for the caller to print.
#[derive(Debug)]
pub struct MapResult {
    pub raw: PathBuf,
    pub run: PipelineRun,
    pub format: OutputFormatArg,
}

pub fn run_instrument(pipeline: &Pipeline, args: &InstrumentArgs) -> Result<()> {
    let span = info_span!("instrument", program = %args.program.display());
    let _guard = span.enter();
    let start = Instant::now();

    let instrumented = pipeline
        .instrument(&args.program)
        .with_context(|| format!("instrument {}", args.program.display()))?;
    write_text(args.output.as_deref(), &instrumented)?;

    info!(
        bytes = instrumented.len(),
        duration_ms = start.elapsed().as_millis(),
        "instrument complete"
    );
    Ok(())
}

pub fn run_split(pipeline: &Pipeline, args: &SplitArgs) -> Result<()> {
    let span = info_span!("split", raw = %args.raw.display());
    let _guard = span.enter();

    let raw = read_text(&args.raw).context("read raw output")?;
    let split = split_traced_output(&raw, pipeline.marker_format());
    write_text(args.clean_out.as_deref(), &split.clean_text)?;

    match &args.trace_out {
        Some(path) => {
            let json =
                serde_json::to_string_pretty(&split.entries).context("serialize trace entries")?;
            fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        }
        None => info!(entries = split.entries.len(), "trace entries not written"),
    }
    Ok(())
}

pub fn run_resolve(args: &ResolveArgs) -> Result<usize> {
    let span = info_span!("resolve", document = %args.document.display());
    let _guard = span.enter();

    let text = read_text(&args.document).context("read document")?;
    let line = LineScanResolver.resolve(&args.location, &buffer_lines(&text));
    info!(location = %args.location, line, "resolved location");
    Ok(line)
}

pub fn run_map(pipeline: &Pipeline, args: &MapArgs) -> Result<MapResult> {
    let span = info_span!("map", raw = %args.raw.display());
    let _guard = span.enter();
    let start = Instant::now();

    let raw = read_text(&args.raw).context("read raw output")?;
    let mut inputs = Vec::with_capacity(args.reports.len() + 1);
    for report in &args.reports {
        let text = read_text(&report.path).context("read validation report")?;
        inputs.push(ReportInput::Structured {
            text,
            source: report.source,
        });
    }
    if let Some(path) = &args.schema_log {
        let text = read_text(path).context("read schema log")?;
        inputs.push(ReportInput::SchemaLog { text });
    }

    let run = pipeline
        .run(&raw, &inputs)
        .context("parse validation report")?;
    info!(
        inputs = inputs.len(),
        issues = run.issues.len(),
        duration_ms = start.elapsed().as_millis(),
        "map complete"
    );
    Ok(MapResult {
        raw: args.raw.clone(),
        run,
        format: args.format,
    })
}

pub fn run_cause(pipeline: &Pipeline, args: &CauseArgs) -> Result<ProducingLocation> {
    let span = info_span!("cause", raw = %args.raw.display(), line = args.line);
    let _guard = span.enter();

    let raw = read_text(&args.raw).context("read raw output")?;
    let run = pipeline.run(&raw, &[]).context("split raw output")?;
    let line = usize::try_from(args.line).context("line number out of range")?;

    let mut session = TraceSession::new();
    session.record(&args.raw, run);
    session
        .producing_location(&args.raw, line)
        .ok_or_else(|| anyhow!("no traced element at or before line {line}"))
}

/// Write to `path`, or stdout when absent.
fn write_text(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, text).with_context(|| format!("write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes()).context("write stdout")?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n").context("write stdout")?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "<!--XTRACE|/work/map.xsl|6|Invoice-->\n<Invoice>\n  <!--XTRACE|/work/map.xsl|7|cbc:ID-->\n  <cbc:ID>1</cbc:ID>\n</Invoice>\n";

    #[test]
    fn cause_reports_the_nearest_preceding_producer() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.xml");
        fs::write(&raw, RAW).unwrap();

        let pipeline = Pipeline::default();
        let cause = run_cause(&pipeline, &CauseArgs { raw: raw.clone(), line: 3 }).unwrap();
        assert_eq!(cause.line, 7);
        assert_eq!(cause.element, "cbc:ID");

        let first = run_cause(&pipeline, &CauseArgs { raw, line: 1 }).unwrap();
        assert_eq!(first.element, "Invoice");
    }

    #[test]
    fn split_writes_clean_text_and_entries() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.xml");
        let clean = dir.path().join("clean.xml");
        let trace = dir.path().join("trace.json");
        fs::write(&raw, RAW).unwrap();

        run_split(
            &Pipeline::default(),
            &SplitArgs {
                raw,
                clean_out: Some(clean.clone()),
                trace_out: Some(trace.clone()),
            },
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(clean).unwrap(),
            "<Invoice>\n  <cbc:ID>1</cbc:ID>\n</Invoice>\n"
        );
        let entries: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(trace).unwrap()).unwrap();
        assert_eq!(entries[1]["outputLine"], 2);
        assert_eq!(entries[1]["sourceLine"], 7);
    }

    #[test]
    fn missing_raw_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_cause(
            &Pipeline::default(),
            &CauseArgs {
                raw: dir.path().join("absent.xml"),
                line: 1,
            },
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("absent.xml"));
    }
}
