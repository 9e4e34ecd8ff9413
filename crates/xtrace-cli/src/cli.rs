//! CLI argument definitions for `xtrace`.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use xtrace_model::IssueSource;

#[derive(Parser)]
#[command(
    name = "xtrace",
    version,
    about = "Trace validation errors in transformation output back to XSLT program lines",
    long_about = "Instrument an XSLT program with position markers, split the traced output of a run,\n\
                  and map schema and business-rule validation findings back to the program line\n\
                  that emitted the offending element."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: ./xtrace.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Insert position markers before every literal element of a program.
    Instrument(InstrumentArgs),

    /// Separate raw traced output into clean output and trace entries.
    Split(SplitArgs),

    /// Print the line an XPath location path points at in a document.
    Resolve(ResolveArgs),

    /// Map validator findings on a traced run back to program lines.
    Map(MapArgs),

    /// Print the program location that produced a line of output.
    Cause(CauseArgs),
}

#[derive(Parser)]
pub struct InstrumentArgs {
    /// XSLT program to instrument.
    #[arg(value_name = "PROGRAM")]
    pub program: PathBuf,

    /// Write the instrumented program here instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct SplitArgs {
    /// Raw output of a run of the instrumented program.
    #[arg(value_name = "RAW")]
    pub raw: PathBuf,

    /// Write the clean output here instead of stdout.
    #[arg(long = "clean-out", value_name = "PATH")]
    pub clean_out: Option<PathBuf>,

    /// Write trace entries as JSON.
    #[arg(long = "trace-out", value_name = "PATH")]
    pub trace_out: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// XML document to search.
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Location path, e.g. /Invoice[1]/AccountingSupplierParty[1]/Party[1].
    #[arg(value_name = "LOCATION")]
    pub location: String,
}

#[derive(Parser)]
pub struct MapArgs {
    /// Raw output of a run of the instrumented program.
    #[arg(value_name = "RAW")]
    pub raw: PathBuf,

    /// SVRL report; suffix `:profile` for profile rules (default `:business`).
    #[arg(long = "report", value_name = "PATH[:business|:profile]")]
    pub reports: Vec<ReportArg>,

    /// Schema validator log in xmllint format.
    #[arg(long = "schema-log", value_name = "PATH")]
    pub schema_log: Option<PathBuf>,

    /// Output format for the traced issues.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Parser)]
pub struct CauseArgs {
    /// Raw output of a run of the instrumented program.
    #[arg(value_name = "RAW")]
    pub raw: PathBuf,

    /// 1-indexed line of the clean output.
    #[arg(value_name = "LINE", value_parser = clap::value_parser!(u64).range(1..))]
    pub line: u64,
}

/// A `--report` value: report path plus the rule set that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArg {
    pub path: PathBuf,
    pub source: IssueSource,
}

impl FromStr for ReportArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err("report path must not be empty".to_string());
        }
        let suffixed = value.rsplit_once(':').and_then(|(path, suffix)| {
            IssueSource::parse(suffix)
                .filter(|source| *source != IssueSource::Schema)
                .map(|source| (path, source))
        });
        let (path, source) = suffixed.unwrap_or((value, IssueSource::BusinessRules));
        if path.is_empty() {
            return Err(format!("missing report path in `{value}`"));
        }
        Ok(Self {
            path: PathBuf::from(path),
            source,
        })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
