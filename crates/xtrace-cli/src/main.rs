//! `xtrace` command-line entry point.

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use xtrace_cli::config::Config;
use xtrace_cli::logging::{LogConfig, LogFormat, init_logging};
use xtrace_core::Pipeline;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_cause, run_instrument, run_map, run_resolve, run_split};
use crate::summary::print_map_result;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    let pipeline = build_pipeline(cli.config.as_deref())?;
    match &cli.command {
        Command::Instrument(args) => run_instrument(&pipeline, args).map(|()| 0),
        Command::Split(args) => run_split(&pipeline, args).map(|()| 0),
        Command::Resolve(args) => {
            let line = run_resolve(args)?;
            println!("{line}");
            Ok(0)
        }
        Command::Map(args) => {
            let result = run_map(&pipeline, args)?;
            print_map_result(&result)?;
            Ok(if result.run.has_errors() { 1 } else { 0 })
        }
        Command::Cause(args) => {
            let cause = run_cause(&pipeline, args)?;
            println!(
                "{}:{}: {}",
                cause.file.display(),
                cause.line,
                cause.element
            );
            Ok(0)
        }
    }
}

fn build_pipeline(explicit: Option<&Path>) -> Result<Pipeline> {
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let config = Config::load(explicit, &cwd)?;
    let marker = config.marker_format().context("marker settings")?;
    Ok(Pipeline::new(marker, config.mapper_options()))
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
