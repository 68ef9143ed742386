//! `tivar` command-line tool.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tivar_cli::logging::{LogConfig, LogFormat, init_logging};
use tivar_cli::report::diagnostic_lines;
use tivar_format::VarError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{Session, run_decode, run_encode, run_extract, run_inspect, run_models};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let result = Session::from_args(&cli.session).and_then(|session| match &cli.command {
        Command::Inspect(args) => run_inspect(&session, args),
        Command::Decode(args) => run_decode(&session, args),
        Command::Encode(args) => run_encode(&session, args),
        Command::Extract(args) => run_extract(&session, args),
        Command::Models => run_models(&session),
    });

    if let Err(error) = result {
        eprintln!("error: {error:#}");
        if let Some(VarError::Rejected(diagnostics)) = error.downcast_ref::<VarError>() {
            eprintln!("{}", diagnostic_lines(diagnostics));
        }
        std::process::exit(1);
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let mut config = LogConfig::default()
        .with_level(level_filter)
        .with_format(format)
        .with_log_file(cli.log_file.clone());
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
