//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tivar_format::EntryKind;

#[derive(Parser)]
#[command(
    name = "tivar",
    version,
    about = "Inspect, decode and build TI calculator variable files",
    long_about = "Inspect, decode and build TI-82/83/84 variable files (.8xp, .8xs, .8xy, .8xg, ...).\n\n\
                  Problems found while reading are reported as diagnostics; \
                  use --strict to treat them as errors."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub session: SessionArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Options shared by every command.
#[derive(Args, Clone, Default)]
pub struct SessionArgs {
    /// Calculator model, e.g. "TI-84+CE" or "ti84pce".
    #[arg(long, value_name = "MODEL", global = true)]
    pub model: Option<String>,

    /// Load the token table from a CSV file (columns: bytes,display).
    #[arg(long, value_name = "CSV", global = true)]
    pub tokens: Option<PathBuf>,

    /// Fail on any warning diagnostic.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the header, entries and diagnostics of a file.
    Inspect(InspectArgs),

    /// Print the text of tokenized entries.
    Decode(DecodeArgs),

    /// Tokenize a text file into a single-entry variable file.
    Encode(EncodeArgs),

    /// Copy one entry of a file into a file of its own.
    Extract(ExtractArgs),

    /// List the known calculator models.
    Models,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Variable file to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Variable file to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only decode the entry at this position.
    #[arg(long, value_name = "INDEX")]
    pub entry: Option<usize>,
}

#[derive(Args)]
pub struct EncodeArgs {
    /// Text file to tokenize ("-" reads stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Kind of entry to create.
    #[arg(long, value_enum, default_value = "program")]
    pub kind: KindArg,

    /// Entry name (default depends on the kind).
    #[arg(long)]
    pub name: Option<String>,

    /// Mark the entry as archived.
    #[arg(long)]
    pub archived: bool,

    /// Header comment.
    #[arg(long)]
    pub comment: Option<String>,

    /// Output file (default: <NAME>.<EXTENSION> in the current directory).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Variable file to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Position of the entry to extract.
    #[arg(long, value_name = "INDEX")]
    pub entry: usize,

    /// Output file (default: <NAME>.<EXTENSION> next to FILE).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Entry kinds that can be built from text.
#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Program,
    Protected,
    String,
    Equation,
}

impl From<KindArg> for EntryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Program => EntryKind::Program,
            KindArg::Protected => EntryKind::ProtectedProgram,
            KindArg::String => EntryKind::String,
            KindArg::Equation => EntryKind::Equation,
        }
    }
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
