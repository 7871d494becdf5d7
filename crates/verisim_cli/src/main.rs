//! Verisim CLI: inspect, query, export and draw value-change dumps.
//!
//! Provides `verisim info` for a streaming summary of a dump, `verisim value`
//! for point queries, `verisim export` for change tables, and `verisim render`
//! for a text waveform of a time window.

#![warn(missing_docs)]

mod export;
mod info;
mod pipeline;
mod render;
mod value;
mod waveform;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use verisim_common::Radix;
use verisim_config::ExportFormat;

/// Verisim, a waveform-trace engine for VCD dumps.
#[derive(Parser, Debug)]
#[command(name = "verisim", version, about = "Verisim waveform-trace engine")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `verisim.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize a dump without building timelines.
    Info(InfoArgs),
    /// Print one signal's value at a point in time.
    Value(ValueArgs),
    /// Export the change table of selected signals.
    Export(ExportArgs),
    /// Draw selected signals over a time window.
    Render(RenderArgs),
}

/// Arguments for the `verisim info` subcommand.
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Dump file (`.vcd` or `.vcd.gz`).
    pub dump: String,

    /// Output format for the summary.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `verisim value` subcommand.
#[derive(Parser, Debug)]
pub struct ValueArgs {
    /// Dump file (`.vcd` or `.vcd.gz`).
    pub dump: String,

    /// Signal name, full (`top.dut.count`) or a unique leaf (`count`).
    #[arg(short, long)]
    pub signal: String,

    /// Time in ticks (`150`) or with a unit (`15ns`).
    #[arg(short, long)]
    pub time: String,

    /// Number base of the printed value.
    #[arg(short, long, value_enum)]
    pub radix: Option<RadixArg>,
}

/// Arguments for the `verisim export` subcommand.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Dump file (`.vcd` or `.vcd.gz`).
    pub dump: String,

    /// Signals to export (repeatable). Defaults to `[view] signals`, then all.
    #[arg(short, long)]
    pub signal: Vec<String>,

    /// Output format. Defaults to `[export] format`.
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormatArg>,

    /// Output file. Defaults to stdout.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Number base of exported values.
    #[arg(short, long, value_enum)]
    pub radix: Option<RadixArg>,
}

/// Arguments for the `verisim render` subcommand.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Dump file (`.vcd` or `.vcd.gz`).
    pub dump: String,

    /// Signals to draw (repeatable). Defaults to `[view] signals`, then all.
    #[arg(short, long)]
    pub signal: Vec<String>,

    /// Window start (e.g., `0`, `10ns`). Defaults to 0.
    #[arg(long)]
    pub from: Option<String>,

    /// Window end, exclusive. Defaults to the last timestamp.
    #[arg(long)]
    pub to: Option<String>,

    /// Total output width. Defaults to `[render] columns`.
    #[arg(short, long)]
    pub columns: Option<u16>,

    /// Number base of bus labels.
    #[arg(short, long, value_enum)]
    pub radix: Option<RadixArg>,
}

/// Summary output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Change-table output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    /// `time,signal,value` rows.
    Csv,
    /// A JSON document of time steps.
    Json,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Csv => ExportFormat::Csv,
            ExportFormatArg::Json => ExportFormat::Json,
        }
    }
}

/// Number base for printed values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RadixArg {
    /// Hexadecimal.
    Hex,
    /// Binary.
    Binary,
    /// Unsigned decimal.
    Decimal,
}

impl From<RadixArg> for Radix {
    fn from(arg: RadixArg) -> Self {
        match arg {
            RadixArg::Hex => Radix::Hex,
            RadixArg::Binary => Radix::Binary,
            RadixArg::Decimal => Radix::Decimal,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

impl GlobalArgs {
    /// Log level implied by `--quiet` and `--verbose`.
    fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Warn
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    // RUST_LOG, when set, takes precedence over the flags.
    env_logger::Builder::new()
        .filter_level(global.log_level())
        .parse_default_env()
        .init();

    let result = match cli.command {
        Command::Info(ref args) => info::run(args, &global),
        Command::Value(ref args) => value::run(args, &global),
        Command::Export(ref args) => export::run(args, &global),
        Command::Render(ref args) => render::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
