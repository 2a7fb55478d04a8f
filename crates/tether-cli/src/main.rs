//! # tether-cli
//!
//! Command-line front end for the Tether dependency linker.
//!
//! This is the main entry point for the `tether` tool. It handles command
//! parsing, sets up logging and error handling, and dispatches to the command
//! handlers.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use tether_config::{Mode, OutputFormat, Overrides};
use tether_core::DuplicatePolicy;

mod commands;
mod output;

use commands::CommandContext;
use output::colors::ColorSupport;
use output::errors::ErrorFormatter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nrustc: ",
    env!("RUSTC_VERSION"),
    "\ntarget: ",
    env!("TETHER_BUILD_TARGET"),
);

/// Link flat declarations into dependency trees and graphs
#[derive(Parser)]
#[command(name = "tether", version, long_version = LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Manifest to read (default: nearest tether.toml or tether.json)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub manifest: Option<Utf8PathBuf>,

    /// User config file (default: ~/.config/tether/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// When to color output
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Link the manifest and print roots, order and unlinked nodes
    Resolve {
        #[command(flatten)]
        opts: ResolveOpts,

        /// Exit with an error when any node is unlinked
        #[arg(long)]
        strict: bool,
    },
    /// Print the initialization order, one name per line
    Order {
        #[command(flatten)]
        opts: ResolveOpts,
    },
    /// Explain where one node sits, or why it is unlinked
    Why {
        name: String,

        #[command(flatten)]
        opts: ResolveOpts,
    },
    /// Validate the manifest without linking it
    Check {
        #[command(flatten)]
        opts: ResolveOpts,
    },
}

/// Flags shared by every command that reads a manifest
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveOpts {
    /// Resolution mode, overriding the manifest
    #[arg(long)]
    pub mode: Option<Mode>,

    /// Output format
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// How to treat repeated names: reject, keep-first or keep-last
    #[arg(long)]
    pub duplicates: Option<DuplicatePolicy>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn support(self) -> ColorSupport {
        match self {
            ColorChoice::Auto => ColorSupport::detect(),
            ColorChoice::Always => ColorSupport::enabled(),
            ColorChoice::Never => ColorSupport::disabled(),
        }
    }
}

impl ResolveOpts {
    /// These flags as the command-line settings layer
    pub fn overrides(&self, strict: Option<bool>) -> Overrides {
        Overrides {
            mode: self.mode,
            format: self.format,
            strict,
            duplicates: self.duplicates,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.log_format);
    setup_panic_handler();

    debug!("Starting tether v{}", env!("CARGO_PKG_VERSION"));

    let colors = cli.color.support();
    match run_cli(cli, colors) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", ErrorFormatter::with_colors(colors).format_error(&err));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli, colors: ColorSupport) -> anyhow::Result<ExitCode> {
    // Create Tokio runtime for async file reads
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| tether_core::TetherError::io("Failed to create async runtime", e))?;

    let ctx = CommandContext::new(cli.manifest, cli.config, colors)?;
    rt.block_on(commands::dispatch_command(cli.command, &ctx))
}

fn setup_logging(verbose: bool, format: LogFormat) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tether={level},tether_core={level},tether_config={level},tether_resolver={level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("tether encountered an unexpected error: {}", panic_info);
        eprintln!("tether crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/tether-rs/tether/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
