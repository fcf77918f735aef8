//! Hydra CLI: generates daisy-chain networks for chip grids.
//!
//! Provides `hydra generate`, which builds a network from a `hydra.toml`
//! file and/or command-line arguments and writes it as a controller
//! network configuration.

#![warn(missing_docs)]

mod generate;
mod network;

use std::io;
use std::process;

use clap::{Parser, Subcommand};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use generate::GenerateArgs;

/// Hydra: daisy-chain network synthesis for chip grids.
#[derive(Parser, Debug)]
#[command(name = "hydra", version, about = "Hydra network generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `hydra.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a network and write its controller configuration.
    Generate(GenerateArgs),
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(log_level(&global));

    let result = match cli.command {
        Command::Generate(ref args) => generate::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn log_level(global: &GlobalArgs) -> LevelFilter {
    if global.quiet {
        LevelFilter::Warn
    } else if global.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Logs to stderr so a network written to stdout stays clean.
fn init_logging(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    if WriteLogger::init(level, config, io::stderr()).is_err() {
        eprintln!("warning: a logger is already installed");
    }
}
