use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ljdsf CLI - Evaluate Lennard-Jones plus damped-shifted-force electrostatics for a particle system and inspect pair style restart records.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate energies, virial and forces of a system described in a TOML file.
    Eval(EvalArgs),
    /// Inspect pair style restart records.
    Restart(RestartArgs),
}

/// Arguments for the `eval` subcommand.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Path to the system description in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Write the configured pair style to a restart record after evaluation.
    #[arg(long, value_name = "PATH")]
    pub write_restart: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Include per-particle forces in the report.
    #[arg(long)]
    pub forces: bool,

    /// Override the unit system from the system file (e.g. 'real', 'metal', 'lj').
    #[arg(short, long, value_name = "NAME")]
    pub units: Option<String>,
}

/// Arguments for the `restart` subcommand.
#[derive(Args, Debug)]
pub struct RestartArgs {
    #[command(subcommand)]
    pub command: RestartCommands,
}

#[derive(Subcommand, Debug)]
pub enum RestartCommands {
    /// Decode a restart record and print its global settings and explicit pairs.
    Show {
        /// The restart record to decode.
        #[arg(required = true)]
        path: PathBuf,

        /// Number of atom types the record was written for.
        #[arg(long, required = true, value_name = "INT")]
        ntypes: usize,

        /// Print the record as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}
