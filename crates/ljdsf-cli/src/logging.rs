use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    fmt::{self, format::FmtSpan},
    prelude::*,
    registry::LookupSpan,
};

/// Target prefix shared by the library and this binary.
const CRATE_TARGET: &str = "ljdsf";

/// `-q` keeps errors only; each `-v` opens one more level above warnings.
fn console_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Our own events at `level`; dependencies never go past warnings.
fn crate_targets(level: LevelFilter) -> Targets {
    Targets::new()
        .with_default(level.min(LevelFilter::WARN))
        .with_target(CRATE_TARGET, level)
}

/// Plain-text file layer. Closing the instrumented init and compute spans records their timings.
fn file_layer<S>(file: File, level: LevelFilter) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(crate_targets(level))
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let console = console_level(verbosity, quiet);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(crate_targets(console));

    // The file always keeps debug detail, whatever the console shows.
    let file_output = match log_file {
        Some(path) => Some(file_layer(
            File::create(&path)?,
            console.max(LevelFilter::DEBUG),
        )),
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_output)
        .try_init()
        .map_err(|e| CliError::Other(e.into()))
}
