use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,ureq=warn";

fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug,ureq=info" } else { DEFAULT_FILTER };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// The interactive UI owns the terminal, so its logs go to a daily file.
/// Keep the guard alive until exit so buffered lines are flushed.
pub fn init_file(dir: &Path, verbose: bool) -> Option<WorkerGuard> {
    if let Err(err) = fs::create_dir_all(dir) {
        eprintln!("psdeck: cannot create log directory {}: {err}", dir.display());
        return None;
    }
    let appender = tracing_appender::rolling::daily(dir, "psdeck.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init();
    if installed.is_err() {
        return None;
    }
    Some(guard)
}

pub fn init_stderr(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
