use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "city_events.log";
const DEFAULT_FILTER: &str = "city_events=debug,info";

/// Console output on stderr plus a daily-rolling JSON file under `logs/`.
///
/// Stdout is left alone so `gather` and `parks` can print JSON there.
pub fn init_logging() {
    if let Err(e) = std::fs::create_dir_all(LOG_DIR) {
        eprintln!("Could not create {LOG_DIR}/: {e}");
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(LOG_DIR, LOG_FILE));

    let file_layer = fmt::layer().json().with_writer(file_writer);
    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    keep_flushing(guard);
}

/// The writer thread stops when its guard drops; the process owns it from here.
fn keep_flushing(guard: WorkerGuard) {
    std::mem::forget(guard);
}
