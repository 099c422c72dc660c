//! Logging setup for the library and CLI.
//!
//! Structured logging via `tracing`. The filter comes from `RUST_LOG`
//! when set, otherwise from a verbosity level. Console output goes to
//! stdout; an optional file layer mirrors events without ANSI colors.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the log file writer alive.
///
/// Dropping the guard flushes and closes the log file, so hold it for
/// the lifetime of the program.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Maps `-q`/`-v` style verbosity to a default filter directive.
fn default_directive(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initializes the global tracing subscriber.
///
/// `verbosity` counts `-v` flags, negative for quiet; `RUST_LOG`
/// overrides it when set. With a `log_file`, the file's directory is
/// created and events are mirrored there. Call once at startup, a
/// second call panics.
pub fn init_logging(verbosity: i8, log_file: Option<&Path>) -> Result<LoggingGuard, io::Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let (file_layer, file_guard) = match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let name = path.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name")
            })?;
            std::fs::create_dir_all(dir)?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_timer(LocalTime::rfc_3339())
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTime::rfc_3339())
        .with_writer(io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(default_directive(-3), "warn");
        assert_eq!(default_directive(-1), "warn");
        assert_eq!(default_directive(0), "info");
        assert_eq!(default_directive(1), "debug");
        assert_eq!(default_directive(2), "trace");
        assert_eq!(default_directive(7), "trace");
    }

    #[test]
    fn test_guard_holds_file_writer() {
        // The global subscriber can only be installed once per process,
        // so only the guard plumbing is exercised here.
        let (writer, guard) = tracing_appender::non_blocking(std::io::sink());
        drop(writer);
        let _logging_guard = LoggingGuard {
            _file_guard: Some(guard),
        };
    }
}
