use std::path::{Path, PathBuf};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging. With `debug` enabled the default level is `debug` and
/// `RUST_LOG` may override it; otherwise the level is fixed at `info`.
///
/// When `log_file` is given, output is appended to that file instead of
/// stderr. A log file that cannot be opened falls back to stderr with a
/// warning. Calling this more than once keeps the first subscriber.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // Without debug logging `RUST_LOG` is ignored so a stray variable in the
    // user's environment cannot make the launcher verbose.
    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let Some(path) = log_file else {
        let _ = builder.with_writer(std::io::stderr).try_init();
        return;
    };
    match file_appender(&path) {
        Ok(appender) => {
            let _ = builder.with_ansi(false).with_writer(appender).try_init();
        }
        Err(e) => {
            let _ = builder.with_writer(std::io::stderr).try_init();
            tracing::warn!(path = %path.display(), error = %e, "could not open log file; logging to stderr");
        }
    }
}

/// Non-rotating appender writing to exactly `path`.
pub fn file_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
}
