//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after runtime settings are resolved, and
//! keep the returned [`LogGuard`] alive until exit.

use std::fs;
use std::path::Path;

use flexi_logger::writers::{ArcFileLogWriter, FileLogWriter, FileLogWriterHandle};
use flexi_logger::{Cleanup, Criterion, FileSpec, Naming};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Size at which the log file is rolled over.
pub const LOG_ROTATE_BYTES: u64 = 5 * 1024 * 1024;

/// Rolled-over files kept next to the live one.
pub const LOG_KEEP_FILES: usize = 5;

/// Holds the rotating log file open.  Dropping it flushes and closes the file.
#[must_use = "dropping the guard closes the log file"]
pub struct LogGuard {
    _file: Option<FileLogWriterHandle>,
}

/// Initialise the global tracing subscriber.
///
/// `level` accepts standard level strings: `"error"`, `"warn"`, `"info"`,
/// `"debug"`, `"trace"`, or any `EnvFilter` directive.
///
/// If `prefer_level` is `true`, `level` takes precedence and `RUST_LOG` is only
/// used as a fallback when `level` is invalid. If `prefer_level` is `false`,
/// `RUST_LOG` takes precedence and `level` is the fallback.
///
/// With `log_file` set, output goes to that file instead of stderr, without
/// ANSI colours.  The file rolls over at [`LOG_ROTATE_BYTES`] and the newest
/// [`LOG_KEEP_FILES`] rolled files are kept.
pub fn init(level: &str, prefer_level: bool, log_file: Option<&Path>) -> Result<LogGuard, AppError> {
    let filter = build_filter(level, prefer_level)?;

    let (writer, ansi, file) = match log_file {
        Some(path) => {
            let (file_writer, handle) = rolling_writer(path, LOG_ROTATE_BYTES)?;
            let writer = BoxMakeWriter::new(move || file_writer.clone());
            (writer, false, Some(handle))
        }
        None => (BoxMakeWriter::new(std::io::stderr), true, None),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(LogGuard { _file: file })
}

fn build_filter(level: &str, prefer_level: bool) -> Result<EnvFilter, AppError> {
    if prefer_level {
        match EnvFilter::try_new(level) {
            Ok(filter) => Ok(filter),
            Err(level_err) => EnvFilter::try_from_default_env().map_err(|env_err| {
                AppError::Logger(format!(
                    "invalid log level '{level}': {level_err}; RUST_LOG parse failed: {env_err}"
                ))
            }),
        }
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
    }
}

/// Size-rotated, appending writer for `path`.
///
/// `logs/bot.log` is written as `logs/bot_rCURRENT.log`; rolled files are
/// `logs/bot_r00000.log`, `logs/bot_r00001.log`, and so on.
fn rolling_writer(
    path: &Path,
    max_bytes: u64,
) -> Result<(ArcFileLogWriter, FileLogWriterHandle), AppError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(|e| {
        AppError::Logger(format!("cannot create log dir '{}': {e}", dir.display()))
    })?;

    let basename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AppError::Logger(format!("invalid log file name '{}'", path.display())))?;
    let suffix = path.extension().and_then(|s| s.to_str()).unwrap_or("log");

    let file_spec = FileSpec::default()
        .directory(dir)
        .basename(basename)
        .suffix(suffix)
        .suppress_timestamp();

    FileLogWriter::builder(file_spec)
        .rotate(
            Criterion::Size(max_bytes),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_KEEP_FILES),
        )
        .append()
        .try_build_with_handle()
        .map_err(|e| AppError::Logger(format!("failed to open log file '{}': {e}", path.display())))
}
