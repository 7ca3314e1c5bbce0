use std::path::Path;
use std::str::FromStr;

use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use crate::error::{AuditError, Result};
use crate::settings::Settings;

fn parse_level(raw: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(raw).map_err(|e| AuditError::Settings(format!("log level {raw:?}: {e}")))
}

fn file_appender(log_file: &Path) -> Result<RollingFileAppender> {
    let dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = log_file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AuditError::Settings(format!("invalid log file: {}", log_file.display())))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .map_err(|e| AuditError::Settings(format!("{}: {e}", log_file.display())))
}

/// Build the console + file logging sinks without installing them globally.
/// The returned guard must outlive every event written through the dispatch;
/// dropping it flushes the log file.
pub fn build_dispatch(settings: &Settings) -> Result<(Dispatch, WorkerGuard)> {
    let console_level = parse_level(&settings.console_level)?;
    let file_level = parse_level(&settings.file_level)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(&settings.log_file)?);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_level);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_filter(file_level);

    let subscriber = tracing_subscriber::registry().with(console_layer).with(file_layer);
    Ok((Dispatch::new(subscriber), guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_respects_level() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            log_file: dir.path().join("audit.log"),
            ..Settings::default()
        };
        let (dispatch, guard) = build_dispatch(&settings).unwrap();
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::debug!("debug only goes to the console");
            tracing::info!("info reaches the file");
        });
        drop(guard);

        let content = std::fs::read_to_string(dir.path().join("audit.log")).unwrap();
        assert!(content.contains("info reaches the file"));
        assert!(content.contains("INFO"));
        assert!(!content.contains("debug only goes to the console"));
    }

    #[test]
    fn test_bad_level_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            log_file: dir.path().join("audit.log"),
            console_level: "loud".to_string(),
            ..Settings::default()
        };
        assert!(matches!(build_dispatch(&settings), Err(AuditError::Settings(_))));
    }
}
