use crate::error::PascalineError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;

/// Sends tracing output to `log_file`. Without a file nothing is installed, so the terminal UI is
/// never written over. Returns whether a subscriber was installed.
pub fn try_init_tracing(level: LevelFilter, log_file: Option<&Path>) -> Result<bool, PascalineError> {
    let Some(path) = log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| PascalineError::Logging {
            message: format!("{}: {error}", path.display()),
        })?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| PascalineError::Logging {
            message: error.to_string(),
        })?;

    tracing::info!(path = %path.display(), %level, "logging started");
    Ok(true)
}
