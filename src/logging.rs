//! Logging bootstrap for the command-line front end.
//!
//! The library only emits through the `log` facade; this module attaches a
//! `flexi_logger` backend writing to stderr, at most once per process.

use flexi_logger::{Logger, LoggerHandle};
use once_cell::sync::OnceCell;

const DEFAULT_LEVEL: &str = "warn";

static LOGGER: OnceCell<(String, LoggerHandle)> = OnceCell::new();

/// Starts stderr logging at `level`, or from `RUST_LOG` when `level` is
/// `None` (falling back to `warn`).
///
/// Repeated calls are no-ops; the first level stays in effect.
pub fn init_logging(level: Option<&str>) -> Result<(), String> {
    let normalized = level.map(normalize_level).transpose()?;
    LOGGER.get_or_try_init(|| -> Result<(String, LoggerHandle), String> {
        let logger = match normalized {
            Some(level) => Logger::try_with_str(level)
                .map_err(|err| format!("invalid log level `{level}`: {err}"))?,
            None => Logger::try_with_env_or_str(DEFAULT_LEVEL)
                .map_err(|err| format!("invalid RUST_LOG specification: {err}"))?,
        };
        let handle = logger
            .log_to_stderr()
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;
        let active = normalized.unwrap_or(DEFAULT_LEVEL).to_string();
        log::debug!("logging started at `{active}`");
        Ok((active, handle))
    })?;
    Ok(())
}

/// Level the logger was started with, if it has been.
pub fn active_level() -> Option<&'static str> {
    LOGGER.get().map(|(level, _)| level.as_str())
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok("off"),
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected off|trace|debug|info|warn|error"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_normalized() {
        assert_eq!(normalize_level(" Warning "), Ok("warn"));
        assert_eq!(normalize_level("DEBUG"), Ok("debug"));
        assert!(normalize_level("loud").is_err());
    }

    #[test]
    fn init_is_idempotent() {
        assert!(init_logging(Some("error")).is_ok());
        assert!(init_logging(Some("debug")).is_ok());
        assert_eq!(active_level(), Some("error"));
    }
}
