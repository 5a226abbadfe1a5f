//! Log output for the binary. Events go to stderr so that stdout carries only the
//! JSON and text reports the subcommands print.

use crate::config::TelemetryConfig;
use tracing::warn;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";

/// Where the active log directives were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOrigin {
    /// `RUST_LOG` was set and parsed.
    Environment,
    /// `APP_LOG_LEVEL`, or its default.
    Configured,
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("log level {directives:?} from APP_LOG_LEVEL is not a valid tracing filter")]
    InvalidLevel {
        directives: String,
        #[source]
        source: ParseError,
    },
    #[error("a global log subscriber is already installed")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Filter chosen for a run, plus the `RUST_LOG` value that had to be ignored, if any.
#[derive(Debug)]
pub struct LogFilter {
    pub filter: EnvFilter,
    pub origin: FilterOrigin,
    pub rejected_env: Option<String>,
}

/// Build the filter from an optional `RUST_LOG` value and the configured level.
///
/// A usable `RUST_LOG` wins. An unparsable one is set aside in favour of the
/// configured level; an unparsable configured level is an error.
pub fn log_filter(
    config: &TelemetryConfig,
    rust_log: Option<&str>,
) -> Result<LogFilter, TelemetryError> {
    let mut rejected_env = None;

    if let Some(directives) = rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        match EnvFilter::try_new(directives) {
            Ok(filter) => {
                return Ok(LogFilter {
                    filter,
                    origin: FilterOrigin::Environment,
                    rejected_env: None,
                })
            }
            Err(_) => rejected_env = Some(directives.to_string()),
        }
    }

    let filter =
        EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::InvalidLevel {
            directives: config.log_level.clone(),
            source,
        })?;

    Ok(LogFilter {
        filter,
        origin: FilterOrigin::Configured,
        rejected_env,
    })
}

/// Install the global subscriber for the process.
pub fn init(config: &TelemetryConfig) -> Result<FilterOrigin, TelemetryError> {
    let rust_log = std::env::var(RUST_LOG).ok();
    let LogFilter {
        filter,
        origin,
        rejected_env,
    } = log_filter(config, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)?;

    if let Some(value) = rejected_env {
        warn!(
            rust_log = %value,
            level = %config.log_level,
            "ignoring unparsable RUST_LOG"
        );
    }

    Ok(origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: level.to_string(),
        }
    }

    #[test]
    fn configured_level_is_used_without_rust_log() {
        let chosen = log_filter(&configured("info"), None).expect("filter builds");
        assert_eq!(chosen.origin, FilterOrigin::Configured);
        assert_eq!(chosen.rejected_env, None);

        let blank = log_filter(&configured("warn"), Some("   ")).expect("filter builds");
        assert_eq!(blank.origin, FilterOrigin::Configured);
    }

    #[test]
    fn rust_log_overrides_configured_level() {
        let chosen = log_filter(&configured("info"), Some("warn,bulkscan=debug"))
            .expect("filter builds");
        assert_eq!(chosen.origin, FilterOrigin::Environment);
        assert_eq!(chosen.rejected_env, None);
    }

    #[test]
    fn unparsable_rust_log_falls_back_to_configured_level() {
        let chosen =
            log_filter(&configured("debug"), Some("bulkscan=chatty")).expect("filter builds");
        assert_eq!(chosen.origin, FilterOrigin::Configured);
        assert_eq!(chosen.rejected_env.as_deref(), Some("bulkscan=chatty"));
    }

    #[test]
    fn unparsable_configured_level_is_reported() {
        match log_filter(&configured("bulkscan=chatty"), None) {
            Err(TelemetryError::InvalidLevel { directives, .. }) => {
                assert_eq!(directives, "bulkscan=chatty");
            }
            other => panic!("expected invalid level, got {other:?}"),
        }
    }
}
