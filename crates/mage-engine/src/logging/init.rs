use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "mage_engine=debug"). When unset, `RUST_LOG` is consulted, then
/// `default_level` applies.
///
/// Per-call GL traces (`headless gl: ...`) are emitted at `trace`; mesh
/// assembly and resource lifetimes at `debug`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl LoggingConfig {
    /// Only warnings and errors, regardless of `RUST_LOG`.
    pub fn quiet() -> Self {
        Self {
            env_filter: Some("warn".to_string()),
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored, as is a logger installed by someone else
/// first (e.g. a test harness).
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(config.default_level);
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::quiet());
        init_logging(LoggingConfig::default());
        assert!(log::max_level() <= log::LevelFilter::Warn);
    }

    #[test]
    fn quiet_overrides_environment() {
        let config = LoggingConfig::quiet();
        assert_eq!(config.env_filter.as_deref(), Some("warn"));
        assert_eq!(config.default_level, log::LevelFilter::Info);
    }
}
