//! Runtime configuration read from the environment

use log::LevelFilter;

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "OSDEMOS_LOG";

pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: LevelFilter,
    /// Set when `OSDEMOS_LOG` held something unparseable; reported once the
    /// logger is up.
    pub rejected_log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: DEFAULT_LOG_LEVEL,
            rejected_log_level: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(raw) = lookup(LOG_ENV) {
            match raw.trim().parse::<LevelFilter>() {
                Ok(level) => config.log_level = level,
                Err(_) => config.rejected_log_level = Some(raw),
            }
        }
        config
    }

    /// Install the stderr logger at the configured level.
    pub fn init_logging(&self) {
        crate::logger::init(self.log_level);
        if let Some(raw) = &self.rejected_log_level {
            log::warn!(
                "ignoring {}={:?}, using {}",
                LOG_ENV,
                raw,
                DEFAULT_LOG_LEVEL
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(value: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| {
            assert_eq!(key, LOG_ENV);
            value.map(str::to_string)
        }
    }

    #[test]
    fn defaults_to_warn() {
        let config = Config::from_lookup(lookup(None));
        assert_eq!(config, Config::default());
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    fn parses_level_names_case_insensitively() {
        assert_eq!(Config::from_lookup(lookup(Some("debug"))).log_level, LevelFilter::Debug);
        assert_eq!(Config::from_lookup(lookup(Some("TRACE"))).log_level, LevelFilter::Trace);
        assert_eq!(Config::from_lookup(lookup(Some(" off "))).log_level, LevelFilter::Off);
    }

    #[test]
    fn bad_level_falls_back_and_is_remembered() {
        let config = Config::from_lookup(lookup(Some("loud")));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.rejected_log_level.as_deref(), Some("loud"));
    }
}
