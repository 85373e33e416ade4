// Configuration module for godev-oracle
// Reads from environment variables with sensible defaults

use crate::resolve::TieBreak;
use clap::ValueEnum;
use std::env;
use std::time::Duration;

/// Application configuration
///
/// Built once in `main` and passed by reference to everything that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Oracle executable name or path (GODEV_ORACLE_BIN)
    pub oracle_bin: String,

    /// Upper bound on a single oracle run (GODEV_ORACLE_TIMEOUT_SECS)
    pub timeout: Duration,

    /// Which root wins when a path falls under several (GODEV_ORACLE_TIE_BREAK)
    pub tie_break: TieBreak,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oracle_bin: "oracle".to_string(),
            timeout: Duration::from_secs(60),
            tie_break: TieBreak::FirstMatch,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(val) = lookup("GODEV_ORACLE_BIN") {
            let trimmed = val.trim();
            if trimmed.is_empty() {
                tracing::warn!(
                    "empty GODEV_ORACLE_BIN value, using default: {}",
                    config.oracle_bin
                );
            } else {
                config.oracle_bin = trimmed.to_string();
            }
        }

        if let Some(val) = lookup("GODEV_ORACLE_TIMEOUT_SECS") {
            if let Ok(parsed) = val.trim().parse::<u64>() {
                config.timeout = Duration::from_secs(parsed.max(1));
            } else {
                tracing::warn!(
                    "invalid GODEV_ORACLE_TIMEOUT_SECS value: {}, using default: {}",
                    val,
                    config.timeout.as_secs()
                );
            }
        }

        if let Some(val) = lookup("GODEV_ORACLE_TIE_BREAK") {
            match TieBreak::from_str(val.trim(), true) {
                Ok(parsed) => config.tie_break = parsed,
                Err(_) => {
                    tracing::warn!(
                        "invalid GODEV_ORACLE_TIE_BREAK value: {}, using default: {:?}",
                        val,
                        config.tie_break
                    );
                }
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.oracle_bin, "oracle");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.tie_break, TieBreak::FirstMatch);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GODEV_ORACLE_BIN", "/opt/go/bin/oracle"),
            ("GODEV_ORACLE_TIMEOUT_SECS", "5"),
            ("GODEV_ORACLE_TIE_BREAK", "last-match"),
        ]));
        assert_eq!(config.oracle_bin, "/opt/go/bin/oracle");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.tie_break, TieBreak::LastMatch);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("GODEV_ORACLE_BIN", "  "),
            ("GODEV_ORACLE_TIMEOUT_SECS", "soon"),
            ("GODEV_ORACLE_TIE_BREAK", "middle"),
        ]));
        assert_eq!(config.oracle_bin, "oracle");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.tie_break, TieBreak::FirstMatch);
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let config = Config::from_lookup(lookup_from(&[("GODEV_ORACLE_TIMEOUT_SECS", "0")]));
        assert_eq!(config.timeout, Duration::from_secs(1));
    }
}
