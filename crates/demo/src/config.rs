//! Demo configuration loaded from environment variables.

/// Demo configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `EVENTSOURCE_DEBUG`: write repository diagnostics to stderr when set to
///   `1`, `true`, `yes` or `on` (default: off)
/// - `AGGREGATE_ID`: id of the entity the demo saves and loads (default: `"123"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: String,
    pub debug: bool,
    pub aggregate_id: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            debug: lookup("EVENTSOURCE_DEBUG")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.debug),
            aggregate_id: lookup("AGGREGATE_ID")
                .filter(|id| !id.trim().is_empty())
                .unwrap_or(defaults.aggregate_id),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
            aggregate_id: "123".to_string(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.debug);
        assert_eq!(config.aggregate_id, "123");
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("RUST_LOG", "debug,eventsource=trace"),
            ("EVENTSOURCE_DEBUG", "TRUE"),
            ("AGGREGATE_ID", "entity-7"),
        ]));
        assert_eq!(config.log_level, "debug,eventsource=trace");
        assert!(config.debug);
        assert_eq!(config.aggregate_id, "entity-7");
    }

    #[test]
    fn test_debug_flag_parsing() {
        for on in ["1", "true", "yes", "on", " On "] {
            assert!(parse_flag(on), "{on:?} should enable debug output");
        }
        for off in ["0", "false", "", "maybe"] {
            assert!(!parse_flag(off), "{off:?} should not enable debug output");
        }
    }

    #[test]
    fn test_blank_aggregate_id_is_ignored() {
        let config = Config::from_lookup(lookup(&[("AGGREGATE_ID", "  ")]));
        assert_eq!(config.aggregate_id, "123");
    }
}
