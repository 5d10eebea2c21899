//! Server configuration read from the environment.
//!
//! | Variable               | Default   | Range                  |
//! |------------------------|-----------|------------------------|
//! | `HOST`                 | `0.0.0.0` |                        |
//! | `PORT`                 | `5001`    | any `u16`              |
//! | `PERSONA_DATA_DIR`     | `data`    |                        |
//! | `PERSONA_INTEREST_MAX` | `3`       | 1..=5                  |
//! | `PERSONA_SURVEY_SIZE`  | `5`       | 1..=catalog size (10)  |
//! | `PERSONA_CHART_SIZE`   | `800`     | 200..=4000 pixels      |

use std::path::PathBuf;
use std::str::FromStr;

use crate::chart::{ChartOptions, DEFAULT_CHART_SIZE};
use crate::error::ConfigError;
use crate::persona::{ANIMALS, DEFAULT_SURVEY_SIZE, MAX_SKILL};

/// Interest scale used by the web survey.
pub const DEFAULT_INTEREST_MAX: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding profile JSON documents and chart PNGs.
    pub data_dir: PathBuf,
    /// Top of the interest scale; interests are rescaled to 0..=5 for display.
    pub interest_max: u8,
    /// Number of animals a new survey asks about.
    pub survey_size: usize,
    pub chart: ChartOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            data_dir: PathBuf::from("data"),
            interest_max: DEFAULT_INTEREST_MAX,
            survey_size: DEFAULT_SURVEY_SIZE,
            chart: ChartOptions::default(),
        }
    }
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT", "a port number", defaults.port, |_| true)?;
        let data_dir = lookup("PERSONA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let interest_max = parse_var(
            &lookup,
            "PERSONA_INTEREST_MAX",
            "an integer between 1 and 5",
            defaults.interest_max,
            |v| (1..=MAX_SKILL).contains(v),
        )?;
        let survey_size = parse_var(
            &lookup,
            "PERSONA_SURVEY_SIZE",
            "an integer between 1 and 10",
            defaults.survey_size,
            |v| (1..=ANIMALS.len()).contains(v),
        )?;
        let chart_size = parse_var(
            &lookup,
            "PERSONA_CHART_SIZE",
            "an integer between 200 and 4000",
            DEFAULT_CHART_SIZE,
            |v| (200..=4000).contains(v),
        )?;

        Ok(Self {
            host,
            port,
            data_dir,
            interest_max,
            survey_size,
            chart: ChartOptions { size: chart_size },
        })
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    expected: &'static str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> Result<T, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => Ok(value),
        _ => Err(ConfigError::Invalid {
            key,
            expected,
            value: raw,
        }),
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
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:5001");
        assert_eq!(config.interest_max, 3);
        assert_eq!(config.chart.size, 800);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("PERSONA_DATA_DIR", "/tmp/personas"),
            ("PERSONA_INTEREST_MAX", "5"),
            ("PERSONA_SURVEY_SIZE", " 7 "),
            ("PERSONA_CHART_SIZE", "1200"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/personas"));
        assert_eq!(config.interest_max, 5);
        assert_eq!(config.survey_size, 7);
        assert_eq!(config.chart.size, 1200);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        for (key, value) in [
            ("PERSONA_INTEREST_MAX", "0"),
            ("PERSONA_INTEREST_MAX", "6"),
            ("PERSONA_SURVEY_SIZE", "0"),
            ("PERSONA_SURVEY_SIZE", "11"),
            ("PERSONA_CHART_SIZE", "50"),
        ] {
            let err = AppConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
            assert_eq!(
                err.to_string().split(' ').next().unwrap(),
                key,
                "{}={} should be rejected",
                key,
                value
            );
        }
    }
}
