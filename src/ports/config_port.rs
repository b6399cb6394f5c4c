//! Configuration access port trait.
//!
//! Implementations only supply raw strings; typed getters are built on top
//! so every source rejects malformed values the same way.

use crate::domain::error::ScreenerError;
use chrono::NaiveDate;
use std::str::FromStr;

pub trait ConfigPort {
    /// Raw value for `key`, `None` when the key is absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `default` when absent, `ConfigInvalid` when present but not an integer.
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, ScreenerError> {
        parse_or_default(self.get_string(section, key), section, key, default, "an integer")
    }

    /// `default` when absent, `ConfigInvalid` when present but not a number.
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, ScreenerError> {
        parse_or_default(self.get_string(section, key), section, key, default, "a number")
    }

    /// `Some(Err(raw))` when the key is present but not a `YYYY-MM-DD` date.
    fn get_date(&self, section: &str, key: &str) -> Option<Result<NaiveDate, String>> {
        self.get_string(section, key).map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| raw)
        })
    }
}

fn parse_or_default<T: FromStr>(
    raw: Option<String>,
    section: &str,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, ScreenerError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ScreenerError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("'{}' is not {expected}", raw.trim()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<&'static str, &'static str>);

    impl ConfigPort for MapConfig {
        fn get_string(&self, _section: &str, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    fn config() -> MapConfig {
        MapConfig(HashMap::from([
            ("max_names", " 10 "),
            ("weight", "0.45"),
            ("bad", "abc"),
            ("start", "2024-01-02"),
        ]))
    }

    #[test]
    fn typed_getters_parse_present_values() {
        assert_eq!(config().get_int("s", "max_names", 25).unwrap(), 10);
        assert_eq!(config().get_double("s", "weight", 0.0).unwrap(), 0.45);
        assert_eq!(
            config().get_date("s", "start"),
            Some(Ok(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()))
        );
    }

    #[test]
    fn typed_getters_default_when_absent() {
        assert_eq!(config().get_int("s", "missing", 25).unwrap(), 25);
        assert_eq!(config().get_double("s", "missing", 0.35).unwrap(), 0.35);
        assert_eq!(config().get_date("s", "missing"), None);
    }

    #[test]
    fn unparsable_values_are_invalid() {
        let err = config().get_int("screen", "bad", 25).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { ref key, .. } if key == "bad"));
        assert!(err.to_string().contains("'abc' is not an integer"));

        let err = config().get_double("screen", "bad", 0.35).unwrap_err();
        assert!(err.to_string().contains("'abc' is not a number"));

        assert!(matches!(config().get_date("s", "bad"), Some(Err(_))));
    }
}
