//! Configuration validation.
//!
//! Validates the `[data]` and `[screen]` sections before anything is loaded.

use crate::domain::error::ScreenerError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const SOURCE_SYNTHETIC: &str = "synthetic";
pub const SOURCE_CSV: &str = "csv";

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| SOURCE_SYNTHETIC.to_string());

    match source.trim().to_lowercase().as_str() {
        SOURCE_SYNTHETIC => {
            validate_positive(config, "data", "tickers", 200)?;
            validate_positive(config, "data", "days", 756)?;
            if config.get_int("data", "seed", 7)? < 0 {
                return Err(invalid("data", "seed", "seed must be non-negative"));
            }
            if config.get_string("data", "end_date").is_some() {
                parse_date(config, "data", "end_date")?;
            }
            Ok(())
        }
        SOURCE_CSV => match config.get_string("data", "dir") {
            Some(dir) if !dir.trim().is_empty() => Ok(()),
            _ => Err(ScreenerError::ConfigMissing {
                section: "data".to_string(),
                key: "dir".to_string(),
            }),
        },
        other => Err(invalid(
            "data",
            "source",
            &format!("unknown source '{other}', expected synthetic or csv"),
        )),
    }
}

pub fn validate_screen_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_dates(config)?;
    validate_positive(config, "screen", "max_names", 25)?;
    validate_positive(config, "screen", "lookback_days", 126)?;
    validate_weights(config)?;
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let start = parse_date(config, "screen", "start_date")?;
    let end = parse_date(config, "screen", "end_date")?;
    if start > end {
        return Err(ScreenerError::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Parse a required `YYYY-MM-DD` key.
pub fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, ScreenerError> {
    match config.get_date(section, key) {
        None => Err(ScreenerError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
        Some(Ok(date)) => Ok(date),
        Some(Err(_)) => Err(invalid(
            section,
            key,
            &format!("invalid {key} format, expected YYYY-MM-DD"),
        )),
    }
}

fn validate_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<(), ScreenerError> {
    if config.get_int(section, key, default)? < 1 {
        return Err(invalid(section, key, &format!("{key} must be at least 1")));
    }
    Ok(())
}

fn validate_weights(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    for key in ["value_weight", "momentum_weight", "quality_weight"] {
        if !config.get_double("screen", key, 0.0)?.is_finite() {
            return Err(invalid("screen", key, &format!("{key} must be a finite number")));
        }
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> ScreenerError {
    ScreenerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockConfig {
        values: HashMap<(String, String), String>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                values: HashMap::new(),
            }
        }

        fn set(mut self, section: &str, key: &str, value: &str) -> Self {
            self.values
                .insert((section.to_string(), key.to_string()), value.to_string());
            self
        }
    }

    impl ConfigPort for MockConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.values
                .get(&(section.to_string(), key.to_string()))
                .cloned()
        }
    }

    fn valid_screen() -> MockConfig {
        MockConfig::new()
            .set("screen", "start_date", "2023-01-01")
            .set("screen", "end_date", "2024-12-31")
            .set("screen", "max_names", "25")
            .set("screen", "lookback_days", "126")
            .set("screen", "value_weight", "0.35")
            .set("screen", "momentum_weight", "0.45")
            .set("screen", "quality_weight", "0.20")
    }

    #[test]
    fn valid_screen_config_passes() {
        assert!(validate_screen_config(&valid_screen()).is_ok());
    }

    #[test]
    fn same_start_and_end_is_allowed() {
        let config = valid_screen()
            .set("screen", "start_date", "2024-06-28")
            .set("screen", "end_date", "2024-06-28");
        assert!(validate_screen_config(&config).is_ok());
    }

    #[test]
    fn inverted_dates_are_an_invalid_range() {
        let config = valid_screen()
            .set("screen", "start_date", "2025-01-01")
            .set("screen", "end_date", "2024-01-01");
        let err = validate_screen_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidDateRange { .. }));
    }

    #[test]
    fn missing_start_date() {
        let config = MockConfig::new().set("screen", "end_date", "2024-12-31");
        let err = validate_screen_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigMissing { key, .. } if key == "start_date"));
    }

    #[test]
    fn malformed_date() {
        let config = valid_screen().set("screen", "end_date", "31/12/2024");
        let err = validate_screen_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "end_date"));
    }

    #[test]
    fn zero_max_names_rejected() {
        let config = valid_screen().set("screen", "max_names", "0");
        let err = validate_screen_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "max_names"));
    }

    #[test]
    fn zero_lookback_rejected() {
        let config = valid_screen().set("screen", "lookback_days", "0");
        let err = validate_screen_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "lookback_days"));
    }

    #[test]
    fn non_finite_weight_rejected() {
        let config = valid_screen().set("screen", "quality_weight", "inf");
        let err = validate_screen_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "quality_weight"));
    }

    #[test]
    fn unparsable_weight_rejected() {
        let config = valid_screen().set("screen", "value_weight", "abc");
        let err = validate_screen_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "value_weight"));
    }

    #[test]
    fn unparsable_max_names_rejected() {
        let config = valid_screen().set("screen", "max_names", "ten");
        let err = validate_screen_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "max_names"));
    }

    #[test]
    fn unparsable_ticker_count_rejected() {
        let config = MockConfig::new().set("data", "tickers", "many");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "tickers"));
    }

    #[test]
    fn negative_weight_is_allowed() {
        let config = valid_screen().set("screen", "value_weight", "-0.5");
        assert!(validate_screen_config(&config).is_ok());
    }

    #[test]
    fn data_defaults_to_synthetic() {
        assert!(validate_data_config(&MockConfig::new()).is_ok());
    }

    #[test]
    fn csv_source_requires_dir() {
        let config = MockConfig::new().set("data", "source", "csv");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigMissing { key, .. } if key == "dir"));

        let config = config.set("data", "dir", "./data");
        assert!(validate_data_config(&config).is_ok());
    }

    #[test]
    fn unknown_source_rejected() {
        let config = MockConfig::new().set("data", "source", "bloomberg");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "source"));
    }

    #[test]
    fn synthetic_rejects_zero_tickers() {
        let config = MockConfig::new().set("data", "tickers", "0");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "tickers"));
    }

    #[test]
    fn synthetic_rejects_bad_end_date() {
        let config = MockConfig::new().set("data", "end_date", "yesterday");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { key, .. } if key == "end_date"));
    }
}
