//! Configuration validation.
//!
//! Validates all config fields before any data is loaded.

use chrono::Duration;

use crate::domain::error::TribarError;
use crate::ports::config_port::ConfigPort;

pub fn validate_barrier_config(config: &dyn ConfigPort) -> Result<(), TribarError> {
    validate_non_negative(config, "barrier", "take_profit")?;
    validate_non_negative(config, "barrier", "stop_loss")?;
    validate_non_negative(config, "barrier", "trade_cost")?;
    validate_time_limit(config)?;
    validate_target_window(config)?;
    validate_max_concurrent_trades(config)?;
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), TribarError> {
    validate_positive(config, "portfolio", "order_amount", 100.0)?;
    validate_positive(config, "portfolio", "leverage", 1.0)?;
    validate_positive(config, "portfolio", "initial_portfolio", 1000.0)?;
    validate_non_negative(config, "portfolio", "maker_fee")?;
    validate_non_negative(config, "portfolio", "taker_fee")?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TribarError> {
    match config.get_optional("data", "symbol") {
        Some(_) => Ok(()),
        None => Err(TribarError::ConfigMissing {
            section: "data".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TribarError {
    TribarError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Present values must parse as a number; absent ones fall back to defaults
/// elsewhere.
fn read_number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, TribarError> {
    match config.get_optional(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(section, key, format!("{key} must be a number, got {raw:?}"))),
    }
}

fn validate_non_negative(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), TribarError> {
    if let Some(value) = read_number(config, section, key)? {
        if value < 0.0 {
            return Err(invalid(section, key, format!("{key} must be non-negative")));
        }
    }
    Ok(())
}

fn validate_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), TribarError> {
    let value = read_number(config, section, key)?.unwrap_or(default);
    if value <= 0.0 {
        return Err(invalid(section, key, format!("{key} must be positive")));
    }
    Ok(())
}

fn validate_time_limit(config: &dyn ConfigPort) -> Result<(), TribarError> {
    if let Some(raw) = config.get_optional("barrier", "time_limit") {
        match raw.parse::<i64>() {
            Ok(v) if v >= 0 && Duration::try_seconds(v).is_some() => {}
            _ => {
                return Err(invalid(
                    "barrier",
                    "time_limit",
                    format!(
                        "time_limit must be a number of seconds between 0 and {}",
                        i64::MAX / 1000
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn validate_target_window(config: &dyn ConfigPort) -> Result<(), TribarError> {
    if let Some(raw) = config.get_optional("barrier", "target_window") {
        match raw.parse::<usize>() {
            Ok(v) if v >= 2 => {}
            _ => {
                return Err(invalid(
                    "barrier",
                    "target_window",
                    "target_window must be an integer of at least 2, or none",
                ));
            }
        }
    }
    Ok(())
}

fn validate_max_concurrent_trades(config: &dyn ConfigPort) -> Result<(), TribarError> {
    if let Some(raw) = config.get_optional("barrier", "max_concurrent_trades") {
        match raw.parse::<usize>() {
            Ok(v) if v >= 1 => {}
            _ => {
                return Err(invalid(
                    "barrier",
                    "max_concurrent_trades",
                    "max_concurrent_trades must be at least 1",
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn assert_invalid(result: Result<(), TribarError>, expected_key: &str) {
        match result {
            Err(TribarError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected ConfigInvalid for {expected_key}, got {other:?}"),
        }
    }

    #[test]
    fn empty_sections_use_defaults() {
        let config = adapter("[barrier]\n[portfolio]\n");
        assert!(validate_barrier_config(&config).is_ok());
        assert!(validate_portfolio_config(&config).is_ok());
    }

    #[test]
    fn full_barrier_section_is_valid() {
        let config = adapter(
            "[barrier]\ntake_profit = 1.5\nstop_loss = 0\ntime_limit = 3600\n\
             target_window = 100\ntrade_cost = 0.0006\nmax_concurrent_trades = 3\n",
        );
        assert!(validate_barrier_config(&config).is_ok());
    }

    #[test]
    fn negative_multiplier_rejected() {
        let config = adapter("[barrier]\ntake_profit = -1\n");
        assert_invalid(validate_barrier_config(&config), "take_profit");
    }

    #[test]
    fn non_numeric_value_rejected() {
        let config = adapter("[barrier]\nstop_loss = wide\n");
        assert_invalid(validate_barrier_config(&config), "stop_loss");
    }

    #[test]
    fn target_window_none_accepted() {
        let config = adapter("[barrier]\ntarget_window = none\n");
        assert!(validate_barrier_config(&config).is_ok());
    }

    #[test]
    fn target_window_of_one_rejected() {
        let config = adapter("[barrier]\ntarget_window = 1\n");
        assert_invalid(validate_barrier_config(&config), "target_window");
    }

    #[test]
    fn zero_slots_rejected() {
        let config = adapter("[barrier]\nmax_concurrent_trades = 0\n");
        assert_invalid(validate_barrier_config(&config), "max_concurrent_trades");
    }

    #[test]
    fn negative_time_limit_rejected() {
        let config = adapter("[barrier]\ntime_limit = -5\n");
        assert_invalid(validate_barrier_config(&config), "time_limit");
    }

    #[test]
    fn out_of_range_time_limit_rejected() {
        let config = adapter("[barrier]\ntime_limit = 9223372036854775807\n");
        assert_invalid(validate_barrier_config(&config), "time_limit");

        let config = adapter(&format!("[barrier]\ntime_limit = {}\n", i64::MAX / 1000));
        assert!(validate_barrier_config(&config).is_ok());
    }

    #[test]
    fn zero_leverage_rejected() {
        let config = adapter("[portfolio]\nleverage = 0\n");
        assert_invalid(validate_portfolio_config(&config), "leverage");
    }

    #[test]
    fn negative_fee_rejected() {
        let config = adapter("[portfolio]\ntaker_fee = -0.001\n");
        assert_invalid(validate_portfolio_config(&config), "taker_fee");
    }

    #[test]
    fn missing_symbol_reported() {
        let config = adapter("[data]\nbase_path = ./data\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(err, TribarError::ConfigMissing { key, .. } if key == "symbol"));
    }
}
