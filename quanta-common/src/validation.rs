//! Configuration validation for the Quanta screener.
//!
//! Rejects parameter combinations that would make the scoring pass or the
//! report delivery meaningless before any network work starts.

use thiserror::Error;

use crate::config::{Config, ObservabilityConfig, ScreenerConfig, TelegramConfig};

/// Highest score the engine can produce.
pub const MAX_SCORE: u8 = 9;

/// Longest price window a run may request, in days.
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Multiple(errors)),
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let errors: Vec<ValidationError> = [
            self.screener.validate(),
            self.telegram.validate(),
            self.observability.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        ValidationError::collect(errors)
    }
}

impl Validate for ScreenerConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if self.score_threshold > MAX_SCORE {
            errors.push(ValidationError::invalid(
                "screener.score_threshold",
                format!("{} exceeds the maximum score of {MAX_SCORE}", self.score_threshold),
            ));
        }

        if self.max_reported == 0 {
            errors.push(ValidationError::invalid(
                "screener.max_reported",
                "must report at least one candidate",
            ));
        }

        if self.rsi_period == 0 {
            errors.push(ValidationError::invalid("screener.rsi_period", "must be positive"));
        }

        let required_bars = self.rsi_period.saturating_add(1);
        if self.rsi_min_bars < required_bars {
            errors.push(ValidationError::Conflict {
                reason: format!(
                    "screener.rsi_min_bars ({}) must be at least rsi_period + 1 ({required_bars})",
                    self.rsi_min_bars
                ),
            });
        }

        if self.min_price_bars < self.rsi_min_bars {
            errors.push(ValidationError::Conflict {
                reason: format!(
                    "screener.min_price_bars ({}) is below screener.rsi_min_bars ({})",
                    self.min_price_bars, self.rsi_min_bars
                ),
            });
        }

        if self.lookback_days == 0 {
            errors.push(ValidationError::invalid("screener.lookback_days", "must be positive"));
        } else if self.lookback_days > MAX_LOOKBACK_DAYS {
            errors.push(ValidationError::invalid(
                "screener.lookback_days",
                format!("{} exceeds {MAX_LOOKBACK_DAYS}", self.lookback_days),
            ));
        }

        if self.stop_loss_pct.is_nan() || self.stop_loss_pct <= 0.0 || self.stop_loss_pct >= 100.0 {
            errors.push(ValidationError::invalid(
                "screener.stop_loss_pct",
                format!("{} is outside (0, 100)", self.stop_loss_pct),
            ));
        }

        if self.reward_risk_ratio.is_nan() || self.reward_risk_ratio <= 0.0 {
            errors.push(ValidationError::invalid(
                "screener.reward_risk_ratio",
                "must be positive",
            ));
        }

        ValidationError::collect(errors)
    }
}

impl Validate for TelegramConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.max_message_length == 0 {
            return Err(ValidationError::invalid(
                "telegram.max_message_length",
                "must be positive",
            ));
        }
        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        let level = self.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ValidationError::invalid(
                "observability.log_level",
                format!("unknown level '{}'", self.log_level),
            ));
        }

        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            errors.push(ValidationError::invalid(
                "observability.log_format",
                format!("expected one of {:?}", LOG_FORMATS),
            ));
        }

        ValidationError::collect(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test_case(9, true ; "maximum score")]
    #[test_case(0, true ; "zero threshold")]
    #[test_case(10, false ; "above maximum")]
    fn test_score_threshold_range(threshold: u8, ok: bool) {
        let config = ScreenerConfig {
            score_threshold: threshold,
            ..Default::default()
        };
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn test_rsi_bars_must_cover_period() {
        let config = ScreenerConfig {
            rsi_period: 14,
            rsi_min_bars: 14,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::Conflict { .. })));
    }

    #[test]
    fn test_huge_rsi_period_is_rejected() {
        let config = ScreenerConfig {
            rsi_period: usize::MAX,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::Conflict { .. })));
    }

    #[test_case(365, true ; "one year")]
    #[test_case(MAX_LOOKBACK_DAYS, true ; "upper bound")]
    #[test_case(0, false ; "empty window")]
    #[test_case(MAX_LOOKBACK_DAYS + 1, false ; "past upper bound")]
    #[test_case(u32::MAX, false ; "u32 max")]
    fn test_lookback_days_range(days: u32, ok: bool) {
        let config = ScreenerConfig {
            lookback_days: days,
            ..Default::default()
        };
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn test_multiple_errors_are_collected() {
        let config = ScreenerConfig {
            max_reported: 0,
            stop_loss_pct: 0.0,
            ..Default::default()
        };
        match config.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn test_observability_rejects_unknown_format() {
        let config = ObservabilityConfig {
            log_level: "INFO".into(),
            log_format: "xml".into(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_message_length_rejected() {
        let config = Config {
            telegram: TelegramConfig {
                max_message_length: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
