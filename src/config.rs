use clap::Args;
use serde::Serialize;
use thiserror::Error;

use crate::grades::{PerformanceLevel, CANONICAL_MAX};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be between 0 and 100, got {value}")]
    OutOfRange { name: &'static str, value: f64 },
    #[error("performance bands must descend: superior {superior} > high {high} > basic {basic}")]
    BandOrder { superior: f64, high: f64, basic: f64 },
}

/// Grading knobs, all on the canonical 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingPolicy {
    /// Scores strictly below this count as failing.
    pub pass_threshold: f64,
    pub superior_from: f64,
    pub high_from: f64,
    pub basic_from: f64,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            pass_threshold: 60.0,
            superior_from: 90.0,
            high_from: 80.0,
            basic_from: 60.0,
        }
    }
}

impl GradingPolicy {
    pub fn classify(&self, score: f64) -> PerformanceLevel {
        if score >= self.superior_from {
            PerformanceLevel::Superior
        } else if score >= self.high_from {
            PerformanceLevel::High
        } else if score >= self.basic_from {
            PerformanceLevel::Basic
        } else {
            PerformanceLevel::Low
        }
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("pass threshold", self.pass_threshold),
            ("superior band", self.superior_from),
            ("high band", self.high_from),
            ("basic band", self.basic_from),
        ] {
            if !(0.0..=CANONICAL_MAX).contains(&value) {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }

        if !(self.superior_from > self.high_from && self.high_from > self.basic_from) {
            return Err(ConfigError::BandOrder {
                superior: self.superior_from,
                high: self.high_from,
                basic: self.basic_from,
            });
        }

        Ok(self)
    }
}

#[derive(Debug, Clone, Args)]
pub struct GradingArgs {
    /// Scores below this value (0-100) count as failing
    #[arg(long, env = "PASS_THRESHOLD", default_value_t = 60.0)]
    pub pass_threshold: f64,
    /// Lowest score (0-100) rated Superior
    #[arg(long, env = "SUPERIOR_FROM", default_value_t = 90.0)]
    pub superior_from: f64,
    /// Lowest score (0-100) rated High
    #[arg(long, env = "HIGH_FROM", default_value_t = 80.0)]
    pub high_from: f64,
    /// Lowest score (0-100) rated Basic
    #[arg(long, env = "BASIC_FROM", default_value_t = 60.0)]
    pub basic_from: f64,
}

impl TryFrom<GradingArgs> for GradingPolicy {
    type Error = ConfigError;

    fn try_from(args: GradingArgs) -> Result<Self, Self::Error> {
        GradingPolicy {
            pass_threshold: args.pass_threshold,
            superior_from: args.superior_from,
            high_from: args.high_from,
            basic_from: args.basic_from,
        }
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_match_report_card_levels() {
        let policy = GradingPolicy::default();
        assert_eq!(policy.classify(95.0), PerformanceLevel::Superior);
        assert_eq!(policy.classify(90.0), PerformanceLevel::Superior);
        assert_eq!(policy.classify(85.0), PerformanceLevel::High);
        assert_eq!(policy.classify(60.0), PerformanceLevel::Basic);
        assert_eq!(policy.classify(59.9), PerformanceLevel::Low);
    }

    #[test]
    fn default_policy_is_valid() {
        assert!(GradingPolicy::default().validate().is_ok());
    }

    #[test]
    fn threshold_outside_scale_is_rejected() {
        let policy = GradingPolicy {
            pass_threshold: 120.0,
            ..GradingPolicy::default()
        };
        assert_eq!(
            policy.validate(),
            Err(ConfigError::OutOfRange {
                name: "pass threshold",
                value: 120.0
            })
        );
    }

    #[test]
    fn bands_must_descend() {
        let policy = GradingPolicy {
            high_from: 95.0,
            ..GradingPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(ConfigError::BandOrder { .. })));
    }

    #[test]
    fn args_convert_into_policy() {
        let args = GradingArgs {
            pass_threshold: 70.0,
            superior_from: 90.0,
            high_from: 80.0,
            basic_from: 70.0,
        };
        let policy = GradingPolicy::try_from(args).unwrap();
        assert_eq!(policy.pass_threshold, 70.0);
        assert_eq!(policy.classify(65.0), PerformanceLevel::Low);
    }
}
