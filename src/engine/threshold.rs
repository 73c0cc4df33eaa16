//! Threshold-based reporting policy
//!
//! Converts a computed score plus the configured thresholds into a
//! reporting decision. Interfaces are judged against the stricter
//! `interface_penalty` floor; bare type aliases and validator
//! constructions against `base_threshold`. The warn/error tiers only
//! classify severity for the reporter.

use crate::config::RuleConfig;
use crate::models::Severity;

/// Outcome of judging one declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    NoReport,
    MissingExplicitCheck { score: f64 },
    ComplexInterfaceNeedsCheck { name: String, score: f64 },
}

pub struct ThresholdEvaluator<'a> {
    config: &'a RuleConfig,
}

impl<'a> ThresholdEvaluator<'a> {
    pub fn new(config: &'a RuleConfig) -> Self {
        Self { config }
    }

    /// Bare (non-exempt) type alias or validator-construction declaration
    pub fn evaluate_plain(&self, score: f64) -> Decision {
        if score >= self.config.base_threshold {
            Decision::MissingExplicitCheck { score }
        } else {
            Decision::NoReport
        }
    }

    /// Interface declarations have their own floor, independent of
    /// `base_threshold`.
    pub fn evaluate_interface(&self, name: &str, score: f64) -> Decision {
        if score >= self.config.interface_penalty {
            Decision::ComplexInterfaceNeedsCheck {
                name: name.to_string(),
                score,
            }
        } else {
            Decision::NoReport
        }
    }

    /// Severity tier for the reporter
    pub fn severity(&self, score: f64) -> Severity {
        if score >= self.config.error_threshold {
            Severity::High
        } else if score >= self.config.warn_threshold {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}
