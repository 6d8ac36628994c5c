//! Agent hyperparameters and run configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{RLError, Result};

/// Configuration for agents
///
/// Missing fields fall back to the defaults of [`AgentConfig::default`]
/// when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Exploration probability in `[0, 1]`
    pub epsilon: f64,
    /// Learning rate in `(0, 1]`
    pub alpha: f64,
    /// Discount factor in `[0, 1]`
    pub gamma: f64,
    /// Number of training episodes before learning is switched off
    pub num_training: usize,
    /// Simulated updates per real transition (Dyna-Q only)
    pub planning_steps: usize,
    /// Episodes between progress reports
    pub report_interval: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.5,
            alpha: 0.5,
            gamma: 1.0,
            num_training: 100,
            planning_steps: 10,
            report_interval: 100,
        }
    }
}

impl AgentConfig {
    /// Defaults tuned for long game-playing runs
    #[must_use]
    pub fn pacman() -> Self {
        Self {
            epsilon: 0.05,
            alpha: 0.2,
            gamma: 0.8,
            num_training: 0,
            ..Self::default()
        }
    }

    /// Set the exploration probability
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the learning rate
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the discount factor
    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the number of training episodes
    #[must_use]
    pub fn with_num_training(mut self, num_training: usize) -> Self {
        self.num_training = num_training;
        self
    }

    /// Set the number of Dyna-Q planning steps
    #[must_use]
    pub fn with_planning_steps(mut self, planning_steps: usize) -> Self {
        self.planning_steps = planning_steps;
        self
    }

    /// Set the progress report interval
    #[must_use]
    pub fn with_report_interval(mut self, report_interval: usize) -> Self {
        self.report_interval = report_interval;
        self
    }

    /// Check every hyperparameter range
    ///
    /// # Errors
    ///
    /// Returns [`RLError::InvalidHyperparameter`] for the first value out of range.
    pub fn validate(&self) -> Result<()> {
        check_epsilon(self.epsilon)?;
        check_alpha(self.alpha)?;
        check_gamma(self.gamma)?;
        if self.report_interval == 0 {
            return Err(RLError::Config(
                "report_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is malformed, or holds out-of-range values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), ?config, "loaded agent configuration");
        Ok(config)
    }
}

pub(crate) fn check_epsilon(epsilon: f64) -> Result<()> {
    if (0.0..=1.0).contains(&epsilon) {
        Ok(())
    } else {
        Err(RLError::InvalidHyperparameter {
            name: "epsilon",
            value: epsilon,
            expected: "[0, 1]",
        })
    }
}

pub(crate) fn check_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha <= 1.0 {
        Ok(())
    } else {
        Err(RLError::InvalidHyperparameter {
            name: "alpha",
            value: alpha,
            expected: "(0, 1]",
        })
    }
}

pub(crate) fn check_gamma(gamma: f64) -> Result<()> {
    if (0.0..=1.0).contains(&gamma) {
        Ok(())
    } else {
        Err(RLError::InvalidHyperparameter {
            name: "gamma",
            value: gamma,
            expected: "[0, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AgentConfig::default().validate().is_ok());
        assert!(AgentConfig::pacman().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = AgentConfig::default().with_alpha(0.0).validate().unwrap_err();
        assert!(matches!(
            err,
            RLError::InvalidHyperparameter { name: "alpha", .. }
        ));
        assert!(AgentConfig::default().with_epsilon(1.2).validate().is_err());
        assert!(AgentConfig::default().with_gamma(f64::NAN).validate().is_err());
        assert!(AgentConfig::default()
            .with_report_interval(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AgentConfig::from_json_str(r#"{ "epsilon": 0.1, "planning_steps": 0 }"#)
            .unwrap();
        assert_eq!(config.epsilon, 0.1);
        assert_eq!(config.planning_steps, 0);
        assert_eq!(config.alpha, AgentConfig::default().alpha);
    }

    #[test]
    fn test_invalid_json_values_rejected() {
        assert!(matches!(
            AgentConfig::from_json_str(r#"{ "gamma": 2.0 }"#),
            Err(RLError::InvalidHyperparameter { name: "gamma", .. })
        ));
        assert!(matches!(
            AgentConfig::from_json_str("{ not json"),
            Err(RLError::Serialization(_))
        ));
    }
}
