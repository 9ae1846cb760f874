//! Engine configuration.
//!
//! The defaults give classic Mamdani inference: min for AND, max for OR, min
//! implication, max aggregation and a sampled centroid, with unit resolution on
//! every universe and a significance threshold of 0.1 for classification.

use crate::error::{InferenceError, Result};
use crate::ops::{AndOp, DefuzzificationOp, ImplicationOp, OrOp, ProductionLink};

/// Default threshold a consequent term's degree must exceed to be reported.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// What to do with crisp inputs that fall outside their variable's universe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputPolicy {
    /// Fuzzify the raw value; shapes usually yield 0 out there.
    #[default]
    Accept,
    /// Clamp the value into the universe first.
    Clamp,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub and_op: AndOp,
    pub or_op: OrOp,
    pub implication: ImplicationOp,
    pub aggregation: ProductionLink,
    pub defuzzification: DefuzzificationOp,
    /// Sampling step used for every universe.
    pub resolution: f64,
    pub input_policy: InputPolicy,
    /// Classification threshold, in `[0, 1)`.
    pub threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            and_op: AndOp::Min,
            or_op: OrOp::Max,
            implication: ImplicationOp::Min,
            aggregation: ProductionLink::Max,
            defuzzification: DefuzzificationOp::Centroid,
            resolution: 1.,
            input_policy: InputPolicy::Accept,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl EngineConfig {
    pub fn with_and_op(mut self, and_op: AndOp) -> Self {
        self.and_op = and_op;
        self
    }

    pub fn with_or_op(mut self, or_op: OrOp) -> Self {
        self.or_op = or_op;
        self
    }

    pub fn with_implication(mut self, implication: ImplicationOp) -> Self {
        self.implication = implication;
        self
    }

    pub fn with_aggregation(mut self, aggregation: ProductionLink) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_defuzzification(mut self, defuzzification: DefuzzificationOp) -> Self {
        self.defuzzification = defuzzification;
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_input_policy(mut self, input_policy: InputPolicy) -> Self {
        self.input_policy = input_policy;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;

        if !(self.resolution.is_finite() && self.resolution > 0.) {
            return Err(InferenceError::InvalidUniverse {
                min: f64::NAN,
                max: f64::NAN,
                step: self.resolution,
            });
        }

        Ok(())
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if (0. ..1.).contains(&threshold) {
        Ok(())
    } else {
        Err(InferenceError::InvalidThreshold(threshold))
    }
}

#[test]
fn test_defaults_and_validation() {
    let config = EngineConfig::default();

    assert_eq!(config.threshold, DEFAULT_THRESHOLD);
    assert_eq!(config.defuzzification, DefuzzificationOp::Centroid);
    assert!(config.validate().is_ok());

    let config = config.with_threshold(1.).with_resolution(0.5);

    assert_eq!(config.validate(), Err(InferenceError::InvalidThreshold(1.)));
    assert!(config.with_threshold(0.2).validate().is_ok());
    assert!(EngineConfig::default().with_resolution(0.).validate().is_err());
    assert!(EngineConfig::default().with_threshold(f64::NAN).validate().is_err());
}
