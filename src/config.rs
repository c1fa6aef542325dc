//! Serializable PERT parameter sets.
//!
//! [`PertConfig`] is plain data: it can be read from JSON (or any serde
//! format) and turned into a validated [`Pert`] with [`PertConfig::build`].
//! Validation happens only at build time.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pert::{Pert, DEFAULT_LAMBDA};

fn default_lambda() -> f64 {
    DEFAULT_LAMBDA
}

/// Parameters of a PERT distribution.
///
/// `lambda` defaults to 4 when omitted. `most_likely` also accepts the key
/// `mode`.
///
/// # Example
///
/// ```
/// use betapert::PertConfig;
///
/// let config = PertConfig::new(10.0, 190.0, 200.0);
/// let dist = config.build().unwrap();
/// assert_eq!(dist.lamb(), 4.0);
/// assert_eq!(PertConfig::from(&dist), config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PertConfig {
    /// Lower bound of the support.
    pub min: f64,

    /// Most likely value.
    #[serde(alias = "mode")]
    pub most_likely: f64,

    /// Upper bound of the support.
    pub max: f64,

    /// Shape parameter; larger values concentrate mass around the mode.
    #[serde(default = "default_lambda")]
    pub lambda: f64,
}

impl PertConfig {
    /// Parameters with the standard shape (λ = 4).
    pub fn new(min: f64, most_likely: f64, max: f64) -> Self {
        Self::with_lambda(min, most_likely, max, DEFAULT_LAMBDA)
    }

    pub fn with_lambda(min: f64, most_likely: f64, max: f64, lambda: f64) -> Self {
        Self {
            min,
            most_likely,
            max,
            lambda,
        }
    }

    /// Validates the parameters and builds the distribution.
    ///
    /// # Errors
    /// Same as [`Pert::with_lambda`].
    pub fn build(&self) -> Result<Pert> {
        Pert::with_lambda(self.min, self.most_likely, self.max, self.lambda)
    }
}

impl From<&Pert> for PertConfig {
    fn from(dist: &Pert) -> Self {
        Self::with_lambda(dist.a(), dist.b(), dist.c(), dist.lamb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_lambda_defaults_when_missing() {
        let config: PertConfig =
            serde_json::from_str(r#"{"min": 0.0, "most_likely": 5.0, "max": 10.0}"#).unwrap();
        assert_eq!(config, PertConfig::new(0.0, 5.0, 10.0));
        assert_eq!(config.lambda, 4.0);
    }

    #[test]
    fn test_mode_alias() {
        let config: PertConfig =
            serde_json::from_str(r#"{"min": 1, "mode": 2, "max": 4, "lambda": 2}"#).unwrap();
        assert_eq!(config, PertConfig::with_lambda(1.0, 2.0, 4.0, 2.0));
    }

    #[test]
    fn test_serializes_field_names() {
        let json = serde_json::to_value(PertConfig::new(0.0, 1.0, 2.0)).unwrap();
        assert_eq!(json["most_likely"], 1.0);
        assert_eq!(json["lambda"], 4.0);
    }

    #[test]
    fn test_build_validates() {
        let dist = PertConfig::new(0.0, 5.0, 10.0).build().unwrap();
        assert_eq!(dist.mean(), 5.0);

        let err = PertConfig::new(5.0, 1.0, 10.0).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OrderingViolation);

        let err = PertConfig::with_lambda(0.0, 1.0, 2.0, -1.0).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonPositiveLambda);
    }

    #[test]
    fn test_round_trip_through_distribution() {
        let config = PertConfig::with_lambda(10.0, 190.0, 200.0, 3.0);
        let dist = config.build().unwrap();
        assert_eq!(PertConfig::from(&dist), config);
    }
}
