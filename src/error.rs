//! Error types for PERT construction, quantile evaluation and sampling.
//!
//! Every failure is a deterministic function of the caller's input and is
//! reported at the offending call. Vectorized calls fail as a whole: one bad
//! element rejects the entire call.

use thiserror::Error;

/// Errors raised by [`Pert`](crate::Pert) and [`PertArray`](crate::PertArray).
///
/// # Examples
/// ```
/// use betapert::{ErrorKind, Pert, PertError};
///
/// let err = Pert::new(10.0, 10.0, 20.0).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::OrderingViolation);
///
/// let err = PertError::NonPositiveLambda { lamb: 0.0 };
/// assert_eq!(err.to_string(), "lamb parameter should be greater than 0, got 0");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PertError {
    /// A constructor input (or interval z-score) is NaN or infinite.
    #[error("non-finite value present in inputs: {name} = {value}")]
    NonFinite {
        /// Name of the offending input
        name: &'static str,
        /// The offending value
        value: f64,
    },

    /// The shape parameter is zero or negative.
    #[error("lamb parameter should be greater than 0, got {lamb}")]
    NonPositiveLambda {
        /// The rejected shape parameter
        lamb: f64,
    },

    /// `min < most_likely < max` does not hold.
    #[error("parameters must satisfy min < most_likely < max, got {min}, {most_likely}, {max}")]
    OrderingViolation {
        /// Minimum value
        min: f64,
        /// Most-likely value
        most_likely: f64,
        /// Maximum value
        max: f64,
    },

    /// Two adjacent parameters are equal within floating-point tolerance.
    #[error("min, most_likely and max must be distinct, {lower} and {upper} are indistinguishable")]
    DegenerateInterval {
        /// Lower of the two adjacent values
        lower: f64,
        /// Upper of the two adjacent values
        upper: f64,
    },

    /// The Beta shapes derived from valid parameters are not finite and
    /// positive.
    #[error("derived Beta shapes must be finite and positive, got alpha = {alpha}, beta = {beta}")]
    InvalidShape {
        /// First Beta shape
        alpha: f64,
        /// Second Beta shape
        beta: f64,
    },

    /// A probability argument lies outside `[0, 1]` or is NaN.
    #[error("probability must lie in [0, 1], got {q}")]
    QuantileOutOfRange {
        /// The rejected probability
        q: f64,
    },

    /// A sample size is negative, malformed or incompatible with the
    /// parameter shape.
    #[error("invalid sample size: {reason}")]
    InvalidSize {
        /// Why the size was rejected
        reason: String,
    },

    /// Array shapes cannot be broadcast together.
    #[error("shapes {lhs:?} and {rhs:?} cannot be broadcast together")]
    ShapeMismatch {
        /// First shape
        lhs: Vec<usize>,
        /// Second shape
        rhs: Vec<usize>,
    },
}

/// Fieldless discriminant of [`PertError`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NonFinite,
    NonPositiveLambda,
    OrderingViolation,
    DegenerateInterval,
    InvalidShape,
    QuantileOutOfRange,
    InvalidSize,
    ShapeMismatch,
}

impl PertError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PertError::NonFinite { .. } => ErrorKind::NonFinite,
            PertError::NonPositiveLambda { .. } => ErrorKind::NonPositiveLambda,
            PertError::OrderingViolation { .. } => ErrorKind::OrderingViolation,
            PertError::DegenerateInterval { .. } => ErrorKind::DegenerateInterval,
            PertError::InvalidShape { .. } => ErrorKind::InvalidShape,
            PertError::QuantileOutOfRange { .. } => ErrorKind::QuantileOutOfRange,
            PertError::InvalidSize { .. } => ErrorKind::InvalidSize,
            PertError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
        }
    }

    pub(crate) fn invalid_size(reason: impl Into<String>) -> Self {
        PertError::InvalidSize {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PertError>;
