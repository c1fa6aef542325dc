//! Random number generation and sample-shape handling for sampling.
//!
//! # Reproducibility
//!
//! A seeded draw uses [`create_rng`], which is deterministic for a given seed
//! on the same platform. Unseeded draws pull a fresh generator from the
//! thread-local entropy source.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::error::{PertError, Result};

/// Creates a fast, seeded random number generator.
///
/// Uses `SmallRng` (Xoshiro256++). The sequence is deterministic for a given
/// seed on the same platform.
///
/// # Examples
/// ```
/// use betapert::random::create_rng;
/// use rand::Rng;
/// let mut rng = create_rng(42);
/// let x: f64 = rng.random();
/// assert!(x >= 0.0 && x < 1.0);
/// ```
pub fn create_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Resolves an optional seed into a generator.
///
/// `Some(seed)` gives a reproducible stream, `None` seeds from process
/// entropy so repeated calls produce different streams.
pub fn rng_from_state(random_state: Option<u64>) -> SmallRng {
    match random_state {
        Some(seed) => create_rng(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    }
}

/// Requested output shape of a sampling call.
///
/// `Count(n)` asks for `n` independent draws in a one-dimensional array,
/// `Shape(dims)` for an array of that shape. Typed constructors cannot be
/// negative; untyped integers go through the `TryFrom` impls, which reject
/// negative or non-integral sizes with [`PertError::InvalidSize`].
///
/// # Examples
/// ```
/// use betapert::Size;
///
/// assert_eq!(Size::from(5_usize).shape(), vec![5]);
/// assert_eq!(Size::from((3_usize, 4_usize)).shape(), vec![3, 4]);
/// assert!(Size::try_from(-1_i64).is_err());
/// assert!(Size::try_from(2.5_f64).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Size {
    /// Number of independent draws.
    Count(usize),
    /// Output array shape.
    Shape(Vec<usize>),
}

impl Size {
    /// The output shape this size describes.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Size::Count(n) => vec![*n],
            Size::Shape(dims) => dims.clone(),
        }
    }

    /// The output shape, checked so that its element count fits in an
    /// array.
    ///
    /// # Errors
    /// [`PertError::InvalidSize`] if the product of the dimensions overflows
    /// `isize::MAX`.
    pub fn checked_shape(&self) -> Result<Vec<usize>> {
        let shape = self.shape();
        match shape.iter().try_fold(1_usize, |acc, &d| acc.checked_mul(d)) {
            Some(n) if n <= isize::MAX as usize => Ok(shape),
            _ => Err(PertError::invalid_size(format!(
                "size {shape:?} has too many elements"
            ))),
        }
    }

    /// Total number of draws.
    pub fn len(&self) -> usize {
        match self {
            Size::Count(n) => *n,
            Size::Shape(dims) => dims.iter().product(),
        }
    }

    /// Whether no draws are requested.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Size {
    fn default() -> Self {
        Size::Count(1)
    }
}

impl From<usize> for Size {
    fn from(n: usize) -> Self {
        Size::Count(n)
    }
}

impl From<Vec<usize>> for Size {
    fn from(dims: Vec<usize>) -> Self {
        Size::Shape(dims)
    }
}

impl From<&[usize]> for Size {
    fn from(dims: &[usize]) -> Self {
        Size::Shape(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Size {
    fn from(dims: [usize; N]) -> Self {
        Size::Shape(dims.to_vec())
    }
}

impl From<(usize, usize)> for Size {
    fn from((rows, cols): (usize, usize)) -> Self {
        Size::Shape(vec![rows, cols])
    }
}

impl From<(usize, usize, usize)> for Size {
    fn from((d0, d1, d2): (usize, usize, usize)) -> Self {
        Size::Shape(vec![d0, d1, d2])
    }
}

impl TryFrom<i64> for Size {
    type Error = PertError;

    fn try_from(n: i64) -> Result<Self> {
        usize::try_from(n)
            .map(Size::Count)
            .map_err(|_| PertError::invalid_size(format!("size must be non-negative, got {n}")))
    }
}

impl TryFrom<&[i64]> for Size {
    type Error = PertError;

    fn try_from(dims: &[i64]) -> Result<Self> {
        dims.iter()
            .map(|&d| {
                usize::try_from(d).map_err(|_| {
                    PertError::invalid_size(format!(
                        "shape entries must be non-negative, got {dims:?}"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Size::Shape)
    }
}

impl TryFrom<f64> for Size {
    type Error = PertError;

    fn try_from(n: f64) -> Result<Self> {
        if !n.is_finite() || n < 0.0 || n.fract() != 0.0 || n > usize::MAX as f64 {
            return Err(PertError::invalid_size(format!(
                "size must be a non-negative integer, got {n}"
            )));
        }
        Ok(Size::Count(n as usize))
    }
}
