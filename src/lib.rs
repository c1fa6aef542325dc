//! # betapert
//!
//! The Beta-PERT distribution: a bounded, unimodal distribution described by
//! a minimum, a most-likely value, a maximum and a shape parameter λ.
//!
//! PERT is a rescaled Beta distribution on `[min, max]` whose shape
//! parameters are derived from where the mode sits inside the range. It is the
//! usual choice for three-point estimates in project scheduling and risk
//! analysis.
//!
//! ## Modules
//!
//! - [`pert`]: The scalar distribution [`Pert`] with validation, density,
//!   cumulative, quantile and survival functions, moments and sampling
//! - [`vectorized`]: [`PertArray`], the same operations over `ndarray`
//!   arrays with numpy-style broadcasting
//! - [`special`]: Log-gamma, regularized incomplete beta and its inverse,
//!   error function
//! - [`random`]: Seeded generators and sample shapes
//! - [`config`]: Serializable parameter records
//! - [`error`]: Error type and result alias
//!
//! ## Example
//!
//! ```
//! use betapert::Pert;
//!
//! let d = Pert::new(10.0, 190.0, 200.0).unwrap();
//! assert!((d.mean() - 970.0 / 6.0).abs() < 1e-9);
//! assert!(d.skew() < 0.0);
//!
//! let q = d.ppf(0.9).unwrap();
//! assert!((d.cdf(q) - 0.9).abs() < 1e-9);
//!
//! let draws = d.rvs(1_000_usize, Some(42)).unwrap();
//! assert!(draws.iter().all(|&x| (10.0..=200.0).contains(&x)));
//! ```
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: log-space evaluation of the log
//!   functions, upper-tail survival instead of `1 - cdf`
//! - **Validate once**: distributions are immutable and always valid after
//!   construction
//! - **Property-based testing**: Mathematical invariants verified via proptest

pub mod config;
pub mod error;
pub mod pert;
pub mod random;
pub mod special;
pub mod vectorized;

pub use config::PertConfig;
pub use error::{ErrorKind, PertError, Result};
pub use pert::{Moments, Pert, DEFAULT_LAMBDA};
pub use random::Size;
pub use vectorized::{broadcast_shape, IntoValues, PertArray};
