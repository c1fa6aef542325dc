//! Scalar Beta-PERT distribution.
//!
//! A modified Beta distribution defined by three points: minimum `a`,
//! most likely `b`, and maximum `c`, plus a shape-sharpness parameter λ.
//!
//! # Mathematical Definition
//!
//! ```text
//! range = c − a
//! α = 1 + λ · (b − a) / range
//! β = 1 + λ · (c − b) / range
//! ```
//!
//! The standardized variable `Y = (X − a) / range` follows Beta(α, β). Every
//! distribution function is the corresponding Beta function of `Y`, rescaled
//! back onto `[a, c]`.
//!
//! | Statistic | Formula |
//! |---|---|
//! | Mean | a + range · α/(α+β) = (a + λ·b + c)/(λ + 2) |
//! | Variance | range² · αβ / ((α+β)²(α+β+1)) |
//! | Skewness | 2(β−α)√(α+β+1) / ((α+β+2)√(αβ)) |
//! | Excess kurtosis | 6[(α−β)²(α+β+1) − αβ(α+β+2)] / (αβ(α+β+2)(α+β+3)) |
//!
//! Reference: Malcolm et al. (1959), "Application of a Technique for
//! Research and Development Program Evaluation", *Operations Research* 7(5).

use std::fmt;

use rand::Rng;
use rand_distr::{Beta, Distribution};
use tracing::{debug, trace};

use crate::error::{PertError, Result};
use crate::random::{rng_from_state, Size};
use crate::special;

/// Shape parameter of the classic PERT distribution.
pub const DEFAULT_LAMBDA: f64 = 4.0;

/// Relative tolerance under which two adjacent parameters count as equal.
///
/// Four ulps: values one or two representable steps apart are rejected,
/// values differing by anything an estimate could mean are accepted.
pub const DEGENERATE_REL_TOL: f64 = 4.0 * f64::EPSILON;

/// Absolute floor for the near-equality test around zero.
pub const DEGENERATE_ABS_TOL: f64 = f64::MIN_POSITIVE;

/// Mean, variance, skewness and excess kurtosis of a distribution.
///
/// `T` is `f64` for [`Pert`] and an array for [`PertArray`](crate::PertArray).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments<T = f64> {
    pub mean: T,
    pub var: T,
    pub skew: T,
    pub kurt: T,
}

/// Beta-PERT distribution on `[a, c]` with most likely value `b`.
///
/// Immutable after construction: the Beta shapes, moments and sampler are
/// computed once by the constructor.
///
/// # Examples
/// ```
/// use betapert::Pert;
///
/// let d = Pert::new(0.0, 5.0, 10.0).unwrap();
/// assert!((d.alpha() - 3.0).abs() < 1e-12);
/// assert!((d.mean() - 5.0).abs() < 1e-12);
/// assert!((d.cdf(d.median()) - 0.5).abs() < 1e-10);
/// assert_eq!(d.pdf(-1.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Pert {
    support: Support,
    b: f64,
    lamb: f64,
    alpha: f64,
    beta: f64,
    /// ln B(α, β) + ln(range), the log normalizer of the rescaled density.
    ln_norm: f64,
    moments: Moments,
    std: f64,
    sampler: Beta<f64>,
}

/// The interval `[a, c]` and the affine map between it and `[0, 1]`.
///
/// When `c − a` overflows, `span` holds half the width and every mapping
/// works on halved coordinates.
#[derive(Debug, Clone, Copy)]
struct Support {
    a: f64,
    c: f64,
    span: f64,
    halved: bool,
}

impl Support {
    fn new(a: f64, c: f64) -> Self {
        let width = c - a;
        if width.is_finite() {
            Self {
                a,
                c,
                span: width,
                halved: false,
            }
        } else {
            Self {
                a,
                c,
                span: 0.5 * c - 0.5 * a,
                halved: true,
            }
        }
    }

    /// `c − a`, infinite when it exceeds `f64::MAX`.
    fn width(&self) -> f64 {
        if self.halved {
            2.0 * self.span
        } else {
            self.span
        }
    }

    fn ln_width(&self) -> f64 {
        if self.halved {
            self.span.ln() + std::f64::consts::LN_2
        } else {
            self.span.ln()
        }
    }

    /// `((x − a)/width, (c − x)/width)`.
    fn standardize(&self, x: f64) -> (f64, f64) {
        if self.halved {
            (
                (0.5 * x - 0.5 * self.a) / self.span,
                (0.5 * self.c - 0.5 * x) / self.span,
            )
        } else {
            ((x - self.a) / self.span, (self.c - x) / self.span)
        }
    }

    /// `width · u` for `u ∈ [0, 1/2]`.
    fn scale(&self, u: f64) -> f64 {
        let d = self.span * u;
        if self.halved {
            d + d
        } else {
            d
        }
    }

    /// `a + width · u`, clamped to `[a, c]`.
    fn from_lower(&self, u: f64) -> f64 {
        let d = self.span * u;
        let x = if self.halved {
            self.a + d + d
        } else {
            self.a + d
        };
        x.clamp(self.a, self.c)
    }

    /// `c − width · u`, clamped to `[a, c]`.
    fn from_upper(&self, u: f64) -> f64 {
        let d = self.span * u;
        let x = if self.halved {
            self.c - d - d
        } else {
            self.c - d
        };
        x.clamp(self.a, self.c)
    }
}

impl Pert {
    /// Creates a standard PERT distribution (λ = 4).
    ///
    /// # Errors
    /// See [`Pert::with_lambda`].
    pub fn new(min_val: f64, ml_val: f64, max_val: f64) -> Result<Self> {
        Self::with_lambda(min_val, ml_val, max_val, DEFAULT_LAMBDA)
    }

    /// Creates a modified PERT distribution with shape parameter λ.
    ///
    /// λ controls the weight of the most likely value:
    /// - λ = 4: standard PERT
    /// - λ > 4: more peaked
    /// - λ < 4: flatter
    ///
    /// # Errors
    /// Checked in order, first failure wins:
    /// 1. [`PertError::NonFinite`] if any input is NaN or infinite.
    /// 2. [`PertError::NonPositiveLambda`] if `lamb <= 0`.
    /// 3. [`PertError::OrderingViolation`] unless `min_val < ml_val < max_val`.
    /// 4. [`PertError::DegenerateInterval`] if adjacent values are equal
    ///    within [`DEGENERATE_REL_TOL`].
    pub fn with_lambda(min_val: f64, ml_val: f64, max_val: f64, lamb: f64) -> Result<Self> {
        check_finite("min_val", min_val)?;
        check_finite("ml_val", ml_val)?;
        check_finite("max_val", max_val)?;
        check_finite("lamb", lamb)?;
        check_lambda(lamb)?;
        check_ordering(min_val, ml_val, max_val)?;
        check_distinct(min_val, ml_val, max_val)?;

        let dist = Self::from_validated(min_val, ml_val, max_val, lamb)?;
        debug!(
            a = dist.a(),
            b = dist.b,
            c = dist.c(),
            lamb = dist.lamb,
            alpha = dist.alpha,
            beta = dist.beta,
            "constructed PERT distribution"
        );
        Ok(dist)
    }

    /// Builds the distribution from parameters that already passed every
    /// validation gate.
    pub(crate) fn from_validated(a: f64, b: f64, c: f64, lamb: f64) -> Result<Self> {
        let support = Support::new(a, c);
        let (lower, upper) = support.standardize(b);
        let alpha = 1.0 + lamb * lower;
        let beta = 1.0 + lamb * upper;

        let sampler = Beta::new(alpha, beta).map_err(|_| {
            trace!(alpha, beta, "rejected Beta shapes");
            PertError::InvalidShape { alpha, beta }
        })?;

        // Standardized moments in terms of p = α/(α+β), q = β/(α+β)
        let ab = alpha + beta;
        let p = alpha / ab;
        let q = beta / ab;
        let std = support.scale((p * q / (ab + 1.0)).sqrt());
        let moments = Moments {
            mean: support.from_lower(p),
            var: std * std,
            skew: 2.0 * (q - p) * (ab + 1.0).sqrt() / ((ab + 2.0) * (p * q).sqrt()),
            kurt: 6.0 * ((p - q).powi(2) * (ab + 1.0) - p * q * (ab + 2.0))
                / (p * q * (ab + 2.0) * (ab + 3.0)),
        };

        Ok(Self {
            support,
            b,
            lamb,
            alpha,
            beta,
            ln_norm: special::ln_beta(alpha, beta) + support.ln_width(),
            moments,
            std,
            sampler,
        })
    }

    /// Minimum of the support.
    pub fn a(&self) -> f64 {
        self.support.a
    }

    /// Most likely value.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Maximum of the support.
    pub fn c(&self) -> f64 {
        self.support.c
    }

    pub fn lamb(&self) -> f64 {
        self.lamb
    }

    /// First Beta shape parameter α.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Second Beta shape parameter β.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Width of the support, `c − a`.
    ///
    /// Infinite when the width exceeds `f64::MAX`; every other quantity stays
    /// finite in that case.
    pub fn range(&self) -> f64 {
        self.support.width()
    }

    /// Mode of the distribution, which is the most likely value `b`.
    pub fn mode(&self) -> f64 {
        self.b
    }

    pub fn mean(&self) -> f64 {
        self.moments.mean
    }

    pub fn var(&self) -> f64 {
        self.moments.var
    }

    /// Standard deviation, `√var`.
    pub fn std(&self) -> f64 {
        self.std
    }

    pub fn skew(&self) -> f64 {
        self.moments.skew
    }

    /// Excess kurtosis (zero for a normal distribution).
    pub fn kurt(&self) -> f64 {
        self.moments.kurt
    }

    /// Mean, variance, skewness and excess kurtosis in one call.
    pub fn stats(&self) -> Moments {
        self.moments
    }

    /// Median, `ppf(0.5)`.
    pub fn median(&self) -> f64 {
        self.lower_quantile(0.5)
    }

    /// Probability density at `x`; zero outside `[a, c]`.
    pub fn pdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        self.logpdf(x).exp()
    }

    /// Log of the density at `x`.
    ///
    /// Evaluated directly in log space, so it is exactly `-inf` at and beyond
    /// the support bounds instead of the log of an underflowed density.
    pub fn logpdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= self.a() || x >= self.c() {
            return f64::NEG_INFINITY;
        }
        let (lower, upper) = self.support.standardize(x);
        (self.alpha - 1.0) * lower.ln() + (self.beta - 1.0) * upper.ln() - self.ln_norm
    }

    /// Cumulative probability `P(X ≤ x)`.
    pub fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= self.a() {
            return 0.0;
        }
        if x >= self.c() {
            return 1.0;
        }
        let (lower, _) = self.support.standardize(x);
        special::regularized_incomplete_beta(lower, self.alpha, self.beta)
    }

    /// Log of the cumulative probability, evaluated in log space.
    pub fn logcdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= self.a() {
            return f64::NEG_INFINITY;
        }
        if x >= self.c() {
            return 0.0;
        }
        let (lower, _) = self.support.standardize(x);
        special::ln_regularized_incomplete_beta(lower, self.alpha, self.beta)
    }

    /// Survival function `P(X > x) = 1 − cdf(x)`.
    ///
    /// Computed from the upper tail of the Beta distribution rather than by
    /// subtraction, so it keeps relative precision where `cdf(x) ≈ 1`.
    pub fn sf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= self.a() {
            return 1.0;
        }
        if x >= self.c() {
            return 0.0;
        }
        let (_, upper) = self.support.standardize(x);
        special::regularized_incomplete_beta(upper, self.beta, self.alpha)
    }

    /// Log of the survival function, evaluated in log space.
    pub fn logsf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= self.a() {
            return 0.0;
        }
        if x >= self.c() {
            return f64::NEG_INFINITY;
        }
        let (_, upper) = self.support.standardize(x);
        special::ln_regularized_incomplete_beta(upper, self.beta, self.alpha)
    }

    /// Quantile function (inverse CDF).
    ///
    /// # Errors
    /// [`PertError::QuantileOutOfRange`] if `q` is outside `[0, 1]` or NaN.
    pub fn ppf(&self, q: f64) -> Result<f64> {
        check_probability(q)?;
        Ok(self.lower_quantile(q))
    }

    /// Inverse survival function: the `x` with `sf(x) = q`.
    ///
    /// # Errors
    /// [`PertError::QuantileOutOfRange`] if `q` is outside `[0, 1]` or NaN.
    pub fn isf(&self, q: f64) -> Result<f64> {
        check_probability(q)?;
        Ok(self.upper_quantile(q))
    }

    /// Central interval containing `confidence` of the probability mass,
    /// `(ppf((1 − confidence)/2), ppf((1 + confidence)/2))`.
    ///
    /// # Errors
    /// [`PertError::QuantileOutOfRange`] if `confidence` is outside `[0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use betapert::Pert;
    ///
    /// let d = Pert::new(10.0, 190.0, 200.0).unwrap();
    /// let (low, high) = d.interval(0.9).unwrap();
    /// assert!(low < d.median() && d.median() < high);
    /// assert!((d.cdf(high) - d.cdf(low) - 0.9).abs() < 1e-9);
    /// ```
    pub fn interval(&self, confidence: f64) -> Result<(f64, f64)> {
        check_probability(confidence)?;
        Ok((
            self.lower_quantile((1.0 - confidence) / 2.0),
            self.lower_quantile((1.0 + confidence) / 2.0),
        ))
    }

    /// Exact-quantile interval carrying the same probability mass a standard
    /// normal places within `z` standard deviations of its mean.
    ///
    /// Equivalent to `interval(erf(|z|/√2))`.
    ///
    /// # Errors
    /// [`PertError::NonFinite`] if `z` is NaN or infinite.
    pub fn z_interval(&self, z: f64) -> Result<(f64, f64)> {
        check_finite("z", z)?;
        self.interval(z_coverage(z))
    }

    /// Normal-approximation interval `(mean − z·std, mean + z·std)`.
    ///
    /// Unlike [`Pert::interval`] this uses only the first two moments, so the
    /// bounds may fall outside `[a, c]` for large `z`.
    ///
    /// # Errors
    /// [`PertError::NonFinite`] if `z` is NaN or infinite.
    pub fn ci(&self, z: f64) -> Result<(f64, f64)> {
        check_finite("z", z)?;
        let half_width = z * self.std();
        Ok((self.mean() - half_width, self.mean() + half_width))
    }

    /// Draws one variate using `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.support.from_lower(self.sampler.sample(rng))
    }

    /// Draws an array of variates shaped by `size`.
    ///
    /// `Some(seed)` makes the output reproducible: equal seeds, parameters and
    /// sizes give bit-identical arrays. `None` draws from process entropy.
    ///
    /// # Examples
    /// ```
    /// use betapert::{Pert, Size};
    ///
    /// let d = Pert::new(0.0, 5.0, 10.0).unwrap();
    /// let draws = d.rvs(Size::from((3_usize, 4_usize)), Some(42)).unwrap();
    /// assert_eq!(draws.shape(), &[3, 4]);
    /// assert_eq!(draws, d.rvs(Size::from((3_usize, 4_usize)), Some(42)).unwrap());
    /// ```
    ///
    /// # Errors
    /// [`PertError::InvalidSize`] if the element count of `size` overflows.
    pub fn rvs(
        &self,
        size: impl Into<Size>,
        random_state: Option<u64>,
    ) -> Result<ndarray::ArrayD<f64>> {
        let size = size.into();
        debug!(size = ?size, seeded = random_state.is_some(), "sampling PERT variates");
        let mut rng = rng_from_state(random_state);
        self.rvs_with_rng(size, &mut rng)
    }

    /// Draws an array of variates shaped by `size` from a caller-supplied
    /// generator, advancing its state.
    ///
    /// # Errors
    /// As for [`Pert::rvs`].
    pub fn rvs_with_rng<R: Rng + ?Sized>(
        &self,
        size: impl Into<Size>,
        rng: &mut R,
    ) -> Result<ndarray::ArrayD<f64>> {
        let shape = size.into().checked_shape()?;
        Ok(ndarray::ArrayD::from_shape_simple_fn(ndarray::IxDyn(&shape), || self.sample(rng)))
    }

    /// Quantile for a probability already known to lie in `[0, 1]`.
    pub(crate) fn lower_quantile(&self, q: f64) -> f64 {
        if q >= 1.0 {
            return self.c();
        }
        let u = special::inverse_regularized_incomplete_beta(q, self.alpha, self.beta);
        self.support.from_lower(u)
    }

    /// Inverse survival for a probability already known to lie in `[0, 1]`.
    pub(crate) fn upper_quantile(&self, q: f64) -> f64 {
        if q >= 1.0 {
            return self.a();
        }
        let u = special::inverse_regularized_incomplete_beta(q, self.beta, self.alpha);
        self.support.from_upper(u)
    }
}

impl PartialEq for Pert {
    /// Distributions are equal when their constructor parameters are.
    fn eq(&self, other: &Self) -> bool {
        self.a() == other.a()
            && self.b == other.b
            && self.c() == other.c()
            && self.lamb == other.lamb
    }
}

impl fmt::Display for Pert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PERT(a={}, b={}, c={}, lamb={})",
            self.a(),
            self.b,
            self.c(),
            self.lamb
        )
    }
}

impl Distribution<f64> for Pert {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        Pert::sample(self, rng)
    }
}

// ============================================================================
// Validation gates
// ============================================================================

pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        trace!(name, value, "rejected non-finite input");
        Err(PertError::NonFinite { name, value })
    }
}

pub(crate) fn check_lambda(lamb: f64) -> Result<()> {
    if lamb > 0.0 {
        Ok(())
    } else {
        trace!(lamb, "rejected non-positive lambda");
        Err(PertError::NonPositiveLambda { lamb })
    }
}

pub(crate) fn check_ordering(min_val: f64, ml_val: f64, max_val: f64) -> Result<()> {
    if min_val < ml_val && ml_val < max_val {
        Ok(())
    } else {
        trace!(min_val, ml_val, max_val, "rejected parameter ordering");
        Err(PertError::OrderingViolation {
            min: min_val,
            most_likely: ml_val,
            max: max_val,
        })
    }
}

pub(crate) fn check_distinct(min_val: f64, ml_val: f64, max_val: f64) -> Result<()> {
    for (lower, upper) in [(min_val, ml_val), (ml_val, max_val)] {
        if nearly_equal(lower, upper) {
            trace!(lower, upper, "rejected degenerate interval");
            return Err(PertError::DegenerateInterval { lower, upper });
        }
    }
    Ok(())
}

pub(crate) fn check_probability(q: f64) -> Result<()> {
    if (0.0..=1.0).contains(&q) {
        Ok(())
    } else {
        Err(PertError::QuantileOutOfRange { q })
    }
}

/// Two-sided coverage of a standard normal within `±z`.
pub(crate) fn z_coverage(z: f64) -> f64 {
    special::erf(z.abs() / std::f64::consts::SQRT_2).clamp(0.0, 1.0)
}

fn nearly_equal(x: f64, y: f64) -> bool {
    approx::relative_eq!(
        x,
        y,
        epsilon = DEGENERATE_ABS_TOL,
        max_relative = DEGENERATE_REL_TOL
    )
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn pert_params() -> impl Strategy<Value = (f64, f64, f64, f64)> {
        (-50.0_f64..0.0, 0.01_f64..0.99, 1.0_f64..50.0, 0.5_f64..10.0).prop_map(
            |(min, mode_frac, range, lamb)| (min, min + mode_frac * range, min + range, lamb),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn mean_inside_support_and_variance_positive((a, b, c, lamb) in pert_params()) {
            let d = Pert::with_lambda(a, b, c, lamb).unwrap();
            prop_assert!(a < d.mean() && d.mean() < c, "mean {} outside ({a}, {c})", d.mean());
            prop_assert!(d.var() > 0.0);
        }

        #[test]
        fn cdf_ppf_roundtrip((a, b, c, lamb) in pert_params(), q in 0.001_f64..0.999) {
            let d = Pert::with_lambda(a, b, c, lamb).unwrap();
            let x = d.ppf(q).unwrap();
            prop_assert!((a..=c).contains(&x));
            prop_assert!((d.cdf(x) - q).abs() < 1e-9, "q={q} -> x={x} -> {}", d.cdf(x));
        }

        #[test]
        fn ppf_cdf_roundtrip((a, b, c, lamb) in pert_params(), frac in 0.1_f64..0.9) {
            let d = Pert::with_lambda(a, b, c, lamb).unwrap();
            let x = a + frac * (c - a);
            let back = d.ppf(d.cdf(x)).unwrap();
            prop_assert!((back - x).abs() < 1e-7 * (c - a), "x={x} -> {back}");
        }

        #[test]
        fn cdf_plus_sf_is_one((a, b, c, lamb) in pert_params(), frac in -0.2_f64..1.2) {
            let d = Pert::with_lambda(a, b, c, lamb).unwrap();
            let x = a + frac * (c - a);
            prop_assert!((d.cdf(x) + d.sf(x) - 1.0).abs() < 1e-12);
        }

        #[test]
        fn cdf_monotonic((a, b, c, lamb) in pert_params()) {
            let d = Pert::with_lambda(a, b, c, lamb).unwrap();
            let mut prev = 0.0;
            for i in 0..=20 {
                let x = a + (i as f64 / 20.0) * (c - a);
                let p = d.cdf(x);
                prop_assert!(p >= prev - 1e-12, "CDF not monotonic at x={x}");
                prev = p;
            }
        }

        #[test]
        fn samples_within_support((a, b, c, lamb) in pert_params(), seed in any::<u64>()) {
            let d = Pert::with_lambda(a, b, c, lamb).unwrap();
            let draws = d.rvs(64_usize, Some(seed)).unwrap();
            prop_assert!(draws.iter().all(|&v| (a..=c).contains(&v)));
        }
    }
}
