//! Array-valued PERT distributions with numpy-style broadcasting.
//!
//! [`PertArray`] holds one [`Pert`] per element of the broadcast parameter
//! shape. Every evaluation broadcasts its input against that shape, so a
//! scalar input against array parameters (or array input against scalar
//! parameters) behaves the way it would in numpy. Zero-dimensional arrays
//! stand in for scalars.
//!
//! Validation is all-or-nothing: each gate runs over every element before
//! the next gate starts, and one bad element fails the whole call.

use std::fmt;

use ndarray::{Array, ArrayBase, ArrayD, ArrayView, ArrayViewD, Data, Dimension, IxDyn, Zip};
use rand::Rng;
use tracing::debug;

use crate::error::{PertError, Result};
use crate::pert::{
    check_distinct, check_finite, check_lambda, check_ordering, check_probability, z_coverage,
    Moments, Pert, DEFAULT_LAMBDA,
};
use crate::random::{rng_from_state, Size};

/// Conversion of scalar or array-like input into a dynamic-dimension array.
///
/// Implemented for `f64` (a zero-dimensional array), slices, `Vec`s, fixed
/// arrays and `ndarray` arrays or views of any dimensionality.
pub trait IntoValues {
    fn into_values(self) -> ArrayD<f64>;
}

impl IntoValues for f64 {
    fn into_values(self) -> ArrayD<f64> {
        ndarray::arr0(self).into_dyn()
    }
}

impl IntoValues for Vec<f64> {
    fn into_values(self) -> ArrayD<f64> {
        Array::from_vec(self).into_dyn()
    }
}

impl IntoValues for &Vec<f64> {
    fn into_values(self) -> ArrayD<f64> {
        self.as_slice().into_values()
    }
}

impl IntoValues for &[f64] {
    fn into_values(self) -> ArrayD<f64> {
        Array::from_vec(self.to_vec()).into_dyn()
    }
}

impl<const N: usize> IntoValues for [f64; N] {
    fn into_values(self) -> ArrayD<f64> {
        Array::from_vec(self.to_vec()).into_dyn()
    }
}

impl<D: Dimension> IntoValues for Array<f64, D> {
    fn into_values(self) -> ArrayD<f64> {
        self.into_dyn()
    }
}

impl<D: Dimension> IntoValues for ArrayView<'_, f64, D> {
    fn into_values(self) -> ArrayD<f64> {
        self.to_owned().into_dyn()
    }
}

impl<S, D> IntoValues for &ArrayBase<S, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    fn into_values(self) -> ArrayD<f64> {
        self.to_owned().into_dyn()
    }
}

/// Shape resulting from broadcasting `lhs` against `rhs` (numpy rules).
///
/// Shapes are aligned on their trailing axes; each axis pair must be equal or
/// contain a 1.
///
/// # Errors
/// [`PertError::ShapeMismatch`] if the shapes are incompatible.
///
/// # Examples
/// ```
/// use betapert::broadcast_shape;
///
/// assert_eq!(broadcast_shape(&[3, 1], &[4]).unwrap(), vec![3, 4]);
/// assert_eq!(broadcast_shape(&[], &[2, 2]).unwrap(), vec![2, 2]);
/// assert!(broadcast_shape(&[2], &[3]).is_err());
/// ```
pub fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>> {
    let ndim = lhs.len().max(rhs.len());
    let axis = |shape: &[usize], i: usize| {
        (i + shape.len())
            .checked_sub(ndim)
            .map_or(1, |j| shape[j])
    };

    (0..ndim)
        .map(|i| match (axis(lhs, i), axis(rhs, i)) {
            (l, r) if l == r => Ok(l),
            (1, r) => Ok(r),
            (l, 1) => Ok(l),
            _ => Err(PertError::ShapeMismatch {
                lhs: lhs.to_vec(),
                rhs: rhs.to_vec(),
            }),
        })
        .collect()
}

fn broadcast_to<'a, T>(array: &'a ArrayD<T>, shape: &[usize]) -> Result<ArrayViewD<'a, T>> {
    array
        .broadcast(IxDyn(shape))
        .ok_or_else(|| PertError::ShapeMismatch {
            lhs: array.shape().to_vec(),
            rhs: shape.to_vec(),
        })
}

/// Beta-PERT distributions over array-shaped parameters.
///
/// # Examples
/// ```
/// use betapert::PertArray;
///
/// let d = PertArray::new([0.0, 10.0], [5.0, 15.0], [10.0, 20.0]).unwrap();
/// assert_eq!(d.shape(), &[2]);
///
/// let pdf = d.pdf([5.0, 15.0]).unwrap();
/// assert_eq!(pdf.shape(), &[2]);
/// assert!((pdf[0] - pdf[1]).abs() < 1e-12);
///
/// // Scalar input broadcasts against the parameter shape
/// let cdf = d.cdf(10.0).unwrap();
/// assert_eq!(cdf.as_slice().unwrap(), &[1.0, 0.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PertArray {
    params: ArrayD<Pert>,
    lamb: f64,
}

impl PertArray {
    /// Creates PERT distributions with the standard shape (λ = 4).
    ///
    /// # Errors
    /// See [`PertArray::with_lambda`].
    pub fn new(
        min_val: impl IntoValues,
        ml_val: impl IntoValues,
        max_val: impl IntoValues,
    ) -> Result<Self> {
        Self::with_lambda(min_val, ml_val, max_val, DEFAULT_LAMBDA)
    }

    /// Creates PERT distributions with shape parameter λ.
    ///
    /// The three parameter arrays are broadcast together.
    ///
    /// # Errors
    /// Checked in order over every element, first failing gate wins:
    /// [`PertError::NonFinite`], [`PertError::NonPositiveLambda`],
    /// [`PertError::ShapeMismatch`], [`PertError::OrderingViolation`],
    /// [`PertError::DegenerateInterval`].
    pub fn with_lambda(
        min_val: impl IntoValues,
        ml_val: impl IntoValues,
        max_val: impl IntoValues,
        lamb: f64,
    ) -> Result<Self> {
        let min_val = min_val.into_values();
        let ml_val = ml_val.into_values();
        let max_val = max_val.into_values();

        for (name, values) in [("min_val", &min_val), ("ml_val", &ml_val), ("max_val", &max_val)] {
            values.iter().try_for_each(|&v| check_finite(name, v))?;
        }
        check_finite("lamb", lamb)?;
        check_lambda(lamb)?;

        let shape = broadcast_shape(min_val.shape(), ml_val.shape())?;
        let shape = broadcast_shape(&shape, max_val.shape())?;
        let a = broadcast_to(&min_val, &shape)?;
        let b = broadcast_to(&ml_val, &shape)?;
        let c = broadcast_to(&max_val, &shape)?;
        let triples = || a.iter().zip(b.iter()).zip(c.iter()).map(|((&a, &b), &c)| (a, b, c));

        triples().try_for_each(|(a, b, c)| check_ordering(a, b, c))?;
        triples().try_for_each(|(a, b, c)| check_distinct(a, b, c))?;

        let params = triples()
            .map(|(a, b, c)| Pert::from_validated(a, b, c, lamb))
            .collect::<Result<Vec<_>>>()?;
        let params = ArrayD::from_shape_vec(IxDyn(&shape), params)
            .map_err(|e| PertError::invalid_size(e.to_string()))?;

        debug!(shape = ?shape, lamb, "constructed PERT distribution array");
        Ok(Self { params, lamb })
    }

    /// Shape of the broadcast parameters.
    pub fn shape(&self) -> &[usize] {
        self.params.shape()
    }

    /// The per-element scalar distributions.
    pub fn params(&self) -> &ArrayD<Pert> {
        &self.params
    }

    pub fn lamb(&self) -> f64 {
        self.lamb
    }

    pub fn a(&self) -> ArrayD<f64> {
        self.params.map(Pert::a)
    }

    pub fn b(&self) -> ArrayD<f64> {
        self.params.map(Pert::b)
    }

    pub fn c(&self) -> ArrayD<f64> {
        self.params.map(Pert::c)
    }

    pub fn alpha(&self) -> ArrayD<f64> {
        self.params.map(Pert::alpha)
    }

    pub fn beta(&self) -> ArrayD<f64> {
        self.params.map(Pert::beta)
    }

    pub fn range(&self) -> ArrayD<f64> {
        self.params.map(Pert::range)
    }

    pub fn mode(&self) -> ArrayD<f64> {
        self.params.map(Pert::mode)
    }

    pub fn mean(&self) -> ArrayD<f64> {
        self.params.map(Pert::mean)
    }

    pub fn var(&self) -> ArrayD<f64> {
        self.params.map(Pert::var)
    }

    pub fn std(&self) -> ArrayD<f64> {
        self.params.map(Pert::std)
    }

    pub fn skew(&self) -> ArrayD<f64> {
        self.params.map(Pert::skew)
    }

    pub fn kurt(&self) -> ArrayD<f64> {
        self.params.map(Pert::kurt)
    }

    pub fn median(&self) -> ArrayD<f64> {
        self.params.map(Pert::median)
    }

    /// Mean, variance, skewness and excess kurtosis arrays in one call.
    pub fn stats(&self) -> Moments<ArrayD<f64>> {
        Moments {
            mean: self.mean(),
            var: self.var(),
            skew: self.skew(),
            kurt: self.kurt(),
        }
    }

    /// Element-wise [`Pert::pdf`], broadcast against the parameter shape.
    pub fn pdf(&self, x: impl IntoValues) -> Result<ArrayD<f64>> {
        self.evaluate(x, Pert::pdf)
    }

    pub fn logpdf(&self, x: impl IntoValues) -> Result<ArrayD<f64>> {
        self.evaluate(x, Pert::logpdf)
    }

    pub fn cdf(&self, x: impl IntoValues) -> Result<ArrayD<f64>> {
        self.evaluate(x, Pert::cdf)
    }

    pub fn logcdf(&self, x: impl IntoValues) -> Result<ArrayD<f64>> {
        self.evaluate(x, Pert::logcdf)
    }

    pub fn sf(&self, x: impl IntoValues) -> Result<ArrayD<f64>> {
        self.evaluate(x, Pert::sf)
    }

    pub fn logsf(&self, x: impl IntoValues) -> Result<ArrayD<f64>> {
        self.evaluate(x, Pert::logsf)
    }

    /// Element-wise quantile function.
    ///
    /// # Errors
    /// [`PertError::QuantileOutOfRange`] if any probability is outside
    /// `[0, 1]`; [`PertError::ShapeMismatch`] for incompatible shapes.
    pub fn ppf(&self, q: impl IntoValues) -> Result<ArrayD<f64>> {
        let q = q.into_values();
        q.iter().try_for_each(|&q| check_probability(q))?;
        self.evaluate(q, Pert::lower_quantile)
    }

    /// Element-wise inverse survival function.
    ///
    /// # Errors
    /// As for [`PertArray::ppf`].
    pub fn isf(&self, q: impl IntoValues) -> Result<ArrayD<f64>> {
        let q = q.into_values();
        q.iter().try_for_each(|&q| check_probability(q))?;
        self.evaluate(q, Pert::upper_quantile)
    }

    /// Lower and upper bounds of the central interval holding `confidence`
    /// of the mass, one pair of arrays over the parameter shape.
    ///
    /// # Errors
    /// [`PertError::QuantileOutOfRange`] if `confidence` is outside `[0, 1]`.
    pub fn interval(&self, confidence: f64) -> Result<(ArrayD<f64>, ArrayD<f64>)> {
        check_probability(confidence)?;
        let low = (1.0 - confidence) / 2.0;
        let high = (1.0 + confidence) / 2.0;
        Ok((
            self.params.map(|p| p.lower_quantile(low)),
            self.params.map(|p| p.lower_quantile(high)),
        ))
    }

    /// Exact-quantile interval at the two-sided normal coverage of `z`.
    ///
    /// # Errors
    /// [`PertError::NonFinite`] if `z` is NaN or infinite.
    pub fn z_interval(&self, z: f64) -> Result<(ArrayD<f64>, ArrayD<f64>)> {
        check_finite("z", z)?;
        self.interval(z_coverage(z))
    }

    /// Normal-approximation intervals `(mean − z·std, mean + z·std)`.
    ///
    /// # Errors
    /// [`PertError::NonFinite`] if `z` is NaN or infinite.
    pub fn ci(&self, z: f64) -> Result<(ArrayD<f64>, ArrayD<f64>)> {
        check_finite("z", z)?;
        let mean = self.mean();
        let half_width = self.std() * z;
        Ok((&mean - &half_width, &mean + &half_width))
    }

    /// Draws variates shaped by `size`, seeded by `random_state`.
    ///
    /// The parameter shape must broadcast to `size`; parameters of shape
    /// `(2,)` accept a size of `(200, 2)` but not `3`.
    ///
    /// # Errors
    /// [`PertError::InvalidSize`] if the element count of `size` overflows or
    /// the parameters cannot broadcast to it.
    pub fn rvs(&self, size: impl Into<Size>, random_state: Option<u64>) -> Result<ArrayD<f64>> {
        let size = size.into();
        debug!(size = ?size, seeded = random_state.is_some(), "sampling PERT variate array");
        let mut rng = rng_from_state(random_state);
        self.rvs_with_rng(size, &mut rng)
    }

    /// Draws variates shaped by `size` from a caller-supplied generator.
    ///
    /// Draws are taken in row-major order of the output.
    ///
    /// # Errors
    /// As for [`PertArray::rvs`].
    pub fn rvs_with_rng<R: Rng + ?Sized>(
        &self,
        size: impl Into<Size>,
        rng: &mut R,
    ) -> Result<ArrayD<f64>> {
        let shape = size.into().checked_shape()?;
        let params = self.params.broadcast(IxDyn(&shape)).ok_or_else(|| {
            PertError::invalid_size(format!(
                "size {shape:?} is not compatible with parameter shape {:?}",
                self.params.shape()
            ))
        })?;
        let draws: Vec<f64> = params.iter().map(|p| p.sample(rng)).collect();
        ArrayD::from_shape_vec(IxDyn(&shape), draws)
            .map_err(|e| PertError::invalid_size(e.to_string()))
    }

    fn evaluate(&self, x: impl IntoValues, f: impl Fn(&Pert, f64) -> f64) -> Result<ArrayD<f64>> {
        let x = x.into_values();
        let shape = broadcast_shape(self.params.shape(), x.shape())?;
        let params = broadcast_to(&self.params, &shape)?;
        let x = broadcast_to(&x, &shape)?;
        Ok(Zip::from(&params).and(&x).map_collect(|p, &x| f(p, x)))
    }
}

impl From<Pert> for PertArray {
    fn from(dist: Pert) -> Self {
        let lamb = dist.lamb();
        Self {
            params: ndarray::arr0(dist).into_dyn(),
            lamb,
        }
    }
}

impl fmt::Display for PertArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PERT(a={}, b={}, c={}, lamb={})",
            self.a(),
            self.b(),
            self.c(),
            self.lamb
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn pair() -> PertArray {
        PertArray::new([0.0, 10.0], [5.0, 15.0], [10.0, 20.0]).unwrap()
    }

    // --- broadcasting ---

    #[test]
    fn test_broadcast_shape_rules() {
        assert_eq!(broadcast_shape(&[2, 3], &[2, 3]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shape(&[2, 1], &[1, 3]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shape(&[3], &[4, 3]).unwrap(), vec![4, 3]);
        assert_eq!(broadcast_shape(&[], &[]).unwrap(), Vec::<usize>::new());
        assert_eq!(broadcast_shape(&[0], &[1]).unwrap(), vec![0]);
        let err = broadcast_shape(&[2, 3], &[3, 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_into_values_shapes() {
        assert_eq!(1.0_f64.into_values().shape(), &[] as &[usize]);
        assert_eq!(vec![1.0_f64, 2.0].into_values().shape(), &[2]);
        assert_eq!([1.0_f64, 2.0, 3.0].into_values().shape(), &[3]);
        let m = Array2::<f64>::zeros((2, 3));
        assert_eq!((&m).into_values().shape(), &[2, 3]);
        assert_eq!(m.view().into_values().shape(), &[2, 3]);
        assert_eq!(m.into_values().shape(), &[2, 3]);
    }

    // --- construction ---

    #[test]
    fn test_scalar_parameters_give_zero_dim() {
        let d = PertArray::new(0.0, 5.0, 10.0).unwrap();
        assert_eq!(d.shape(), &[] as &[usize]);
        let pdf = d.pdf(5.0).unwrap();
        assert_eq!(pdf.ndim(), 0);
        assert_abs_diff_eq!(pdf.sum(), 0.1875, epsilon = 1e-10);
    }

    #[test]
    fn test_parameters_broadcast_together() {
        let d = PertArray::new(0.0, [1.0, 2.0, 3.0], 10.0).unwrap();
        assert_eq!(d.shape(), &[3]);
        assert_eq!(d.a(), array![0.0, 0.0, 0.0].into_dyn());
        assert_eq!(d.b(), array![1.0, 2.0, 3.0].into_dyn());
    }

    #[test]
    fn test_matches_scalar_distribution() {
        let d = PertArray::new([1.0, 10.0], [2.0, 190.0], [4.0, 200.0]).unwrap();
        let scalar = Pert::new(10.0, 190.0, 200.0).unwrap();
        assert_eq!(d.alpha()[1], scalar.alpha());
        assert_eq!(d.mean()[1], scalar.mean());
        assert_eq!(d.cdf([3.0, 150.0]).unwrap()[1], scalar.cdf(150.0));
    }

    #[test]
    fn test_any_element_violating_ordering_fails() {
        let err = PertArray::new([0.0, 5.0], [1.0, 4.0], [2.0, 6.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OrderingViolation);
    }

    #[test]
    fn test_ordering_checked_before_degeneracy_across_elements() {
        let next_up = f64::from_bits(1.0_f64.to_bits() + 1);
        // First element degenerate, second out of order: ordering gate wins
        let err = PertArray::new([1.0, 5.0], [next_up, 4.0], [2.0, 6.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OrderingViolation);
        let err = PertArray::new([1.0, 3.0], [next_up, 4.0], [2.0, 6.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateInterval);
    }

    #[test]
    fn test_non_broadcastable_shapes_fail() {
        let err = PertArray::new([0.0, 1.0], [1.0, 2.0, 3.0], [2.0, 3.0, 4.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_non_finite_element_fails() {
        let err = PertArray::new([0.0, f64::NAN], [1.0, 2.0], [2.0, 3.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonFinite);
        let err = PertArray::with_lambda([0.0], [1.0], [2.0], 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonPositiveLambda);
    }

    // --- evaluation ---

    #[test]
    fn test_vectorized_outputs_keep_shape() {
        let d = pair();
        assert_eq!(d.pdf([5.0, 15.0]).unwrap().shape(), &[2]);
        assert_eq!(d.cdf([5.0, 15.0]).unwrap().shape(), &[2]);
        assert_eq!(d.ppf([0.25, 0.75]).unwrap().shape(), &[2]);
        let (low, high) = d.interval(0.9).unwrap();
        assert_eq!(low.shape(), &[2]);
        assert_eq!(high.shape(), &[2]);
    }

    #[test]
    fn test_outer_broadcast() {
        let d = pair();
        let x = array![[5.0], [15.0], [25.0]];
        let cdf = d.cdf(&x).unwrap();
        assert_eq!(cdf.shape(), &[3, 2]);
        assert_abs_diff_eq!(cdf[[0, 0]], 0.5, epsilon = 1e-12);
        assert_eq!(cdf[[0, 1]], 0.0);
        assert_eq!(cdf[[1, 0]], 1.0);
        assert_abs_diff_eq!(cdf[[1, 1]], 0.5, epsilon = 1e-12);
        assert_eq!(cdf[[2, 1]], 1.0);
    }

    #[test]
    fn test_input_shape_mismatch() {
        let d = pair();
        let err = d.pdf([1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_identities_hold_elementwise() {
        let d = pair();
        let x = [3.0, 17.0];
        let cdf = d.cdf(x).unwrap();
        let sf = d.sf(x).unwrap();
        for (p, s) in cdf.iter().zip(sf.iter()) {
            assert_abs_diff_eq!(p + s, 1.0, epsilon = 1e-12);
        }
        let back = d.ppf(cdf).unwrap();
        for (b, x) in back.iter().zip(x.iter()) {
            assert_abs_diff_eq!(b, x, epsilon = 1e-9);
        }
        let logpdf = d.logpdf(x).unwrap();
        let pdf = d.pdf(x).unwrap();
        for (l, p) in logpdf.iter().zip(pdf.iter()) {
            assert_abs_diff_eq!(*l, p.ln(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_log_functions_at_bounds() {
        let d = pair();
        let logpdf = d.logpdf([0.0, 25.0]).unwrap();
        assert!(logpdf.iter().all(|&v| v == f64::NEG_INFINITY));
        let logcdf = d.logcdf([0.0, 20.0]).unwrap();
        assert_eq!(logcdf[0], f64::NEG_INFINITY);
        assert_eq!(logcdf[1], 0.0);
        let logsf = d.logsf([10.0, 10.0]).unwrap();
        assert_eq!(logsf[0], f64::NEG_INFINITY);
        assert_eq!(logsf[1], 0.0);
    }

    #[test]
    fn test_quantile_validation_is_all_or_nothing() {
        let d = pair();
        let err = d.ppf([0.5, 1.5]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuantileOutOfRange);
        let err = d.isf([-0.1, 0.5]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QuantileOutOfRange);
    }

    #[test]
    fn test_isf_matches_ppf_of_complement() {
        let d = pair();
        let isf = d.isf([0.1, 0.8]).unwrap();
        let ppf = d.ppf([0.9, 0.2]).unwrap();
        for (i, p) in isf.iter().zip(ppf.iter()) {
            assert_abs_diff_eq!(i, p, epsilon = 1e-9);
        }
    }

    // --- moments and intervals ---

    #[test]
    fn test_stats_matches_accessors() {
        let d = pair();
        let s = d.stats();
        assert_eq!(s.mean, d.mean());
        assert_eq!(s.var, d.var());
        assert_eq!(s.skew, d.skew());
        assert_eq!(s.kurt, d.kurt());
        assert_abs_diff_eq!(s.mean[1], 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ci_and_z_interval() {
        let d = pair();
        let (low, high) = d.ci(1.0).unwrap();
        let std = d.std();
        assert_abs_diff_eq!(high[0] - low[0], 2.0 * std[0], epsilon = 1e-12);
        let (zl, zh) = d.z_interval(1.0).unwrap();
        assert!(zl[1] < d.median()[1] && d.median()[1] < zh[1]);
        assert!(d.ci(f64::INFINITY).is_err());
    }

    // --- sampling ---

    #[test]
    fn test_rvs_size_by_parameter_shape() {
        let d = pair();
        let draws = d.rvs((200_usize, 2_usize), Some(123)).unwrap();
        assert_eq!(draws.shape(), &[200, 2]);
        for row in draws.outer_iter() {
            assert!((0.0..=10.0).contains(&row[0]));
            assert!((10.0..=20.0).contains(&row[1]));
        }
    }

    #[test]
    fn test_rvs_reproducible() {
        let d = pair();
        let first = d.rvs((50_usize, 2_usize), Some(9)).unwrap();
        let second = d.rvs((50_usize, 2_usize), Some(9)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rvs_incompatible_size() {
        let d = pair();
        let err = d.rvs(3_usize, Some(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSize);
        let err = d.rvs(Size::Shape(vec![usize::MAX, 2]), Some(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSize);
    }

    #[test]
    fn test_wide_support_element() {
        let d = PertArray::new([-1e308, 0.0], [0.0, 1.0], [1e308, 2.0]).unwrap();
        let mean = d.mean();
        assert!(mean.iter().all(|m| m.is_finite()));
        assert_abs_diff_eq!(mean[1], 1.0, epsilon = 1e-12);
        let cdf = d.cdf([0.0, 1.0]).unwrap();
        assert_abs_diff_eq!(cdf[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(cdf[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rvs_scalar_parameters_match_scalar_type() {
        let scalar = Pert::new(0.0, 5.0, 10.0).unwrap();
        let d = PertArray::from(scalar.clone());
        assert_eq!(
            d.rvs((3_usize, 4_usize), Some(42)).unwrap(),
            scalar.rvs((3_usize, 4_usize), Some(42)).unwrap()
        );
    }

    #[test]
    fn test_display() {
        let d = pair();
        assert_eq!(d.to_string(), "PERT(a=[0, 10], b=[5, 15], c=[10, 20], lamb=4)");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn param_rows() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
        prop::collection::vec(
            (-50.0_f64..0.0, 0.01_f64..0.99, 1.0_f64..50.0)
                .prop_map(|(min, frac, range)| (min, min + frac * range, min + range)),
            1..6,
        )
    }

    fn split(rows: &[(f64, f64, f64)]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (
            rows.iter().map(|r| r.0).collect(),
            rows.iter().map(|r| r.1).collect(),
            rows.iter().map(|r| r.2).collect(),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn elementwise_matches_scalar(rows in param_rows(), frac in -0.1_f64..1.1) {
            let (a, b, c) = split(&rows);
            let d = PertArray::new(&a, &b, &c).unwrap();
            let x: Vec<f64> = rows.iter().map(|&(a, _, c)| a + frac * (c - a)).collect();
            let cdf = d.cdf(&x).unwrap();
            let pdf = d.pdf(&x).unwrap();
            for (i, &(a, b, c)) in rows.iter().enumerate() {
                let scalar = Pert::new(a, b, c).unwrap();
                prop_assert_eq!(cdf[i], scalar.cdf(x[i]));
                prop_assert_eq!(pdf[i], scalar.pdf(x[i]));
            }
        }

        #[test]
        fn samples_within_each_support(rows in param_rows(), seed in any::<u64>()) {
            let (a, b, c) = split(&rows);
            let d = PertArray::new(&a, &b, &c).unwrap();
            let draws = d.rvs(vec![16, rows.len()], Some(seed)).unwrap();
            for row in draws.outer_iter() {
                for (v, &(a, _, c)) in row.iter().zip(rows.iter()) {
                    prop_assert!((a..=c).contains(v));
                }
            }
        }
    }
}
