//! Standard-normal helpers.
//!
//! Scalar φ, Φ and Φ⁻¹ delegate to `statrs` (the workspace's 1-D
//! distribution primitive); the multivariate density is assembled from a
//! Cholesky factorisation of the correlation matrix.

use crate::types::ReliaError;
use nalgebra::{Cholesky, DMatrix, DVector};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

fn std_normal() -> Normal {
    // (0, 1) parameters are always accepted.
    Normal::new(0.0, 1.0).unwrap()
}

/// Standard normal probability density φ(x).
///
/// # Examples
///
/// ```
/// use relia_core::math::phi_pdf;
///
/// assert!((phi_pdf(0.0) - 0.3989422804014327).abs() < 1e-12);
/// ```
#[inline]
pub fn phi_pdf(x: f64) -> f64 {
    std_normal().pdf(x)
}

/// Standard normal cumulative distribution Φ(x).
#[inline]
pub fn phi_cdf(x: f64) -> f64 {
    std_normal().cdf(x)
}

/// Inverse of the standard normal CDF.
///
/// `phi_icdf(0.0)` is −∞ and `phi_icdf(1.0)` is +∞; arguments outside
/// `[0, 1]` yield NaN.
///
/// # Examples
///
/// ```
/// use relia_core::math::phi_icdf;
///
/// assert!((phi_icdf(0.5)).abs() < 1e-12);
/// assert_eq!(phi_icdf(0.0), f64::NEG_INFINITY);
/// assert_eq!(phi_icdf(1.0), f64::INFINITY);
/// ```
#[inline]
pub fn phi_icdf(q: f64) -> f64 {
    if !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    if q == 0.0 {
        return f64::NEG_INFINITY;
    }
    if q == 1.0 {
        return f64::INFINITY;
    }
    std_normal().inverse_cdf(q)
}

/// Multivariate standard-normal density with covariance `corr`.
///
/// # Errors
///
/// - [`ReliaError::ShapeMismatch`] when `trace(corr)` disagrees with the
///   dimension of `x` (a correlation matrix has unit diagonal, so its trace
///   is its dimension) or when `corr` is not `n × n`
/// - [`ReliaError::InvalidParameter`] when `corr` is not positive definite
pub fn phi_pdf_multivariate(x: &DVector<f64>, corr: &DMatrix<f64>) -> Result<f64, ReliaError> {
    let n = x.len();
    if corr.nrows() != n || corr.ncols() != n {
        return Err(ReliaError::shape_mismatch(
            "phi_pdf_multivariate",
            n,
            corr.nrows(),
        ));
    }
    if (corr.trace() - n as f64).abs() > 1e-9 {
        return Err(ReliaError::shape_mismatch(
            "phi_pdf_multivariate",
            n,
            corr.trace().round() as usize,
        ));
    }

    let chol = Cholesky::new(corr.clone()).ok_or_else(|| {
        ReliaError::invalid_parameter("corr", "correlation matrix is not positive definite")
    })?;
    let det = chol.determinant();
    let exponent = -0.5 * x.dot(&chol.solve(x));
    let norm = 1.0 / ((2.0 * std::f64::consts::PI).powi(n as i32) * det).sqrt();

    Ok(norm * exponent.exp())
}

/// Convert a probability of failure into a reliability index, β = −Φ⁻¹(p).
#[inline]
pub fn pf_to_beta(pf: f64) -> f64 {
    -phi_icdf(pf)
}

/// Convert a reliability index into a probability of failure, p = Φ(−β).
#[inline]
pub fn beta_to_pf(beta: f64) -> f64 {
    phi_cdf(-beta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_phi_pdf_reference_values() {
        assert_relative_eq!(phi_pdf(0.0), 0.3989422804014327, epsilon = 1e-12);
        assert_relative_eq!(phi_pdf(1.0), 0.24197072451914337, epsilon = 1e-12);
        assert_relative_eq!(phi_pdf(-1.0), phi_pdf(1.0), epsilon = 1e-15);
    }

    #[test]
    fn test_phi_cdf_reference_values() {
        assert_relative_eq!(phi_cdf(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(phi_cdf(1.0), 0.8413447460685429, epsilon = 1e-9);
        assert_relative_eq!(phi_cdf(-2.0), 0.022750131948179195, epsilon = 1e-9);
    }

    #[test]
    fn test_phi_icdf_inverts_phi_cdf() {
        for &q in &[0.01, 0.1, 0.25, 0.5, 0.75, 0.9, 0.99] {
            assert_relative_eq!(phi_cdf(phi_icdf(q)), q, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_phi_icdf_edges() {
        assert_eq!(phi_icdf(0.0), f64::NEG_INFINITY);
        assert_eq!(phi_icdf(1.0), f64::INFINITY);
        assert!(phi_icdf(-0.1).is_nan());
        assert!(phi_icdf(1.1).is_nan());
    }

    #[test]
    fn test_beta_pf_round_trip() {
        for &pf in &[1e-12, 1e-6, 1e-3, 0.1855, 0.5, 0.9, 1.0 - 1e-12] {
            assert_relative_eq!(beta_to_pf(pf_to_beta(pf)), pf, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_pf_to_beta_reference() {
        // β ≈ 0.8944 gives p_f ≈ 0.1855
        assert_relative_eq!(beta_to_pf(0.8944), 0.18555, epsilon = 1e-4);
    }

    #[test]
    fn test_multivariate_pdf_identity_corr_is_product() {
        let x = DVector::from_vec(vec![0.3, -1.2]);
        let corr = DMatrix::identity(2, 2);
        let joint = phi_pdf_multivariate(&x, &corr).unwrap();
        assert_relative_eq!(joint, phi_pdf(0.3) * phi_pdf(-1.2), epsilon = 1e-12);
    }

    #[test]
    fn test_multivariate_pdf_correlated_reference() {
        // ρ = 0.5 at the origin: 1 / (2π √(1 − ρ²))
        let x = DVector::from_vec(vec![0.0, 0.0]);
        let corr = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]);
        let expected = 1.0 / (2.0 * std::f64::consts::PI * (1.0_f64 - 0.25).sqrt());
        assert_relative_eq!(
            phi_pdf_multivariate(&x, &corr).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_multivariate_pdf_shape_mismatch() {
        let x = DVector::from_vec(vec![0.0, 0.0, 0.0]);
        let corr = DMatrix::identity(2, 2);
        let err = phi_pdf_multivariate(&x, &corr).unwrap_err();
        assert!(err.is_shape_mismatch());
    }

    proptest::proptest! {
        #[test]
        fn prop_beta_pf_round_trip(p in 1e-9_f64..0.999_999_999) {
            proptest::prop_assert!((beta_to_pf(pf_to_beta(p)) - p).abs() < 1e-12);
        }

        #[test]
        fn prop_phi_cdf_monotone(a in -6.0_f64..6.0, delta in 1e-6_f64..1.0) {
            proptest::prop_assert!(phi_cdf(a + delta) >= phi_cdf(a));
        }
    }

    #[test]
    fn test_multivariate_pdf_trace_mismatch() {
        // Right size but a scaled diagonal: trace no longer equals dim.
        let x = DVector::from_vec(vec![0.0, 0.0]);
        let corr = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 2.0]);
        let err = phi_pdf_multivariate(&x, &corr).unwrap_err();
        assert!(err.is_shape_mismatch());
    }
}
