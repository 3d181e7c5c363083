//! Decompositions of the Z-space correlation matrix.
//!
//! Both factorisations produce the Jacobian pair for the Y ↔ Z coordinate
//! change: `jzy` maps uncorrelated standard normals Y into correlated
//! standard normals Z (z = J_zy · y), and `jyz` is its inverse. Either way
//! J_zy · J_zyᵀ = C.

use crate::types::ReliaError;
use nalgebra::{Cholesky, DMatrix, SymmetricEigen};

/// Jacobian pair for the Y ↔ Z coordinate change.
#[derive(Debug, Clone)]
pub struct CorrelationFactors {
    /// Jacobian from Z to Y (y = J_yz · z).
    pub jyz: DMatrix<f64>,
    /// Jacobian from Y to Z (z = J_zy · y).
    pub jzy: DMatrix<f64>,
}

fn check_square(context: &'static str, c: &DMatrix<f64>) -> Result<usize, ReliaError> {
    let n = c.nrows();
    if c.ncols() != n {
        return Err(ReliaError::shape_mismatch(context, n, c.ncols()));
    }
    Ok(n)
}

/// Spectral decomposition of a correlation matrix.
///
/// Eigendecomposes C = A Λ Aᵀ and returns J_yz = (A · Λ^{−1/2})ᵀ together
/// with its inverse J_zy. Eigenvector ordering is whatever the
/// factorisation produces; callers rely only on J_zy · J_zyᵀ = C.
///
/// # Errors
///
/// - [`ReliaError::ShapeMismatch`] when `c` is not square
/// - [`ReliaError::InvalidParameter`] when `c` has a non-positive
///   eigenvalue (not positive definite)
///
/// # Examples
///
/// ```
/// use nalgebra::DMatrix;
/// use relia_core::math::spectral;
///
/// let c = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]);
/// let factors = spectral(&c).unwrap();
/// let recomposed = &factors.jzy * factors.jzy.transpose();
/// assert!((recomposed - c).norm() < 1e-9);
/// ```
pub fn spectral(c: &DMatrix<f64>) -> Result<CorrelationFactors, ReliaError> {
    let n = check_square("spectral", c)?;

    let eigen = SymmetricEigen::new(c.clone());
    if eigen.eigenvalues.iter().any(|&l| l <= 0.0) {
        return Err(ReliaError::invalid_parameter(
            "correlation",
            "matrix is not positive definite",
        ));
    }

    let inv_sqrt = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            1.0 / eigen.eigenvalues[i].sqrt()
        } else {
            0.0
        }
    });
    let jyz = (&eigen.eigenvectors * inv_sqrt).transpose();
    let jzy = jyz.clone().try_inverse().ok_or_else(|| {
        ReliaError::invalid_parameter("correlation", "decomposition is singular")
    })?;

    Ok(CorrelationFactors { jyz, jzy })
}

/// Cholesky decomposition of a correlation matrix.
///
/// Returns J_zy = L (lower triangular, L Lᵀ = C) and J_yz = L⁻¹.
///
/// # Errors
///
/// - [`ReliaError::ShapeMismatch`] when `c` is not square
/// - [`ReliaError::InvalidParameter`] when `c` is not positive definite
pub fn cholesky(c: &DMatrix<f64>) -> Result<CorrelationFactors, ReliaError> {
    check_square("cholesky", c)?;

    let factor = Cholesky::new(c.clone()).ok_or_else(|| {
        ReliaError::invalid_parameter("correlation", "matrix is not positive definite")
    })?;
    let jzy = factor.l();
    let jyz = jzy.clone().try_inverse().ok_or_else(|| {
        ReliaError::invalid_parameter("correlation", "decomposition is singular")
    })?;

    Ok(CorrelationFactors { jyz, jzy })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_correlation() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 0.5, 0.2, 0.5, 1.0, -0.3, 0.2, -0.3, 1.0],
        )
    }

    #[test]
    fn test_spectral_recomposes_correlation() {
        let c = sample_correlation();
        let factors = spectral(&c).unwrap();
        let recomposed = &factors.jzy * factors.jzy.transpose();
        assert_relative_eq!((recomposed - &c).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cholesky_recomposes_correlation() {
        let c = sample_correlation();
        let factors = cholesky(&c).unwrap();
        let recomposed = &factors.jzy * factors.jzy.transpose();
        assert_relative_eq!((recomposed - &c).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_jacobians_are_inverse_pairs() {
        let c = sample_correlation();
        for factors in [spectral(&c).unwrap(), cholesky(&c).unwrap()] {
            let product = &factors.jyz * &factors.jzy;
            assert_relative_eq!(
                (product - DMatrix::identity(3, 3)).norm(),
                0.0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_whitening_maps_correlation_to_identity() {
        // y = J_yz z must have identity covariance: J_yz C J_yzᵀ = I.
        let c = sample_correlation();
        let factors = spectral(&c).unwrap();
        let white = &factors.jyz * &c * factors.jyz.transpose();
        assert_relative_eq!(
            (white - DMatrix::identity(3, 3)).norm(),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_identity_correlation() {
        let c = DMatrix::identity(4, 4);
        let factors = cholesky(&c).unwrap();
        assert_relative_eq!(
            (&factors.jzy - DMatrix::identity(4, 4)).norm(),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_non_positive_definite_rejected() {
        let c = DMatrix::from_row_slice(2, 2, &[1.0, 1.5, 1.5, 1.0]);
        assert!(spectral(&c).unwrap_err().is_invalid_parameter());
        assert!(cholesky(&c).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_non_square_rejected() {
        let c = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert!(spectral(&c).unwrap_err().is_shape_mismatch());
        assert!(cholesky(&c).unwrap_err().is_shape_mismatch());
    }
}
