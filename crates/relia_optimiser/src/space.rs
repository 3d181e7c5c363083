//! The Y → X coordinate map used by the search.

use nalgebra::{DMatrix, DVector};
use relia_core::ReliaError;

/// An affine map from search space Y to physical space X.
///
/// Holds the Jacobian J_xy and a shift vector as plain values:
/// x = J_xy · y + shift, and gradients pull back as ∇_y g = J_xyᵀ · ∇_x g.
/// FOSM uses the degenerate diag(σ) map around the mean; FORM rebuilds the
/// map from the per-point normal-equivalents at every outer iteration.
#[derive(Debug, Clone)]
pub struct SpaceMap {
    jxy: DMatrix<f64>,
    shift: DVector<f64>,
}

impl SpaceMap {
    /// Build a map from an explicit Jacobian and shift.
    ///
    /// # Errors
    ///
    /// [`ReliaError::ShapeMismatch`] when the Jacobian is not square or
    /// disagrees with the shift length.
    pub fn new(jxy: DMatrix<f64>, shift: DVector<f64>) -> Result<Self, ReliaError> {
        if jxy.nrows() != jxy.ncols() {
            return Err(ReliaError::shape_mismatch(
                "space map",
                jxy.nrows(),
                jxy.ncols(),
            ));
        }
        if jxy.nrows() != shift.len() {
            return Err(ReliaError::shape_mismatch(
                "space map",
                jxy.nrows(),
                shift.len(),
            ));
        }
        Ok(Self { jxy, shift })
    }

    /// The standardised map x = μ + σ ⊙ y (independent normal-equivalents
    /// at every point).
    ///
    /// # Errors
    ///
    /// [`ReliaError::ShapeMismatch`] when `mean` and `std` disagree in
    /// length.
    pub fn standardised(mean: &DVector<f64>, std: &DVector<f64>) -> Result<Self, ReliaError> {
        if mean.len() != std.len() {
            return Err(ReliaError::shape_mismatch(
                "space map",
                mean.len(),
                std.len(),
            ));
        }
        Ok(Self {
            jxy: DMatrix::from_diagonal(std),
            shift: mean.clone(),
        })
    }

    /// Dimension of the spaces.
    pub fn dim(&self) -> usize {
        self.shift.len()
    }

    /// The Jacobian J_xy.
    pub fn jxy(&self) -> &DMatrix<f64> {
        &self.jxy
    }

    /// Map a point from Y to X.
    pub fn x_of_y(&self, y: &DVector<f64>) -> DVector<f64> {
        &self.jxy * y + &self.shift
    }

    /// Pull an X-space gradient back to Y: ∇_y g = J_xyᵀ · ∇_x g.
    pub fn grad_to_y(&self, dgdx: &DVector<f64>) -> DVector<f64> {
        self.jxy.transpose() * dgdx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standardised_map_round_trip() {
        let mean = DVector::from_vec(vec![10.0, 5.0]);
        let std = DVector::from_vec(vec![2.0, 1.0]);
        let map = SpaceMap::standardised(&mean, &std).unwrap();

        let y = DVector::from_vec(vec![0.0, 0.0]);
        assert_relative_eq!((map.x_of_y(&y) - &mean).norm(), 0.0);

        let y = DVector::from_vec(vec![1.0, -2.0]);
        let x = map.x_of_y(&y);
        assert_relative_eq!(x[0], 12.0);
        assert_relative_eq!(x[1], 3.0);
    }

    #[test]
    fn test_gradient_pullback_scales_by_std() {
        let mean = DVector::from_vec(vec![0.0, 0.0]);
        let std = DVector::from_vec(vec![2.0, 1.0]);
        let map = SpaceMap::standardised(&mean, &std).unwrap();

        let dgdx = DVector::from_vec(vec![1.0, -1.0]);
        let dgdy = map.grad_to_y(&dgdx);
        assert_relative_eq!(dgdy[0], 2.0);
        assert_relative_eq!(dgdy[1], -1.0);
    }

    #[test]
    fn test_shape_checks() {
        let jxy = DMatrix::identity(2, 2);
        let shift = DVector::from_vec(vec![0.0, 0.0, 0.0]);
        assert!(SpaceMap::new(jxy, shift).unwrap_err().is_shape_mismatch());

        let mean = DVector::from_vec(vec![0.0]);
        let std = DVector::from_vec(vec![1.0, 1.0]);
        assert!(SpaceMap::standardised(&mean, &std)
            .unwrap_err()
            .is_shape_mismatch());
    }
}
