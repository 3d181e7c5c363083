//! Central finite-difference gradients.

use nalgebra::DVector;

/// Finite-difference step.
const STEP: f64 = 1e-6;

/// Gradient of `f` at `x` by central differences with step 1e-6.
///
/// # Examples
///
/// ```
/// use nalgebra::DVector;
/// use relia_core::math::numerical_gradient;
///
/// let x = DVector::from_vec(vec![1.0, 2.0]);
/// let grad = numerical_gradient(&x, |p| p[0] * p[0] + 3.0 * p[1]);
/// assert!((grad[0] - 2.0).abs() < 1e-6);
/// assert!((grad[1] - 3.0).abs() < 1e-6);
/// ```
pub fn numerical_gradient<F>(x: &DVector<f64>, f: F) -> DVector<f64>
where
    F: Fn(&DVector<f64>) -> f64,
{
    DVector::from_fn(x.len(), |i, _| {
        let mut forward = x.clone();
        forward[i] += STEP;
        let mut backward = x.clone();
        backward[i] -= STEP;
        (f(&forward) - f(&backward)) / (2.0 * STEP)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_function_is_exact() {
        let x = DVector::from_vec(vec![10.0, 5.0]);
        let grad = numerical_gradient(&x, |p| p[0] - p[1] - 3.0);
        assert_relative_eq!(grad[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(grad[1], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_quadratic_function() {
        let x = DVector::from_vec(vec![2.0, 5.0]);
        let grad = numerical_gradient(&x, |p| p[0] * p[0] - p[1]);
        assert_relative_eq!(grad[0], 4.0, epsilon = 1e-6);
        assert_relative_eq!(grad[1], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_transcendental_function() {
        let x = DVector::from_vec(vec![0.5]);
        let grad = numerical_gradient(&x, |p| p[0].exp());
        assert_relative_eq!(grad[0], 0.5_f64.exp(), epsilon = 1e-6);
    }
}
