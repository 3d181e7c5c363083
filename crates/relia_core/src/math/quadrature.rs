//! Gauss–Legendre quadrature.
//!
//! A fixed-order tensor rule stands in for the 2-D adaptive integrator the
//! Nataf solve needs: the integrand (a product moment against a bivariate
//! normal density) is smooth and effectively supported on a bounded square,
//! where Gauss–Legendre converges geometrically.

use crate::types::ReliaError;

/// A Gauss–Legendre rule of fixed order on [−1, 1].
///
/// Nodes are the roots of the Legendre polynomial Pₙ, located by Newton
/// iteration from the Chebyshev initial guesses; weights follow from the
/// derivative at each root.
///
/// # Examples
///
/// ```
/// use relia_core::math::GaussLegendre;
///
/// let rule = GaussLegendre::new(16).unwrap();
/// // ∫₀¹ x² dx = 1/3
/// let integral = rule.integrate(0.0, 1.0, |x| x * x);
/// assert!((integral - 1.0 / 3.0).abs() < 1e-14);
/// ```
#[derive(Debug, Clone)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendre {
    /// Build a rule of the given order (number of nodes).
    ///
    /// # Errors
    ///
    /// [`ReliaError::InvalidParameter`] when `order < 2`.
    pub fn new(order: usize) -> Result<Self, ReliaError> {
        if order < 2 {
            return Err(ReliaError::invalid_parameter("order", "must be >= 2"));
        }

        let n = order;
        let mut nodes = vec![0.0; n];
        let mut weights = vec![0.0; n];

        let m = n.div_ceil(2);
        for i in 0..m {
            // Chebyshev guess for the i-th positive root, then Newton.
            let mut z = (std::f64::consts::PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
            let mut pp = 0.0;
            for _ in 0..100 {
                // Recurrence: k·Pₖ = (2k−1)·z·Pₖ₋₁ − (k−1)·Pₖ₋₂
                let mut p1 = 1.0;
                let mut p2 = 0.0;
                for k in 1..=n {
                    let p3 = p2;
                    p2 = p1;
                    p1 = ((2 * k - 1) as f64 * z * p2 - (k - 1) as f64 * p3) / k as f64;
                }
                pp = n as f64 * (z * p1 - p2) / (z * z - 1.0);
                let dz = p1 / pp;
                z -= dz;
                if dz.abs() < 1e-15 {
                    break;
                }
            }
            let w = 2.0 / ((1.0 - z * z) * pp * pp);
            nodes[i] = -z;
            nodes[n - 1 - i] = z;
            weights[i] = w;
            weights[n - 1 - i] = w;
        }

        Ok(Self { nodes, weights })
    }

    /// Order of the rule.
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// Integrate `f` over `[a, b]`.
    pub fn integrate<F>(&self, a: f64, b: f64, f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let half_width = 0.5 * (b - a);
        let centre = 0.5 * (a + b);
        let mut sum = 0.0;
        for (&x, &w) in self.nodes.iter().zip(&self.weights) {
            sum += w * f(centre + half_width * x);
        }
        sum * half_width
    }

    /// Integrate `f` over the square `[a, b] × [a, b]` with the tensor rule.
    pub fn integrate_2d<F>(&self, a: f64, b: f64, f: F) -> f64
    where
        F: Fn(f64, f64) -> f64,
    {
        let half_width = 0.5 * (b - a);
        let centre = 0.5 * (a + b);
        let mut sum = 0.0;
        for (&xi, &wi) in self.nodes.iter().zip(&self.weights) {
            let x = centre + half_width * xi;
            let mut inner = 0.0;
            for (&yj, &wj) in self.nodes.iter().zip(&self.weights) {
                inner += wj * f(x, centre + half_width * yj);
            }
            sum += wi * inner;
        }
        sum * half_width * half_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_degenerate_order() {
        assert!(GaussLegendre::new(0).is_err());
        assert!(GaussLegendre::new(1).is_err());
        assert!(GaussLegendre::new(2).is_ok());
    }

    #[test]
    fn test_weights_sum_to_interval_length() {
        for order in [2, 5, 16, 48] {
            let rule = GaussLegendre::new(order).unwrap();
            let total: f64 = rule.weights.iter().sum();
            assert_relative_eq!(total, 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_nodes_are_symmetric() {
        let rule = GaussLegendre::new(17).unwrap();
        for i in 0..rule.order() {
            assert_relative_eq!(
                rule.nodes[i],
                -rule.nodes[rule.order() - 1 - i],
                epsilon = 1e-14
            );
        }
    }

    #[test]
    fn test_exact_for_low_degree_polynomials() {
        // An order-n rule is exact for polynomials of degree 2n − 1.
        let rule = GaussLegendre::new(4).unwrap();
        let integral = rule.integrate(-1.0, 3.0, |x| x.powi(7) - 2.0 * x.powi(3) + 1.0);
        // Antiderivative x⁸/8 − x⁴/2 + x evaluated on [−1, 3]
        let exact = (3f64.powi(8) / 8.0 - 3f64.powi(4) / 2.0 + 3.0)
            - ((-1f64).powi(8) / 8.0 - (-1f64).powi(4) / 2.0 - 1.0);
        assert_relative_eq!(integral, exact, epsilon = 1e-10);
    }

    #[test]
    fn test_gaussian_integral() {
        let rule = GaussLegendre::new(48).unwrap();
        let integral = rule.integrate(-8.5, 8.5, |x| (-0.5 * x * x).exp());
        assert_relative_eq!(
            integral,
            (2.0 * std::f64::consts::PI).sqrt(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_tensor_rule_separates() {
        let rule = GaussLegendre::new(24).unwrap();
        let product = rule.integrate_2d(0.0, 1.0, |x, y| x * y);
        assert_relative_eq!(product, 0.25, epsilon = 1e-12);
    }
}
