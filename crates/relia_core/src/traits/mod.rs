//! Core traits for 1-D marginal distributions.
//!
//! The engine never manipulates distribution parameters directly; every
//! marginal enters through the [`Marginal`] capability record. Catalogue
//! implementations live in `relia_models`; callers may inject their own.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A 1-D marginal probability distribution.
///
/// The joint model stores marginals as trait objects, so implementations
/// must be object safe. The contract mirrors what the reliability kernels
/// need and nothing more: density, distribution function and its inverse,
/// the first two moments, and seeded sampling.
///
/// # Invariants
///
/// - `cdf(icdf(u)) = u` up to numeric tolerance for `u ∈ (0, 1)`
/// - `mean()` and `variance()` are finite for any marginal admitted into a
///   joint model (checked at joint construction)
///
/// # Examples
///
/// ```
/// use relia_core::Marginal;
///
/// struct StandardUniform;
///
/// impl Marginal for StandardUniform {
///     fn pdf(&self, x: f64) -> f64 {
///         if (0.0..=1.0).contains(&x) { 1.0 } else { 0.0 }
///     }
///     fn cdf(&self, x: f64) -> f64 {
///         x.clamp(0.0, 1.0)
///     }
///     fn icdf(&self, u: f64) -> f64 {
///         u
///     }
///     fn mean(&self) -> f64 {
///         0.5
///     }
///     fn variance(&self) -> f64 {
///         1.0 / 12.0
///     }
/// }
///
/// let m = StandardUniform;
/// assert_eq!(m.cdf(m.icdf(0.3)), 0.3);
/// assert_eq!(m.sample(8, 42).len(), 8);
/// ```
pub trait Marginal {
    /// Probability density at `x`.
    fn pdf(&self, x: f64) -> f64;

    /// Cumulative distribution function at `x`.
    fn cdf(&self, x: f64) -> f64;

    /// Inverse cumulative distribution function for `u ∈ (0, 1)`.
    fn icdf(&self, u: f64) -> f64;

    /// Mean of the distribution.
    fn mean(&self) -> f64;

    /// Variance of the distribution.
    fn variance(&self) -> f64;

    /// Standard deviation of the distribution.
    fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Draw `n_sim` samples by inverse transform from seeded uniforms.
    ///
    /// The same seed always yields the same samples on a given platform.
    fn sample(&self, n_sim: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n_sim).map(|_| self.icdf(rng.gen::<f64>())).collect()
    }
}
