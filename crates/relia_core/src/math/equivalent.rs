//! Per-point normal-equivalents and the diagonal X ↔ Z Jacobians.
//!
//! FORM linearises non-normal marginals locally: at a point x the marginal
//! is replaced by the Gaussian whose CDF and PDF match the marginal's
//! there. The matched means and standard deviations give the diagonal
//! Jacobians of the X ↔ Z change of variables.

use crate::traits::Marginal;
use crate::types::ReliaError;
use nalgebra::{DMatrix, DVector};

use super::normal::{phi_icdf, phi_pdf};

/// The Gaussian matching a marginal's CDF and PDF at a point.
#[derive(Debug, Clone, Copy)]
pub struct NormalEquivalent {
    /// Equivalent mean μ_eq.
    pub mean: f64,
    /// Equivalent standard deviation σ_eq.
    pub std: f64,
}

/// Normal-equivalent of `marginal` at `x`.
///
/// With q = F(x) and z = Φ⁻¹(q): σ_eq = φ(z)/f(x) and μ_eq = x − z·σ_eq.
/// σ_eq is positive whenever f(x) > 0; outside the support the result is
/// unusable (NaN propagates), which callers avoid by keeping iterates
/// interior.
///
/// # Examples
///
/// ```
/// use relia_core::math::normal_equivalent;
/// use relia_core::Marginal;
///
/// struct Std;
/// impl Marginal for Std {
///     fn pdf(&self, x: f64) -> f64 { relia_core::math::phi_pdf(x) }
///     fn cdf(&self, x: f64) -> f64 { relia_core::math::phi_cdf(x) }
///     fn icdf(&self, u: f64) -> f64 { relia_core::math::phi_icdf(u) }
///     fn mean(&self) -> f64 { 0.0 }
///     fn variance(&self) -> f64 { 1.0 }
/// }
///
/// // A normal marginal is its own equivalent everywhere.
/// let eq = normal_equivalent(1.3, &Std);
/// assert!((eq.mean - 0.0).abs() < 1e-9);
/// assert!((eq.std - 1.0).abs() < 1e-9);
/// ```
pub fn normal_equivalent(x: f64, marginal: &dyn Marginal) -> NormalEquivalent {
    let q = marginal.cdf(x);
    let z = phi_icdf(q);
    let std = phi_pdf(z) / marginal.pdf(x);
    let mean = x - z * std;
    NormalEquivalent { mean, std }
}

/// The diagonal Jacobians of the X ↔ Z change of variables at a point.
///
/// `jxz` maps Z-displacements to X-displacements (dx/dz = diag(σ_eq));
/// `jzx` is its inverse (dz/dx = diag(1/σ_eq)). FORM composes them with
/// the Y ↔ Z factors: J_xy = J_xz · J_zy and J_yx = J_yz · J_zx.
#[derive(Debug, Clone)]
pub struct XzTransform {
    /// Jacobian from Z to X, diag(σ_eq).
    pub jxz: DMatrix<f64>,
    /// Jacobian from X to Z, diag(1/σ_eq).
    pub jzx: DMatrix<f64>,
    /// Equivalent means, one per marginal.
    pub mean_eq: DVector<f64>,
    /// Equivalent standard deviations, one per marginal.
    pub std_eq: DVector<f64>,
}

/// Compute the X ↔ Z transform at the point `x`.
///
/// # Errors
///
/// [`ReliaError::ShapeMismatch`] when `x` and `marginals` disagree in
/// length.
pub fn transform_xz(
    x: &DVector<f64>,
    marginals: &[Box<dyn Marginal>],
) -> Result<XzTransform, ReliaError> {
    let n = marginals.len();
    if x.len() != n {
        return Err(ReliaError::shape_mismatch("transform_xz", n, x.len()));
    }

    let mut mean_eq = DVector::zeros(n);
    let mut std_eq = DVector::zeros(n);
    for i in 0..n {
        let eq = normal_equivalent(x[i], marginals[i].as_ref());
        mean_eq[i] = eq.mean;
        std_eq[i] = eq.std;
    }

    let jxz = DMatrix::from_diagonal(&std_eq);
    let jzx = DMatrix::from_diagonal(&std_eq.map(|s| 1.0 / s));

    Ok(XzTransform {
        jxz,
        jzx,
        mean_eq,
        std_eq,
    })
}
