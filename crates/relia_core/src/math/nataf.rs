//! Nataf model for correlation-matrix transformation.
//!
//! Maps a correlation matrix in the physical space X to an equivalent
//! correlation matrix in standard-normal space Z. Each off-diagonal entry
//! is adjusted independently by a secant-style fixed point on the squared
//! mismatch between the prescribed correlation and the product moment of a
//! bivariate standard normal, the moment being evaluated by 2-D
//! Gauss–Legendre quadrature.

use crate::math::quadrature::GaussLegendre;
use crate::types::ReliaError;
use nalgebra::DMatrix;

/// Finite-difference step for the secant update on the mismatch function.
const SECANT_STEP: f64 = 1e-9;

/// Settings for the Nataf correlation solve.
///
/// The defaults reproduce the conventional solve: at most 5 outer
/// iterations per entry, mismatch tolerance 1e-10, and a clamp that keeps
/// the adjusted correlation strictly inside (−1, 1) so the bivariate
/// density stays non-degenerate.
///
/// # Examples
///
/// ```
/// use relia_core::math::NatafSettings;
///
/// let settings = NatafSettings::default();
/// assert_eq!(settings.max_iter, 5);
/// assert!(settings.clamp.0 < 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct NatafSettings {
    /// Maximum number of secant iterations per matrix entry.
    pub max_iter: usize,
    /// Tolerance on the squared correlation mismatch.
    pub tol: f64,
    /// Interval the adjusted correlation is clamped to after each step.
    pub clamp: (f64, f64),
    /// Order of the tensor Gauss–Legendre rule.
    pub quadrature_order: usize,
    /// Half-width of the integration square (in standard deviations).
    pub integration_bound: f64,
}

impl Default for NatafSettings {
    fn default() -> Self {
        Self {
            max_iter: 5,
            tol: 1e-10,
            clamp: (-1.0 + 1e-6, 1.0 - 1e-6),
            quadrature_order: 48,
            integration_bound: 8.5,
        }
    }
}

impl NatafSettings {
    /// Settings with the historical clamp to [0, 1].
    ///
    /// Kept for comparisons with older results; it cannot adjust negative
    /// correlations once an iteration step is taken.
    pub fn legacy_clamp() -> Self {
        Self {
            clamp: (0.0, 1.0),
            ..Self::default()
        }
    }

    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// [`ReliaError::InvalidParameter`] when an entry is outside its domain.
    pub fn validate(&self) -> Result<(), ReliaError> {
        if self.max_iter < 1 {
            return Err(ReliaError::invalid_parameter("max_iter", "must be >= 1"));
        }
        if self.tol < 0.0 {
            return Err(ReliaError::invalid_parameter("tol", "must be >= 0"));
        }
        if self.clamp.0 >= self.clamp.1 {
            return Err(ReliaError::invalid_parameter(
                "clamp",
                "lower bound must be below upper bound",
            ));
        }
        if self.quadrature_order < 2 {
            return Err(ReliaError::invalid_parameter(
                "quadrature_order",
                "must be >= 2",
            ));
        }
        if self.integration_bound <= 0.0 {
            return Err(ReliaError::invalid_parameter(
                "integration_bound",
                "must be > 0",
            ));
        }
        Ok(())
    }
}

/// Bivariate standard-normal density with correlation `rho`.
fn binormal_pdf(x: f64, y: f64, rho: f64) -> f64 {
    let s = 1.0 - rho * rho;
    let norm = 1.0 / (2.0 * std::f64::consts::PI * s.sqrt());
    norm * (-(x * x - 2.0 * rho * x * y + y * y) / (2.0 * s)).exp()
}

/// E[XY] for a bivariate standard normal with correlation `rho`.
fn product_moment(rho: f64, rule: &GaussLegendre, bound: f64) -> f64 {
    rule.integrate_2d(-bound, bound, |x, y| x * y * binormal_pdf(x, y, rho))
}

/// Transform a correlation matrix from X to Z with the Nataf model.
///
/// For each off-diagonal entry the solve starts at the prescribed
/// correlation ρ_x and iterates
/// ρ ← ρ − (G(ρ + h) − G(ρ))/h with G(ρ) = |E[XY | ρ] − ρ_x|²,
/// clamping after every step, until G drops below `settings.tol` or
/// `settings.max_iter` iterations are spent. The result is symmetric with
/// unit diagonal.
///
/// # Errors
///
/// - [`ReliaError::ShapeMismatch`] when `cx` is not square
/// - [`ReliaError::InvalidParameter`] when the settings are out of domain
///
/// # Examples
///
/// ```
/// use nalgebra::DMatrix;
/// use relia_core::math::{nataf, NatafSettings};
///
/// let cx = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]);
/// let cz = nataf(&cx, &NatafSettings::default()).unwrap();
/// assert!((cz[(0, 1)] - 0.5).abs() < 1e-8);
/// ```
pub fn nataf(cx: &DMatrix<f64>, settings: &NatafSettings) -> Result<DMatrix<f64>, ReliaError> {
    settings.validate()?;
    let n = cx.nrows();
    if cx.ncols() != n {
        return Err(ReliaError::shape_mismatch("nataf", n, cx.ncols()));
    }

    let rule = GaussLegendre::new(settings.quadrature_order)?;
    let bound = settings.integration_bound;
    let (lo, hi) = settings.clamp;

    let mut cz = DMatrix::identity(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let target = cx[(i, j)];
            let mismatch =
                |rho: f64| (product_moment(rho, &rule, bound) - target).abs().powi(2);

            let mut rho = target;
            for _ in 0..settings.max_iter {
                let err0 = mismatch(rho);
                if err0 < settings.tol {
                    break;
                }
                let err1 = mismatch(rho + SECANT_STEP);
                rho -= (err1 - err0) / SECANT_STEP;
                rho = rho.clamp(lo, hi);
            }

            cz[(i, j)] = rho;
            cz[(j, i)] = rho;
        }
    }

    Ok(cz)
}
