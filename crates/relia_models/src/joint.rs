//! The joint probability model.
//!
//! A [`JointDistribution`] owns an ordered set of marginals and their
//! X-space correlation matrix. Construction validates the inputs, caches
//! the moment vectors, resolves the Z-space correlation (either the
//! approximation C_z = C_x or the Nataf solve, exactly once) and
//! factorises it for the Y ↔ Z coordinate change. The object is immutable
//! afterwards.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use relia_core::math::{
    cholesky, nataf, phi_cdf, phi_pdf, phi_pdf_multivariate, spectral, transform_xz,
    CorrelationFactors, NatafSettings,
};
use relia_core::{Marginal, ReliaError};

/// How the Z-space correlation matrix is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationMode {
    /// Use the X-space correlation unchanged, C_z = C_x.
    Approx,
    /// Solve the Nataf model for C_z.
    Nataf,
}

/// Factorisation used for the Y ↔ Z coordinate change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decomposition {
    /// Eigendecomposition of C_z (default).
    #[default]
    Spectral,
    /// Cholesky factorisation of C_z.
    Cholesky,
}

/// An immutable joint distribution over n random variables.
///
/// # Examples
///
/// ```
/// use nalgebra::DMatrix;
/// use relia_models::marginals::Normal;
/// use relia_models::{CorrelationMode, Decomposition, JointDistribution};
/// use relia_core::Marginal;
///
/// let marginals: Vec<Box<dyn Marginal>> = vec![
///     Box::new(Normal::new(10.0, 2.0).unwrap()),
///     Box::new(Normal::new(5.0, 1.0).unwrap()),
/// ];
/// let joint = JointDistribution::new(
///     marginals,
///     DMatrix::identity(2, 2),
///     CorrelationMode::Approx,
///     Decomposition::Spectral,
///     42,
/// )
/// .unwrap();
///
/// assert_eq!(joint.nrv(), 2);
/// let x = joint.sample_x(100).unwrap();
/// assert_eq!((x.nrows(), x.ncols()), (100, 2));
/// ```
pub struct JointDistribution {
    marginals: Vec<Box<dyn Marginal>>,
    correlation: DMatrix<f64>,
    mode: CorrelationMode,
    decomposition: Decomposition,
    seed: u64,
    mean: DVector<f64>,
    std: DVector<f64>,
    cz: DMatrix<f64>,
    factors: CorrelationFactors,
}

impl std::fmt::Debug for JointDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JointDistribution")
            .field("nrv", &self.marginals.len())
            .field("correlation", &self.correlation)
            .field("mode", &self.mode)
            .field("decomposition", &self.decomposition)
            .field("seed", &self.seed)
            .field("mean", &self.mean)
            .field("std", &self.std)
            .finish()
    }
}

impl JointDistribution {
    /// Build a joint distribution.
    ///
    /// The Nataf solve (when requested) and the correlation factorisation
    /// both happen here, exactly once.
    ///
    /// # Errors
    ///
    /// - [`ReliaError::TypeContract`] when the marginal list is empty or a
    ///   marginal has non-finite moments
    /// - [`ReliaError::ShapeMismatch`] when the correlation matrix is not
    ///   n × n
    /// - [`ReliaError::InvalidParameter`] when the correlation matrix is
    ///   not symmetric with unit diagonal and entries in [−1, 1], or is
    ///   not positive definite
    pub fn new(
        marginals: Vec<Box<dyn Marginal>>,
        correlation: DMatrix<f64>,
        mode: CorrelationMode,
        decomposition: Decomposition,
        seed: u64,
    ) -> Result<Self, ReliaError> {
        if marginals.is_empty() {
            return Err(ReliaError::type_contract(
                "the marginal list must not be empty",
            ));
        }
        let n = marginals.len();
        if correlation.nrows() != n || correlation.ncols() != n {
            return Err(ReliaError::shape_mismatch(
                "joint correlation",
                n,
                correlation.nrows(),
            ));
        }
        validate_correlation(&correlation)?;

        let mut mean = DVector::zeros(n);
        let mut std = DVector::zeros(n);
        for (i, marginal) in marginals.iter().enumerate() {
            mean[i] = marginal.mean();
            std[i] = marginal.std();
            if !mean[i].is_finite() || !std[i].is_finite() {
                return Err(ReliaError::type_contract(format!(
                    "marginal {} has non-finite moments",
                    i
                )));
            }
        }

        let cz = match mode {
            CorrelationMode::Approx => correlation.clone(),
            CorrelationMode::Nataf => nataf(&correlation, &NatafSettings::default())?,
        };

        let factors = match decomposition {
            Decomposition::Spectral => spectral(&cz)?,
            Decomposition::Cholesky => cholesky(&cz)?,
        };

        Ok(Self {
            marginals,
            correlation,
            mode,
            decomposition,
            seed,
            mean,
            std,
            cz,
            factors,
        })
    }

    /// Build a joint distribution with independent marginals.
    pub fn independent(
        marginals: Vec<Box<dyn Marginal>>,
        seed: u64,
    ) -> Result<Self, ReliaError> {
        let n = marginals.len();
        Self::new(
            marginals,
            DMatrix::identity(n, n),
            CorrelationMode::Approx,
            Decomposition::Spectral,
            seed,
        )
    }

    /// Number of random variables.
    pub fn nrv(&self) -> usize {
        self.marginals.len()
    }

    /// The marginal distributions, in order.
    pub fn marginals(&self) -> &[Box<dyn Marginal>] {
        &self.marginals
    }

    /// Marginal means μ.
    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    /// Marginal standard deviations σ.
    pub fn std(&self) -> &DVector<f64> {
        &self.std
    }

    /// The X-space correlation matrix C_x.
    pub fn correlation(&self) -> &DMatrix<f64> {
        &self.correlation
    }

    /// The Z-space correlation matrix C_z.
    pub fn cz(&self) -> &DMatrix<f64> {
        &self.cz
    }

    /// Jacobian from Z to Y (y = J_yz · z).
    pub fn jyz(&self) -> &DMatrix<f64> {
        &self.factors.jyz
    }

    /// Jacobian from Y to Z (z = J_zy · y).
    pub fn jzy(&self) -> &DMatrix<f64> {
        &self.factors.jzy
    }

    /// How C_z was obtained.
    pub fn mode(&self) -> CorrelationMode {
        self.mode
    }

    /// Which factorisation backs the Y ↔ Z change.
    pub fn decomposition(&self) -> Decomposition {
        self.decomposition
    }

    /// The seed used by [`sample_x`](Self::sample_x).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw `n_sim` samples in physical space; rows are samples.
    ///
    /// The pipeline is Y → Z → U → X: i.i.d. standard normals, correlation
    /// through J_zy, Φ to uniforms, marginal inverse CDFs to X. The draw
    /// restarts from the construction seed, so repeated calls return the
    /// same matrix.
    ///
    /// # Errors
    ///
    /// [`ReliaError::InvalidParameter`] when `n_sim` is zero.
    pub fn sample_x(&self, n_sim: usize) -> Result<DMatrix<f64>, ReliaError> {
        self.sample_x_seeded(n_sim, self.seed)
    }

    /// Like [`sample_x`](Self::sample_x) with an explicit seed.
    pub fn sample_x_seeded(&self, n_sim: usize, seed: u64) -> Result<DMatrix<f64>, ReliaError> {
        if n_sim == 0 {
            return Err(ReliaError::invalid_parameter("n_sim", "must be >= 1"));
        }
        let n = self.nrv();

        let mut rng = StdRng::seed_from_u64(seed);
        let mut y = DMatrix::zeros(n, n_sim);
        for s in 0..n_sim {
            for i in 0..n {
                y[(i, s)] = StandardNormal.sample(&mut rng);
            }
        }
        let z = &self.factors.jzy * y;

        let mut x = DMatrix::zeros(n_sim, n);
        for s in 0..n_sim {
            for j in 0..n {
                let u = phi_cdf(z[(j, s)]);
                x[(s, j)] = self.marginals[j].icdf(u);
            }
        }
        Ok(x)
    }

    /// Joint probability density at `x`.
    ///
    /// Uses the per-point normal-equivalents: with z = J_zx (x − μ_eq),
    /// f(x) = φ_n(z; C_z) · Π f_i(x_i) / Π φ(z_i). For independent inputs
    /// this reduces to the product of the marginal densities.
    ///
    /// # Errors
    ///
    /// [`ReliaError::ShapeMismatch`] when `x` has the wrong length.
    pub fn joint_pdf(&self, x: &DVector<f64>) -> Result<f64, ReliaError> {
        let n = self.nrv();
        if x.len() != n {
            return Err(ReliaError::shape_mismatch("joint_pdf", n, x.len()));
        }

        let transform = transform_xz(x, &self.marginals)?;
        let z = &transform.jzx * (x - &transform.mean_eq);

        let mut marginal_product = 1.0;
        let mut normal_product = 1.0;
        for i in 0..n {
            let fx = self.marginals[i].pdf(x[i]);
            if fx == 0.0 {
                return Ok(0.0);
            }
            let fz = phi_pdf(z[i]);
            if fz == 0.0 {
                return Ok(0.0);
            }
            marginal_product *= fx;
            normal_product *= fz;
        }

        let joint_normal = phi_pdf_multivariate(&z, &self.cz)?;
        Ok(joint_normal * marginal_product / normal_product)
    }
}

fn validate_correlation(c: &DMatrix<f64>) -> Result<(), ReliaError> {
    let n = c.nrows();
    for i in 0..n {
        if (c[(i, i)] - 1.0).abs() > 1e-12 {
            return Err(ReliaError::invalid_parameter(
                "correlation",
                format!("diagonal entry ({i}, {i}) must be 1"),
            ));
        }
        for j in (i + 1)..n {
            if (c[(i, j)] - c[(j, i)]).abs() > 1e-12 {
                return Err(ReliaError::invalid_parameter(
                    "correlation",
                    format!("entries ({i}, {j}) and ({j}, {i}) are not symmetric"),
                ));
            }
            if c[(i, j)].abs() > 1.0 {
                return Err(ReliaError::invalid_parameter(
                    "correlation",
                    format!("entry ({i}, {j}) is outside [-1, 1]"),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marginals::{Exponential, Normal, Uniform};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn two_normals() -> Vec<Box<dyn Marginal>> {
        vec![
            Box::new(Normal::new(10.0, 2.0).unwrap()),
            Box::new(Normal::new(5.0, 1.0).unwrap()),
        ]
    }

    #[test]
    fn test_moments_cached_from_marginals() {
        let joint = JointDistribution::independent(two_normals(), 1).unwrap();
        assert_relative_eq!(joint.mean()[0], 10.0);
        assert_relative_eq!(joint.mean()[1], 5.0);
        assert_relative_eq!(joint.std()[0], 2.0);
        assert_relative_eq!(joint.std()[1], 1.0);
    }

    #[test]
    fn test_empty_marginals_rejected() {
        let err = JointDistribution::independent(vec![], 1).unwrap_err();
        assert!(err.is_type_contract());
    }

    #[test]
    fn test_wrong_correlation_shape_rejected() {
        let err = JointDistribution::new(
            two_normals(),
            DMatrix::identity(3, 3),
            CorrelationMode::Approx,
            Decomposition::Spectral,
            1,
        )
        .unwrap_err();
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn test_asymmetric_correlation_rejected() {
        let c = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.2, 1.0]);
        let err = JointDistribution::new(
            two_normals(),
            c,
            CorrelationMode::Approx,
            Decomposition::Spectral,
            1,
        )
        .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_out_of_range_entry_rejected() {
        let c = DMatrix::from_row_slice(2, 2, &[1.0, 1.2, 1.2, 1.0]);
        let err = JointDistribution::new(
            two_normals(),
            c,
            CorrelationMode::Approx,
            Decomposition::Spectral,
            1,
        )
        .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_independent_pdf_is_product_of_marginals() {
        let marginals: Vec<Box<dyn Marginal>> = vec![
            Box::new(Normal::standard()),
            Box::new(Normal::standard()),
        ];
        let joint = JointDistribution::independent(marginals, 1).unwrap();
        for &(a, b) in &[(0.0, 0.0), (0.5, -1.0), (1.7, 2.3), (-2.0, 0.4)] {
            let x = DVector::from_vec(vec![a, b]);
            let expected = phi_pdf(a) * phi_pdf(b);
            assert_abs_diff_eq!(joint.joint_pdf(&x).unwrap(), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_independent_pdf_product_for_mixed_marginals() {
        let marginals: Vec<Box<dyn Marginal>> = vec![
            Box::new(Exponential::new(1.5).unwrap()),
            Box::new(Uniform::new(0.0, 2.0).unwrap()),
        ];
        let joint = JointDistribution::independent(marginals, 1).unwrap();
        let x = DVector::from_vec(vec![0.7, 1.2]);
        let expected = 1.5 * (-1.5_f64 * 0.7).exp() * 0.5;
        assert_relative_eq!(joint.joint_pdf(&x).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_nataf_mode_matches_approx_for_normal_marginals() {
        let c = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]);
        let approx_joint = JointDistribution::new(
            two_normals(),
            c.clone(),
            CorrelationMode::Approx,
            Decomposition::Spectral,
            1,
        )
        .unwrap();
        let nataf_joint = JointDistribution::new(
            two_normals(),
            c,
            CorrelationMode::Nataf,
            Decomposition::Spectral,
            1,
        )
        .unwrap();
        assert_relative_eq!(
            (approx_joint.cz() - nataf_joint.cz()).norm(),
            0.0,
            epsilon = 1e-8
        );
    }

    #[test]
    fn test_sampling_is_reproducible_and_shaped() {
        let joint = JointDistribution::independent(two_normals(), 42).unwrap();
        let a = joint.sample_x(50).unwrap();
        let b = joint.sample_x(50).unwrap();
        assert_eq!((a.nrows(), a.ncols()), (50, 2));
        assert_relative_eq!((a.clone() - b).norm(), 0.0);
        let c = joint.sample_x_seeded(50, 43).unwrap();
        assert!((a - c).norm() > 0.0);
    }

    #[test]
    fn test_sampled_correlation_tracks_target() {
        let c = DMatrix::from_row_slice(2, 2, &[1.0, 0.8, 0.8, 1.0]);
        let joint = JointDistribution::new(
            two_normals(),
            c,
            CorrelationMode::Nataf,
            Decomposition::Cholesky,
            7,
        )
        .unwrap();
        let x = joint.sample_x(20_000).unwrap();

        let m = x.nrows() as f64;
        let mean0 = x.column(0).sum() / m;
        let mean1 = x.column(1).sum() / m;
        let mut cov = 0.0;
        let mut var0 = 0.0;
        let mut var1 = 0.0;
        for s in 0..x.nrows() {
            let d0 = x[(s, 0)] - mean0;
            let d1 = x[(s, 1)] - mean1;
            cov += d0 * d1;
            var0 += d0 * d0;
            var1 += d1 * d1;
        }
        let rho = cov / (var0.sqrt() * var1.sqrt());
        assert_abs_diff_eq!(rho, 0.8, epsilon = 0.02);
    }

    #[test]
    fn test_zero_samples_rejected() {
        let joint = JointDistribution::independent(two_normals(), 1).unwrap();
        assert!(joint.sample_x(0).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_joint_pdf_wrong_length_rejected() {
        let joint = JointDistribution::independent(two_normals(), 1).unwrap();
        let x = DVector::from_vec(vec![1.0]);
        assert!(joint.joint_pdf(&x).unwrap_err().is_shape_mismatch());
    }
}
