//! Sampling strategies over a joint distribution.
//!
//! All samplers share the Y → Z → U → X inversion pipeline: uncorrelated
//! standard normals are correlated through the joint's cached J_zy factor,
//! pushed to uniforms with Φ, and inverted through the marginal CDFs. The
//! strategies differ only in how the Y (or U) matrix is constructed.

use nalgebra::{DMatrix, DVector};
use relia_core::math::phi_cdf;
use relia_core::ReliaError;
use relia_models::JointDistribution;

use crate::draws::SampleDraws;

/// How the Latin Hypercube positions a sample inside its stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LhsMode {
    /// Uniformly at random within each stratum (default).
    #[default]
    Random,
    /// At the centre of each stratum.
    Center,
}

/// A sampling strategy.
///
/// # Examples
///
/// ```
/// use nalgebra::DMatrix;
/// use relia_analysis::{SampleSet, Sampler};
/// use relia_core::Marginal;
/// use relia_models::marginals::Normal;
/// use relia_models::JointDistribution;
///
/// let marginals: Vec<Box<dyn Marginal>> = vec![
///     Box::new(Normal::new(0.0, 1.0).unwrap()),
///     Box::new(Normal::new(0.0, 1.0).unwrap()),
/// ];
/// let joint = JointDistribution::independent(marginals, 1).unwrap();
///
/// match Sampler::Random.generate(&joint, 100, 42).unwrap() {
///     SampleSet::Plain(x) => assert_eq!((x.nrows(), x.ncols()), (100, 2)),
///     SampleSet::Paired { .. } => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampler {
    /// Simple random sampling: Y is an i.i.d. standard-normal draw.
    Random,
    /// Antithetic pairs: U and 1 − U drive two aligned streams.
    Antithetic,
    /// Latin Hypercube sampling with the given stratum mode.
    Lhs(LhsMode),
}

/// The output of a sampler: one matrix of samples, or an aligned pair.
#[derive(Debug, Clone)]
pub enum SampleSet {
    /// A single sample matrix, rows are samples.
    Plain(DMatrix<f64>),
    /// Two aligned matrices; row s of `second` is the antithetic partner
    /// of row s of `first`.
    Paired {
        /// The primary stream.
        first: DMatrix<f64>,
        /// The antithetic stream, row-aligned with `first`.
        second: DMatrix<f64>,
    },
}

impl SampleSet {
    /// Number of samples per stream.
    pub fn n_samples(&self) -> usize {
        match self {
            Self::Plain(x) => x.nrows(),
            Self::Paired { first, .. } => first.nrows(),
        }
    }

    /// Whether this is an antithetic pair.
    pub fn is_paired(&self) -> bool {
        matches!(self, Self::Paired { .. })
    }
}

impl Sampler {
    /// Draw `n_sim` samples (per stream) from the joint distribution.
    ///
    /// # Errors
    ///
    /// [`ReliaError::InvalidParameter`] when `n_sim` is zero.
    pub fn generate(
        &self,
        joint: &JointDistribution,
        n_sim: usize,
        seed: u64,
    ) -> Result<SampleSet, ReliaError> {
        if n_sim == 0 {
            return Err(ReliaError::invalid_parameter("n_sim", "must be >= 1"));
        }
        let n = joint.nrv();
        let mut draws = SampleDraws::from_seed(seed);
        match self {
            Self::Random => {
                let y = draws.random_y(n, n_sim);
                Ok(SampleSet::Plain(x_from_y_columns(joint, &y)))
            }
            Self::Antithetic => {
                let (y, y_anti) = draws.antithetic_y(n, n_sim);
                Ok(SampleSet::Paired {
                    first: x_from_y_columns(joint, &y),
                    second: x_from_y_columns(joint, &y_anti),
                })
            }
            Self::Lhs(mode) => {
                let y = draws.lhs_y(n, n_sim, *mode);
                Ok(SampleSet::Plain(x_from_y_columns(joint, &y)))
            }
        }
    }
}

/// Complete the Z → U → X tail of the pipeline for one sample.
fn x_from_z(joint: &JointDistribution, z: &DVector<f64>) -> DVector<f64> {
    DVector::from_fn(joint.nrv(), |j, _| {
        joint.marginals()[j].icdf(phi_cdf(z[j]))
    })
}

/// Push a Y-space sample matrix (one column per sample) through the
/// pipeline; rows of the result are samples.
fn x_from_y_columns(joint: &JointDistribution, y: &DMatrix<f64>) -> DMatrix<f64> {
    let z = joint.jzy() * y;
    let n = joint.nrv();
    let m = y.ncols();
    let mut x = DMatrix::zeros(m, n);
    for s in 0..m {
        let xs = x_from_z(joint, &z.column(s).into_owned());
        for j in 0..n {
            x[(s, j)] = xs[j];
        }
    }
    x
}
