//! Importance sampling centred at the design point.

use nalgebra::{DMatrix, DVector};
use relia_core::math::pf_to_beta;
use relia_core::ReliaError;
use relia_models::{JointDistribution, LimitState};
use relia_optimiser::SearchSettings;

use crate::form::Form;
use crate::report::SimulationReport;
use crate::sampling::{SampleSet, Sampler};
use crate::Optimisation;

/// Importance sampling with the proposal re-centred at the FORM design
/// point.
///
/// The design point x* is located first; every raw sample is then shifted
/// by (x* − μ) and weighted by w = f(x_shifted)/h, where f is the joint
/// density and h the proposal density — the joint density evaluated at
/// the unshifted sample. The estimator is the mean of w·1[g ≤ 0]; for
/// antithetic streams the two half-estimators are averaged.
///
/// # Examples
///
/// ```
/// use nalgebra::DVector;
/// use relia_analysis::{Importance, Sampler};
/// use relia_core::Marginal;
/// use relia_models::marginals::Normal;
/// use relia_models::{JointDistribution, LimitState};
/// use relia_optimiser::SearchSettings;
///
/// let marginals: Vec<Box<dyn Marginal>> = vec![
///     Box::new(Normal::new(10.0, 2.0).unwrap()),
///     Box::new(Normal::new(5.0, 1.0).unwrap()),
/// ];
/// let joint = JointDistribution::independent(marginals, 1).unwrap();
/// let ls = LimitState::new(|x: &DVector<f64>| x[0] - x[1] - 3.0);
///
/// let mut is = Importance::new(&ls, &joint, Sampler::Random, 2_000, 42);
/// let report = is.run(&SearchSettings::default()).unwrap();
/// assert!((report.pf - 0.1855).abs() < 0.03);
/// ```
pub struct Importance<'a> {
    limit_state: &'a LimitState,
    joint: &'a JointDistribution,
    sampler: Sampler,
    optimisation: Optimisation,
    n_sim: usize,
    seed: u64,
    report: Option<SimulationReport>,
}

impl<'a> Importance<'a> {
    /// Create an importance-sampling analysis (HLRF design-point search
    /// by default).
    pub fn new(
        limit_state: &'a LimitState,
        joint: &'a JointDistribution,
        sampler: Sampler,
        n_sim: usize,
        seed: u64,
    ) -> Self {
        Self {
            limit_state,
            joint,
            sampler,
            optimisation: Optimisation::default(),
            n_sim,
            seed,
            report: None,
        }
    }

    /// Select the design-point algorithm.
    pub fn with_optimisation(mut self, optimisation: Optimisation) -> Self {
        self.optimisation = optimisation;
        self
    }

    /// Run the analysis and cache the report.
    ///
    /// # Errors
    ///
    /// - [`ReliaError::NotImplemented`] for system limit states
    /// - otherwise propagates design-point, sampler and limit-state errors
    pub fn run(&mut self, settings: &SearchSettings) -> Result<&SimulationReport, ReliaError> {
        if self.limit_state.n_components(self.joint.mean()) > 1 {
            return Err(ReliaError::not_implemented(
                "importance sampling for system limit states",
            ));
        }

        // Centre the proposal at the design point in physical space.
        let mut form = Form::new(self.limit_state, self.joint)
            .with_optimisation(self.optimisation);
        let design = form.run(settings)?.components[0].clone();
        let shift = &design.x - self.joint.mean();

        let samples = self.sampler.generate(self.joint, self.n_sim, self.seed)?;
        let report = match samples {
            SampleSet::Plain(x) => {
                let (pf, std_error) = self.estimate(&x, &shift)?;
                SimulationReport {
                    pf,
                    beta: pf_to_beta(pf),
                    std_error,
                    n_sim: self.n_sim,
                }
            }
            SampleSet::Paired { first, second } => {
                let (pf_1, se_1) = self.estimate(&first, &shift)?;
                let (pf_2, se_2) = self.estimate(&second, &shift)?;
                let pf = 0.5 * (pf_1 + pf_2);
                SimulationReport {
                    pf,
                    beta: pf_to_beta(pf),
                    std_error: 0.5 * (se_1 * se_1 + se_2 * se_2).sqrt(),
                    n_sim: self.n_sim,
                }
            }
        };

        self.report = Some(report);
        Ok(self.report.as_ref().unwrap())
    }

    /// Weighted failure estimate over one raw sample matrix.
    fn estimate(
        &self,
        x_original: &DMatrix<f64>,
        shift: &DVector<f64>,
    ) -> Result<(f64, f64), ReliaError> {
        let m = x_original.nrows();
        let n = x_original.ncols();

        let mut x_shifted = x_original.clone();
        for s in 0..m {
            for j in 0..n {
                x_shifted[(s, j)] += shift[j];
            }
        }

        let g = self.limit_state.run(&x_shifted)?;

        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for s in 0..m {
            if g[s] <= 0.0 {
                let target = self.joint.joint_pdf(&x_shifted.row(s).transpose())?;
                let proposal = self.joint.joint_pdf(&x_original.row(s).transpose())?;
                let w = target / proposal;
                sum += w;
                sum_sq += w * w;
            }
        }

        let pf = sum / m as f64;
        let variance = ((sum_sq - m as f64 * pf * pf) / (m as f64 - 1.0).max(1.0)).max(0.0);
        Ok((pf, (variance / m as f64).sqrt()))
    }

    /// The cached report, when `run` has completed.
    pub fn report(&self) -> Option<&SimulationReport> {
        self.report.as_ref()
    }

    /// Estimated p_f, when available.
    pub fn pf(&self) -> Option<f64> {
        self.report.as_ref().map(|r| r.pf)
    }

    /// Reliability index −Φ⁻¹(p_f), when available.
    pub fn beta(&self) -> Option<f64> {
        self.report.as_ref().map(|r| r.beta)
    }
}
