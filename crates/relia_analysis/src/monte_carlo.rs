//! Crude Monte Carlo simulation.

use relia_core::math::pf_to_beta;
use relia_core::ReliaError;
use relia_models::{JointDistribution, LimitState};

use crate::report::SimulationReport;
use crate::sampling::{SampleSet, Sampler};

/// Crude Monte Carlo: draw samples, evaluate g, count failures (g ≤ 0).
///
/// With an antithetic sampler the failure fraction is computed
/// independently on each half and the two estimators are averaged; the
/// standard error then comes from the per-pair averages, so the
/// antithetic variance reduction shows up in the reported error.
///
/// # Examples
///
/// ```
/// use nalgebra::DVector;
/// use relia_analysis::{MonteCarlo, Sampler};
/// use relia_core::Marginal;
/// use relia_models::marginals::Normal;
/// use relia_models::{JointDistribution, LimitState};
///
/// let marginals: Vec<Box<dyn Marginal>> = vec![
///     Box::new(Normal::new(10.0, 2.0).unwrap()),
///     Box::new(Normal::new(5.0, 1.0).unwrap()),
/// ];
/// let joint = JointDistribution::independent(marginals, 1).unwrap();
/// let ls = LimitState::new(|x: &DVector<f64>| x[0] - x[1] - 3.0);
///
/// let mut mc = MonteCarlo::new(&ls, &joint, Sampler::Random, 10_000, 42);
/// let report = mc.run().unwrap();
/// // p_f ≈ 0.1855
/// assert!((report.pf - 0.1855).abs() < 0.02);
/// ```
pub struct MonteCarlo<'a> {
    limit_state: &'a LimitState,
    joint: &'a JointDistribution,
    sampler: Sampler,
    n_sim: usize,
    seed: u64,
    report: Option<SimulationReport>,
}

impl<'a> MonteCarlo<'a> {
    /// Create a crude Monte Carlo analysis.
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
            n_sim,
            seed,
            report: None,
        }
    }

    /// Run the simulation and cache the report.
    ///
    /// # Errors
    ///
    /// Propagates sampler and limit-state evaluation errors (including
    /// [`ReliaError::NotImplemented`] for `n_tasks > 1`).
    pub fn run(&mut self) -> Result<&SimulationReport, ReliaError> {
        let samples = self.sampler.generate(self.joint, self.n_sim, self.seed)?;

        let report = match samples {
            SampleSet::Plain(x) => {
                let g = self.limit_state.run(&x)?;
                let m = g.len();
                let failures = g.iter().filter(|&&v| v <= 0.0).count();
                let pf = failures as f64 / m as f64;
                SimulationReport {
                    pf,
                    beta: pf_to_beta(pf),
                    std_error: (pf * (1.0 - pf) / m as f64).sqrt(),
                    n_sim: m,
                }
            }
            SampleSet::Paired { first, second } => {
                let g1 = self.limit_state.run(&first)?;
                let g2 = self.limit_state.run(&second)?;
                let m = g1.len();

                // Per-pair averaged indicators; the estimator is their mean.
                let indicator = |g: f64| if g <= 0.0 { 1.0 } else { 0.0 };
                let pairs: Vec<f64> = g1
                    .iter()
                    .zip(&g2)
                    .map(|(&a, &b)| 0.5 * (indicator(a) + indicator(b)))
                    .collect();
                let pf = pairs.iter().sum::<f64>() / m as f64;
                let variance = pairs
                    .iter()
                    .map(|v| (v - pf) * (v - pf))
                    .sum::<f64>()
                    / (m as f64 - 1.0).max(1.0);
                SimulationReport {
                    pf,
                    beta: pf_to_beta(pf),
                    std_error: (variance / m as f64).sqrt(),
                    n_sim: m,
                }
            }
        };

        self.report = Some(report);
        Ok(self.report.as_ref().unwrap())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::LhsMode;
    use approx::assert_abs_diff_eq;
    use nalgebra::DVector;
    use relia_core::Marginal;
    use relia_models::marginals::Normal;

    fn benchmark() -> (LimitState, JointDistribution) {
        let marginals: Vec<Box<dyn Marginal>> = vec![
            Box::new(Normal::new(10.0, 2.0).unwrap()),
            Box::new(Normal::new(5.0, 1.0).unwrap()),
        ];
        let joint = JointDistribution::independent(marginals, 1).unwrap();
        let ls = LimitState::new(|x: &DVector<f64>| x[0] - x[1] - 3.0);
        (ls, joint)
    }

    #[test]
    fn test_random_sampling_estimate() {
        let (ls, joint) = benchmark();
        let mut mc = MonteCarlo::new(&ls, &joint, Sampler::Random, 20_000, 42);
        let report = mc.run().unwrap();
        assert_abs_diff_eq!(report.pf, 0.18555, epsilon = 0.01);
        assert!(report.std_error > 0.0);
        assert_eq!(report.n_sim, 20_000);
    }

    #[test]
    fn test_lhs_sampling_estimate() {
        let (ls, joint) = benchmark();
        let mut mc = MonteCarlo::new(&ls, &joint, Sampler::Lhs(LhsMode::Random), 20_000, 42);
        let report = mc.run().unwrap();
        assert_abs_diff_eq!(report.pf, 0.18555, epsilon = 0.01);
    }

    #[test]
    fn test_antithetic_sampling_estimate() {
        let (ls, joint) = benchmark();
        let mut mc = MonteCarlo::new(&ls, &joint, Sampler::Antithetic, 10_000, 42);
        let report = mc.run().unwrap();
        assert_abs_diff_eq!(report.pf, 0.18555, epsilon = 0.01);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let (ls, joint) = benchmark();
        let a = MonteCarlo::new(&ls, &joint, Sampler::Random, 5_000, 9)
            .run()
            .unwrap()
            .pf;
        let b = MonteCarlo::new(&ls, &joint, Sampler::Random, 5_000, 9)
            .run()
            .unwrap()
            .pf;
        assert_eq!(a, b);
    }

    #[test]
    fn test_parallel_request_fails_fast() {
        let marginals: Vec<Box<dyn Marginal>> = vec![
            Box::new(Normal::new(10.0, 2.0).unwrap()),
            Box::new(Normal::new(5.0, 1.0).unwrap()),
        ];
        let joint = JointDistribution::independent(marginals, 1).unwrap();
        let ls = LimitState::new(|x: &DVector<f64>| x[0] - x[1] - 3.0).with_n_tasks(8);
        let mut mc = MonteCarlo::new(&ls, &joint, Sampler::Random, 100, 1);
        assert!(mc.run().unwrap_err().is_not_implemented());
    }
}
