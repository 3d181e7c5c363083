//! First-order second-moment analysis.

use relia_core::ReliaError;
use relia_models::{JointDistribution, LimitState};
use relia_optimiser::{DesignPointSearch, SearchSettings, SpaceMap};

use crate::report::{design_point, ReliabilityReport};
use crate::Optimisation;

/// FOSM: a full design-point search in the standardised space.
///
/// The coordinate map is the degenerate x = μ + σ ⊙ y — identity
/// normal-equivalents everywhere, correlation ignored. For each component
/// of the limit state one full HLRF or iHLRF search runs to completion.
///
/// # Examples
///
/// ```
/// use nalgebra::DVector;
/// use relia_analysis::Fosm;
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
/// let mut fosm = Fosm::new(&ls, &joint);
/// let report = fosm.run(&SearchSettings::default()).unwrap();
/// // β = 2/√5 ≈ 0.8944
/// assert!((report.beta() - 0.8944).abs() < 1e-3);
/// ```
pub struct Fosm<'a> {
    limit_state: &'a LimitState,
    joint: &'a JointDistribution,
    optimisation: Optimisation,
    report: Option<ReliabilityReport>,
}

impl<'a> Fosm<'a> {
    /// Create a FOSM analysis (HLRF by default).
    pub fn new(limit_state: &'a LimitState, joint: &'a JointDistribution) -> Self {
        Self {
            limit_state,
            joint,
            optimisation: Optimisation::default(),
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
    /// Propagates settings validation and limit-state evaluation errors.
    pub fn run(&mut self, settings: &SearchSettings) -> Result<&ReliabilityReport, ReliaError> {
        let mean = self.joint.mean();
        let std = self.joint.std();
        let n_components = self.limit_state.n_components(mean);

        let mut components = Vec::with_capacity(n_components);
        for k in 0..n_components {
            let sys_id = if n_components == 1 { None } else { Some(k) };

            let map = SpaceMap::standardised(mean, std)?;
            let mut search =
                DesignPointSearch::new(self.limit_state, map, settings.clone())?;
            if let Some(k) = sys_id {
                search = search.with_component(k);
            }
            let outcome = match self.optimisation {
                Optimisation::Hlrf => search.hlrf()?,
                Optimisation::Ihlrf => search.ihlrf()?,
            };

            let x = search.map().x_of_y(&outcome.y);
            let dgdx = self.limit_state.gradient(&x, sys_id)?;
            let dgdy = search.map().grad_to_y(&dgdx);

            components.push(design_point(
                outcome.y,
                x,
                &dgdy,
                outcome.iterations,
                outcome.converged,
            ));
        }

        self.report = Some(ReliabilityReport { components });
        Ok(self.report.as_ref().unwrap())
    }

    /// The cached report, when `run` has completed.
    pub fn report(&self) -> Option<&ReliabilityReport> {
        self.report.as_ref()
    }

    /// β of the first component, when available.
    pub fn beta(&self) -> Option<f64> {
        self.report.as_ref().map(|r| r.beta())
    }

    /// p_f of the first component, when available.
    pub fn pf(&self) -> Option<f64> {
        self.report.as_ref().map(|r| r.pf())
    }
}
