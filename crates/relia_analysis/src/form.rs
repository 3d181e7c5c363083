//! First-order reliability method.

use nalgebra::DVector;
use relia_core::math::transform_xz;
use relia_core::ReliaError;
use relia_models::{JointDistribution, LimitState};
use relia_optimiser::{hlrf_step, ihlrf_step, SearchSettings, SpaceMap};

use crate::report::{design_point, DesignPoint, ReliabilityReport};
use crate::Optimisation;

/// FORM: the design-point search with per-iteration normal-equivalents.
///
/// Each outer iteration re-linearises the marginals at the current
/// physical point: the X ↔ Z Jacobians are rebuilt from the
/// normal-equivalents, composed with the joint's Y ↔ Z factors into
/// J_xy = J_xz · J_zy and J_yx = J_yz · J_zx, and ONE optimiser step is
/// taken before mapping back to X. Convergence requires both a small
/// gradient/iterate misalignment, e₁ = 1 − |d·y|/(‖d‖·‖y‖) < tol_1, and a
/// small residual |g| < tol_2.
///
/// # Examples
///
/// ```
/// use nalgebra::DVector;
/// use relia_analysis::Form;
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
/// let mut form = Form::new(&ls, &joint);
/// let report = form.run(&SearchSettings::default()).unwrap();
/// assert!((report.beta() - 0.8944).abs() < 1e-3);
/// ```
pub struct Form<'a> {
    limit_state: &'a LimitState,
    joint: &'a JointDistribution,
    optimisation: Optimisation,
    report: Option<ReliabilityReport>,
}

impl<'a> Form<'a> {
    /// Create a FORM analysis (HLRF by default).
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
        settings.validate()?;

        let n_components = self.limit_state.n_components(self.joint.mean());
        let mut components = Vec::with_capacity(n_components);
        for k in 0..n_components {
            let sys_id = if n_components == 1 { None } else { Some(k) };
            components.push(self.search_component(sys_id, settings)?);
        }

        self.report = Some(ReliabilityReport { components });
        Ok(self.report.as_ref().unwrap())
    }

    fn search_component(
        &self,
        sys_id: Option<usize>,
        settings: &SearchSettings,
    ) -> Result<DesignPoint, ReliaError> {
        let mut x = self.joint.mean().clone();

        // Residual threshold for the iHLRF merit weight, scaled by the
        // limit state at the starting point.
        let g0 = self.limit_state.component(&x, sys_id)?;
        let violation_tol = settings.tol * g0.abs();

        let mut y = DVector::zeros(self.joint.nrv());
        let mut dgdy = y.clone();
        let mut iterations = 0;
        let mut converged = false;

        while iterations < settings.max_iter {
            // Re-linearise the marginals at the current point and rebuild
            // the composed Jacobians; never cached across iterations.
            let transform = transform_xz(&x, self.joint.marginals())?;
            let jxy = &transform.jxz * self.joint.jzy();
            let jyx = self.joint.jyz() * &transform.jzx;
            let map = SpaceMap::new(jxy, transform.mean_eq.clone())?;

            y = jyx * (&x - &transform.mean_eq);

            let g = self.limit_state.component(&x, sys_id)?;
            let dgdx = self.limit_state.gradient(&x, sys_id)?;
            dgdy = map.grad_to_y(&dgdx);

            let next = match self.optimisation {
                Optimisation::Hlrf => hlrf_step(&y, g, &dgdy),
                Optimisation::Ihlrf => ihlrf_step(
                    self.limit_state,
                    &map,
                    sys_id,
                    &y,
                    g,
                    &dgdy,
                    violation_tol,
                    settings,
                )?,
            };

            x = map.x_of_y(&next);
            let g = self.limit_state.component(&x, sys_id)?;
            let dgdx = self.limit_state.gradient(&x, sys_id)?;
            dgdy = map.grad_to_y(&dgdx);
            y = next;
            iterations += 1;

            let norm_y = y.norm();
            let misalignment = if norm_y > 0.0 {
                1.0 - dgdy.dot(&y).abs() / (dgdy.norm() * norm_y)
            } else {
                f64::INFINITY
            };
            if misalignment < settings.tol_1 && g.abs() < settings.tol_2 {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                iterations,
                ?sys_id,
                "form outer loop exhausted its iteration budget"
            );
        }
        Ok(design_point(y, x, &dgdy, iterations, converged))
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
