//! HLRF and iHLRF design-point searches.

use nalgebra::DVector;
use relia_core::math::numerical_gradient;
use relia_core::ReliaError;
use relia_models::LimitState;

use crate::settings::SearchSettings;
use crate::space::SpaceMap;

/// Result of a design-point search.
///
/// Exhausting the iteration budget is reported through `converged`, never
/// by discarding the final iterate.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The final iterate in Y-space.
    pub y: DVector<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether a stopping test was met within the iteration budget.
    pub converged: bool,
}

/// One HLRF update: project the origin onto the linearised surface
/// d·(y′ − y) + g = 0, giving y′ = ((d·y − g)/‖d‖²) · d.
pub fn hlrf_step(y: &DVector<f64>, g: f64, dgdy: &DVector<f64>) -> DVector<f64> {
    let c = (dgdy.dot(y) - g) / dgdy.norm_squared();
    dgdy.scale(c)
}

/// One iHLRF update: the HLRF direction globalised by an Armijo
/// backtracking line search on the Zhang–Kiureghian merit function
/// m_c(y) = ½‖y‖² + c·|g(x(y))|.
///
/// `violation_tol` is the constraint-residual threshold deciding which
/// merit weight applies: when |g| ≥ violation_tol the weight is
/// γ·max(v₀, v₁), otherwise γ·v₀, with v₀ = ‖y‖/‖d‖ and
/// v₁ = ½‖y + d_k‖²/|g|. The merit gradient is taken by central finite
/// differences; the backtracking loop is bounded by
/// `settings.armijo_max_backtracks`.
pub fn ihlrf_step(
    limit_state: &LimitState,
    map: &SpaceMap,
    sys_id: Option<usize>,
    y: &DVector<f64>,
    g: f64,
    dgdy: &DVector<f64>,
    violation_tol: f64,
    settings: &SearchSettings,
) -> Result<DVector<f64>, ReliaError> {
    let c = (dgdy.dot(y) - g) / dgdy.norm_squared();
    let dk = dgdy.scale(c) - y;

    let v0 = y.norm() / dgdy.norm();
    let ck = if g.abs() >= violation_tol {
        let v1 = 0.5 * (y + &dk).norm_squared() / g.abs();
        settings.gamma * v0.max(v1)
    } else {
        settings.gamma * v0
    };

    let merit = |p: &DVector<f64>| {
        let x = map.x_of_y(p);
        let value = limit_state.value(&x);
        let gp = match sys_id {
            None => value.total(),
            Some(k) => value.component(k).unwrap_or(f64::NAN),
        };
        0.5 * p.norm_squared() + ck * gp.abs()
    };

    let merit_at_y = merit(y);
    let merit_gradient = numerical_gradient(y, &merit);
    let decrease_scale = -settings.a * merit_gradient.norm();

    let mut step = 1.0;
    for _ in 0..settings.armijo_max_backtracks {
        let candidate = y + dk.scale(step);
        if merit(&candidate) - merit_at_y <= decrease_scale * step {
            return Ok(candidate);
        }
        step *= settings.b;
    }

    tracing::warn!(
        backtracks = settings.armijo_max_backtracks,
        "armijo line search exhausted its backtracking cap"
    );
    Ok(y + dk.scale(step))
}

/// A design-point search over one limit-state surface.
///
/// Minimises ‖y‖ subject to g(x(y)) = 0, with x = map(y). For system
/// limit states, [`with_component`](Self::with_component) selects which
/// surface to search; analyses run one search per component.
///
/// # Examples
///
/// ```
/// use nalgebra::DVector;
/// use relia_models::LimitState;
/// use relia_optimiser::{DesignPointSearch, SearchSettings, SpaceMap};
///
/// // g(x) = x1 − x2 − 3 with X1 ~ N(10, 2²), X2 ~ N(5, 1²)
/// let ls = LimitState::new(|x: &DVector<f64>| x[0] - x[1] - 3.0);
/// let map = SpaceMap::standardised(
///     &DVector::from_vec(vec![10.0, 5.0]),
///     &DVector::from_vec(vec![2.0, 1.0]),
/// )
/// .unwrap();
///
/// let search = DesignPointSearch::new(&ls, map, SearchSettings::default()).unwrap();
/// let outcome = search.hlrf().unwrap();
///
/// assert!(outcome.converged);
/// // β = 2/√5
/// assert!((outcome.y.norm() - 0.8944).abs() < 1e-3);
/// ```
pub struct DesignPointSearch<'a> {
    limit_state: &'a LimitState,
    map: SpaceMap,
    sys_id: Option<usize>,
    settings: SearchSettings,
}

impl<'a> std::fmt::Debug for DesignPointSearch<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignPointSearch")
            .field("map", &self.map)
            .field("sys_id", &self.sys_id)
            .field("settings", &self.settings)
            .finish()
    }
}

impl<'a> DesignPointSearch<'a> {
    /// Create a search over the scalar (or total) limit state.
    ///
    /// # Errors
    ///
    /// [`ReliaError::InvalidParameter`] when the settings are out of
    /// domain.
    pub fn new(
        limit_state: &'a LimitState,
        map: SpaceMap,
        settings: SearchSettings,
    ) -> Result<Self, ReliaError> {
        settings.validate()?;
        Ok(Self {
            limit_state,
            map,
            sys_id: None,
            settings,
        })
    }

    /// Search component `sys_id` of a system limit state instead.
    pub fn with_component(mut self, sys_id: usize) -> Self {
        self.sys_id = Some(sys_id);
        self
    }

    /// The coordinate map in use.
    pub fn map(&self) -> &SpaceMap {
        &self.map
    }

    fn evaluate(&self, y: &DVector<f64>) -> Result<(f64, DVector<f64>), ReliaError> {
        let x = self.map.x_of_y(y);
        let g = self.limit_state.component(&x, self.sys_id)?;
        let dgdx = self.limit_state.gradient(&x, self.sys_id)?;
        let dgdy = self.map.grad_to_y(&dgdx);
        if !dgdy.norm_squared().is_normal() {
            return Err(ReliaError::non_convergence("design-point search", 0));
        }
        Ok((g, dgdy))
    }

    /// Run the HLRF fixed-point iteration from y = 0.
    ///
    /// Stops when ‖y − y_prev‖ < tol or after `max_iter` iterations; the
    /// latter flags `converged = false` and emits a warning.
    ///
    /// # Errors
    ///
    /// Propagates limit-state evaluation failures; a vanished gradient is
    /// reported as [`ReliaError::NonConvergence`].
    pub fn hlrf(&self) -> Result<SearchOutcome, ReliaError> {
        let mut y = DVector::zeros(self.map.dim());
        let mut error = f64::INFINITY;
        let mut iterations = 0;

        while error > self.settings.tol && iterations < self.settings.max_iter {
            let (g, dgdy) = self.evaluate(&y)?;
            let next = hlrf_step(&y, g, &dgdy);
            error = (&next - &y).norm();
            y = next;
            iterations += 1;
        }

        let converged = error <= self.settings.tol;
        if !converged {
            tracing::warn!(
                iterations,
                tol = self.settings.tol,
                "hlrf exhausted its iteration budget"
            );
        }
        Ok(SearchOutcome {
            y,
            iterations,
            converged,
        })
    }

    /// Run the iHLRF search from y = 1⃗.
    ///
    /// Stops when both e₁ = 1 − |d·y|/(‖d‖·‖y‖) < tol_1 and
    /// |g| < tol_2·|g(x(1⃗))| hold, when the step shrinks below tol, or
    /// after `max_iter` iterations (flagged, not raised).
    ///
    /// # Errors
    ///
    /// Propagates limit-state evaluation failures; a vanished gradient is
    /// reported as [`ReliaError::NonConvergence`].
    pub fn ihlrf(&self) -> Result<SearchOutcome, ReliaError> {
        let mut y = DVector::from_element(self.map.dim(), 1.0);

        // The residual tolerance scales with the limit state at the
        // initial iterate.
        let g0 = self
            .limit_state
            .component(&self.map.x_of_y(&y), self.sys_id)?;
        let residual_tol = self.settings.tol_2 * g0.abs();

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.settings.max_iter {
            let (g, dgdy) = self.evaluate(&y)?;

            let misalignment = 1.0 - dgdy.dot(&y).abs() / (dgdy.norm() * y.norm());
            if misalignment < self.settings.tol_1 && g.abs() < residual_tol {
                converged = true;
                break;
            }

            let next = ihlrf_step(
                self.limit_state,
                &self.map,
                self.sys_id,
                &y,
                g,
                &dgdy,
                residual_tol,
                &self.settings,
            )?;
            let error = (&next - &y).norm();
            y = next;
            iterations += 1;

            if error < self.settings.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                iterations,
                "ihlrf exhausted its iteration budget"
            );
        }
        Ok(SearchOutcome {
            y,
            iterations,
            converged,
        })
    }
}
