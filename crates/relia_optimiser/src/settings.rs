//! Search configuration.

use relia_core::ReliaError;

/// Parameters of the design-point search.
///
/// The defaults are the conventional choices: Armijo parameters a = 0.1
/// and b = 0.5, merit weight factor γ = 2, all tolerances 1e-3, and at
/// most 20 iterations. The Armijo backtracking loop carries its own hard
/// cap so a pathological merit landscape cannot stall the search.
///
/// # Examples
///
/// ```
/// use relia_optimiser::SearchSettings;
///
/// let settings = SearchSettings::default().with_max_iter(50);
/// assert!(settings.validate().is_ok());
///
/// let bad = SearchSettings::default().with_a(1.5);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Armijo sufficient-decrease parameter, in (0, 1).
    pub a: f64,
    /// Armijo backtracking factor, in (0, 1).
    pub b: f64,
    /// Merit weight factor γ ≥ 1.
    pub gamma: f64,
    /// Step-size convergence tolerance (‖y − y_prev‖).
    pub tol: f64,
    /// Tolerance on the gradient/iterate misalignment test.
    pub tol_1: f64,
    /// Tolerance on the constraint residual test.
    pub tol_2: f64,
    /// Maximum number of search iterations.
    pub max_iter: usize,
    /// Hard cap on Armijo backtracking steps per iteration.
    pub armijo_max_backtracks: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            a: 0.1,
            b: 0.5,
            gamma: 2.0,
            tol: 1e-3,
            tol_1: 1e-3,
            tol_2: 1e-3,
            max_iter: 20,
            armijo_max_backtracks: 50,
        }
    }
}

impl SearchSettings {
    /// Set the Armijo sufficient-decrease parameter.
    pub fn with_a(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    /// Set the Armijo backtracking factor.
    pub fn with_b(mut self, b: f64) -> Self {
        self.b = b;
        self
    }

    /// Set the merit weight factor.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the step-size convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the misalignment tolerance.
    pub fn with_tol_1(mut self, tol_1: f64) -> Self {
        self.tol_1 = tol_1;
        self
    }

    /// Set the constraint-residual tolerance.
    pub fn with_tol_2(mut self, tol_2: f64) -> Self {
        self.tol_2 = tol_2;
        self
    }

    /// Set the iteration budget.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Validate every parameter against its declared interval.
    ///
    /// # Errors
    ///
    /// [`ReliaError::InvalidParameter`] naming the offending parameter.
    pub fn validate(&self) -> Result<(), ReliaError> {
        if !(self.a > 0.0 && self.a < 1.0) {
            return Err(ReliaError::invalid_parameter("a", "must lie in (0, 1)"));
        }
        if !(self.b > 0.0 && self.b < 1.0) {
            return Err(ReliaError::invalid_parameter("b", "must lie in (0, 1)"));
        }
        if self.gamma < 1.0 {
            return Err(ReliaError::invalid_parameter("gamma", "must be >= 1"));
        }
        if self.tol < 0.0 {
            return Err(ReliaError::invalid_parameter("tol", "must be >= 0"));
        }
        if self.tol_1 < 0.0 {
            return Err(ReliaError::invalid_parameter("tol_1", "must be >= 0"));
        }
        if self.tol_2 < 0.0 {
            return Err(ReliaError::invalid_parameter("tol_2", "must be >= 0"));
        }
        if self.max_iter < 1 {
            return Err(ReliaError::invalid_parameter("max_iter", "must be >= 1"));
        }
        if self.armijo_max_backtracks < 1 {
            return Err(ReliaError::invalid_parameter(
                "armijo_max_backtracks",
                "must be >= 1",
            ));
        }
        Ok(())
    }
}
