//! The limit-state wrapper.
//!
//! Wraps the user-supplied limit-state function g: ℝⁿ → ℝ (or its system
//! variant returning a total and per-component surfaces) together with an
//! optional analytic gradient. When no gradient is supplied, central
//! finite differences are used. The safe region is {g > 0}, failure is
//! {g ≤ 0}.

use nalgebra::{DMatrix, DVector};
use relia_core::math::numerical_gradient;
use relia_core::ReliaError;

/// Value of a limit-state evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    /// A single limit-state surface.
    Scalar(f64),
    /// A system of surfaces with a combined value (typically the minimum).
    System {
        /// Combined system value g_total.
        total: f64,
        /// Per-component surface values g_1 … g_K.
        components: Vec<f64>,
    },
}

impl StateValue {
    /// The combined value used for failure counting.
    pub fn total(&self) -> f64 {
        match self {
            Self::Scalar(g) => *g,
            Self::System { total, .. } => *total,
        }
    }

    /// Number of component surfaces (1 for a scalar state).
    pub fn n_components(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::System { components, .. } => components.len(),
        }
    }

    /// Component `k`, when it exists.
    pub fn component(&self, k: usize) -> Option<f64> {
        match self {
            Self::Scalar(_) => None,
            Self::System { components, .. } => components.get(k).copied(),
        }
    }
}

/// Gradient of a limit-state evaluation, matching the arity of the value.
#[derive(Debug, Clone, PartialEq)]
pub enum StateGradient {
    /// Gradient of a single surface.
    Scalar(DVector<f64>),
    /// One gradient per component surface.
    System(Vec<DVector<f64>>),
}

type StateFn = Box<dyn Fn(&DVector<f64>) -> StateValue>;
type GradientFn = Box<dyn Fn(&DVector<f64>) -> StateGradient>;

/// The limit-state model: g, optionally ∇g, and the evaluation knobs.
///
/// # Examples
///
/// ```
/// use nalgebra::DVector;
/// use relia_models::LimitState;
///
/// // g(x) = x1 − x2 − 3
/// let ls = LimitState::new(|x: &DVector<f64>| x[0] - x[1] - 3.0);
///
/// let x = DVector::from_vec(vec![10.0, 5.0]);
/// assert_eq!(ls.component(&x, None).unwrap(), 2.0);
///
/// let grad = ls.gradient(&x, None).unwrap();
/// assert!((grad[0] - 1.0).abs() < 1e-6);
/// assert!((grad[1] + 1.0).abs() < 1e-6);
/// ```
pub struct LimitState {
    function: StateFn,
    gradient: Option<GradientFn>,
    n_tasks: usize,
}

impl LimitState {
    /// Wrap a scalar limit-state function; gradients fall back to central
    /// finite differences.
    pub fn new<G>(g: G) -> Self
    where
        G: Fn(&DVector<f64>) -> f64 + 'static,
    {
        Self {
            function: Box::new(move |x| StateValue::Scalar(g(x))),
            gradient: None,
            n_tasks: 1,
        }
    }

    /// Wrap a scalar limit-state function with an analytic gradient.
    pub fn with_gradient<G, D>(g: G, grad: D) -> Self
    where
        G: Fn(&DVector<f64>) -> f64 + 'static,
        D: Fn(&DVector<f64>) -> DVector<f64> + 'static,
    {
        Self {
            function: Box::new(move |x| StateValue::Scalar(g(x))),
            gradient: Some(Box::new(move |x| StateGradient::Scalar(grad(x)))),
            n_tasks: 1,
        }
    }

    /// Wrap a system limit-state function returning (g_total, components).
    pub fn system<G>(g: G) -> Self
    where
        G: Fn(&DVector<f64>) -> (f64, Vec<f64>) + 'static,
    {
        Self {
            function: Box::new(move |x| {
                let (total, components) = g(x);
                StateValue::System { total, components }
            }),
            gradient: None,
            n_tasks: 1,
        }
    }

    /// Wrap a system limit-state function with per-component analytic
    /// gradients.
    pub fn system_with_gradient<G, D>(g: G, grad: D) -> Self
    where
        G: Fn(&DVector<f64>) -> (f64, Vec<f64>) + 'static,
        D: Fn(&DVector<f64>) -> Vec<DVector<f64>> + 'static,
    {
        Self {
            function: Box::new(move |x| {
                let (total, components) = g(x);
                StateValue::System { total, components }
            }),
            gradient: Some(Box::new(move |x| StateGradient::System(grad(x)))),
            n_tasks: 1,
        }
    }

    /// Set the number of evaluation tasks (reserved; only 1 is supported).
    pub fn with_n_tasks(mut self, n_tasks: usize) -> Self {
        self.n_tasks = n_tasks;
        self
    }

    /// The configured number of evaluation tasks.
    pub fn n_tasks(&self) -> usize {
        self.n_tasks
    }

    /// Evaluate g at `x`.
    pub fn value(&self, x: &DVector<f64>) -> StateValue {
        (self.function)(x)
    }

    /// Number of component surfaces, probed at `at`.
    pub fn n_components(&self, at: &DVector<f64>) -> usize {
        self.value(at).n_components()
    }

    /// Evaluate one surface: the scalar/total value for `sys_id = None`,
    /// or component `k` for `sys_id = Some(k)`.
    ///
    /// # Errors
    ///
    /// [`ReliaError::InvalidParameter`] when `sys_id` addresses a
    /// component that does not exist.
    pub fn component(&self, x: &DVector<f64>, sys_id: Option<usize>) -> Result<f64, ReliaError> {
        let value = self.value(x);
        match sys_id {
            None => Ok(value.total()),
            Some(k) => value.component(k).ok_or_else(|| {
                ReliaError::invalid_parameter("sys_id", format!("component {} does not exist", k))
            }),
        }
    }

    /// Gradient of the selected surface at `x`.
    ///
    /// Uses the analytic gradient when supplied, otherwise central finite
    /// differences with step 1e-6.
    ///
    /// # Errors
    ///
    /// - [`ReliaError::InvalidParameter`] when `sys_id` is out of range or
    ///   its arity disagrees with the supplied gradient
    /// - [`ReliaError::ShapeMismatch`] when an analytic gradient has the
    ///   wrong length
    pub fn gradient(
        &self,
        x: &DVector<f64>,
        sys_id: Option<usize>,
    ) -> Result<DVector<f64>, ReliaError> {
        // Validates sys_id as a side effect.
        self.component(x, sys_id)?;

        match &self.gradient {
            Some(grad) => {
                let d = match (grad(x), sys_id) {
                    (StateGradient::Scalar(d), None) => d,
                    (StateGradient::Scalar(_), Some(_)) => {
                        return Err(ReliaError::invalid_parameter(
                            "sys_id",
                            "scalar gradient cannot be indexed by component",
                        ))
                    }
                    (StateGradient::System(ds), Some(k)) => ds.get(k).cloned().ok_or_else(|| {
                        ReliaError::invalid_parameter(
                            "sys_id",
                            format!("gradient component {} does not exist", k),
                        )
                    })?,
                    (StateGradient::System(_), None) => {
                        return Err(ReliaError::invalid_parameter(
                            "sys_id",
                            "system gradient requires a component id",
                        ))
                    }
                };
                if d.len() != x.len() {
                    return Err(ReliaError::shape_mismatch("gradient", x.len(), d.len()));
                }
                Ok(d)
            }
            None => Ok(numerical_gradient(x, |p| {
                let value = (self.function)(p);
                match sys_id {
                    None => value.total(),
                    Some(k) => value.component(k).unwrap_or(f64::NAN),
                }
            })),
        }
    }

    /// Evaluate the total limit state for every row of a sample matrix.
    ///
    /// # Errors
    ///
    /// [`ReliaError::NotImplemented`] when `n_tasks > 1`; parallel
    /// evaluation is reserved and must not silently serialise.
    pub fn run(&self, x: &DMatrix<f64>) -> Result<Vec<f64>, ReliaError> {
        if self.n_tasks > 1 {
            return Err(ReliaError::not_implemented(
                "parallel limit-state evaluation (n_tasks > 1)",
            ));
        }
        let mut g = Vec::with_capacity(x.nrows());
        for s in 0..x.nrows() {
            let row = x.row(s).transpose();
            g.push(self.value(&row).total());
        }
        Ok(g)
    }

    /// Evaluate further samples and append the results to `out`.
    pub fn append_to(&self, x: &DMatrix<f64>, out: &mut Vec<f64>) -> Result<(), ReliaError> {
        let mut extra = self.run(x)?;
        out.append(&mut extra);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear() -> LimitState {
        LimitState::new(|x: &DVector<f64>| x[0] - x[1] - 3.0)
    }

    #[test]
    fn test_scalar_evaluation() {
        let ls = linear();
        let x = DVector::from_vec(vec![10.0, 5.0]);
        assert_relative_eq!(ls.component(&x, None).unwrap(), 2.0);
        assert_eq!(ls.n_components(&x), 1);
    }

    #[test]
    fn test_scalar_rejects_component_id() {
        let ls = linear();
        let x = DVector::from_vec(vec![10.0, 5.0]);
        assert!(ls.component(&x, Some(0)).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_numerical_gradient_matches_analytic() {
        let numeric = linear();
        let analytic = LimitState::with_gradient(
            |x: &DVector<f64>| x[0] - x[1] - 3.0,
            |_x| DVector::from_vec(vec![1.0, -1.0]),
        );
        let x = DVector::from_vec(vec![10.0, 5.0]);
        let dn = numeric.gradient(&x, None).unwrap();
        let da = analytic.gradient(&x, None).unwrap();
        assert_relative_eq!((dn - da).norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_system_evaluation_and_gradient() {
        let ls = LimitState::system(|x: &DVector<f64>| {
            let g1 = x[0] - 1.0;
            let g2 = x[1] - 2.0;
            (g1.min(g2), vec![g1, g2])
        });
        let x = DVector::from_vec(vec![3.0, 2.5]);

        assert_relative_eq!(ls.component(&x, None).unwrap(), 0.5);
        assert_relative_eq!(ls.component(&x, Some(0)).unwrap(), 2.0);
        assert_relative_eq!(ls.component(&x, Some(1)).unwrap(), 0.5);
        assert_eq!(ls.n_components(&x), 2);
        assert!(ls.component(&x, Some(2)).unwrap_err().is_invalid_parameter());

        let d0 = ls.gradient(&x, Some(0)).unwrap();
        assert_relative_eq!(d0[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(d0[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_analytic_gradient_arity_checked() {
        let ls = LimitState::with_gradient(
            |x: &DVector<f64>| x[0] - x[1],
            |_x| DVector::from_vec(vec![1.0]),
        );
        let x = DVector::from_vec(vec![1.0, 2.0]);
        assert!(ls.gradient(&x, None).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn test_batch_run_and_append() {
        let ls = linear();
        let x = DMatrix::from_row_slice(2, 2, &[10.0, 5.0, 8.0, 6.0]);
        let mut g = ls.run(&x).unwrap();
        assert_eq!(g, vec![2.0, -1.0]);

        let more = DMatrix::from_row_slice(1, 2, &[3.0, 0.0]);
        ls.append_to(&more, &mut g).unwrap();
        assert_eq!(g, vec![2.0, -1.0, 0.0]);
    }

    #[test]
    fn test_parallel_evaluation_fails_fast() {
        let ls = linear().with_n_tasks(4);
        let x = DMatrix::from_row_slice(1, 2, &[10.0, 5.0]);
        assert!(ls.run(&x).unwrap_err().is_not_implemented());
    }
}
