//! Analysis reports.

use nalgebra::DVector;
use relia_core::math::beta_to_pf;

/// A design point found by a first-order analysis.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DesignPoint {
    /// Reliability index β (signed: negative when the mean lies in the
    /// failure domain).
    pub beta: f64,
    /// Probability of failure Φ(−β).
    pub pf: f64,
    /// The design point in the uncorrelated standard-normal space Y.
    pub y: DVector<f64>,
    /// The design point in physical space X.
    pub x: DVector<f64>,
    /// Iterations spent by the search.
    pub iterations: usize,
    /// Whether the search met its stopping test within the budget.
    pub converged: bool,
}

/// Report of a first-order analysis: one design point per limit-state
/// component (a single entry for scalar limit states).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReliabilityReport {
    /// Per-component results, in component order.
    pub components: Vec<DesignPoint>,
}

impl ReliabilityReport {
    /// β of the first (or only) component.
    pub fn beta(&self) -> f64 {
        self.components[0].beta
    }

    /// p_f of the first (or only) component.
    pub fn pf(&self) -> f64 {
        self.components[0].pf
    }

    /// Whether this is a system analysis with several components.
    pub fn is_system(&self) -> bool {
        self.components.len() > 1
    }

    /// Whether every component search converged.
    pub fn converged(&self) -> bool {
        self.components.iter().all(|c| c.converged)
    }
}

/// Report of a simulation analysis.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimulationReport {
    /// Estimated probability of failure.
    pub pf: f64,
    /// Reliability index −Φ⁻¹(p_f).
    pub beta: f64,
    /// Standard error of the estimator.
    pub std_error: f64,
    /// Number of samples per stream.
    pub n_sim: usize,
}

/// Signed reliability index from the linearisation at the design point:
/// p_f = Φ(d·y/‖d‖), so β = −d·y/‖d‖. Negative when the mean already lies
/// in the failure domain.
pub(crate) fn signed_beta(y: &DVector<f64>, dgdy: &DVector<f64>) -> f64 {
    -dgdy.dot(y) / dgdy.norm()
}

/// Assemble a design point record from a search result.
pub(crate) fn design_point(
    y: DVector<f64>,
    x: DVector<f64>,
    dgdy: &DVector<f64>,
    iterations: usize,
    converged: bool,
) -> DesignPoint {
    let beta = signed_beta(&y, dgdy);
    DesignPoint {
        beta,
        pf: beta_to_pf(beta),
        y,
        x,
        iterations,
        converged,
    }
}
