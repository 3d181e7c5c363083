//! # relia_analysis (L3: Analyses)
//!
//! The user-facing reliability analyses, orchestrating the joint model
//! (L2), the design-point search (L2.5) and the sampling pipelines:
//!
//! - [`Fosm`] — first-order second-moment analysis: a full design-point
//!   search in the standardised space x = μ + σ ⊙ y
//! - [`Form`] — first-order reliability method: per-iteration
//!   normal-equivalents, rebuilt Jacobians, one optimiser step per outer
//!   iteration
//! - [`MonteCarlo`] — crude simulation over any [`Sampler`]
//! - [`Importance`] — importance sampling re-centred at the FORM design
//!   point
//!
//! Analyses cache their report after `run`, exposing `beta()` / `pf()`
//! accessors; reports carry per-component design points, iteration counts
//! and a `converged` flag.

#![warn(missing_docs)]

mod draws;
pub mod form;
pub mod fosm;
pub mod importance;
pub mod monte_carlo;
pub mod report;
pub mod sampling;

pub use form::Form;
pub use fosm::Fosm;
pub use importance::Importance;
pub use monte_carlo::MonteCarlo;
pub use report::{DesignPoint, ReliabilityReport, SimulationReport};
pub use sampling::{LhsMode, SampleSet, Sampler};

/// Which design-point algorithm an analysis should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Optimisation {
    /// The classical HLRF fixed point (default).
    #[default]
    Hlrf,
    /// iHLRF with the Armijo line search on the merit function.
    Ihlrf,
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::form::Form;
    pub use crate::fosm::Fosm;
    pub use crate::importance::Importance;
    pub use crate::monte_carlo::MonteCarlo;
    pub use crate::report::{DesignPoint, ReliabilityReport, SimulationReport};
    pub use crate::sampling::{LhsMode, SampleSet, Sampler};
    pub use crate::Optimisation;
}
