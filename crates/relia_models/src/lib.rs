//! # relia_models (L2: Models)
//!
//! Probabilistic and structural models for the relia reliability library.
//!
//! This crate provides:
//! - `marginals`: the statrs-backed catalogue of 1-D marginal
//!   distributions implementing [`relia_core::Marginal`]
//! - `joint`: [`JointDistribution`](joint::JointDistribution), the
//!   immutable joint probability model (marginals + correlation, with the
//!   Nataf or approximate Z-space correlation and its decomposition cached
//!   at construction)
//! - `limit_state`: [`LimitState`](limit_state::LimitState), the wrapper
//!   around the user-supplied limit-state function g and its gradient
//!
//! Layer 2 sits on `relia_core` (L1) and is consumed by
//! `relia_optimiser` (L2.5) and `relia_analysis` (L3).

#![warn(missing_docs)]

pub mod joint;
pub mod limit_state;
pub mod marginals;

pub use joint::{CorrelationMode, Decomposition, JointDistribution};
pub use limit_state::{LimitState, StateGradient, StateValue};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::joint::{CorrelationMode, Decomposition, JointDistribution};
    pub use crate::limit_state::{LimitState, StateGradient, StateValue};
    pub use crate::marginals::{
        Beta, Exponential, Gamma, Gumbel, LogNormal, Normal, Triangular, Uniform, Weibull,
    };
}
