//! # relia_core (L1: Foundation)
//!
//! Core mathematical kernel and shared types for the relia reliability
//! library.
//!
//! This crate provides:
//! - Standard-normal helpers and the β ↔ p_f conversions
//! - The Nataf correlation-matrix solve (X-space → Z-space correlation)
//! - Per-point normal-equivalents and the diagonal X ↔ Z Jacobians
//! - Spectral and Cholesky decompositions of a correlation matrix
//! - Central finite-difference gradients
//! - The [`Marginal`] trait, the seam between the engine and 1-D
//!   distribution primitives
//! - [`ReliaError`], the shared error enum for the whole workspace
//!
//! Higher layers (`relia_models`, `relia_optimiser`, `relia_analysis`)
//! build the joint model, the design-point search, and the reliability
//! analyses on top of these kernels.

#![warn(missing_docs)]

pub mod math;
pub mod traits;
pub mod types;

pub use traits::Marginal;
pub use types::ReliaError;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::math::{
        beta_to_pf, cholesky, nataf, normal_equivalent, numerical_gradient, pf_to_beta, phi_cdf,
        phi_icdf, phi_pdf, phi_pdf_multivariate, spectral, transform_xz, CorrelationFactors,
        GaussLegendre, NatafSettings, NormalEquivalent, XzTransform,
    };
    pub use crate::traits::Marginal;
    pub use crate::types::ReliaError;
}
