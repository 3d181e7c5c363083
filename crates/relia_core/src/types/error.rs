//! Error types for structured error handling.
//!
//! The whole workspace reports failures through a single enum so callers
//! can distinguish the five error kinds without string matching.

use thiserror::Error;

/// Categorised errors for reliability computations.
///
/// All errors are reported synchronously at the call site; there are no
/// retries and no partial results.
///
/// # Variants
///
/// - `InvalidParameter`: a scalar parameter is outside its declared interval
/// - `ShapeMismatch`: dimension disagreement between inputs
/// - `TypeContract`: a runtime contract the type system cannot enforce
/// - `NotImplemented`: an option enumerated in the API but not supplied
/// - `NonConvergence`: an iterative kernel exhausted its iteration bound
///
/// # Examples
///
/// ```
/// use relia_core::ReliaError;
///
/// let err = ReliaError::invalid_parameter("gamma", "must be >= 1");
/// assert!(err.is_invalid_parameter());
/// assert!(format!("{}", err).contains("gamma"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReliaError {
    /// A scalar parameter is outside its declared interval.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Dimension disagreement between inputs.
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Operation that detected the mismatch.
        context: &'static str,
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// A runtime contract violation the type system cannot catch.
    #[error("type contract violated: {0}")]
    TypeContract(String),

    /// An option enumerated in the API but not yet supplied.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// An iterative kernel exhausted its iteration bound.
    #[error("`{kernel}` failed to converge after {iterations} iterations")]
    NonConvergence {
        /// Name of the iterative kernel.
        kernel: &'static str,
        /// Number of iterations performed.
        iterations: usize,
    },
}

impl ReliaError {
    /// Create an invalid-parameter error.
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Create a shape-mismatch error.
    pub fn shape_mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            context,
            expected,
            actual,
        }
    }

    /// Create a type-contract error.
    pub fn type_contract(message: impl Into<String>) -> Self {
        Self::TypeContract(message.into())
    }

    /// Create a not-implemented error.
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplemented(message.into())
    }

    /// Create a non-convergence error.
    pub fn non_convergence(kernel: &'static str, iterations: usize) -> Self {
        Self::NonConvergence { kernel, iterations }
    }

    /// Check if this is an invalid-parameter error.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    /// Check if this is a shape-mismatch error.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }

    /// Check if this is a type-contract error.
    pub fn is_type_contract(&self) -> bool {
        matches!(self, Self::TypeContract(_))
    }

    /// Check if this is a not-implemented error.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_))
    }

    /// Check if this is a non-convergence error.
    pub fn is_non_convergence(&self) -> bool {
        matches!(self, Self::NonConvergence { .. })
    }
}
