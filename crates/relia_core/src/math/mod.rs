//! Mathematical kernels for reliability computations.
//!
//! Everything here is a pure function of its inputs. The kernels operate on
//! `f64`, `nalgebra` vectors and matrices, and [`Marginal`](crate::Marginal)
//! trait objects.

pub mod decomposition;
pub mod equivalent;
pub mod gradient;
pub mod nataf;
pub mod normal;
pub mod quadrature;

pub use decomposition::{cholesky, spectral, CorrelationFactors};
pub use equivalent::{normal_equivalent, transform_xz, NormalEquivalent, XzTransform};
pub use gradient::numerical_gradient;
pub use nataf::{nataf, NatafSettings};
pub use normal::{beta_to_pf, pf_to_beta, phi_cdf, phi_icdf, phi_pdf, phi_pdf_multivariate};
pub use quadrature::GaussLegendre;
