//! The statrs-backed catalogue of 1-D marginal distributions.
//!
//! Every entry wraps a `statrs` distribution behind the
//! [`Marginal`](relia_core::Marginal) capability record. Constructors
//! validate parameters and map statrs rejections to
//! [`ReliaError::InvalidParameter`](relia_core::ReliaError). Sampling is
//! the trait's seeded inverse transform.

use relia_core::{Marginal, ReliaError};
use statrs::distribution as dist;
use statrs::distribution::{Continuous, ContinuousCDF};
use statrs::statistics::Distribution as StatsDistribution;

/// Polish a quantile with a few Newton steps on the CDF.
///
/// statrs falls back to a coarse bisection for distributions without a
/// closed-form quantile (gamma, beta); a couple of Newton iterations
/// brings the residual u − F(x) down to machine precision.
fn newton_polish<D>(distribution: &D, u: f64, mut x: f64) -> f64
where
    D: Continuous<f64, f64> + ContinuousCDF<f64, f64>,
{
    if !x.is_finite() {
        return x;
    }
    for _ in 0..3 {
        let density = distribution.pdf(x);
        if !(density > 0.0) || !density.is_finite() {
            break;
        }
        let step = (distribution.cdf(x) - u) / density;
        x -= step;
        if !x.is_finite() || step.abs() < 1e-14 * (1.0 + x.abs()) {
            break;
        }
    }
    x
}

macro_rules! impl_marginal {
    ($name:ident) => {
        impl Marginal for $name {
            fn pdf(&self, x: f64) -> f64 {
                self.inner.pdf(x)
            }
            fn cdf(&self, x: f64) -> f64 {
                self.inner.cdf(x)
            }
            fn icdf(&self, u: f64) -> f64 {
                newton_polish(&self.inner, u, self.inner.inverse_cdf(u))
            }
            fn mean(&self) -> f64 {
                StatsDistribution::mean(&self.inner).unwrap_or(f64::NAN)
            }
            fn variance(&self) -> f64 {
                StatsDistribution::variance(&self.inner).unwrap_or(f64::NAN)
            }
        }
    };
}

/// Normal (Gaussian) marginal.
///
/// # Examples
///
/// ```
/// use relia_core::Marginal;
/// use relia_models::marginals::Normal;
///
/// let x = Normal::new(10.0, 2.0).unwrap();
/// assert_eq!(x.mean(), 10.0);
/// assert_eq!(x.std(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct Normal {
    inner: dist::Normal,
}

impl Normal {
    /// Create a normal marginal from mean and standard deviation.
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, ReliaError> {
        dist::Normal::new(mean, std_dev)
            .map(|inner| Self { inner })
            .map_err(|e| ReliaError::invalid_parameter("normal", e.to_string()))
    }

    /// The standard normal marginal, N(0, 1).
    pub fn standard() -> Self {
        Self {
            inner: dist::Normal::new(0.0, 1.0).unwrap(),
        }
    }
}

impl_marginal!(Normal);

/// Log-normal marginal; parameters are the underlying normal's location
/// and scale.
#[derive(Debug, Clone)]
pub struct LogNormal {
    inner: dist::LogNormal,
}

impl LogNormal {
    /// Create a log-normal marginal.
    pub fn new(location: f64, scale: f64) -> Result<Self, ReliaError> {
        dist::LogNormal::new(location, scale)
            .map(|inner| Self { inner })
            .map_err(|e| ReliaError::invalid_parameter("lognormal", e.to_string()))
    }
}

impl_marginal!(LogNormal);

/// Continuous uniform marginal on [min, max].
#[derive(Debug, Clone)]
pub struct Uniform {
    inner: dist::Uniform,
}

impl Uniform {
    /// Create a uniform marginal.
    pub fn new(min: f64, max: f64) -> Result<Self, ReliaError> {
        dist::Uniform::new(min, max)
            .map(|inner| Self { inner })
            .map_err(|e| ReliaError::invalid_parameter("uniform", e.to_string()))
    }
}

impl_marginal!(Uniform);

/// Exponential marginal with the given rate.
#[derive(Debug, Clone)]
pub struct Exponential {
    inner: dist::Exp,
}

impl Exponential {
    /// Create an exponential marginal.
    pub fn new(rate: f64) -> Result<Self, ReliaError> {
        dist::Exp::new(rate)
            .map(|inner| Self { inner })
            .map_err(|e| ReliaError::invalid_parameter("exponential", e.to_string()))
    }
}

impl_marginal!(Exponential);

/// Gamma marginal with shape and rate.
#[derive(Debug, Clone)]
pub struct Gamma {
    inner: dist::Gamma,
}

impl Gamma {
    /// Create a gamma marginal.
    pub fn new(shape: f64, rate: f64) -> Result<Self, ReliaError> {
        dist::Gamma::new(shape, rate)
            .map(|inner| Self { inner })
            .map_err(|e| ReliaError::invalid_parameter("gamma", e.to_string()))
    }
}

impl_marginal!(Gamma);

/// Beta marginal on (0, 1) with shape parameters.
#[derive(Debug, Clone)]
pub struct Beta {
    inner: dist::Beta,
}

impl Beta {
    /// Create a beta marginal.
    pub fn new(shape_a: f64, shape_b: f64) -> Result<Self, ReliaError> {
        dist::Beta::new(shape_a, shape_b)
            .map(|inner| Self { inner })
            .map_err(|e| ReliaError::invalid_parameter("beta", e.to_string()))
    }
}

impl_marginal!(Beta);

/// Weibull marginal with shape and scale.
#[derive(Debug, Clone)]
pub struct Weibull {
    inner: dist::Weibull,
}

impl Weibull {
    /// Create a Weibull marginal.
    pub fn new(shape: f64, scale: f64) -> Result<Self, ReliaError> {
        dist::Weibull::new(shape, scale)
            .map(|inner| Self { inner })
            .map_err(|e| ReliaError::invalid_parameter("weibull", e.to_string()))
    }
}

impl_marginal!(Weibull);

/// Gumbel (type-I extreme value) marginal with location and scale.
#[derive(Debug, Clone)]
pub struct Gumbel {
    inner: dist::Gumbel,
}

impl Gumbel {
    /// Create a Gumbel marginal.
    pub fn new(location: f64, scale: f64) -> Result<Self, ReliaError> {
        dist::Gumbel::new(location, scale)
            .map(|inner| Self { inner })
            .map_err(|e| ReliaError::invalid_parameter("gumbel", e.to_string()))
    }
}

impl_marginal!(Gumbel);

/// Triangular marginal with lower bound, upper bound and mode.
#[derive(Debug, Clone)]
pub struct Triangular {
    inner: dist::Triangular,
}

impl Triangular {
    /// Create a triangular marginal.
    pub fn new(min: f64, max: f64, mode: f64) -> Result<Self, ReliaError> {
        dist::Triangular::new(min, max, mode)
            .map(|inner| Self { inner })
            .map_err(|e| ReliaError::invalid_parameter("triangular", e.to_string()))
    }
}

impl_marginal!(Triangular);
