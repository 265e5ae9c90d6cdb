//! Activation functions for pattern-producing networks.
//!
//! The catalog is a closed set of pure scalar functions. Periodic functions
//! (sine, cosine) and radial/symmetric functions (gaussian, absolute value)
//! produce the ripples and lobes that make evolved coordinate patterns
//! interesting; the folding functions (modulus, alternating floor) produce
//! tilings and bands.

use std::f64::consts::{E, PI};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Activation function kinds applied by network nodes.
///
/// Each variant dispatches to a pure `f64 -> f64` function. A function is
/// invoked once per node per evaluation, so every branch here is cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Activation {
    /// f(x) = x
    #[default]
    Linear,
    /// f(x) = x clamped to [-1, 1]
    BoundedLinear,
    /// Rescaled sigmoid: f(x) = 2 / (1 + e^-x) - 1, range (-1, 1)
    Sigmoid,
    /// f(x) = tanh(πx), range (-1, 1)
    Tanh,
    /// f(x) = sin(2πx), period 1
    Sine,
    /// f(x) = cos(2πx), period 1
    Cosine,
    /// Normal density with σ = 0.4: f(x) = e^(-x²/(2·0.4²)) / (0.4·√(2π))
    Gaussian,
    /// f(x) = max(0, x)
    Relu,
    /// f(x) = |x|
    Absolute,
    /// f(x) = 1 - |x|
    InverseAbsolute,
    /// f(x) = x mod 1 (sign-preserving remainder)
    Modulus,
    /// f(x) = 1 - (x mod 1)
    InverseModulus,
    /// f(x) = 1/(x+1) for x > 0, 1/(x-1) for x < 0, 0 at x = 0
    Inverse,
    /// f(x) = x²
    Parabolic,
    /// f(x) = x³
    Cubic,
    /// f(x) = ln(x + 1/e) for x > 0, -ln(-x + 1/e) for x < 0, 0 at x = 0
    Log,
    /// f(x) = 2^(x-1)
    Exponential,
    /// f(x) = floor(x) mod 2
    AlternatingFloor,
    /// f(x) = 1 - (floor(x) mod 2)
    InverseAlternatingFloor,
}

impl Activation {
    /// Every activation in the catalog, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::Linear,
        Self::BoundedLinear,
        Self::Sigmoid,
        Self::Tanh,
        Self::Sine,
        Self::Cosine,
        Self::Gaussian,
        Self::Relu,
        Self::Absolute,
        Self::InverseAbsolute,
        Self::Modulus,
        Self::InverseModulus,
        Self::Inverse,
        Self::Parabolic,
        Self::Cubic,
        Self::Log,
        Self::Exponential,
        Self::AlternatingFloor,
        Self::InverseAlternatingFloor,
    ];

    /// Draw an activation uniformly from the catalog.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// The catalog name of this activation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::BoundedLinear => "boundedLinear",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Sine => "sine",
            Self::Cosine => "cosine",
            Self::Gaussian => "gaussian",
            Self::Relu => "relu",
            Self::Absolute => "absolute",
            Self::InverseAbsolute => "inverseAbsolute",
            Self::Modulus => "modulus",
            Self::InverseModulus => "inverseModulus",
            Self::Inverse => "inverse",
            Self::Parabolic => "parabolic",
            Self::Cubic => "cubic",
            Self::Log => "log",
            Self::Exponential => "exponential",
            Self::AlternatingFloor => "alternatingFloor",
            Self::InverseAlternatingFloor => "inverseAlternatingFloor",
        }
    }

    /// Look up an activation by its catalog name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Apply this activation function to an input value.
    #[inline]
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::BoundedLinear => x.clamp(-1.0, 1.0),
            Self::Sigmoid => 2.0 / (1.0 + (-x).exp()) - 1.0,
            Self::Tanh => (x * PI).tanh(),
            Self::Sine => (x * 2.0 * PI).sin(),
            Self::Cosine => (x * 2.0 * PI).cos(),
            Self::Gaussian => (-(x * x) / (2.0 * 0.4 * 0.4)).exp() / (0.4 * (2.0 * PI).sqrt()),
            Self::Relu => x.max(0.0),
            Self::Absolute => x.abs(),
            Self::InverseAbsolute => 1.0 - x.abs(),
            Self::Modulus => x % 1.0,
            Self::InverseModulus => 1.0 - x % 1.0,
            Self::Inverse => {
                if x > 0.0 {
                    1.0 / (x + 1.0)
                } else if x < 0.0 {
                    1.0 / (x - 1.0)
                } else {
                    0.0
                }
            }
            Self::Parabolic => x * x,
            Self::Cubic => x * x * x,
            Self::Log => {
                if x > 0.0 {
                    (x + E.recip()).ln()
                } else if x < 0.0 {
                    -(-x + E.recip()).ln()
                } else {
                    0.0
                }
            }
            Self::Exponential => 2f64.powf(x - 1.0),
            Self::AlternatingFloor => x.floor() % 2.0,
            Self::InverseAlternatingFloor => 1.0 - x.floor() % 2.0,
        }
    }
}
