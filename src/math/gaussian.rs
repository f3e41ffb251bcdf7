//! Discrete Gaussian sampling
//!
//! Knuth-Yao sampler for the zero-centred discrete Gaussian over Z,
//! truncated at ±⌈mσ⌉. The probability of every magnitude is stored as a
//! fixed-precision binary fraction; sampling walks the columns of that
//! table (a discrete distribution generating tree) one random bit at a time.

use std::f64::consts::PI;

use rand::Rng;

use super::modular::ModQ;
use crate::error::{ensure_params, BkwError, Result};

/// Number of binary digits kept for each magnitude probability
pub const PRECISION_BITS: u32 = u128::BITS;

/// Default bound on Knuth-Yao walk restarts before giving up
pub const DEFAULT_MAX_RESTARTS: u32 = 64;

/// Unnormalised-by-sum density exp(-x²/2σ²) / (σ√(2π))
#[inline]
pub fn density(x: i64, sigma: f64) -> f64 {
    let x = x as f64;
    (-(x * x) / (2.0 * sigma * sigma)).exp() / (sigma * (2.0 * PI).sqrt())
}

/// Convert a probability in `[0, 1)` to a 128-bit binary fraction.
///
/// Bit 127 is the first digit after the binary point.
fn to_fixed(p: f64) -> u128 {
    let mut rest = p;
    let mut bits = 0u128;
    for i in 0..PRECISION_BITS {
        rest *= 2.0;
        if rest >= 1.0 {
            rest -= 1.0;
            bits |= 1u128 << (PRECISION_BITS - 1 - i);
        }
        if rest == 0.0 {
            break;
        }
    }
    bits
}

/// Knuth-Yao discrete Gaussian sampler centred at 0.
///
/// Produces integers in `[-⌈mσ⌉, ⌈mσ⌉]` with P(x) ∝ exp(-x²/2σ²). The table
/// is fixed at construction; sampling borrows it immutably and draws its
/// randomness from the caller's RNG.
#[derive(Clone)]
pub struct GaussianSampler {
    /// Standard deviation σ
    sigma: f64,
    /// Tail multiplier m
    tail: f64,
    /// Largest magnitude supported, ⌈mσ⌉
    max: i64,
    /// P(|x|) as binary fractions, with P(0) halved for the sign split
    table: Vec<u128>,
    max_restarts: u32,
}

impl GaussianSampler {
    /// Build the probability table for σ and tail multiplier m
    pub fn new(sigma: f64, tail: f64) -> Result<Self> {
        ensure_params!(
            sigma.is_finite() && sigma > 0.0,
            "sigma must be positive and finite, got {}",
            sigma
        );
        ensure_params!(
            tail.is_finite() && tail > 0.0,
            "tail multiplier must be positive and finite, got {}",
            tail
        );

        let max = (tail * sigma).ceil() as i64;
        ensure_params!(
            max < u32::MAX as i64,
            "support ±{} is too wide for a probability table",
            max
        );

        let mut mass = 0.0;
        let mut table = Vec::with_capacity(max as usize + 1);
        for x in 0..=max {
            let p = if x == 0 {
                density(0, sigma) / 2.0
            } else {
                density(x, sigma)
            };
            mass += p;
            table.push(p);
        }
        ensure_params!(
            mass < 1.0,
            "sigma = {} is too small: magnitude table mass {} is not a probability",
            sigma,
            mass
        );

        Ok(Self {
            sigma,
            tail,
            max,
            table: table.into_iter().map(to_fixed).collect(),
            max_restarts: DEFAULT_MAX_RESTARTS,
        })
    }

    /// Override the restart bound of the Knuth-Yao walk
    pub fn with_max_restarts(mut self, max_restarts: u32) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn tail(&self) -> f64 {
        self.tail
    }

    /// Largest magnitude the sampler can return
    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn max_restarts(&self) -> u32 {
        self.max_restarts
    }

    /// P(X = x) under the Gaussian approximation with S = σ√(2π)
    pub fn prob(&self, x: i64) -> f64 {
        density(x, self.sigma)
    }

    /// P(a ≤ X ≤ b), summed pointwise (0 counted once)
    pub fn prob_range(&self, a: i64, b: i64) -> f64 {
        (a..=b).map(|x| self.prob(x)).sum()
    }

    /// Bit `col` (0 = first after the binary point) of magnitude `row`
    #[inline]
    fn bit(&self, row: usize, col: u32) -> i64 {
        ((self.table[row] >> (PRECISION_BITS - 1 - col)) & 1) as i64
    }

    /// Draw one value from the distribution
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<i64> {
        let sign = if rng.gen::<bool>() { 1 } else { -1 };
        let rows = self.table.len() as i64;

        for _ in 0..=self.max_restarts {
            let mut d: i64 = 0;
            for col in 0..PRECISION_BITS {
                d = 2 * d + rng.gen::<bool>() as i64;
                for row in (0..self.table.len()).rev() {
                    d -= self.bit(row, col);
                    if d == -1 {
                        return Ok(sign * row as i64);
                    }
                }
                // From here on d can only grow, so no later column can hit.
                if d >= rows {
                    break;
                }
            }
        }

        Err(BkwError::PrecisionExhausted {
            restarts: self.max_restarts,
        })
    }

    /// Draw one value and reduce it into Z_q
    pub fn sample_mod<R: Rng + ?Sized>(&self, rng: &mut R, q: u64) -> Result<u64> {
        Ok(ModQ::from_signed(self.sample(rng)?, q))
    }

    /// Draw `len` values
    pub fn sample_vec<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Result<Vec<i64>> {
        (0..len).map(|_| self.sample(rng)).collect()
    }
}

impl std::fmt::Debug for GaussianSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaussianSampler")
            .field("sigma", &self.sigma)
            .field("tail", &self.tail)
            .field("max", &self.max)
            .field("max_restarts", &self.max_restarts)
            .finish()
    }
}
