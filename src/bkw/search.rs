//! Maximum-likelihood search over the surviving secret suffix
//!
//! After a levels of reduction, a terminal sample (a, c) is zero outside
//! its last d coordinates a', and c = ⟨a', s'⟩ + e' where e' is a sum of
//! up to 2^a level-0 errors. For the right guess v = s' the residual
//! ⟨a', v⟩ - c is distributed like -e'; for a wrong guess it is close to
//! uniform. Each candidate is scored by the average log-likelihood ratio
//! of its residuals under these two hypotheses.

use std::f64::consts::PI;

use tracing::debug;

use crate::error::{ensure_params, BkwError, Result};
use crate::lwe::Sample;
use crate::math::gaussian::density;
use crate::math::{ModQ, ZqVector};

/// Noise model of reduced samples: a discrete Gaussian truncated at
/// ±⌈mσ⌉, folded onto Z_q when scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseModel {
    sigma: f64,
    tail: f64,
}

impl NoiseModel {
    pub fn new(sigma: f64, tail: f64) -> Result<Self> {
        ensure_params!(
            sigma.is_finite() && sigma > 0.0,
            "noise sigma must be positive and finite, got {}",
            sigma
        );
        ensure_params!(
            tail.is_finite() && tail > 0.0,
            "noise tail multiplier must be positive and finite, got {}",
            tail
        );
        Ok(Self { sigma, tail })
    }

    /// Model of the error after `levels` eliminations.
    ///
    /// Each level adds or subtracts two independent samples, doubling the
    /// variance, so σ grows by √(2^levels).
    pub fn grown(&self, levels: usize) -> Self {
        Self {
            sigma: self.sigma * 2f64.powf(levels as f64 / 2.0),
            tail: self.tail,
        }
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn tail(&self) -> f64 {
        self.tail
    }

    /// Probability of each residue j ∈ Z_q being the error mod q.
    ///
    /// Sums the Gaussian over every integer e ≡ j (mod q) inside the
    /// support, then normalises so the entries add up to 1. Once σ ≥ q and
    /// the support spans more than `DIRECT_FOLD_PERIODS` periods, the fold
    /// is evaluated as the theta series of the wrapped Gaussian instead,
    /// which ignores the truncation at ±⌈mσ⌉.
    pub fn residue_pmf(&self, q: u64) -> Result<Vec<f64>> {
        ensure_params!(q >= 2, "modulus q must be at least 2, got {}", q);
        let len = usize::try_from(q)
            .map_err(|_| BkwError::invalid(format!("modulus q = {} does not fit in usize", q)))?;
        let max = (self.tail * self.sigma).ceil();
        let qf = q as f64;

        let mut pmf = if self.sigma >= qf && max > DIRECT_FOLD_PERIODS * qf {
            wrapped_theta(self.sigma, qf, len)
        } else {
            let max = max as i64;
            let mut pmf = vec![0.0; len];
            for e in -max..=max {
                pmf[ModQ::from_signed(e, q) as usize] += density(e, self.sigma);
            }
            pmf
        };

        let total: f64 = pmf.iter().sum();
        if total > 0.0 {
            pmf.iter_mut().for_each(|p| *p /= total);
        }
        Ok(pmf)
    }
}

/// Support widths, in multiples of q, that are still folded term by term
const DIRECT_FOLD_PERIODS: f64 = 64.0;

/// Unnormalised wrapped Gaussian on Z_q via Poisson summation:
/// 1 + 2 Σ_k exp(-2π²k²σ²/q²) cos(2πkj/q).
fn wrapped_theta(sigma: f64, q: f64, len: usize) -> Vec<f64> {
    let decay = -2.0 * PI * PI * sigma * sigma / (q * q);
    let terms: Vec<f64> = (1..)
        .map(|k: u32| (decay * f64::from(k * k)).exp())
        .take_while(|&t| t > f64::EPSILON * 1e-4)
        .collect();
    (0..len)
        .map(|j| {
            let phase = 2.0 * PI * j as f64 / q;
            1.0 + 2.0
                * terms
                    .iter()
                    .enumerate()
                    .map(|(k, t)| t * (phase * (k + 1) as f64).cos())
                    .sum::<f64>()
        })
        .collect()
}

/// Best candidate found by a search
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Predicted last d coordinates of the secret
    pub suffix: ZqVector,
    /// Average log-likelihood ratio of the candidate
    pub score: f64,
}

/// Log-likelihood scoring of every v ∈ Z_q^d against terminal samples
#[derive(Debug, Clone)]
pub struct CandidateSearch {
    q: u64,
    d: usize,
    noise: NoiseModel,
    candidates: usize,
}

impl CandidateSearch {
    /// Search over Z_q^d with the (already grown) noise model
    pub fn new(q: u64, d: usize, noise: NoiseModel) -> Result<Self> {
        ensure_params!(q >= 2, "modulus q must be at least 2, got {}", q);
        ensure_params!(
            usize::try_from(q).is_ok(),
            "modulus q = {} does not fit in usize",
            q
        );
        let candidates = ModQ::checked_pow(q, d);
        ensure_params!(
            candidates.is_some(),
            "q^d = {}^{} candidates do not fit in memory",
            q,
            d
        );
        Ok(Self {
            q,
            d,
            noise,
            candidates: candidates.unwrap_or(0),
        })
    }

    /// Number of candidates q^d
    pub fn candidate_count(&self) -> usize {
        self.candidates
    }

    /// Weight W_j = log₂(p_j / p̃_j) for every residual j.
    ///
    /// p̃_j = (q^(d-1) - p_j) / (q^d - 1) is the density of residual j
    /// under a wrong guess. Both densities are floored at the smallest
    /// positive f64 so every weight stays finite.
    ///
    /// With d = 0 there is no residual to weigh and the table is empty.
    pub fn weights(&self) -> Result<Vec<f64>> {
        if self.d == 0 {
            return Ok(Vec::new());
        }
        let pmf = self.noise.residue_pmf(self.q)?;
        let q = self.q as f64;
        let q_d = q.powi(self.d as i32);
        let q_d1 = q.powi(self.d as i32 - 1);
        Ok(pmf
            .into_iter()
            .map(|p| {
                let wrong = ((q_d1 - p) / (q_d - 1.0)).max(f64::MIN_POSITIVE);
                let right = p.max(f64::MIN_POSITIVE);
                (right / wrong).log2()
            })
            .collect())
    }

    /// Score every candidate, indexed by enumeration rank.
    ///
    /// Rank order increments the last coordinate first, so rank 0 is the
    /// zero vector and rank 1 is (0, ..., 0, 1).
    pub fn scores(&self, samples: &[Sample]) -> Result<Vec<f64>> {
        ensure_params!(!samples.is_empty(), "candidate search needs at least one sample");
        let n = samples[0].n();
        let suffixes = samples
            .iter()
            .map(|s| {
                s.check_shape(n, self.q)?;
                s.suffix(self.d).map(|a| (a, s.c()))
            })
            .collect::<Result<Vec<_>>>()?;
        // The empty candidate explains every sample equally well
        if self.d == 0 {
            return Ok(vec![0.0]);
        }

        let weights = self.weights()?;
        let m = samples.len() as f64;
        let mut table = vec![0.0; self.candidates];
        let mut v = ZqVector::zero(self.d, self.q)?;
        for slot in table.iter_mut() {
            for (a, c) in &suffixes {
                let j = ModQ::sub(a.dot(&v)?, *c, self.q);
                *slot += weights[j as usize] / m;
            }
            v = v.next();
        }
        Ok(table)
    }

    /// Candidate with the highest score; the lowest rank wins ties
    pub fn run(&self, samples: &[Sample]) -> Result<Candidate> {
        let scores = self.scores(samples)?;
        let (rank, score) = scores
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &s)| {
                if s > best.1 {
                    (i, s)
                } else {
                    best
                }
            });
        let suffix = ZqVector::from_rank(rank, self.d, self.q)?;
        debug!(
            rank,
            score,
            candidates = self.candidates,
            samples = samples.len(),
            "candidate search finished"
        );
        Ok(Candidate { suffix, score })
    }
}
