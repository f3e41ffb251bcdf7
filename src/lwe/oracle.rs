//! LWE sample oracle

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use super::types::Sample;
use crate::error::{ensure_params, Result};
use crate::math::{GaussianSampler, ModQ, ZqVector};

/// Source of LWE samples over a fixed (n, q).
///
/// The BKW oracle chain only needs fresh samples and the shape of the
/// instance; it never sees the secret.
pub trait SampleOracle {
    /// Dimension n of the secret
    fn n(&self) -> usize;

    /// Modulus q
    fn q(&self) -> u64;

    /// Error distribution of the samples
    fn noise(&self) -> &GaussianSampler;

    /// Draw one fresh sample
    fn query(&mut self) -> Result<Sample>;
}

/// LWE oracle with a secret fixed at construction.
///
/// Each query draws a uniform a ∈ Z_q^n and an error e from the injected
/// Gaussian sampler and returns (a, ⟨a, s⟩ + e mod q).
pub struct LweOracle {
    n: usize,
    q: u64,
    secret: ZqVector,
    sampler: GaussianSampler,
    rng: ChaCha20Rng,
}

impl LweOracle {
    /// Oracle with a uniformly random secret and an entropy-seeded RNG
    pub fn new(n: usize, q: u64, sampler: GaussianSampler) -> Result<Self> {
        Self::from_rng(n, q, sampler, ChaCha20Rng::from_entropy())
    }

    /// Reproducible oracle: secret and samples both derive from `seed`
    pub fn with_seed(n: usize, q: u64, sampler: GaussianSampler, seed: u64) -> Result<Self> {
        Self::from_rng(n, q, sampler, ChaCha20Rng::seed_from_u64(seed))
    }

    /// Oracle with a caller-chosen secret; n and q are taken from it
    pub fn with_secret(secret: ZqVector, sampler: GaussianSampler, seed: u64) -> Result<Self> {
        let n = secret.len();
        let q = secret.modulus();
        ensure_params!(n > 0, "secret dimension must be positive");
        Ok(Self {
            n,
            q,
            secret,
            sampler,
            rng: ChaCha20Rng::seed_from_u64(seed),
        })
    }

    fn from_rng(n: usize, q: u64, sampler: GaussianSampler, mut rng: ChaCha20Rng) -> Result<Self> {
        ensure_params!(n > 0, "dimension n must be positive");
        ensure_params!(q >= 2, "modulus q must be at least 2, got {}", q);
        let secret = ZqVector::random(n, q, &mut rng)?;
        debug!(n, q, "generated uniform LWE secret");
        Ok(Self {
            n,
            q,
            secret,
            sampler,
            rng,
        })
    }

    /// The secret. Only test harnesses may look at this.
    pub fn secret(&self) -> &ZqVector {
        &self.secret
    }

    pub fn sampler(&self) -> &GaussianSampler {
        &self.sampler
    }

    /// Centred error e = c - ⟨a, s⟩ carried by `sample`
    pub fn noise_of(&self, sample: &Sample) -> Result<i64> {
        sample.check_shape(self.n, self.q)?;
        let inner = ModQ::dot(sample.a(), self.secret.coeffs(), self.q);
        Ok(ModQ::to_signed(ModQ::sub(sample.c(), inner, self.q), self.q))
    }
}

impl SampleOracle for LweOracle {
    fn n(&self) -> usize {
        self.n
    }

    fn q(&self) -> u64 {
        self.q
    }

    fn noise(&self) -> &GaussianSampler {
        &self.sampler
    }

    fn query(&mut self) -> Result<Sample> {
        let a = ZqVector::random(self.n, self.q, &mut self.rng)?;
        let e = self.sampler.sample_mod(&mut self.rng, self.q)?;
        let c = ModQ::add(a.dot(&self.secret)?, e, self.q);
        Sample::new(a, c)
    }
}

impl std::fmt::Debug for LweOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LweOracle")
            .field("n", &self.n)
            .field("q", &self.q)
            .field("sampler", &self.sampler)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BkwError;

    const N: usize = 8;
    const Q: u64 = 19;

    fn sampler() -> GaussianSampler {
        GaussianSampler::new(2.5, 10.0).unwrap()
    }

    #[test]
    fn test_invalid_shape() {
        assert!(matches!(
            LweOracle::with_seed(0, Q, sampler(), 1),
            Err(BkwError::InvalidParameters(_))
        ));
        assert!(matches!(
            LweOracle::with_seed(N, 1, sampler(), 1),
            Err(BkwError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_sample_shape() {
        let mut oracle = LweOracle::with_seed(N, Q, sampler(), 7).unwrap();
        for _ in 0..100 {
            let s = oracle.query().unwrap();
            assert_eq!(s.n(), N);
            assert_eq!(s.modulus(), Q);
            assert!(s.as_vector().coeffs().iter().all(|&x| x < Q));
        }
    }

    #[test]
    fn test_noise_recoverable_and_in_support() {
        // q large enough that the centred residue is the actual error
        let q = 1_000_003;
        let mut oracle = LweOracle::with_seed(16, q, sampler(), 11).unwrap();
        let max = oracle.sampler().max();
        for _ in 0..1000 {
            let s = oracle.query().unwrap();
            let e = oracle.noise_of(&s).unwrap();
            assert!(e.abs() <= max, "noise {} outside ±{}", e, max);
        }
    }

    #[test]
    fn test_fixed_secret() {
        let secret = ZqVector::new(vec![3, 1, 4, 1, 5, 9, 2, 6], Q).unwrap();
        let mut oracle = LweOracle::with_secret(secret.clone(), sampler(), 5).unwrap();
        assert_eq!(oracle.secret(), &secret);
        assert_eq!(oracle.n(), 8);
        assert_eq!(oracle.q(), Q);

        let s = oracle.query().unwrap();
        let e = oracle.noise_of(&s).unwrap();
        let expected = ModQ::add(ModQ::dot(s.a(), secret.coeffs(), Q), ModQ::from_signed(e, Q), Q);
        assert_eq!(s.c(), expected);
    }

    #[test]
    fn test_seeded_oracles_agree() {
        let mut o1 = LweOracle::with_seed(N, Q, sampler(), 99).unwrap();
        let mut o2 = LweOracle::with_seed(N, Q, sampler(), 99).unwrap();
        assert_eq!(o1.secret(), o2.secret());
        for _ in 0..20 {
            assert_eq!(o1.query().unwrap(), o2.query().unwrap());
        }
    }

    #[test]
    fn test_noise_of_rejects_foreign_sample() {
        let oracle = LweOracle::with_seed(N, Q, sampler(), 1).unwrap();
        let mut other = LweOracle::with_seed(N, 23, sampler(), 1).unwrap();
        let s = other.query().unwrap();
        assert_eq!(
            oracle.noise_of(&s),
            Err(BkwError::ModulusMismatch { expected: Q, found: 23 })
        );
    }
}
