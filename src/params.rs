//! Attack parameter sets
//!
//! One `AttackParams` value fixes everything an attack run needs: the LWE
//! instance shape (n, q), the error distribution (σ, tail multiplier), the
//! BKW windows (b, d), the number of terminal samples and the loop bounds.

use serde::{Deserialize, Serialize};

use crate::bkw::chain::{level_count, DEFAULT_QUERY_BUDGET};
use crate::error::{ensure_params, Result};
use crate::math::gaussian::DEFAULT_MAX_RESTARTS;
use crate::math::{GaussianSampler, ModQ};

/// Parameters of one BKW attack run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackParams {
    /// Secret dimension n
    pub n: usize,

    /// Modulus q
    pub q: u64,

    /// Standard deviation of the LWE error
    pub sigma: f64,

    /// Tail multiplier m: errors are truncated at ±⌈mσ⌉
    pub tail: f64,

    /// Window width b (1 ≤ b ≤ n)
    pub b: usize,

    /// Length d of the secret suffix left after reduction
    pub d: usize,

    /// Terminal samples collected before decoding (m')
    pub samples: usize,

    /// Knuth-Yao walk restarts before the sampler gives up
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,

    /// Level-0 samples one terminal query may consume
    #[serde(default = "default_max_oracle_queries")]
    pub max_oracle_queries: u64,

    /// Seed for the oracle RNG; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_restarts() -> u32 {
    DEFAULT_MAX_RESTARTS
}

fn default_max_oracle_queries() -> u64 {
    DEFAULT_QUERY_BUDGET
}

impl AttackParams {
    /// Reference instance: n = 8, q = 19, σ = 2.5, b = 2, d = 1 and 500
    /// terminal samples.
    ///
    /// After four levels the error has σ' = 10, which is close to uniform
    /// mod 19; lower σ for a reliable recovery.
    pub fn toy() -> Self {
        Self {
            n: 8,
            q: 19,
            sigma: 2.5,
            tail: 10.0,
            b: 2,
            d: 1,
            samples: 500,
            max_restarts: DEFAULT_MAX_RESTARTS,
            max_oracle_queries: DEFAULT_QUERY_BUDGET,
            seed: None,
        }
    }

    /// Composite-modulus demo instance (q = 10)
    pub fn demo_q10() -> Self {
        Self {
            q: 10,
            ..Self::toy()
        }
    }

    /// Number of reduction levels a = ⌈n/b⌉
    pub fn levels(&self) -> Result<usize> {
        level_count(self.n, self.b, self.d)
    }

    /// Error sampler described by these parameters
    pub fn sampler(&self) -> Result<GaussianSampler> {
        Ok(GaussianSampler::new(self.sigma, self.tail)?.with_max_restarts(self.max_restarts))
    }

    /// Check every construction-time precondition up front
    pub fn validate(&self) -> Result<()> {
        ensure_params!(self.n > 0, "dimension n must be positive");
        ensure_params!(self.q >= 2, "modulus q must be at least 2, got {}", self.q);
        ensure_params!(
            self.sigma.is_finite() && self.sigma > 0.0,
            "sigma must be positive, got {}",
            self.sigma
        );
        ensure_params!(
            self.tail.is_finite() && self.tail > 0.0,
            "tail multiplier must be positive, got {}",
            self.tail
        );
        ensure_params!(self.samples > 0, "at least one terminal sample is required");
        ensure_params!(self.max_oracle_queries > 0, "oracle query budget must be positive");
        self.levels()?;
        ensure_params!(
            ModQ::checked_pow(self.q, self.d).is_some(),
            "q^d = {}^{} candidates is too many to enumerate",
            self.q,
            self.d
        );
        Ok(())
    }
}

impl Default for AttackParams {
    fn default() -> Self {
        Self::toy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BkwError;

    #[test]
    fn test_presets_are_valid() {
        assert!(AttackParams::toy().validate().is_ok());
        assert!(AttackParams::demo_q10().validate().is_ok());
        assert_eq!(AttackParams::toy().levels(), Ok(4));
        assert_eq!(AttackParams::default(), AttackParams::toy());
    }

    #[test]
    fn test_validate_rejects() {
        let bad_q = AttackParams { q: 1, ..AttackParams::toy() };
        assert!(matches!(bad_q.validate(), Err(BkwError::InvalidParameters(_))));

        let bad_sigma = AttackParams { sigma: -2.5, ..AttackParams::toy() };
        assert!(matches!(bad_sigma.validate(), Err(BkwError::InvalidParameters(_))));

        let bad_window = AttackParams { d: 3, ..AttackParams::toy() };
        assert_eq!(
            bad_window.validate(),
            Err(BkwError::InvalidWindow { n: 8, b: 2, d: 3 })
        );

        let no_samples = AttackParams { samples: 0, ..AttackParams::toy() };
        assert!(no_samples.validate().is_err());
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{"n": 8, "q": 19, "sigma": 2.5, "tail": 10.0, "b": 2, "d": 1, "samples": 500}"#;
        let params: AttackParams = serde_json::from_str(json).unwrap();
        assert_eq!(params, AttackParams::toy());

        let roundtrip: AttackParams =
            serde_json::from_str(&serde_json::to_string(&params).unwrap()).unwrap();
        assert_eq!(roundtrip, params);
    }

    #[test]
    fn test_sampler_from_params() {
        let params = AttackParams { max_restarts: 7, ..AttackParams::toy() };
        let sampler = params.sampler().unwrap();
        assert_eq!(sampler.max(), 25);
        assert_eq!(sampler.max_restarts(), 7);
    }
}
