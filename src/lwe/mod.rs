//! LWE (Learning With Errors) samples and the oracle that produces them.
//!
//! A sample is a pair (a, c) with a uniform in Z_q^n and
//!
//! ```text
//! c = <a, s> + e  (mod q)
//! ```
//!
//! where s is the oracle's fixed secret and e is drawn from a discrete
//! Gaussian. Samples are stored as one vector of length n + 1 with c last.
//!
//! # Example
//!
//! ```
//! use bkw_lwe::lwe::{LweOracle, SampleOracle};
//! use bkw_lwe::math::GaussianSampler;
//!
//! let sampler = GaussianSampler::new(2.5, 10.0).unwrap();
//! let mut oracle = LweOracle::with_seed(8, 19, sampler, 42).unwrap();
//! let sample = oracle.query().unwrap();
//! assert_eq!(sample.n(), 8);
//! ```

mod oracle;
mod types;

pub use oracle::{LweOracle, SampleOracle};
pub use types::Sample;
