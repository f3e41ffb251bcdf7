//! BKW: solving Learning-With-Errors by collision-based reduction
//!
//! This crate implements the Blum-Kalai-Wasserman attack on LWE together
//! with the pieces it runs on:
//!
//! - Knuth-Yao discrete Gaussian sampler for LWE errors
//! - LWE oracle holding a fixed secret
//! - Chain of B-oracles that zero the secret's coordinates window by window
//! - Log-likelihood candidate search over the surviving secret suffix

pub mod bkw;
pub mod error;
pub mod lwe;
pub mod math;
pub mod params;

pub use bkw::{AttackOutcome, Bkw, Candidate, CandidateSearch, NoiseModel, OracleChain};
pub use error::{BkwError, Result};
pub use lwe::{LweOracle, Sample, SampleOracle};
pub use math::{GaussianSampler, ZqVector};
pub use params::AttackParams;
