//! BKW (Blum-Kalai-Wasserman) reduction and decoding.
//!
//! # Pipeline
//!
//! 1. **Chain**: a = ⌈n/b⌉ B-oracles, each zeroing one window of b
//!    coordinates by pairing samples that collide up to sign
//! 2. **Collect**: m' samples from the terminal level, nonzero only on the
//!    last d coordinates
//! 3. **Search**: score every v ∈ Z_q^d by log-likelihood ratio and keep
//!    the best one
//!
//! The output is a statistical guess, not an exact recovery: its success
//! rate depends on m' and on how much the noise grew over a levels.
//!
//! # Example
//!
//! ```
//! use bkw_lwe::bkw::Bkw;
//! use bkw_lwe::lwe::LweOracle;
//! use bkw_lwe::params::AttackParams;
//!
//! let params = AttackParams { samples: 50, ..AttackParams::toy() };
//! let oracle = LweOracle::with_seed(params.n, params.q, params.sampler().unwrap(), 7).unwrap();
//! let mut attack = Bkw::new(oracle, &params).unwrap();
//! let outcome = attack.run().unwrap();
//! assert_eq!(outcome.suffix.len(), params.d);
//! ```

pub mod attack;
pub mod chain;
pub mod search;
pub mod table;

pub use attack::{AttackOutcome, Bkw};
pub use chain::OracleChain;
pub use search::{Candidate, CandidateSearch, NoiseModel};
pub use table::{Collision, CollisionTable, WindowKey};
