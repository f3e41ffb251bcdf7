//! Mathematical primitives for the BKW attack.
//!
//! - **Modular arithmetic** over Z_q on plain `u64` residues
//! - **Vectors over Z_q** that carry their modulus, with slicing,
//!   canonical byte encoding and rank-order enumeration
//! - **Discrete Gaussian sampling** with the Knuth-Yao algorithm
//!
//! # Example
//!
//! ```
//! use bkw_lwe::math::{GaussianSampler, ZqVector};
//! use rand::SeedableRng;
//!
//! let sampler = GaussianSampler::new(2.5, 10.0).unwrap();
//! let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(1);
//! let e = sampler.sample(&mut rng).unwrap();
//! assert!(e.abs() <= sampler.max());
//!
//! let v = ZqVector::new(vec![1, 2, 3], 19).unwrap();
//! assert_eq!(v.dot(&v).unwrap(), 14);
//! ```

pub mod gaussian;
pub mod modular;
pub mod vector;

pub use gaussian::GaussianSampler;
pub use modular::ModQ;
pub use vector::ZqVector;
