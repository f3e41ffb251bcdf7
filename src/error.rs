//! Error handling for the attack pipeline
//!
//! Every failure is a local precondition or construction failure and is
//! surfaced to the caller immediately. The only internal retry is the
//! sampler's bounded restart loop, which turns into `PrecisionExhausted`
//! once its bound is hit.

use thiserror::Error;

/// Failure taxonomy shared by the sampler, the oracle and the BKW engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BkwError {
    /// Non-positive σ, tail multiplier, modulus or dimension, or otherwise
    /// unusable construction parameters.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Window width / terminal window length combination that cannot be
    /// reduced over dimension `n`.
    #[error("invalid window: b = {b}, d = {d} for n = {n}")]
    InvalidWindow { n: usize, b: usize, d: usize },

    /// A vector built under one modulus met an operation bound to another.
    #[error("modulus mismatch: expected q = {expected}, found q = {found}")]
    ModulusMismatch { expected: u64, found: u64 },

    /// The Knuth-Yao walk did not hit within the restart bound.
    #[error("sampler precision exhausted after {restarts} restarts")]
    PrecisionExhausted { restarts: u32 },

    /// A vector length does not match the context (n, n + 1 or d).
    #[error("dimension mismatch: expected length {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// The collision search consumed more level-0 samples than allowed.
    #[error("collision search exceeded its budget of {budget} oracle queries")]
    QueryBudgetExhausted { budget: u64 },
}

impl BkwError {
    /// Create an `InvalidParameters` error from anything printable
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}

/// Result type for every fallible operation in the crate
pub type Result<T> = std::result::Result<T, BkwError>;

/// Early-return an `InvalidParameters` error with format string support
macro_rules! ensure_params {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::BkwError::InvalidParameters(format!($($arg)*)));
        }
    };
}

pub(crate) use ensure_params;
