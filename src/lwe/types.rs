//! LWE sample type

use serde::{Deserialize, Serialize};

use crate::error::{BkwError, Result};
use crate::math::ZqVector;

/// LWE sample (a, c) with c = ⟨a, s⟩ + e, stored as one length-(n + 1)
/// vector whose last entry is c.
///
/// Samples are immutable: reduction produces new samples by adding or
/// subtracting whole vectors, which keeps c consistent with a.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    inner: ZqVector,
}

impl Sample {
    /// Assemble a sample from its `a` part and right-hand value `c`
    pub fn new(a: ZqVector, c: u64) -> Result<Self> {
        let q = a.modulus();
        let mut coeffs = a.into_coeffs();
        coeffs.push(c);
        Ok(Self {
            inner: ZqVector::new(coeffs, q)?,
        })
    }

    /// Dimension n of the `a` part
    pub fn n(&self) -> usize {
        self.inner.len() - 1
    }

    pub fn modulus(&self) -> u64 {
        self.inner.modulus()
    }

    /// The `a` part as residues
    pub fn a(&self) -> &[u64] {
        let n = self.n();
        &self.inner.coeffs()[..n]
    }

    /// The right-hand value c
    pub fn c(&self) -> u64 {
        self.inner.coeffs()[self.n()]
    }

    /// The full (a, c) vector
    pub fn as_vector(&self) -> &ZqVector {
        &self.inner
    }

    /// Fail unless this sample has dimension `n` over Z_q
    pub fn check_shape(&self, n: usize, q: u64) -> Result<()> {
        self.inner.check_modulus(q)?;
        self.inner.check_len(n + 1)
    }

    /// Sample whose noise is the sum of both noises
    pub fn add(&self, other: &Sample) -> Result<Self> {
        Ok(Self {
            inner: self.inner.add(&other.inner)?,
        })
    }

    /// Sample whose noise is the difference of both noises
    pub fn sub(&self, other: &Sample) -> Result<Self> {
        Ok(Self {
            inner: self.inner.sub(&other.inner)?,
        })
    }

    /// `a` coordinates in `window`
    pub fn window(&self, window: std::ops::Range<usize>) -> Result<ZqVector> {
        if window.end > self.n() && window.start < window.end {
            return Err(BkwError::DimensionMismatch {
                expected: window.end,
                found: self.n(),
            });
        }
        self.inner.slice(window)
    }

    /// True when the `a` part is zero on `window`
    pub fn is_zero_on(&self, window: std::ops::Range<usize>) -> bool {
        self.inner.is_zero_on(window)
    }

    /// The trailing `d` coordinates of `a`
    pub fn suffix(&self, d: usize) -> Result<ZqVector> {
        let n = self.n();
        if d > n {
            return Err(BkwError::DimensionMismatch { expected: d, found: n });
        }
        self.inner.slice(n - d..n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q: u64 = 19;

    fn sample(a: &[u64], c: u64) -> Sample {
        Sample::new(ZqVector::new(a.to_vec(), Q).unwrap(), c).unwrap()
    }

    #[test]
    fn test_parts() {
        let s = sample(&[1, 2, 3, 4], 20);
        assert_eq!(s.n(), 4);
        assert_eq!(s.a(), &[1, 2, 3, 4]);
        assert_eq!(s.c(), 1);
        assert_eq!(s.suffix(1).unwrap().coeffs(), &[4]);
        assert!(s.suffix(0).unwrap().is_empty());
        assert!(s.suffix(5).is_err());
    }

    #[test]
    fn test_window_excludes_right_hand_value() {
        let s = sample(&[0, 0, 5], 7);
        assert_eq!(s.window(1..3).unwrap().coeffs(), &[0, 5]);
        assert!(s.window(2..4).is_err());
        assert!(s.window(3..3).unwrap().is_empty());
        assert!(s.is_zero_on(0..2));
    }

    #[test]
    fn test_combination_keeps_shape() {
        let x = sample(&[1, 2], 3);
        let y = sample(&[1, 5], 4);
        let diff = x.sub(&y).unwrap();
        assert_eq!(diff.a(), &[0, 16]);
        assert_eq!(diff.c(), 18);
        assert!(diff.check_shape(2, Q).is_ok());
        assert_eq!(
            diff.check_shape(3, Q),
            Err(BkwError::DimensionMismatch { expected: 4, found: 3 })
        );
        assert_eq!(
            diff.check_shape(2, 10),
            Err(BkwError::ModulusMismatch { expected: 10, found: 19 })
        );
    }
}
