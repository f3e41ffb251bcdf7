//! Vectors over Z_q that remember their modulus
//!
//! Every binary operation checks that both operands were built under the
//! same modulus and have the same length, so a vector from one attack run
//! can never be silently mixed into another.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::modular::ModQ;
use crate::error::{BkwError, Result};

/// Vector in Z_q^len with its modulus attached
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZqVector {
    coeffs: Vec<u64>,
    q: u64,
}

impl ZqVector {
    /// Build a vector from residues, reducing every entry mod q
    pub fn new(coeffs: Vec<u64>, q: u64) -> Result<Self> {
        if q < 2 {
            return Err(BkwError::invalid(format!("modulus must be at least 2, got {}", q)));
        }
        let coeffs = coeffs.into_iter().map(|c| c % q).collect();
        Ok(Self { coeffs, q })
    }

    /// Build a vector from signed integers, mapping each into Z_q
    pub fn from_signed(values: &[i64], q: u64) -> Result<Self> {
        Self::new(values.iter().map(|&v| ModQ::from_signed(v, q)).collect(), q)
    }

    /// The zero vector of length `len`
    pub fn zero(len: usize, q: u64) -> Result<Self> {
        Self::new(vec![0; len], q)
    }

    /// Uniformly random vector in Z_q^len
    pub fn random<R: rand::Rng + ?Sized>(len: usize, q: u64, rng: &mut R) -> Result<Self> {
        Self::new((0..len).map(|_| rng.gen_range(0..q)).collect(), q)
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn modulus(&self) -> u64 {
        self.q
    }

    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    pub fn into_coeffs(self) -> Vec<u64> {
        self.coeffs
    }

    /// Fail unless `other` lives in the same Z_q^len as `self`
    pub fn check_compatible(&self, other: &ZqVector) -> Result<()> {
        self.check_modulus(other.q)?;
        if self.len() != other.len() {
            return Err(BkwError::DimensionMismatch {
                expected: self.len(),
                found: other.len(),
            });
        }
        Ok(())
    }

    /// Fail unless this vector was built under modulus `q`
    pub fn check_modulus(&self, q: u64) -> Result<()> {
        if self.q != q {
            return Err(BkwError::ModulusMismatch {
                expected: q,
                found: self.q,
            });
        }
        Ok(())
    }

    /// Fail unless this vector has length `len`
    pub fn check_len(&self, len: usize) -> Result<()> {
        if self.len() != len {
            return Err(BkwError::DimensionMismatch {
                expected: len,
                found: self.len(),
            });
        }
        Ok(())
    }

    /// Component-wise sum
    pub fn add(&self, other: &ZqVector) -> Result<Self> {
        self.check_compatible(other)?;
        let q = self.q;
        let coeffs = self
            .coeffs
            .iter()
            .zip(other.coeffs.iter())
            .map(|(&x, &y)| ModQ::add(x, y, q))
            .collect();
        Ok(Self { coeffs, q })
    }

    /// Component-wise difference
    pub fn sub(&self, other: &ZqVector) -> Result<Self> {
        self.check_compatible(other)?;
        let q = self.q;
        let coeffs = self
            .coeffs
            .iter()
            .zip(other.coeffs.iter())
            .map(|(&x, &y)| ModQ::sub(x, y, q))
            .collect();
        Ok(Self { coeffs, q })
    }

    /// Additive inverse
    pub fn negate(&self) -> Self {
        let q = self.q;
        Self {
            coeffs: self.coeffs.iter().map(|&x| ModQ::negate(x, q)).collect(),
            q,
        }
    }

    /// Inner product ⟨self, other⟩ mod q
    pub fn dot(&self, other: &ZqVector) -> Result<u64> {
        self.check_compatible(other)?;
        Ok(ModQ::dot(&self.coeffs, &other.coeffs, self.q))
    }

    /// Entries in `range` as a new vector.
    ///
    /// An empty or reversed range yields the empty vector; an end past the
    /// vector is a dimension mismatch.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start >= range.end {
            return Ok(Self { coeffs: Vec::new(), q: self.q });
        }
        if range.end > self.len() {
            return Err(BkwError::DimensionMismatch {
                expected: range.end,
                found: self.len(),
            });
        }
        Ok(Self {
            coeffs: self.coeffs[range].to_vec(),
            q: self.q,
        })
    }

    /// True when every entry in `range` is zero (vacuously for empty ranges)
    pub fn is_zero_on(&self, range: Range<usize>) -> bool {
        if range.start >= range.end {
            return true;
        }
        let end = range.end.min(self.len());
        self.coeffs[range.start.min(end)..end].iter().all(|&c| c == 0)
    }

    /// Canonical big-endian digit encoding.
    ///
    /// Each residue takes `residue_width(q)` bytes, so equal vectors under
    /// the same modulus and length always encode to the same bytes.
    pub fn encode(&self) -> Vec<u8> {
        let width = residue_width(self.q);
        let mut out = Vec::with_capacity(width * self.len());
        for &c in &self.coeffs {
            out.extend_from_slice(&c.to_be_bytes()[8 - width..]);
        }
        out
    }

    /// The vector whose enumeration rank is `rank` among Z_q^len.
    ///
    /// Rank order increments the last component first and carries towards
    /// the front, wrapping mod q.
    pub fn from_rank(mut rank: usize, len: usize, q: u64) -> Result<Self> {
        let mut coeffs = vec![0u64; len];
        for slot in coeffs.iter_mut().rev() {
            *slot = (rank as u64) % q;
            rank = (rank as u64 / q) as usize;
        }
        Self::new(coeffs, q)
    }

    /// Successor in rank order; wraps from the all-(q-1) vector to zero.
    pub fn next(&self) -> Self {
        let mut result = self.clone();
        for slot in result.coeffs.iter_mut().rev() {
            *slot = ModQ::add(*slot, 1, self.q);
            if *slot != 0 {
                break;
            }
        }
        result
    }
}

/// Bytes needed to store any residue in `[0, q)`
pub fn residue_width(q: u64) -> usize {
    let bits = 64 - q.saturating_sub(1).leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const Q: u64 = 19;

    fn v(coeffs: &[u64]) -> ZqVector {
        ZqVector::new(coeffs.to_vec(), Q).unwrap()
    }

    #[test]
    fn test_new_reduces() {
        assert_eq!(v(&[19, 20, 38]).coeffs(), &[0, 1, 0]);
        assert!(ZqVector::new(vec![1], 1).is_err());
    }

    #[test]
    fn test_add_sub_negate() {
        let x = v(&[1, 18, 5]);
        let y = v(&[18, 2, 5]);
        assert_eq!(x.add(&y).unwrap().coeffs(), &[0, 1, 10]);
        assert_eq!(x.sub(&y).unwrap().coeffs(), &[2, 16, 0]);
        assert_eq!(x.negate().coeffs(), &[18, 1, 14]);
        assert!(x.add(&x.negate()).unwrap().is_zero_on(0..3));
    }

    #[test]
    fn test_modulus_mismatch_detected() {
        let x = v(&[1, 2]);
        let y = ZqVector::new(vec![1, 2], 10).unwrap();
        assert_eq!(
            x.add(&y),
            Err(BkwError::ModulusMismatch { expected: 19, found: 10 })
        );
    }

    #[test]
    fn test_dimension_mismatch_detected() {
        let x = v(&[1, 2]);
        let y = v(&[1, 2, 3]);
        assert_eq!(
            x.dot(&y),
            Err(BkwError::DimensionMismatch { expected: 2, found: 3 })
        );
    }

    #[test]
    fn test_slice_and_zero_window() {
        let x = v(&[0, 0, 7, 0]);
        assert_eq!(x.slice(1..3).unwrap().coeffs(), &[0, 7]);
        assert!(x.slice(3..3).unwrap().is_empty());
        assert!(x.slice(2..5).is_err());
        assert!(x.is_zero_on(0..2));
        assert!(!x.is_zero_on(1..3));
        assert!(x.is_zero_on(3..3));
        assert!(x.is_zero_on(3..1));
    }

    #[test]
    fn test_encoding_width() {
        assert_eq!(residue_width(2), 1);
        assert_eq!(residue_width(256), 1);
        assert_eq!(residue_width(257), 2);
        assert_eq!(residue_width(1 << 40), 5);
        assert_eq!(v(&[1, 18]).encode(), vec![1, 18]);

        let wide = ZqVector::new(vec![1, 300], 1000).unwrap();
        assert_eq!(wide.encode(), vec![0, 1, 1, 44]);
    }

    #[test]
    fn test_enumeration_order() {
        let start = ZqVector::zero(2, 3).unwrap();
        let mut seen = vec![start.clone()];
        let mut cur = start.next();
        while cur != start {
            seen.push(cur.clone());
            cur = cur.next();
        }
        assert_eq!(seen.len(), 9);
        assert_eq!(seen[1].coeffs(), &[0, 1]);
        assert_eq!(seen[3].coeffs(), &[1, 0]);
        for (rank, vec) in seen.iter().enumerate() {
            assert_eq!(&ZqVector::from_rank(rank, 2, 3).unwrap(), vec);
        }
    }

    #[test]
    fn test_random_in_range() {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(7);
        let r = ZqVector::random(64, Q, &mut rng).unwrap();
        assert_eq!(r.len(), 64);
        assert!(r.coeffs().iter().all(|&c| c < Q));
    }
}
