//! Per-level collision tables

use std::collections::HashMap;
use std::ops::Range;

use crate::error::{BkwError, Result};
use crate::lwe::Sample;
use crate::math::vector::residue_width;
use crate::math::ZqVector;

/// Canonical encoding of a window slice.
///
/// Fixed-width big-endian digits under the table's modulus, so two slices
/// collide exactly when they are equal in Z_q^width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowKey(Vec<u8>);

/// Outcome of offering a sample to a collision table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collision {
    /// A stored sample has the same window; subtract it
    Equal(Sample),
    /// A stored sample has the negated window; add it
    Negated(Sample),
    /// No partner yet; the offered sample was stored
    Inserted,
}

/// Collision table T_l for one BKW level.
///
/// Maps the window slice of a sample to the first sample seen with that
/// slice. Entries are never evicted, so memory grows with the number of
/// distinct slices seen (at most q^width).
#[derive(Debug, Clone)]
pub struct CollisionTable {
    q: u64,
    window: Range<usize>,
    entries: HashMap<WindowKey, Sample>,
}

impl CollisionTable {
    pub fn new(q: u64, window: Range<usize>) -> Self {
        Self {
            q,
            window,
            entries: HashMap::new(),
        }
    }

    pub fn window(&self) -> Range<usize> {
        self.window.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode a slice of this table's window.
    ///
    /// The slice must be built under the table's modulus and span exactly
    /// the window width.
    pub fn key(&self, slice: &ZqVector) -> Result<WindowKey> {
        slice.check_modulus(self.q)?;
        slice.check_len(self.window.len())?;
        debug_assert_eq!(slice.encode().len(), self.window.len() * residue_width(self.q));
        Ok(WindowKey(slice.encode()))
    }

    /// Look up `sample`'s window, storing the sample if neither the slice
    /// nor its negation is present.
    ///
    /// An equal slice is checked before the negated one, so when both exist
    /// (possible when a slice equals its own negation) the equal match wins.
    pub fn offer(&mut self, sample: &Sample) -> Result<Collision> {
        if sample.modulus() != self.q {
            return Err(BkwError::ModulusMismatch {
                expected: self.q,
                found: sample.modulus(),
            });
        }
        let slice = sample.window(self.window.clone())?;
        let key = self.key(&slice)?;
        if let Some(stored) = self.entries.get(&key) {
            return Ok(Collision::Equal(stored.clone()));
        }
        let negated = self.key(&slice.negate())?;
        if let Some(stored) = self.entries.get(&negated) {
            return Ok(Collision::Negated(stored.clone()));
        }
        self.entries.insert(key, sample.clone());
        Ok(Collision::Inserted)
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
    fn test_insert_then_equal() {
        let mut table = CollisionTable::new(Q, 0..2);
        let first = sample(&[3, 4, 1], 5);
        assert_eq!(table.offer(&first).unwrap(), Collision::Inserted);
        assert_eq!(table.len(), 1);

        let second = sample(&[3, 4, 9], 2);
        assert_eq!(table.offer(&second).unwrap(), Collision::Equal(first));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_negated_match() {
        let mut table = CollisionTable::new(Q, 1..3);
        let first = sample(&[7, 3, 4], 5);
        table.offer(&first).unwrap();
        let second = sample(&[0, 16, 15], 1);
        assert_eq!(table.offer(&second).unwrap(), Collision::Negated(first));
    }

    #[test]
    fn test_equal_wins_over_negated() {
        // q even: 5 is its own negation mod 10
        let mut table = CollisionTable::new(10, 0..1);
        let first = Sample::new(ZqVector::new(vec![5, 1], 10).unwrap(), 0).unwrap();
        table.offer(&first).unwrap();
        let second = Sample::new(ZqVector::new(vec![5, 2], 10).unwrap(), 0).unwrap();
        assert_eq!(table.offer(&second).unwrap(), Collision::Equal(first));
    }

    #[test]
    fn test_modulus_checked_on_offer() {
        let mut table = CollisionTable::new(Q, 0..1);
        let foreign = Sample::new(ZqVector::new(vec![1, 2], 23).unwrap(), 0).unwrap();
        assert_eq!(
            table.offer(&foreign),
            Err(BkwError::ModulusMismatch { expected: Q, found: 23 })
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_key_checks_width() {
        let table = CollisionTable::new(Q, 0..2);
        let slice = ZqVector::new(vec![1, 2, 3], Q).unwrap();
        assert_eq!(
            table.key(&slice),
            Err(BkwError::DimensionMismatch { expected: 2, found: 3 })
        );
        let ok = ZqVector::new(vec![1, 2], Q).unwrap();
        let reduced = ZqVector::new(vec![20, 21], Q).unwrap();
        assert_eq!(table.key(&ok).unwrap(), table.key(&reduced).unwrap());
    }
}
