//! Scalar arithmetic over Z_q
//!
//! Residues are plain `u64` values in `[0, q)`. Intermediate products are
//! widened to `u128` so any modulus that fits in a `u64` is safe.

/// Residue arithmetic used by samples, collision windows and scoring
pub struct ModQ;

impl ModQ {
    /// a + b mod q; combines two samples whose windows are negations
    #[inline]
    pub fn add(a: u64, b: u64, q: u64) -> u64 {
        let (sum, carry) = a.overflowing_add(b);
        if carry || sum >= q {
            sum.wrapping_sub(q)
        } else {
            sum
        }
    }

    /// a - b mod q; cancels two samples with equal windows and forms the
    /// residual ⟨a', v⟩ - c when scoring a candidate
    #[inline]
    pub fn sub(a: u64, b: u64, q: u64) -> u64 {
        match a.checked_sub(b) {
            Some(diff) => diff,
            None => a.wrapping_sub(b).wrapping_add(q),
        }
    }

    /// -a mod q, used to build the negated window key
    #[inline]
    pub fn negate(a: u64, q: u64) -> u64 {
        Self::sub(0, a, q)
    }

    /// Lift a sampled error into Z_q
    #[inline]
    pub fn from_signed(val: i64, q: u64) -> u64 {
        (i128::from(val).rem_euclid(i128::from(q))) as u64
    }

    /// Recover the integer error from its residue, choosing the
    /// representative in `(-q/2, q/2]`
    #[inline]
    pub fn to_signed(val: u64, q: u64) -> i64 {
        if val > q / 2 {
            -((q - val) as i64)
        } else {
            val as i64
        }
    }

    /// Inner product of two residue slices modulo q.
    ///
    /// Callers check lengths; a mismatch is a programming error here.
    pub fn dot(a: &[u64], b: &[u64], q: u64) -> u64 {
        debug_assert_eq!(a.len(), b.len());
        let acc = a
            .iter()
            .zip(b.iter())
            .fold(0u128, |acc, (&x, &y)| (acc + x as u128 * y as u128) % q as u128);
        acc as u64
    }

    /// q^e as a `usize`, or `None` on overflow
    pub fn checked_pow(q: u64, e: usize) -> Option<usize> {
        let base = usize::try_from(q).ok()?;
        let e = u32::try_from(e).ok()?;
        base.checked_pow(e)
    }
}
