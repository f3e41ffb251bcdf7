//! The chain of BKW "B-oracles"
//!
//! Oracle level 0 is the LWE oracle itself. Oracle level l (0 < l ≤ a)
//! draws samples from level l - 1 and pairs up samples whose window
//! [b(l-1), bl) agrees up to sign, returning their difference or sum so the
//! window becomes zero. The terminal level a eliminates [b(a-1), n-d)
//! instead, leaving the last d coordinates and the right-hand value.
//!
//! Logically `query(l)` recurses into `query(l - 1)`. It is evaluated
//! here as a loop over a (sample, level) state: a sample that reaches level
//! k is either reduced to level k, or stored in T_k, in which case a fresh
//! sample starts again from level 0. Stack use does not depend on a.

use std::ops::Range;

use tracing::{debug, trace};

use super::table::{Collision, CollisionTable};
use crate::error::{BkwError, Result};
use crate::lwe::{Sample, SampleOracle};

/// Default bound on level-0 samples drawn by one top-level query
pub const DEFAULT_QUERY_BUDGET: u64 = 1 << 24;

/// Validate (n, b, d) and return the level count a = ⌈n/b⌉.
///
/// Requires 1 ≤ b ≤ n and d ≤ n - b(a-1), i.e. the terminal window
/// [b(a-1), n-d) has non-negative length. Since n - b(a-1) ≤ b this also
/// bounds d by b; d = b is only possible when b divides n, and then the
/// terminal window is empty.
pub fn level_count(n: usize, b: usize, d: usize) -> Result<usize> {
    if b == 0 || b > n {
        return Err(BkwError::InvalidWindow { n, b, d });
    }
    let a = n.div_ceil(b);
    let last_start = b * (a - 1);
    if d > n - last_start {
        return Err(BkwError::InvalidWindow { n, b, d });
    }
    Ok(a)
}

/// The series of B-oracles over one LWE oracle
pub struct OracleChain<O> {
    oracle: O,
    n: usize,
    b: usize,
    d: usize,
    levels: usize,
    /// `tables[l - 1]` is T_l
    tables: Vec<CollisionTable>,
    budget: u64,
    oracle_queries: u64,
}

impl<O: SampleOracle> OracleChain<O> {
    /// Chain with window width `b` and terminal window length `d`
    pub fn new(oracle: O, b: usize, d: usize) -> Result<Self> {
        let n = oracle.n();
        let q = oracle.q();
        let levels = level_count(n, b, d)?;
        let tables = (1..=levels)
            .map(|l| CollisionTable::new(q, window_for(n, b, d, levels, l)))
            .collect();

        debug!(n, q, b, d, levels, "built BKW oracle chain");
        Ok(Self {
            oracle,
            n,
            b,
            d,
            levels,
            tables,
            budget: DEFAULT_QUERY_BUDGET,
            oracle_queries: 0,
        })
    }

    /// Bound the level-0 samples one top-level `query` may draw
    pub fn with_query_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    /// Number of reduction levels a = ⌈n/b⌉
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Length d of the surviving suffix
    pub fn suffix_len(&self) -> usize {
        self.d
    }

    /// Coordinates zeroed by level `l` (1 ≤ l ≤ a)
    pub fn window(&self, l: usize) -> Range<usize> {
        window_for(self.n, self.b, self.d, self.levels, l)
    }

    /// Entries in T_l, or 0 for levels without a table
    pub fn table_len(&self, l: usize) -> usize {
        if l == 0 || l > self.levels {
            return 0;
        }
        self.tables[l - 1].len()
    }

    /// Level-0 samples drawn over the chain's lifetime
    pub fn oracle_queries(&self) -> u64 {
        self.oracle_queries
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Sample from oracle level `l`; levels above a are clamped to a.
    ///
    /// Every returned sample is zero on the windows of levels 1..=l.
    pub fn query(&mut self, l: usize) -> Result<Sample> {
        let target = l.min(self.levels);
        let mut drawn: u64 = 0;

        let mut sample = self.draw(&mut drawn)?;
        let mut reached = 0;
        while reached < target {
            let level = reached + 1;
            if sample.is_zero_on(self.window(level)) {
                reached = level;
                continue;
            }

            match self.tables[level - 1].offer(&sample)? {
                Collision::Equal(stored) => {
                    sample = sample.sub(&stored)?;
                    reached = level;
                }
                Collision::Negated(stored) => {
                    sample = sample.add(&stored)?;
                    reached = level;
                }
                Collision::Inserted => {
                    trace!(level, size = self.tables[level - 1].len(), "stored sample");
                    sample = self.draw(&mut drawn)?;
                    reached = 0;
                }
            }
        }

        if target == self.levels {
            debug!(level = target, drawn, "terminal sample");
        }
        Ok(sample)
    }

    fn draw(&mut self, drawn: &mut u64) -> Result<Sample> {
        if *drawn >= self.budget {
            return Err(BkwError::QueryBudgetExhausted { budget: self.budget });
        }
        *drawn += 1;
        self.oracle_queries += 1;
        self.oracle.query()
    }
}

/// Window of level `l` for a chain over (n, b, d) with `levels` levels
fn window_for(n: usize, b: usize, d: usize, levels: usize, l: usize) -> Range<usize> {
    if l == levels {
        b * (l - 1)..n - d
    } else {
        b * (l - 1)..b * l
    }
}

impl<O> std::fmt::Debug for OracleChain<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleChain")
            .field("n", &self.n)
            .field("b", &self.b)
            .field("d", &self.d)
            .field("levels", &self.levels)
            .field("oracle_queries", &self.oracle_queries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lwe::LweOracle;
    use crate::math::GaussianSampler;

    fn oracle(n: usize, q: u64, seed: u64) -> LweOracle {
        let sampler = GaussianSampler::new(2.5, 10.0).unwrap();
        LweOracle::with_seed(n, q, sampler, seed).unwrap()
    }

    #[test]
    fn test_level_count() {
        assert_eq!(level_count(8, 2, 1), Ok(4));
        assert_eq!(level_count(8, 3, 1), Ok(3));
        assert_eq!(level_count(8, 1, 0), Ok(8));
        assert_eq!(level_count(8, 8, 7), Ok(1));
        // d = b with b | n: terminal window is empty
        assert_eq!(level_count(8, 2, 2), Ok(4));
    }

    #[test]
    fn test_invalid_windows() {
        for (n, b, d) in [(8, 0, 0), (8, 9, 0), (8, 2, 3), (7, 3, 2), (8, 3, 3)] {
            assert_eq!(
                level_count(n, b, d),
                Err(BkwError::InvalidWindow { n, b, d }),
                "n = {}, b = {}, d = {}",
                n,
                b,
                d
            );
        }
        assert!(OracleChain::new(oracle(8, 19, 1), 2, 3).is_err());
    }

    #[test]
    fn test_windows_partition_prefix() {
        let chain = OracleChain::new(oracle(8, 19, 1), 3, 1).unwrap();
        assert_eq!(chain.levels(), 3);
        assert_eq!(chain.window(1), 0..3);
        assert_eq!(chain.window(2), 3..6);
        assert_eq!(chain.window(3), 6..7);
    }

    #[test]
    fn test_every_level_zeroes_its_windows() {
        let mut chain = OracleChain::new(oracle(8, 19, 2), 2, 1).unwrap();
        for l in 0..=chain.levels() {
            for _ in 0..20 {
                let s = chain.query(l).unwrap();
                for k in 1..=l {
                    assert!(
                        s.is_zero_on(chain.window(k)),
                        "level {} sample not zero on window {:?}",
                        l,
                        chain.window(k)
                    );
                }
            }
        }
        assert!(chain.table_len(1) > 0);
        assert!(chain.oracle_queries() > 0);
    }

    #[test]
    fn test_level_zero_is_the_oracle() {
        let mut chain = OracleChain::new(oracle(8, 19, 3), 2, 1).unwrap();
        let mut reference = oracle(8, 19, 3);
        for _ in 0..5 {
            assert_eq!(chain.query(0).unwrap(), reference.query().unwrap());
        }
        assert_eq!(chain.table_len(1), 0);
    }

    #[test]
    fn test_levels_above_a_are_clamped() {
        let mut chain = OracleChain::new(oracle(6, 11, 4), 2, 1).unwrap();
        let s = chain.query(100).unwrap();
        assert!(s.is_zero_on(0..5));
    }

    #[test]
    fn test_query_budget() {
        let mut chain = OracleChain::new(oracle(8, 19, 5), 2, 1)
            .unwrap()
            .with_query_budget(1);
        assert_eq!(
            chain.query(4),
            Err(BkwError::QueryBudgetExhausted { budget: 1 })
        );
    }

    #[test]
    fn test_table_len_out_of_range() {
        let chain = OracleChain::new(oracle(8, 19, 6), 2, 1).unwrap();
        assert_eq!(chain.table_len(0), 0);
        assert_eq!(chain.table_len(5), 0);
    }
}
