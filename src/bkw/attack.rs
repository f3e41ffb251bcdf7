//! End-to-end BKW attack: reduce, collect, decode

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::chain::OracleChain;
use super::search::{CandidateSearch, NoiseModel};
use crate::error::{ensure_params, Result};
use crate::lwe::{Sample, SampleOracle};
use crate::math::ZqVector;
use crate::params::AttackParams;

/// Result of one attack run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// Predicted last d coordinates of the secret
    pub suffix: ZqVector,
    /// Score of the predicted suffix
    pub score: f64,
    /// Terminal samples the prediction is based on
    pub samples: usize,
    /// Level-0 samples drawn from the LWE oracle
    pub oracle_queries: u64,
    /// Entries per collision table, T_1 first
    pub table_sizes: Vec<usize>,
}

/// BKW attack over one LWE oracle
#[derive(Debug)]
pub struct Bkw<O> {
    chain: OracleChain<O>,
    samples: usize,
    noise: NoiseModel,
}

impl<O: SampleOracle> Bkw<O> {
    /// Set up the oracle chain for `params`.
    ///
    /// The oracle's (n, q) must match the parameters.
    pub fn new(oracle: O, params: &AttackParams) -> Result<Self> {
        params.validate()?;
        ensure_params!(
            oracle.n() == params.n && oracle.q() == params.q,
            "oracle is over Z_{}^{} but parameters describe Z_{}^{}",
            oracle.q(),
            oracle.n(),
            params.q,
            params.n
        );
        let noise = NoiseModel::new(oracle.noise().sigma(), oracle.noise().tail())?;
        let chain = OracleChain::new(oracle, params.b, params.d)?
            .with_query_budget(params.max_oracle_queries);
        Ok(Self {
            chain,
            samples: params.samples,
            noise,
        })
    }

    pub fn chain(&self) -> &OracleChain<O> {
        &self.chain
    }

    /// Draw `count` samples from the terminal level
    pub fn collect(&mut self, count: usize) -> Result<Vec<Sample>> {
        let levels = self.chain.levels();
        (0..count).map(|_| self.chain.query(levels)).collect()
    }

    /// Run reduction and decoding once
    pub fn run(&mut self) -> Result<AttackOutcome> {
        let start = Instant::now();
        let levels = self.chain.levels();
        let d = self.chain.suffix_len();
        let q = self.chain.oracle().q();

        let samples = self.collect(self.samples)?;
        info!(
            samples = samples.len(),
            oracle_queries = self.chain.oracle_queries(),
            elapsed = ?start.elapsed(),
            "collected terminal samples"
        );

        let search = CandidateSearch::new(q, d, self.noise.grown(levels))?;
        let best = search.run(&samples)?;
        info!(suffix = ?best.suffix.coeffs(), score = best.score, elapsed = ?start.elapsed(), "attack finished");

        Ok(AttackOutcome {
            suffix: best.suffix,
            score: best.score,
            samples: samples.len(),
            oracle_queries: self.chain.oracle_queries(),
            table_sizes: (1..=levels).map(|l| self.chain.table_len(l)).collect(),
        })
    }

    pub fn into_oracle(self) -> O {
        self.chain.into_oracle()
    }
}
