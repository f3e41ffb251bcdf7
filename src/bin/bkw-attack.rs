//! bkw-attack: run the BKW attack against a freshly generated LWE instance
//!
//! Builds an LWE oracle with a random secret, runs the reduction and the
//! candidate search, and reports the predicted secret suffix next to the
//! true one.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bkw_lwe::{AttackParams, Bkw, LweOracle};

#[derive(Parser)]
#[command(name = "bkw-attack")]
#[command(about = "Recover an LWE secret suffix with the BKW algorithm")]
#[command(version)]
struct Args {
    /// JSON file with attack parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Secret dimension n
    #[arg(long)]
    n: Option<usize>,

    /// Modulus q
    #[arg(long)]
    q: Option<u64>,

    /// Error standard deviation
    #[arg(long)]
    sigma: Option<f64>,

    /// Error tail multiplier
    #[arg(long)]
    tail: Option<f64>,

    /// Window width b
    #[arg(short, long)]
    b: Option<usize>,

    /// Length d of the recovered suffix
    #[arg(short, long)]
    d: Option<usize>,

    /// Terminal samples collected before decoding
    #[arg(long)]
    samples: Option<usize>,

    /// Random seed for a reproducible instance
    #[arg(long)]
    seed: Option<u64>,

    /// Repeat the attack on fresh instances and report the success rate
    #[arg(long, default_value = "1")]
    trials: usize,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn params(&self) -> Result<AttackParams> {
        let mut params = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open config {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => AttackParams::toy(),
        };

        if let Some(n) = self.n {
            params.n = n;
        }
        if let Some(q) = self.q {
            params.q = q;
        }
        if let Some(sigma) = self.sigma {
            params.sigma = sigma;
        }
        if let Some(tail) = self.tail {
            params.tail = tail;
        }
        if let Some(b) = self.b {
            params.b = b;
        }
        if let Some(d) = self.d {
            params.d = d;
        }
        if let Some(samples) = self.samples {
            params.samples = samples;
        }
        if self.seed.is_some() {
            params.seed = self.seed;
        }

        params
            .validate()
            .map_err(|e| eyre::eyre!("Invalid parameters: {}", e))?;
        Ok(params)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let params = args.params()?;
    info!(
        "n = {}, q = {}, sigma = {}, b = {}, d = {}, m' = {}, levels = {}",
        params.n,
        params.q,
        params.sigma,
        params.b,
        params.d,
        params.samples,
        params.levels()?
    );

    let total_start = Instant::now();
    let mut hits = 0;
    for trial in 0..args.trials {
        let sampler = params.sampler()?;
        let oracle = match params.seed {
            Some(seed) => LweOracle::with_seed(params.n, params.q, sampler, seed + trial as u64),
            None => LweOracle::new(params.n, params.q, sampler),
        }
        .with_context(|| "Failed to build LWE oracle")?;

        let mut attack = Bkw::new(oracle, &params).with_context(|| "Failed to set up BKW")?;
        let outcome = attack.run().with_context(|| format!("Attack trial {} failed", trial))?;

        let oracle = attack.into_oracle();
        let secret = oracle.secret().coeffs();
        let truth = &secret[params.n - params.d..];
        let hit = outcome.suffix.coeffs() == truth;
        if hit {
            hits += 1;
        }

        info!(
            "trial {}: predicted {:?}, actual {:?}, score {:.4}, oracle queries {}, tables {:?}",
            trial,
            outcome.suffix.coeffs(),
            truth,
            outcome.score,
            outcome.oracle_queries,
            outcome.table_sizes
        );
    }

    println!();
    println!("=== BKW Attack Complete ===");
    println!("Trials: {}", args.trials);
    println!("Recovered suffix: {}/{}", hits, args.trials);
    println!(
        "Random guessing: {:.4}",
        1.0 / (params.q as f64).powi(params.d as i32)
    );
    println!("Total time: {:.2?}", total_start.elapsed());

    Ok(())
}
