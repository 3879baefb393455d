use crate::errors::{check_finite, MixError, MixResult};
use crate::trial::{run_trial_with_options, ModelParams, Mode, TrialOptions};
use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Most values a single range may hold.
pub const MAX_RANGE_VALUES: usize = 1 << 24;

/// Inclusive range of strength values walked from `low` to `high` by `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ParameterRange {
    low: f64,
    high: f64,
    step: f64,
}

impl ParameterRange {
    /// Make a range, `step` must be positive and leave at most `MAX_RANGE_VALUES` values.
    pub fn new(low: f64, high: f64, step: f64) -> MixResult<Self> {
        let low = check_finite("low", low)?;
        let high = check_finite("high", high)?;
        let step = check_finite("step", step)?;
        let range = Self { low, high, step };
        if step <= 0.0 || range.count().is_none() {
            return Err(MixError::InvalidParameter {
                name: "step",
                value: step,
            });
        }
        Ok(range)
    }

    /// Number of values, `None` past `MAX_RANGE_VALUES`.
    fn count(&self) -> Option<usize> {
        if self.high < self.low {
            return Some(0);
        }
        // Tolerate rounding so `high` itself is included when it lies on the grid.
        let steps = ((self.high - self.low) / self.step + 1e-9).floor();
        if !steps.is_finite() || steps >= MAX_RANGE_VALUES as f64 {
            return None;
        }
        (steps as usize).checked_add(1)
    }

    /// A single value.
    pub fn single(value: f64) -> MixResult<Self> {
        Self::new(value, value, 1.0)
    }

    /// Lower end.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper end.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Increment.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of values in the range.
    pub fn len(&self) -> usize {
        self.count().unwrap_or(MAX_RANGE_VALUES)
    }

    /// Check for an empty range.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values `low + i * step`, computed from the index so steps do not accumulate error.
    pub fn values(&self) -> impl Iterator<Item = f64> {
        let ParameterRange { low, step, .. } = *self;
        (0..self.len()).map(move |i| low + i as f64 * step)
    }
}

/// Everything needed to run a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SweepConfig {
    /// System size handed to every trial.
    pub n: usize,
    /// Repetitions per strength value.
    pub k: usize,
    /// Strength values.
    pub range: ParameterRange,
    /// Model, the strength is overwritten with each value of the range.
    pub params: ModelParams,
    /// Trial mode.
    pub mode: Mode,
    /// Seed of the per trial random streams.
    pub seed: u64,
    /// Per trial options.
    pub options: TrialOptions,
}

impl SweepConfig {
    /// Sweep `params` over `range` with `k` repetitions, in the model's default mode.
    pub fn new(n: usize, k: usize, range: ParameterRange, params: ModelParams) -> Self {
        Self {
            n,
            k,
            range,
            params,
            mode: params.default_mode(),
            seed: 0,
            options: TrialOptions::default(),
        }
    }

    /// Seed the random streams.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the trial options.
    pub fn with_options(mut self, options: TrialOptions) -> Self {
        self.options = options;
        self
    }

    /// Label for the result file, `swendsen-wang` gets its q appended.
    pub fn label(&self) -> String {
        match self.params {
            ModelParams::Potts { q, .. } => format!("{}-{}", self.params.name(), q),
            _ => self.params.name().to_string(),
        }
    }
}

/// One finished trial.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SweepRecord {
    /// Strength value.
    pub parameter: f64,
    /// Repetition index at this value.
    pub repetition: usize,
    /// Iterations run.
    pub iterations: u64,
    /// False if the trial hit the iteration cap.
    pub converged: bool,
    /// Wall clock time of the trial.
    pub duration: Duration,
}

/// Independent random stream for trial `index` of a sweep.
pub fn trial_rng(seed: u64, index: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index);
    rng
}

fn run_job(config: &SweepConfig, index: usize, value: f64, repetition: usize) -> MixResult<SweepRecord> {
    let mut rng = trial_rng(config.seed, index as u64);
    let params = config.params.with_strength(value);
    let start = Instant::now();
    let outcome = run_trial_with_options(config.n, &params, config.mode, config.options, &mut rng)?;
    let duration = start.elapsed();
    if outcome.converged() {
        info!(
            "{}: {:.6}, k: {}, iterations: {}, {:?}",
            params.strength_name(),
            value,
            repetition,
            outcome.iterations(),
            duration
        );
    } else {
        warn!(
            "{}: {:.6}, k: {}, stopped at cap of {} iterations",
            params.strength_name(),
            value,
            repetition,
            outcome.iterations()
        );
    }
    Ok(SweepRecord {
        parameter: value,
        repetition,
        iterations: outcome.iterations(),
        converged: outcome.converged(),
        duration,
    })
}

/// Run `k` trials for every value of the range. Records come back in sweep order whether or
/// not the `parallel` feature is on, and each trial's stream only depends on the seed and its
/// position in the sweep.
pub fn run_sweep(config: &SweepConfig) -> MixResult<Vec<SweepRecord>> {
    let k = config.k;
    let jobs: Vec<(usize, f64, usize)> = config
        .range
        .values()
        .enumerate()
        .flat_map(|(value_index, value)| {
            (0..k).map(move |repetition| (value_index * k + repetition, value, repetition))
        })
        .collect();

    #[cfg(feature = "parallel")]
    let records = {
        use rayon::prelude::*;
        jobs.par_iter()
            .map(|(index, value, repetition)| run_job(config, *index, *value, *repetition))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let records = jobs
        .iter()
        .map(|(index, value, repetition)| run_job(config, *index, *value, *repetition))
        .collect();
    records
}

/// File name `<label>:<n>:<k>:<low>:<high>:<step>:<timestamp>`.
pub fn results_file_name(config: &SweepConfig, timestamp: u64) -> String {
    format!(
        "{}:{}:{}:{:.6}:{:.6}:{:.6}:{}",
        config.label(),
        config.n,
        config.k,
        config.range.low(),
        config.range.high(),
        config.range.step(),
        timestamp
    )
}

/// Write one `"<parameter> <iterations>"` line per record.
pub fn write_results<W: Write>(mut w: W, records: &[SweepRecord]) -> MixResult<()> {
    for r in records {
        writeln!(w, "{:.6} {}", r.parameter, r.iterations)?;
    }
    w.flush()?;
    Ok(())
}

/// Write one `"<parameter>, <iterations>, <seconds>"` line per record.
pub fn write_timed_results<W: Write>(mut w: W, records: &[SweepRecord]) -> MixResult<()> {
    for r in records {
        writeln!(
            w,
            "{:.6}, {}, {:.6}",
            r.parameter,
            r.iterations,
            r.duration.as_secs_f64()
        )?;
    }
    w.flush()?;
    Ok(())
}

/// Write records into a new timestamped file under `dir`, returns its path.
pub fn save_results(dir: &Path, config: &SweepConfig, records: &[SweepRecord]) -> MixResult<PathBuf> {
    create_dir_all(dir)?;
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let path = dir.join(results_file_name(config, timestamp));
    let file = File::create(&path)?;
    write_results(BufWriter::new(file), records)?;
    info!("wrote {} records to {}", records.len(), path.display());
    Ok(path)
}
