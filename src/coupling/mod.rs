use crate::convergence::{CouplingCriterion, TrialOutcome};
use crate::errors::{MixError, MixResult};
use crate::state::CoupledPair;
use log::{debug, warn};
use rand::Rng;

/// Curie-Weiss heat bath coupling on the complete graph.
pub mod curie_weiss;
/// Hardcore model heat bath coupling on a periodic grid.
pub mod independent_set;
/// Metropolis filtered couplings on the complete graph and the torus.
pub mod metropolis;
/// Nearest neighbor Ising heat bath coupling on the torus.
pub mod torus;

pub use curie_weiss::*;
pub use independent_set::*;
pub use metropolis::*;
pub use torus::*;

/// A single site update which advances two chains under one shared random draw.
pub trait CouplingRule {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// The extremal starting pair.
    fn initial_pair(&self) -> MixResult<CoupledPair>;

    /// Pick a site, draw the shared uniform and update both chains.
    fn step<R: Rng>(&self, pair: &mut CoupledPair, rng: &mut R) -> MixResult<()>;

    /// Run from the initial pair until `criterion` holds or `max_iterations` steps were taken.
    fn couple<R: Rng>(
        &self,
        criterion: CouplingCriterion,
        max_iterations: Option<u64>,
        rng: &mut R,
    ) -> MixResult<TrialOutcome> {
        let mut pair = self.initial_pair()?;
        debug!(
            "{}: coupling {} sites, {} start different",
            self.name(),
            pair.len(),
            pair.diff_count()
        );
        let mut iterations = 0u64;
        while !criterion.is_met(&pair) {
            if max_iterations.map_or(false, |m| iterations >= m) {
                warn!(
                    "{}: not coupled after {} steps, {} sites differ",
                    self.name(),
                    iterations,
                    pair.diff_count()
                );
                return Ok(TrialOutcome::NotConverged(iterations));
            }
            self.step(&mut pair, rng)?;
            iterations += 1;
        }
        debug!("{}: coupled after {} steps", self.name(), iterations);
        Ok(TrialOutcome::Converged(iterations))
    }
}

/// Glauber probability of the positive spin, `e^f / (e^f + e^-f)`.
pub fn glauber_probability(rule: &'static str, field: f64) -> MixResult<f64> {
    let up = field.exp();
    let down = (-field).exp();
    let p = up / (up + down);
    if p.is_finite() {
        Ok(p)
    } else {
        Err(MixError::NonFiniteProbability { rule, field })
    }
}

/// Metropolis acceptance `min(1, e^(-beta * delta))`.
pub fn metropolis_probability(rule: &'static str, beta: f64, delta: f64) -> MixResult<f64> {
    let field = -beta * delta;
    if field.is_nan() {
        return Err(MixError::NonFiniteProbability { rule, field });
    }
    Ok(field.exp().min(1.0))
}

/// Both extremes of a Glauber field must give finite probabilities.
pub(crate) fn check_glauber_range(rule: &'static str, max_field: f64) -> MixResult<()> {
    glauber_probability(rule, max_field)?;
    glauber_probability(rule, -max_field)?;
    Ok(())
}
