use crate::errors::{MixError, MixResult};
use crate::state::{Alphabet, Configuration, CoupledPair};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// When a coupled pair counts as mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum CouplingCriterion {
    /// Every site agrees, `diff_count == 0`.
    #[default]
    Agreement,
    /// Both chains have the same type vector (for Ising: the same magnetization).
    MatchingTallies,
}

impl CouplingCriterion {
    /// Check the pair.
    pub fn is_met(&self, pair: &CoupledPair) -> bool {
        match self {
            CouplingCriterion::Agreement => pair.is_coupled(),
            CouplingCriterion::MatchingTallies => pair.x().tallies() == pair.y().tallies(),
        }
    }
}

/// A reference type vector a single chain is run into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TypeVectorTarget {
    /// `n/q` sites in every class.
    Balanced,
    /// One class holds `n(q-1)/q` sites, every other class `n/(q(q-1))`.
    Dominant,
}

impl TypeVectorTarget {
    /// Name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            TypeVectorTarget::Balanced => "balanced",
            TypeVectorTarget::Dominant => "dominant",
        }
    }

    /// Check that the target type vector has integer entries for `n` sites and `q` classes.
    pub fn validate(&self, n: usize, q: usize) -> MixResult<()> {
        if n == 0 {
            return Err(MixError::EmptySystem);
        }
        if q < 2 {
            return Err(MixError::TooFewClasses(q));
        }
        let divisible = match self {
            TypeVectorTarget::Balanced => n % q == 0,
            TypeVectorTarget::Dominant => n % q == 0 && (n / q) % (q - 1) == 0,
        };
        if divisible {
            Ok(())
        } else {
            Err(MixError::IndivisibleTypeVector {
                target: self.name(),
                n,
                q,
            })
        }
    }

    /// Check a type vector. Call `validate` first, otherwise indivisible sizes never match.
    pub fn is_met(&self, counts: &[usize]) -> bool {
        let q = counts.len();
        if q < 2 {
            return false;
        }
        let n: usize = counts.iter().sum();
        match self {
            TypeVectorTarget::Balanced => n % q == 0 && counts.iter().all(|c| *c == n / q),
            TypeVectorTarget::Dominant => {
                if n % q != 0 || (n / q) % (q - 1) != 0 {
                    return false;
                }
                let major = n / q * (q - 1);
                let minor = n / q / (q - 1);
                counts.iter().enumerate().any(|(dominant, count)| {
                    *count == major
                        && counts
                            .iter()
                            .enumerate()
                            .all(|(s, c)| s == dominant || *c == minor)
                })
            }
        }
    }

    /// Starting configuration at the opposite reference type vector.
    ///
    /// For a balanced target the chain starts from the dominant layout: sites below
    /// `(q-1)/q * n` take class 0, then classes 1.. get blocks of `n/(q(q-1))` sites and the
    /// last class takes what is left. For a dominant target the chain starts from equal blocks.
    pub fn initial_configuration(&self, n: usize, q: usize) -> MixResult<Configuration> {
        if n == 0 {
            return Err(MixError::EmptySystem);
        }
        if q < 2 {
            return Err(MixError::TooFewClasses(q));
        }
        let spins = match self {
            TypeVectorTarget::Balanced => {
                let nf = n as f64;
                let qf = q as f64;
                let major = (qf - 1.0) * nf / qf;
                let block = nf / ((qf - 1.0) * qf);
                (0..n)
                    .map(|i| {
                        let i = i as f64;
                        if i < major {
                            0
                        } else {
                            let offset = ((i - major) / block).floor() as usize;
                            (1 + offset).min(q - 1)
                        }
                    })
                    .collect()
            }
            TypeVectorTarget::Dominant => (0..n).map(|i| i * q / n).collect(),
        };
        Configuration::from_spins(spins, Alphabet::Potts(q))
    }
}

/// How a trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TrialOutcome {
    /// Stopping rule met after this many iterations.
    Converged(u64),
    /// Gave up at the iteration cap.
    NotConverged(u64),
}

impl TrialOutcome {
    /// Iterations run either way.
    pub fn iterations(&self) -> u64 {
        match self {
            TrialOutcome::Converged(i) | TrialOutcome::NotConverged(i) => *i,
        }
    }

    /// Whether the stopping rule was met.
    pub fn converged(&self) -> bool {
        matches!(self, TrialOutcome::Converged(_))
    }
}
