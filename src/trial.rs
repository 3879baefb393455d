use crate::cluster::SwendsenWang;
use crate::convergence::{CouplingCriterion, TrialOutcome, TypeVectorTarget};
use crate::coupling::*;
use crate::errors::{MixError, MixResult};
use crate::graph::{Graph, Topology};
use rand::Rng;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Graph a Potts cluster trial runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Lattice {
    /// `K_n` with `n` sites.
    #[default]
    Complete,
    /// Periodic `n x n` grid with `n * n` sites.
    Torus,
}

/// Which model to run and at which strength.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ModelParams {
    /// Curie-Weiss heat bath on `K_n`.
    CurieWeiss {
        /// Interaction strength, used as `alpha / n`.
        alpha: f64,
    },
    /// Ising heat bath on the `n x n` torus.
    TorusIsing {
        /// Inverse temperature.
        beta: f64,
    },
    /// Hardcore model heat bath on the `n x n` periodic grid.
    IndependentSet {
        /// Fugacity.
        lambda: f64,
        /// Which chain blocks occupation.
        check: ExclusionCheck,
    },
    /// Metropolis filtered Curie-Weiss on `K_n`.
    CurieWeissMetropolis {
        /// Inverse temperature per disagreeing pair.
        beta: f64,
    },
    /// Metropolis filtered Ising on the `n x n` torus.
    TorusMetropolis {
        /// Inverse temperature per disagreeing edge.
        beta: f64,
    },
    /// Swendsen-Wang Potts hitting time.
    Potts {
        /// Coupling, bonds survive with `1 - exp(-c/n)`.
        c: f64,
        /// Number of colors.
        q: usize,
        /// Type vector which stops the chain.
        target: TypeVectorTarget,
        /// Graph to run on.
        lattice: Lattice,
    },
}

impl ModelParams {
    /// Name used in logs and result files.
    pub fn name(&self) -> &'static str {
        match self {
            ModelParams::CurieWeiss { .. } => "curie-weiss-heat-bath",
            ModelParams::TorusIsing { .. } => "torus-heat-bath",
            ModelParams::IndependentSet { .. } => "independent-set-heat-bath",
            ModelParams::CurieWeissMetropolis { .. } => "curie-weiss-metropolis",
            ModelParams::TorusMetropolis { .. } => "torus-metropolis-edges",
            ModelParams::Potts { .. } => "swendsen-wang",
        }
    }

    /// Name of the strength parameter.
    pub fn strength_name(&self) -> &'static str {
        match self {
            ModelParams::CurieWeiss { .. } => "alpha",
            ModelParams::TorusIsing { .. }
            | ModelParams::CurieWeissMetropolis { .. }
            | ModelParams::TorusMetropolis { .. } => "beta",
            ModelParams::IndependentSet { .. } => "lambda",
            ModelParams::Potts { .. } => "c",
        }
    }

    /// Current strength value.
    pub fn strength(&self) -> f64 {
        match self {
            ModelParams::CurieWeiss { alpha } => *alpha,
            ModelParams::TorusIsing { beta }
            | ModelParams::CurieWeissMetropolis { beta }
            | ModelParams::TorusMetropolis { beta } => *beta,
            ModelParams::IndependentSet { lambda, .. } => *lambda,
            ModelParams::Potts { c, .. } => *c,
        }
    }

    /// Same model at a different strength.
    pub fn with_strength(self, value: f64) -> Self {
        match self {
            ModelParams::CurieWeiss { .. } => ModelParams::CurieWeiss { alpha: value },
            ModelParams::TorusIsing { .. } => ModelParams::TorusIsing { beta: value },
            ModelParams::IndependentSet { check, .. } => ModelParams::IndependentSet {
                lambda: value,
                check,
            },
            ModelParams::CurieWeissMetropolis { .. } => {
                ModelParams::CurieWeissMetropolis { beta: value }
            }
            ModelParams::TorusMetropolis { .. } => ModelParams::TorusMetropolis { beta: value },
            ModelParams::Potts {
                q, target, lattice, ..
            } => ModelParams::Potts {
                c: value,
                q,
                target,
                lattice,
            },
        }
    }

    /// The mode this model runs in.
    pub fn default_mode(&self) -> Mode {
        match self {
            ModelParams::Potts { .. } => Mode::Cluster,
            _ => Mode::Coupling,
        }
    }
}

/// How a trial measures mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Two chains under common randomness until they meet.
    Coupling,
    /// One chain under cluster updates until it hits a type vector.
    Cluster,
}

impl Mode {
    /// Name for errors.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Coupling => "coupling",
            Mode::Cluster => "cluster",
        }
    }
}

/// Knobs for a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TrialOptions {
    /// Give up after this many iterations. `None` runs until the stopping rule holds.
    pub max_iterations: Option<u64>,
    /// Stopping rule for coupling trials.
    pub criterion: CouplingCriterion,
}

impl TrialOptions {
    /// Cap the number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Use a different coupling stopping rule.
    pub fn with_criterion(mut self, criterion: CouplingCriterion) -> Self {
        self.criterion = criterion;
        self
    }
}

/// Run one trial and return the number of iterations until the stopping rule held.
///
/// `n` is the number of sites on complete graphs and the side length on tori and grids.
pub fn run_trial<R: Rng>(n: usize, params: &ModelParams, mode: Mode, rng: &mut R) -> MixResult<u64> {
    run_trial_with_options(n, params, mode, TrialOptions::default(), rng).map(|o| o.iterations())
}

/// Run one trial with an optional iteration cap and coupling stopping rule.
pub fn run_trial_with_options<R: Rng>(
    n: usize,
    params: &ModelParams,
    mode: Mode,
    options: TrialOptions,
    rng: &mut R,
) -> MixResult<TrialOutcome> {
    if n == 0 {
        return Err(MixError::EmptySystem);
    }
    let TrialOptions {
        max_iterations,
        criterion,
    } = options;
    match (mode, *params) {
        (Mode::Coupling, ModelParams::CurieWeiss { alpha }) => {
            CurieWeissHeatBath::new(n, alpha)?.couple(criterion, max_iterations, rng)
        }
        (Mode::Coupling, ModelParams::TorusIsing { beta }) => {
            TorusHeatBath::new(n, beta)?.couple(criterion, max_iterations, rng)
        }
        (Mode::Coupling, ModelParams::IndependentSet { lambda, check }) => {
            IndependentSetHeatBath::new(n, lambda, check)?.couple(criterion, max_iterations, rng)
        }
        (Mode::Coupling, ModelParams::CurieWeissMetropolis { beta }) => {
            CurieWeissMetropolis::new(n, beta)?.couple(criterion, max_iterations, rng)
        }
        (Mode::Coupling, ModelParams::TorusMetropolis { beta }) => {
            TorusMetropolis::new(n, beta)?.couple(criterion, max_iterations, rng)
        }
        (
            Mode::Cluster,
            ModelParams::Potts {
                c,
                q,
                target,
                lattice,
            },
        ) => {
            let topology = match lattice {
                Lattice::Complete => Topology::Complete(n),
                Lattice::Torus => Topology::Sparse(Graph::torus(n)?),
            };
            SwendsenWang::for_target(topology, q, c, target)?.run_to_target(
                target,
                max_iterations,
                rng,
            )
        }
        (mode, params) => Err(MixError::UnsupportedMode {
            model: params.name(),
            mode: mode.name(),
        }),
    }
}

#[cfg(test)]
mod trial_tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn test_mode_mismatch() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let params = ModelParams::CurieWeiss { alpha: 1.0 };
        assert!(matches!(
            run_trial(4, &params, Mode::Cluster, &mut rng),
            Err(MixError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn test_zero_sites() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let params = ModelParams::TorusIsing { beta: 0.1 };
        assert!(matches!(
            run_trial(0, &params, Mode::Coupling, &mut rng),
            Err(MixError::EmptySystem)
        ));
    }

    #[test]
    fn test_with_strength_keeps_rest() {
        let params = ModelParams::Potts {
            c: 1.0,
            q: 4,
            target: TypeVectorTarget::Dominant,
            lattice: Lattice::Torus,
        };
        let moved = params.with_strength(2.5);
        assert_eq!(moved.strength(), 2.5);
        assert_eq!(moved.with_strength(1.0), params);
        assert_eq!(moved.default_mode(), Mode::Cluster);
    }

    #[test]
    fn test_cap() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let params = ModelParams::TorusIsing { beta: 0.3 };
        let options = TrialOptions::default().with_max_iterations(5);
        let outcome = run_trial_with_options(20, &params, Mode::Coupling, options, &mut rng).unwrap();
        assert_eq!(outcome, TrialOutcome::NotConverged(5));
    }
}
