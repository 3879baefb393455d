use crate::coupling::CouplingRule;
use crate::errors::{check_finite, MixError, MixResult};
use crate::graph::{torus_neighbors, torus_site};
use crate::state::{Alphabet, Configuration, CoupledPair};
use rand::Rng;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Which chain's neighborhood decides whether a site may become occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ExclusionCheck {
    /// X is checked against Y's neighbors and Y against X's.
    #[default]
    OpposingChain,
    /// Each chain is checked against its own neighbors.
    OwnChain,
}

/// Heat bath coupling of the hardcore (independent set) model with fugacity `lambda` on an
/// `n x n` periodic grid.
///
/// X starts on the even checkerboard and Y on the odd one, so every site starts different.
#[derive(Debug, Clone, Copy)]
pub struct IndependentSetHeatBath {
    side: usize,
    lambda: f64,
    occupation: f64,
    check: ExclusionCheck,
}

impl IndependentSetHeatBath {
    /// New rule on a grid of side `side`.
    pub fn new(side: usize, lambda: f64, check: ExclusionCheck) -> MixResult<Self> {
        if side == 0 {
            return Err(MixError::EmptySystem);
        }
        let lambda = check_finite("lambda", lambda)?;
        if lambda < 0.0 {
            return Err(MixError::InvalidParameter {
                name: "lambda",
                value: lambda,
            });
        }
        let occupation = lambda / (lambda + 1.0);
        if !occupation.is_finite() {
            return Err(MixError::NonFiniteProbability {
                rule: "independent-set-heat-bath",
                field: lambda,
            });
        }
        Ok(Self {
            side,
            lambda,
            occupation,
            check,
        })
    }

    /// Probability of proposing an occupied site, `lambda / (lambda + 1)`.
    pub fn occupation_probability(&self) -> f64 {
        self.occupation
    }

    /// The fugacity.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// True if none of the four grid neighbors of `(x, y)` is occupied in `config`.
    pub fn can_occupy(&self, config: &Configuration, x: usize, y: usize) -> bool {
        torus_neighbors(self.side, x, y)
            .iter()
            .all(|v| config.get(*v) != Alphabet::OCCUPIED)
    }
}

impl CouplingRule for IndependentSetHeatBath {
    fn name(&self) -> &'static str {
        "independent-set-heat-bath"
    }

    fn initial_pair(&self) -> MixResult<CoupledPair> {
        let n = self.side;
        let mut x = Vec::with_capacity(n * n);
        let mut y = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let even = (i + j) % 2 == 0;
                x.push(if even { Alphabet::OCCUPIED } else { Alphabet::EMPTY });
                y.push(if even { Alphabet::EMPTY } else { Alphabet::OCCUPIED });
            }
        }
        CoupledPair::new(
            Configuration::from_spins(x, Alphabet::Occupancy)?,
            Configuration::from_spins(y, Alphabet::Occupancy)?,
        )
    }

    fn step<R: Rng>(&self, pair: &mut CoupledPair, rng: &mut R) -> MixResult<()> {
        let vx = rng.gen_range(0..self.side);
        let vy = rng.gen_range(0..self.side);
        let r = rng.gen::<f64>();

        let (x_spin, y_spin) = if r <= self.occupation {
            // Both checks read the pre-step state.
            let (x_free, y_free) = match self.check {
                ExclusionCheck::OpposingChain => (
                    self.can_occupy(pair.y(), vx, vy),
                    self.can_occupy(pair.x(), vx, vy),
                ),
                ExclusionCheck::OwnChain => (
                    self.can_occupy(pair.x(), vx, vy),
                    self.can_occupy(pair.y(), vx, vy),
                ),
            };
            let occupy = |free: bool| {
                if free {
                    Alphabet::OCCUPIED
                } else {
                    Alphabet::EMPTY
                }
            };
            (occupy(x_free), occupy(y_free))
        } else {
            (Alphabet::EMPTY, Alphabet::EMPTY)
        };
        pair.update_site(torus_site(self.side, vx, vy), x_spin, y_spin);
        Ok(())
    }
}
