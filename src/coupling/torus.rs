use crate::coupling::{check_glauber_range, glauber_probability, CouplingRule};
use crate::errors::{check_finite, MixError, MixResult};
use crate::graph::{torus_neighbors, torus_site};
use crate::state::{Alphabet, Configuration, CoupledPair};
use rand::Rng;

/// Glauber heat bath coupling of the nearest neighbor Ising model on an `n x n` torus.
#[derive(Debug, Clone, Copy)]
pub struct TorusHeatBath {
    side: usize,
    beta: f64,
}

impl TorusHeatBath {
    /// New rule on a torus of side `side`.
    pub fn new(side: usize, beta: f64) -> MixResult<Self> {
        if side == 0 {
            return Err(MixError::EmptySystem);
        }
        let beta = check_finite("beta", beta)?;
        check_glauber_range("torus", 4.0 * beta)?;
        Ok(Self { side, beta })
    }

    /// Side length.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Sum of the four neighboring spins, with wraparound.
    pub fn local_spin_sum(&self, config: &Configuration, x: usize, y: usize) -> i32 {
        torus_neighbors(self.side, x, y)
            .iter()
            .map(|v| config.value(*v))
            .sum()
    }

    /// Probability the site `(x, y)` is set positive in `config`.
    pub fn positive_probability(&self, config: &Configuration, x: usize, y: usize) -> MixResult<f64> {
        let field = self.beta * f64::from(self.local_spin_sum(config, x, y));
        glauber_probability(self.name(), field)
    }
}

impl CouplingRule for TorusHeatBath {
    fn name(&self) -> &'static str {
        "torus-heat-bath"
    }

    fn initial_pair(&self) -> MixResult<CoupledPair> {
        let n = self.side * self.side;
        let x = Configuration::new(n, Alphabet::Ising, Alphabet::POSITIVE)?;
        let y = Configuration::new(n, Alphabet::Ising, Alphabet::NEGATIVE)?;
        CoupledPair::new(x, y)
    }

    fn step<R: Rng>(&self, pair: &mut CoupledPair, rng: &mut R) -> MixResult<()> {
        let vx = rng.gen_range(0..self.side);
        let vy = rng.gen_range(0..self.side);
        let y_pos_prob = self.positive_probability(pair.y(), vx, vy)?;
        let x_pos_prob = self.positive_probability(pair.x(), vx, vy)?;
        let r = rng.gen::<f64>();
        let pick = |p: f64| {
            if r <= p {
                Alphabet::POSITIVE
            } else {
                Alphabet::NEGATIVE
            }
        };
        pair.update_site(torus_site(self.side, vx, vy), pick(x_pos_prob), pick(y_pos_prob));
        Ok(())
    }
}
