use crate::coupling::{metropolis_probability, CouplingRule};
use crate::errors::{check_finite, MixError, MixResult};
use crate::graph::{torus_neighbors, torus_site};
use crate::state::{Alphabet, Configuration, CoupledPair, Spin};
use rand::Rng;

/// Propose -1 for draws at or below one half, +1 otherwise.
fn propose<R: Rng>(rng: &mut R) -> Spin {
    if rng.gen::<f64>() <= 0.5 {
        Alphabet::NEGATIVE
    } else {
        Alphabet::POSITIVE
    }
}

/// Metropolis coupling of the Curie-Weiss model on `K_n` with energy counted in disagreeing
/// pairs.
#[derive(Debug, Clone, Copy)]
pub struct CurieWeissMetropolis {
    n: usize,
    beta: f64,
}

impl CurieWeissMetropolis {
    /// New rule for `n` sites.
    pub fn new(n: usize, beta: f64) -> MixResult<Self> {
        if n == 0 {
            return Err(MixError::EmptySystem);
        }
        let beta = check_finite("beta", beta)?;
        Ok(Self { n, beta })
    }

    /// Change in the number of other sites disagreeing with `site` if it took `proposal`.
    pub fn disagreement_change(&self, config: &Configuration, site: usize, proposal: Spin) -> i64 {
        let current = config.get(site);
        let others = self.n as i64 - 1;
        let others_with = |s: Spin| config.tally(s) as i64 - i64::from(s == current);
        let count = others - others_with(current);
        let change_count = others - others_with(proposal);
        change_count - count
    }

    /// Acceptance probability of `proposal` at `site`.
    pub fn acceptance(&self, config: &Configuration, site: usize, proposal: Spin) -> MixResult<f64> {
        let delta = self.disagreement_change(config, site, proposal) as f64;
        metropolis_probability(self.name(), self.beta, delta)
    }
}

impl CouplingRule for CurieWeissMetropolis {
    fn name(&self) -> &'static str {
        "curie-weiss-metropolis"
    }

    fn initial_pair(&self) -> MixResult<CoupledPair> {
        let x = Configuration::new(self.n, Alphabet::Ising, Alphabet::POSITIVE)?;
        let y = Configuration::new(self.n, Alphabet::Ising, Alphabet::NEGATIVE)?;
        CoupledPair::new(x, y)
    }

    fn step<R: Rng>(&self, pair: &mut CoupledPair, rng: &mut R) -> MixResult<()> {
        let v = rng.gen_range(0..self.n);
        let proposal = propose(rng);
        let p = self.acceptance(pair.y(), v, proposal)?;
        let q = self.acceptance(pair.x(), v, proposal)?;
        let r = rng.gen::<f64>();
        let y_spin = if r <= p { proposal } else { pair.y().get(v) };
        let x_spin = if r <= q { proposal } else { pair.x().get(v) };
        pair.update_site(v, x_spin, y_spin);
        Ok(())
    }
}

/// Metropolis coupling of the nearest neighbor Ising model on an `n x n` torus, with energy
/// counted in disagreeing edges.
#[derive(Debug, Clone, Copy)]
pub struct TorusMetropolis {
    side: usize,
    beta: f64,
}

impl TorusMetropolis {
    /// New rule on a torus of side `side`.
    pub fn new(side: usize, beta: f64) -> MixResult<Self> {
        if side == 0 {
            return Err(MixError::EmptySystem);
        }
        let beta = check_finite("beta", beta)?;
        Ok(Self { side, beta })
    }

    /// Change in disagreeing edges at `(x, y)` if it took `proposal`.
    pub fn disagreement_change(
        &self,
        config: &Configuration,
        x: usize,
        y: usize,
        proposal: Spin,
    ) -> i64 {
        let current = config.get(torus_site(self.side, x, y));
        let (count, change_count) = torus_neighbors(self.side, x, y).iter().fold(
            (0i64, 0i64),
            |(count, change_count), v| {
                let s = config.get(*v);
                (
                    count + i64::from(s != current),
                    change_count + i64::from(s != proposal),
                )
            },
        );
        change_count - count
    }

    fn acceptance(&self, config: &Configuration, x: usize, y: usize, proposal: Spin) -> MixResult<f64> {
        let delta = self.disagreement_change(config, x, y, proposal) as f64;
        metropolis_probability(self.name(), self.beta, delta)
    }
}

impl CouplingRule for TorusMetropolis {
    fn name(&self) -> &'static str {
        "torus-metropolis-edges"
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
        let proposal = propose(rng);
        let p = self.acceptance(pair.y(), vx, vy, proposal)?;
        let q = self.acceptance(pair.x(), vx, vy, proposal)?;
        let r = rng.gen::<f64>();
        let site = torus_site(self.side, vx, vy);
        let y_spin = if r <= p { proposal } else { pair.y().get(site) };
        let x_spin = if r <= q { proposal } else { pair.x().get(site) };
        pair.update_site(site, x_spin, y_spin);
        Ok(())
    }
}
