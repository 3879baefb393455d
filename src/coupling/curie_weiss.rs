use crate::coupling::{check_glauber_range, glauber_probability, CouplingRule};
use crate::errors::{check_finite, MixError, MixResult};
use crate::state::{Alphabet, Configuration, CoupledPair};
use rand::Rng;

/// Heat bath coupling of the Curie-Weiss model on `K_n` with interaction `alpha / n`.
///
/// X starts all positive and Y all negative. The probability of the positive spin only depends
/// on the positive tally, so a step costs O(1).
#[derive(Debug, Clone, Copy)]
pub struct CurieWeissHeatBath {
    n: usize,
    alpha: f64,
}

impl CurieWeissHeatBath {
    /// New rule for `n` sites.
    pub fn new(n: usize, alpha: f64) -> MixResult<Self> {
        if n == 0 {
            return Err(MixError::EmptySystem);
        }
        let alpha = check_finite("alpha", alpha)?;
        // |spin sum| never exceeds n - 1.
        check_glauber_range("curie-weiss", alpha * (n as f64 - 1.0) / n as f64)?;
        Ok(Self { n, alpha })
    }

    /// Sum of the spins of every other site, computed from the positive tally.
    pub fn spin_sum(&self, config: &Configuration, site: usize) -> i64 {
        let n = self.n as i64;
        let positives = config.tally(Alphabet::POSITIVE) as i64;
        if config.get(site) == Alphabet::POSITIVE {
            positives - 1 - (n - positives)
        } else {
            positives - (n - positives - 1)
        }
    }

    /// Probability the site is set positive in `config`.
    pub fn positive_probability(&self, config: &Configuration, site: usize) -> MixResult<f64> {
        let field = self.alpha / self.n as f64 * self.spin_sum(config, site) as f64;
        glauber_probability(self.name(), field)
    }
}

impl CouplingRule for CurieWeissHeatBath {
    fn name(&self) -> &'static str {
        "curie-weiss-heat-bath"
    }

    fn initial_pair(&self) -> MixResult<CoupledPair> {
        let x = Configuration::new(self.n, Alphabet::Ising, Alphabet::POSITIVE)?;
        let y = Configuration::new(self.n, Alphabet::Ising, Alphabet::NEGATIVE)?;
        CoupledPair::new(x, y)
    }

    fn step<R: Rng>(&self, pair: &mut CoupledPair, rng: &mut R) -> MixResult<()> {
        let v = rng.gen_range(0..self.n);
        let y_pos_prob = self.positive_probability(pair.y(), v)?;
        let x_pos_prob = self.positive_probability(pair.x(), v)?;
        let r = rng.gen::<f64>();
        let pick = |p: f64| {
            if r <= p {
                Alphabet::POSITIVE
            } else {
                Alphabet::NEGATIVE
            }
        };
        pair.update_site(v, pick(x_pos_prob), pick(y_pos_prob));
        Ok(())
    }
}
