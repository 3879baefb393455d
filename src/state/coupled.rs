use crate::errors::{MixError, MixResult};
use crate::state::configuration::{Configuration, Spin};

/// Two configurations driven by the same random stream, plus the number of sites where they
/// disagree.
#[derive(Debug, Clone)]
pub struct CoupledPair {
    x: Configuration,
    y: Configuration,
    diff_count: usize,
}

impl CoupledPair {
    /// Pair up two configurations of the same size and alphabet.
    pub fn new(x: Configuration, y: Configuration) -> MixResult<Self> {
        if x.len() != y.len() {
            return Err(MixError::SizeMismatch(x.len(), y.len()));
        }
        if x.num_classes() != y.num_classes() {
            return Err(MixError::SizeMismatch(x.num_classes(), y.num_classes()));
        }
        let diff_count = count_differences(&x, &y);
        Ok(Self { x, y, diff_count })
    }

    /// Write new spins for `site` in both chains and keep `diff_count` in step.
    pub fn update_site(&mut self, site: usize, x_spin: Spin, y_spin: Spin) {
        let started_same = self.x.get(site) == self.y.get(site);
        self.x.set(site, x_spin);
        self.y.set(site, y_spin);
        let ends_same = x_spin == y_spin;
        match (started_same, ends_same) {
            (true, false) => self.diff_count += 1,
            (false, true) => self.diff_count -= 1,
            _ => {}
        }
        debug_assert!(self.diff_count_consistent());
    }

    /// Number of sites where the chains disagree.
    pub fn diff_count(&self) -> usize {
        self.diff_count
    }

    /// True once the chains are identical.
    pub fn is_coupled(&self) -> bool {
        self.diff_count == 0
    }

    /// The X chain.
    pub fn x(&self) -> &Configuration {
        &self.x
    }

    /// The Y chain.
    pub fn y(&self) -> &Configuration {
        &self.y
    }

    /// Number of sites in each chain.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false, configurations are never empty.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Take back both chains.
    pub fn into_inner(self) -> (Configuration, Configuration) {
        (self.x, self.y)
    }

    fn diff_count_consistent(&self) -> bool {
        if self.x.len() > 1024 {
            return true;
        }
        count_differences(&self.x, &self.y) == self.diff_count
    }
}

fn count_differences(x: &Configuration, y: &Configuration) -> usize {
    x.spins()
        .iter()
        .zip(y.spins().iter())
        .filter(|(a, b)| a != b)
        .count()
}

#[cfg(test)]
mod coupled_tests {
    use super::*;
    use crate::state::configuration::Alphabet;

    #[test]
    fn test_diff_count_tracks_updates() {
        let x = Configuration::new(4, Alphabet::Ising, Alphabet::POSITIVE).unwrap();
        let y = Configuration::new(4, Alphabet::Ising, Alphabet::NEGATIVE).unwrap();
        let mut pair = CoupledPair::new(x, y).unwrap();
        assert_eq!(pair.diff_count(), 4);
        pair.update_site(0, Alphabet::POSITIVE, Alphabet::POSITIVE);
        assert_eq!(pair.diff_count(), 3);
        pair.update_site(0, Alphabet::POSITIVE, Alphabet::POSITIVE);
        assert_eq!(pair.diff_count(), 3);
        pair.update_site(0, Alphabet::NEGATIVE, Alphabet::POSITIVE);
        assert_eq!(pair.diff_count(), 4);
        pair.update_site(1, Alphabet::NEGATIVE, Alphabet::POSITIVE);
        assert_eq!(pair.diff_count(), 4);
        assert_eq!(pair.x().tally(Alphabet::NEGATIVE), 2);
        assert_eq!(pair.y().tally(Alphabet::POSITIVE), 2);
    }

    #[test]
    fn test_mismatched_pair() {
        let x = Configuration::new(4, Alphabet::Ising, 0).unwrap();
        let y = Configuration::new(5, Alphabet::Ising, 0).unwrap();
        assert!(CoupledPair::new(x, y).is_err());
    }
}
