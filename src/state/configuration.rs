use crate::errors::{MixError, MixResult};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Error, Formatter};

/// Spin class index in `0..q`.
pub type Spin = usize;

/// How spin class indices map onto model values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Alphabet {
    /// Hardcore model: 0 is empty, 1 is occupied.
    Occupancy,
    /// Ising model: 0 is -1, 1 is +1.
    Ising,
    /// Potts model with q colors.
    Potts(usize),
}

impl Alphabet {
    /// Empty site of the hardcore model.
    pub const EMPTY: Spin = 0;
    /// Occupied site of the hardcore model.
    pub const OCCUPIED: Spin = 1;
    /// The -1 Ising spin.
    pub const NEGATIVE: Spin = 0;
    /// The +1 Ising spin.
    pub const POSITIVE: Spin = 1;

    /// Number of spin classes.
    pub fn num_classes(&self) -> usize {
        match self {
            Alphabet::Occupancy | Alphabet::Ising => 2,
            Alphabet::Potts(q) => *q,
        }
    }

    /// Numeric value of a spin class.
    pub fn value(&self, spin: Spin) -> i32 {
        match self {
            Alphabet::Ising => 2 * spin as i32 - 1,
            Alphabet::Occupancy | Alphabet::Potts(_) => spin as i32,
        }
    }
}

/// A site indexed spin state with per class tallies kept up to date on every write.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Configuration {
    spins: Vec<Spin>,
    tallies: Vec<usize>,
    alphabet: Alphabet,
}

impl Debug for Configuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let s = self
            .spins
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("");
        f.write_str(&format!("{}\t{:?}", s, self.tallies))
    }
}

impl Configuration {
    /// A configuration of `n` sites all holding `fill`.
    pub fn new(n: usize, alphabet: Alphabet, fill: Spin) -> MixResult<Self> {
        let q = check_alphabet(alphabet)?;
        if n == 0 {
            return Err(MixError::EmptySystem);
        }
        if fill >= q {
            return Err(MixError::SpinOutOfRange {
                spin: fill,
                classes: q,
            });
        }
        let mut tallies = vec![0; q];
        tallies[fill] = n;
        Ok(Self {
            spins: vec![fill; n],
            tallies,
            alphabet,
        })
    }

    /// Build a configuration from explicit spins. This is the only place tallies are counted
    /// by a scan.
    pub fn from_spins(spins: Vec<Spin>, alphabet: Alphabet) -> MixResult<Self> {
        let q = check_alphabet(alphabet)?;
        if spins.is_empty() {
            return Err(MixError::EmptySystem);
        }
        let mut tallies = vec![0; q];
        for &s in &spins {
            if s >= q {
                return Err(MixError::SpinOutOfRange {
                    spin: s,
                    classes: q,
                });
            }
            tallies[s] += 1;
        }
        Ok(Self {
            spins,
            tallies,
            alphabet,
        })
    }

    /// Spin at a site.
    pub fn get(&self, site: usize) -> Spin {
        self.spins[site]
    }

    /// Model value at a site.
    pub fn value(&self, site: usize) -> i32 {
        self.alphabet.value(self.spins[site])
    }

    /// Write a spin, returning the previous one.
    pub fn set(&mut self, site: usize, spin: Spin) -> Spin {
        debug_assert!(spin < self.tallies.len());
        let old = self.spins[site];
        if old != spin {
            self.tallies[old] -= 1;
            self.tallies[spin] += 1;
            self.spins[site] = spin;
        }
        debug_assert!(self.tallies_consistent());
        old
    }

    /// Number of sites holding `spin`.
    pub fn tally(&self, spin: Spin) -> usize {
        self.tallies[spin]
    }

    /// All tallies, indexed by spin class. This is the type vector.
    pub fn tallies(&self) -> &[usize] {
        &self.tallies
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.spins.len()
    }

    /// Always false, configurations are never empty.
    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    /// Number of spin classes.
    pub fn num_classes(&self) -> usize {
        self.tallies.len()
    }

    /// The alphabet spins are drawn from.
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Ref to the spin vector.
    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    /// Recount every class and compare against the tallies. O(n), for assertions only.
    pub fn tallies_consistent(&self) -> bool {
        // Skip the scan outside of debug builds or for large systems, set is O(1).
        if cfg!(not(debug_assertions)) || self.spins.len() > 1024 {
            return true;
        }
        let mut counts = vec![0; self.tallies.len()];
        self.spins.iter().for_each(|s| counts[*s] += 1);
        counts == self.tallies
    }
}

fn check_alphabet(alphabet: Alphabet) -> MixResult<usize> {
    let q = alphabet.num_classes();
    if q < 2 {
        Err(MixError::TooFewClasses(q))
    } else {
        Ok(q)
    }
}

#[cfg(test)]
mod configuration_tests {
    use super::*;
    use rand::prelude::*;

    fn recount(c: &Configuration) -> Vec<usize> {
        let mut counts = vec![0; c.num_classes()];
        c.spins().iter().for_each(|s| counts[*s] += 1);
        counts
    }

    #[test]
    fn test_tally_after_random_sets() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let mut c = Configuration::new(50, Alphabet::Potts(4), 0).unwrap();
        for _ in 0..5000 {
            let site = rng.gen_range(0..c.len());
            let spin = rng.gen_range(0..4);
            c.set(site, spin);
            assert_eq!(c.tallies(), recount(&c).as_slice());
        }
    }

    #[test]
    fn test_set_returns_old_and_noop() {
        let mut c = Configuration::new(3, Alphabet::Ising, Alphabet::POSITIVE).unwrap();
        assert_eq!(c.set(1, Alphabet::POSITIVE), Alphabet::POSITIVE);
        assert_eq!(c.tally(Alphabet::POSITIVE), 3);
        assert_eq!(c.set(1, Alphabet::NEGATIVE), Alphabet::POSITIVE);
        assert_eq!(c.tallies(), &[1, 2]);
        assert_eq!(c.value(1), -1);
        assert_eq!(c.value(0), 1);
    }

    #[test]
    fn test_from_spins() {
        let c = Configuration::from_spins(vec![0, 2, 2, 1], Alphabet::Potts(3)).unwrap();
        assert_eq!(c.tallies(), &[1, 1, 2]);
        assert!(Configuration::from_spins(vec![0, 3], Alphabet::Potts(3)).is_err());
        assert!(Configuration::from_spins(vec![], Alphabet::Ising).is_err());
    }

    #[test]
    fn test_bad_construction() {
        assert!(matches!(
            Configuration::new(0, Alphabet::Ising, 0),
            Err(MixError::EmptySystem)
        ));
        assert!(matches!(
            Configuration::new(4, Alphabet::Potts(1), 0),
            Err(MixError::TooFewClasses(1))
        ));
        assert!(Configuration::new(4, Alphabet::Occupancy, 2).is_err());
    }
}
