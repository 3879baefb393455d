use crate::cluster::edge_set::EdgeSet;
use crate::convergence::{TrialOutcome, TypeVectorTarget};
use crate::errors::{check_finite, MixError, MixResult};
use crate::graph::Topology;
use crate::state::Configuration;
use log::{debug, trace, warn};
use rand::Rng;

/// Swendsen-Wang cluster updates of a q-state Potts model with coupling `c / n`.
///
/// Every sweep keeps each same spin candidate bond with probability `1 - exp(-c/n)`, then gives
/// every connected component of kept bonds a fresh uniform spin. The new spins are written to
/// a second configuration so every component is found from the same pre-sweep state, then the
/// two swap.
#[derive(Debug, Clone)]
pub struct SwendsenWang {
    topology: Topology,
    q: usize,
    c: f64,
    bond_probability: f64,
    current: Configuration,
    next: Configuration,
    classes: Vec<Vec<usize>>,
    edges: EdgeSet,
    stack: Vec<usize>,
    cluster_labels: Vec<usize>,
    cluster_sizes: Vec<usize>,
}

impl SwendsenWang {
    /// New chain on `topology` starting from `initial`. The number of classes comes from the
    /// configuration's alphabet.
    pub fn new(topology: Topology, c: f64, initial: Configuration) -> MixResult<Self> {
        let n = topology.num_sites();
        if n == 0 {
            return Err(MixError::EmptySystem);
        }
        if initial.len() != n {
            return Err(MixError::SizeMismatch(n, initial.len()));
        }
        let q = initial.num_classes();
        if q < 2 {
            return Err(MixError::TooFewClasses(q));
        }
        let c = check_finite("c", c)?;
        let bond_probability = 1.0 - (-c / n as f64).exp();
        if !bond_probability.is_finite() || !(0.0..=1.0).contains(&bond_probability) {
            return Err(MixError::InvalidParameter {
                name: "c",
                value: c,
            });
        }
        let mut sw = Self {
            topology,
            q,
            c,
            bond_probability,
            next: initial.clone(),
            current: initial,
            classes: vec![Vec::default(); q],
            edges: EdgeSet::new(n),
            stack: Vec::default(),
            cluster_labels: vec![0; n],
            cluster_sizes: Vec::default(),
        };
        sw.rebuild_classes();
        Ok(sw)
    }

    /// New chain starting from the reference type vector opposite to `target`.
    pub fn for_target(
        topology: Topology,
        q: usize,
        c: f64,
        target: TypeVectorTarget,
    ) -> MixResult<Self> {
        let n = topology.num_sites();
        target.validate(n, q)?;
        let initial = target.initial_configuration(n, q)?;
        Self::new(topology, c, initial)
    }

    /// Probability a candidate bond is kept.
    pub fn bond_probability(&self) -> f64 {
        self.bond_probability
    }

    /// The coupling constant.
    pub fn c(&self) -> f64 {
        self.c
    }

    /// Number of spin classes.
    pub fn num_classes(&self) -> usize {
        self.q
    }

    /// The configuration after the last sweep.
    pub fn current(&self) -> &Configuration {
        &self.current
    }

    /// Sites currently holding `spin`.
    pub fn class_members(&self, spin: usize) -> &[usize] {
        &self.classes[spin]
    }

    /// Cluster label of every site and the size of every cluster, for the last sweep.
    pub fn last_clusters(&self) -> (&[usize], &[usize]) {
        (&self.cluster_labels, &self.cluster_sizes)
    }

    /// Perform one sweep, returns the number of clusters found.
    pub fn sweep<R: Rng>(&mut self, rng: &mut R) -> usize {
        self.edges.clear();
        self.sample_bonds(rng);
        self.relabel_clusters(rng);
        std::mem::swap(&mut self.current, &mut self.next);
        self.rebuild_classes();
        trace!(
            "sweep: {} clusters, type vector {:?}",
            self.cluster_sizes.len(),
            self.current.tallies()
        );
        self.cluster_sizes.len()
    }

    /// Sweep until the type vector hits `target`, at least once.
    pub fn run_to_target<R: Rng>(
        &mut self,
        target: TypeVectorTarget,
        max_iterations: Option<u64>,
        rng: &mut R,
    ) -> MixResult<TrialOutcome> {
        target.validate(self.current.len(), self.q)?;
        debug!(
            "swendsen-wang: n={} q={} c={} from {:?} to {} target",
            self.current.len(),
            self.q,
            self.c,
            self.current.tallies(),
            target.name()
        );
        let mut iterations = 0u64;
        loop {
            if max_iterations.map_or(false, |m| iterations >= m) {
                warn!(
                    "swendsen-wang: {} target not hit after {} sweeps",
                    target.name(),
                    iterations
                );
                return Ok(TrialOutcome::NotConverged(iterations));
            }
            self.sweep(rng);
            iterations += 1;
            if target.is_met(self.current.tallies()) {
                debug!("swendsen-wang: hit target after {} sweeps", iterations);
                return Ok(TrialOutcome::Converged(iterations));
            }
        }
    }

    /// Keep each same spin candidate pair with the bond probability.
    fn sample_bonds<R: Rng>(&mut self, rng: &mut R) {
        let p = self.bond_probability;
        match &self.topology {
            Topology::Complete(_) => {
                for members in &self.classes {
                    for (index, &a) in members.iter().enumerate() {
                        for &b in &members[index + 1..] {
                            if rng.gen::<f64>() < p {
                                self.edges.add(a, b);
                            }
                        }
                    }
                }
            }
            Topology::Sparse(graph) => {
                for (spin, members) in self.classes.iter().enumerate() {
                    for &a in members {
                        for &b in graph.neighbors(a) {
                            if a < b && self.current.get(b) == spin && rng.gen::<f64>() < p {
                                self.edges.add(a, b);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Depth first search over kept bonds, one class at a time. Each component gets one
    /// fresh spin in the next configuration, singletons included.
    fn relabel_clusters<R: Rng>(&mut self, rng: &mut R) {
        self.cluster_sizes.clear();
        for spin in 0..self.q {
            for index in 0..self.classes[spin].len() {
                let root = self.classes[spin][index];
                if self.edges.is_visited(root) {
                    continue;
                }
                let new_spin = rng.gen_range(0..self.q);
                let label = self.cluster_sizes.len();
                self.cluster_sizes.push(0);
                self.stack.push(root);
                while let Some(j) = self.stack.pop() {
                    if !self.edges.visit(j) {
                        continue;
                    }
                    self.next.set(j, new_spin);
                    self.cluster_labels[j] = label;
                    self.cluster_sizes[label] += 1;
                    match &self.topology {
                        Topology::Complete(_) => {
                            for &k in &self.classes[spin] {
                                if k != j
                                    && !self.edges.is_visited(k)
                                    && self.edges.test_and_remove(j, k)
                                {
                                    self.stack.push(k);
                                }
                            }
                        }
                        Topology::Sparse(graph) => {
                            for &k in graph.neighbors(j) {
                                if self.current.get(k) == spin
                                    && !self.edges.is_visited(k)
                                    && self.edges.test_and_remove(j, k)
                                {
                                    self.stack.push(k);
                                }
                            }
                        }
                    }
                }
            }
        }
        debug_assert_eq!(
            self.cluster_sizes.iter().sum::<usize>(),
            self.current.len()
        );
    }

    fn rebuild_classes(&mut self) {
        self.classes.iter_mut().for_each(|members| members.clear());
        for (site, spin) in self.current.spins().iter().enumerate() {
            self.classes[*spin].push(site);
        }
    }
}

#[cfg(test)]
mod swendsen_wang_tests {
    use super::*;
    use crate::graph::Graph;
    use crate::state::Alphabet;
    use rand::prelude::*;

    #[test]
    fn test_bond_probability() {
        let init = Configuration::new(10, Alphabet::Potts(3), 0).unwrap();
        let sw = SwendsenWang::new(Topology::Complete(10), 2.0, init.clone()).unwrap();
        assert!((sw.bond_probability() - (1.0 - (-0.2f64).exp())).abs() < 1e-12);
        let sw = SwendsenWang::new(Topology::Complete(10), 0.0, init.clone()).unwrap();
        assert_eq!(sw.bond_probability(), 0.0);
        assert_eq!(sw.c(), 0.0);
        assert_eq!(sw.num_classes(), 3);
        assert!(SwendsenWang::new(Topology::Complete(10), -1.0, init.clone()).is_err());
        assert!(SwendsenWang::new(Topology::Complete(11), 1.0, init).is_err());
    }

    #[test]
    fn test_huge_c_is_one_cluster_per_class() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let init = Configuration::from_spins(vec![0, 0, 1, 1, 1, 2], Alphabet::Potts(3)).unwrap();
        let mut sw = SwendsenWang::new(Topology::Complete(6), 1e9, init).unwrap();
        assert_eq!(sw.sweep(&mut rng), 3);
        let (labels, sizes) = sw.last_clusters();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[4]);
        let mut sorted = sizes.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3]);
        // Clusters move as a block.
        let c = sw.current();
        assert_eq!(c.get(2), c.get(3));
        assert_eq!(c.get(3), c.get(4));
    }

    #[test]
    fn test_classes_follow_state() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let topology = Topology::Sparse(Graph::torus(3).unwrap());
        let mut sw = SwendsenWang::for_target(topology, 3, 1.5, TypeVectorTarget::Balanced).unwrap();
        for _ in 0..20 {
            sw.sweep(&mut rng);
            for spin in 0..3 {
                assert_eq!(sw.class_members(spin).len(), sw.current().tally(spin));
                assert!(sw
                    .class_members(spin)
                    .iter()
                    .all(|v| sw.current().get(*v) == spin));
            }
        }
    }
}
