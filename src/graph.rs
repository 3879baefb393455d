use crate::errors::{MixError, MixResult};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An edge between two sites.
pub type Edge = (usize, usize);

/// Neighbor list for a single site.
pub type Neighbors = SmallVec<[usize; 4]>;

/// Site index of `(x, y)` on a torus of side `side`.
pub fn torus_site(side: usize, x: usize, y: usize) -> usize {
    x * side + y
}

/// The four toroidal neighbors of `(x, y)` in the order (x+1, y), (x-1, y), (x, y+1), (x, y-1).
/// Positions are repeated for tori of side 1 or 2.
pub fn torus_neighbors(side: usize, x: usize, y: usize) -> [usize; 4] {
    let up = (x + 1) % side;
    let down = (x + side - 1) % side;
    let right = (y + 1) % side;
    let left = (y + side - 1) % side;
    [
        torus_site(side, up, y),
        torus_site(side, down, y),
        torus_site(side, x, right),
        torus_site(side, x, left),
    ]
}

/// Edges of a periodic 2d lattice with `l*l` sites.
pub fn two_d_periodic(l: usize) -> Vec<Edge> {
    let f = |i, j| torus_site(l, i, j);
    let right_connects = (0..l).flat_map(|i| (0..l).map(move |j| (i, j)));
    let down_connects = right_connects.clone();
    right_connects
        .map(|(i, j)| (f(i, j), f((i + 1) % l, j)))
        .chain(down_connects.map(|(i, j)| (f(i, j), f(i, (j + 1) % l))))
        .collect()
}

/// A sparse undirected graph stored as sorted, deduplicated adjacency lists.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Graph {
    adjacency: Vec<Neighbors>,
}

impl Graph {
    /// Make a graph on `n` sites from a list of edges. Self loops and repeated edges are dropped.
    pub fn from_edges(n: usize, edges: &[Edge]) -> MixResult<Self> {
        if n == 0 {
            return Err(MixError::EmptySystem);
        }
        let mut adjacency = vec![Neighbors::new(); n];
        for &(a, b) in edges {
            if a >= n || b >= n {
                return Err(MixError::InvalidGraph(a, b, n));
            }
            if a != b {
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }
        adjacency.iter_mut().for_each(|vs| {
            vs.sort_unstable();
            vs.dedup();
        });
        Ok(Self { adjacency })
    }

    /// Periodic square lattice of `side * side` sites.
    pub fn torus(side: usize) -> MixResult<Self> {
        if side == 0 {
            return Err(MixError::EmptySystem);
        }
        Self::from_edges(side * side, &two_d_periodic(side))
    }

    /// Number of sites.
    pub fn num_sites(&self) -> usize {
        self.adjacency.len()
    }

    /// Distinct neighbors of a site, ascending.
    pub fn neighbors(&self, site: usize) -> &[usize] {
        &self.adjacency[site]
    }

    /// Number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().map(|vs| vs.len()).sum::<usize>() / 2
    }
}

/// The graph a cluster update runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Topology {
    /// Complete graph `K_n`: every pair of sites is a candidate bond.
    Complete(usize),
    /// Only graph-adjacent pairs are candidate bonds.
    Sparse(Graph),
}

impl Topology {
    /// Number of sites.
    pub fn num_sites(&self) -> usize {
        match self {
            Topology::Complete(n) => *n,
            Topology::Sparse(g) => g.num_sites(),
        }
    }
}
