use smallvec::SmallVec;

/// A sparse set of undirected edges over `n` sites.
///
/// Edge `(i, j)` lives in the bucket of `min(i, j)`. Membership tests consume the edge, so a
/// bond is found at most once between two calls to `clear`. The set also carries per site
/// visited flags for traversals; once a site has been visited no more edges may be added
/// until the next `clear`.
#[derive(Debug, Clone)]
pub struct EdgeSet {
    buckets: Vec<SmallVec<[usize; 4]>>,
    dirty: Vec<usize>,
    visited: Vec<bool>,
    visited_sites: Vec<usize>,
    num_edges: usize,
}

impl EdgeSet {
    /// Empty edge set over `n` sites.
    pub fn new(n: usize) -> Self {
        Self {
            buckets: vec![SmallVec::new(); n],
            dirty: Vec::default(),
            visited: vec![false; n],
            visited_sites: Vec::default(),
            num_edges: 0,
        }
    }

    fn order(i: usize, j: usize) -> (usize, usize) {
        if i < j {
            (i, j)
        } else {
            (j, i)
        }
    }

    /// Insert an edge. Returns false for self loops and edges already present.
    pub fn add(&mut self, i: usize, j: usize) -> bool {
        debug_assert!(
            self.visited_sites.is_empty(),
            "edges added after traversal started"
        );
        if i == j {
            return false;
        }
        let (lo, hi) = Self::order(i, j);
        let bucket = &mut self.buckets[lo];
        if bucket.contains(&hi) {
            return false;
        }
        if bucket.is_empty() {
            self.dirty.push(lo);
        }
        bucket.push(hi);
        self.num_edges += 1;
        true
    }

    /// Check for an edge without consuming it.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        let (lo, hi) = Self::order(i, j);
        self.buckets[lo].contains(&hi)
    }

    /// Check for an edge and remove it if present.
    pub fn test_and_remove(&mut self, i: usize, j: usize) -> bool {
        let (lo, hi) = Self::order(i, j);
        let bucket = &mut self.buckets[lo];
        match bucket.iter().position(|v| *v == hi) {
            Some(index) => {
                bucket.swap_remove(index);
                self.num_edges -= 1;
                true
            }
            None => false,
        }
    }

    /// Mark a site visited. Returns true if it was not visited before.
    pub fn visit(&mut self, i: usize) -> bool {
        if self.visited[i] {
            false
        } else {
            self.visited[i] = true;
            self.visited_sites.push(i);
            true
        }
    }

    /// Check the visited flag of a site.
    pub fn is_visited(&self, i: usize) -> bool {
        self.visited[i]
    }

    /// Remove all edges and visited flags. Only touches buckets and flags which were used.
    pub fn clear(&mut self) {
        let buckets = &mut self.buckets;
        self.dirty.drain(..).for_each(|b| buckets[b].clear());
        let visited = &mut self.visited;
        self.visited_sites
            .drain(..)
            .for_each(|v| visited[v] = false);
        self.num_edges = 0;
    }

    /// Number of edges currently stored.
    pub fn len(&self) -> usize {
        self.num_edges
    }

    /// Check if there are no edges.
    pub fn is_empty(&self) -> bool {
        self.num_edges == 0
    }

    /// Number of sites.
    pub fn num_sites(&self) -> usize {
        self.buckets.len()
    }
}
