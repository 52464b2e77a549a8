use hashbrown::HashMap;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Dense index of a vertex in a [`Graph`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub struct VertexId(u32);

impl VertexId {
    /// The `i`-th vertex added to a graph.
    pub fn from_index(i: usize) -> Self {
        VertexId(i as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<VertexId> for usize {
    fn from(value: VertexId) -> Self {
        value.0 as usize
    }
}

impl Display for VertexId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An undirected graph whose vertices are identified by opaque names.
///
/// Edges are stored once, as `(min, max)` pairs, so that `(u, v)` and `(v, u)` denote the same edge.
/// Every endpoint of an edge is a vertex of the graph by construction.
#[derive(Default, Clone, Debug)]
pub struct Graph {
    names: Vec<String>,
    index: HashMap<String, VertexId>,
    edges: BTreeSet<(VertexId, VertexId)>,
}

impl Graph {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the vertex with the given name, creating it if needed.
    pub fn add_vertex(&mut self, name: impl Into<String>) -> VertexId {
        let name = name.into();
        if let Some(&id) = self.index.get(&name) {
            return id;
        }
        let id = VertexId(self.names.len() as u32);
        self.names.push(name.clone());
        self.index.insert(name, id);
        id
    }

    /// Adds an undirected edge between two named vertices, adding any missing endpoint.
    /// Returns false if the edge was already present (in any orientation).
    pub fn add_edge(&mut self, a: impl Into<String>, b: impl Into<String>) -> bool {
        let a = self.add_vertex(a);
        let b = self.add_vertex(b);
        self.connect(a, b)
    }

    /// Adds an undirected edge between two existing vertices.
    pub fn connect(&mut self, a: VertexId, b: VertexId) -> bool {
        debug_assert!(a.index() < self.names.len() && b.index() < self.names.len());
        self.edges.insert((a.min(b), a.max(b)))
    }

    pub fn find(&self, name: &str) -> Option<VertexId> {
        self.index.get(name).copied()
    }

    pub fn name(&self, v: VertexId) -> &str {
        &self.names[v.index()]
    }

    /// All vertices, in insertion order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = VertexId> + '_ {
        (0..self.names.len() as u32).map(VertexId)
    }

    /// All edges, each appearing exactly once as `(u, v)` with `u <= v`.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.edges.iter().copied()
    }

    pub fn num_vertices(&self) -> usize {
        self.names.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains_edge(&self, a: VertexId, b: VertexId) -> bool {
        self.edges.contains(&(a.min(b), a.max(b)))
    }

    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.edges.iter().filter_map(move |&(a, b)| {
            if a == v {
                Some(b)
            } else if b == v {
                Some(a)
            } else {
                None
            }
        })
    }

    /// Number of edges incident to `v`, a self-loop counting once.
    pub fn degree(&self, v: VertexId) -> usize {
        self.neighbors(v).count()
    }

    pub fn max_degree(&self) -> usize {
        let mut degrees = vec![0usize; self.num_vertices()];
        for &(a, b) in &self.edges {
            degrees[a.index()] += 1;
            if a != b {
                degrees[b.index()] += 1;
            }
        }
        degrees.into_iter().max().unwrap_or(0)
    }

    /// A self-loop makes the graph impossible to color with any number of colors.
    pub fn has_self_loop(&self) -> bool {
        self.edges.iter().any(|(a, b)| a == b)
    }

    /// A random simple graph on the vertices `0` to `n - 1`.
    ///
    /// The number of edges is uniformly drawn in `[n/2, n(n-1)/2]` and the edges are a uniform
    /// sample of the pairs of distinct vertices.
    pub fn random(n: usize, rng: &mut impl Rng) -> Graph {
        let mut graph = Graph::new();
        for i in 0..n {
            graph.add_vertex(i.to_string());
        }
        let pairs: Vec<(usize, usize)> = (0..n).flat_map(|a| (a + 1..n).map(move |b| (a, b))).collect();
        let max_edges = pairs.len();
        let num_edges = rng.random_range((n / 2).min(max_edges)..=max_edges);
        for &(a, b) in pairs.choose_multiple(rng, num_edges) {
            graph.connect(VertexId::from_index(a), VertexId::from_index(b));
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_undirected() {
        let mut g = Graph::new();
        assert!(g.add_edge("a", "b"));
        assert!(!g.add_edge("b", "a"));
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.num_vertices(), 2);
        let a = g.find("a").unwrap();
        let b = g.find("b").unwrap();
        assert!(g.contains_edge(b, a));
        assert_eq!(g.neighbors(b).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn vertices_keep_insertion_order() {
        let mut g = Graph::new();
        g.add_vertex("z");
        g.add_edge("y", "z");
        g.add_vertex("x");
        let names: Vec<&str> = g.vertices().map(|v| g.name(v)).collect();
        assert_eq!(names, vec!["z", "y", "x"]);
    }

    #[test]
    fn degrees() {
        let mut g = Graph::new();
        g.add_edge("a", "b");
        g.add_edge("a", "c");
        g.add_edge("a", "d");
        g.add_vertex("e");
        assert_eq!(g.degree(g.find("a").unwrap()), 3);
        assert_eq!(g.degree(g.find("e").unwrap()), 0);
        assert_eq!(g.max_degree(), 3);
        assert!(!g.has_self_loop());
        g.add_edge("e", "e");
        assert!(g.has_self_loop());
        assert_eq!(g.degree(g.find("e").unwrap()), 1);
    }

    #[test]
    fn random_graphs() {
        use rand::SeedableRng;
        use rand::rngs::SmallRng;
        let mut rng = SmallRng::seed_from_u64(0);
        for n in 0..12 {
            let g = Graph::random(n, &mut rng);
            assert_eq!(g.num_vertices(), n);
            assert!(g.num_edges() <= n * n.saturating_sub(1) / 2);
            assert!(g.num_edges() >= (n / 2).min(n * n.saturating_sub(1) / 2));
            assert!(!g.has_self_loop());
            assert_eq!(g.find(&n.saturating_sub(1).to_string()).is_some(), n > 0);
        }
    }
}
