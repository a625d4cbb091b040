//! Simple directed graph view shared by every statistic.

use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;

/// A simple directed graph over nodes `0..n`.
///
/// Parallel edges and self-loops are discarded on construction, so every
/// statistic sees the collapsed graph. Neighbor lists are sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    out: Vec<Vec<usize>>,
    inc: Vec<Vec<usize>>,
    und: Vec<Vec<usize>>,
    n_edges: usize,
}

impl Adjacency {
    /// Build from an edge list over `n` nodes.
    ///
    /// Edges with an endpoint `>= n` are ignored.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut out = vec![Vec::new(); n];
        let mut inc = vec![Vec::new(); n];
        for &(i, j) in edges {
            if i == j || i >= n || j >= n {
                continue;
            }
            out[i].push(j);
            inc[j].push(i);
        }
        for list in out.iter_mut().chain(inc.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        let mut und = vec![Vec::new(); n];
        for (i, targets) in out.iter().enumerate() {
            for &j in targets {
                und[i].push(j);
                und[j].push(i);
            }
        }
        for list in &mut und {
            list.sort_unstable();
            list.dedup();
        }

        let n_edges = out.iter().map(Vec::len).sum();
        Self {
            out,
            inc,
            und,
            n_edges,
        }
    }

    /// Build from a petgraph directed graph, using node indices as ids.
    pub fn from_graph<N, E>(graph: &DiGraph<N, E>) -> Self {
        let edges: Vec<(usize, usize)> = graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();
        Self::from_edges(graph.node_count(), &edges)
    }

    /// The symmetrized graph: `i -> j` and `j -> i` whenever either was present.
    pub fn symmetrized(&self) -> Self {
        Self {
            out: self.und.clone(),
            inc: self.und.clone(),
            und: self.und.clone(),
            n_edges: self.und.iter().map(Vec::len).sum(),
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.out.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.n_edges
    }

    /// Number of undirected edges in the symmetrized graph.
    pub fn undirected_edge_count(&self) -> usize {
        self.und.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Out-neighbors of `i`.
    pub fn successors(&self, i: usize) -> &[usize] {
        &self.out[i]
    }

    /// In-neighbors of `i`.
    pub fn predecessors(&self, i: usize) -> &[usize] {
        &self.inc[i]
    }

    /// Neighbors of `i` ignoring direction.
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.und[i]
    }

    /// Whether the directed edge `i -> j` exists.
    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        self.out
            .get(i)
            .is_some_and(|list| list.binary_search(&j).is_ok())
    }

    /// Whether `i` and `j` are adjacent in either direction.
    pub fn adjacent(&self, i: usize, j: usize) -> bool {
        self.und
            .get(i)
            .is_some_and(|list| list.binary_search(&j).is_ok())
    }

    /// Iterate over directed edges in (source, target) order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.out
            .iter()
            .enumerate()
            .flat_map(|(i, targets)| targets.iter().map(move |&j| (i, j)))
    }

    /// Dense 0/1 adjacency matrix (row = source).
    pub fn to_matrix(&self) -> ndarray::Array2<f64> {
        let n = self.node_count();
        let mut m = ndarray::Array2::zeros((n, n));
        for (i, j) in self.edges() {
            m[[i, j]] = 1.0;
        }
        m
    }

    /// Induced subgraph on `nodes` (renumbered in the given order).
    ///
    /// Duplicates in `nodes` are ignored after their first occurrence.
    pub fn induced(&self, nodes: &[usize]) -> Self {
        let mut map = vec![usize::MAX; self.node_count()];
        let mut kept = 0;
        for &v in nodes {
            if v < map.len() && map[v] == usize::MAX {
                map[v] = kept;
                kept += 1;
            }
        }
        let edges: Vec<(usize, usize)> = self
            .edges()
            .filter(|&(i, j)| map[i] != usize::MAX && map[j] != usize::MAX)
            .map(|(i, j)| (map[i], map[j]))
            .collect();
        Self::from_edges(kept, &edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_parallel_edges_and_loops() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (0, 1), (1, 1), (1, 2)]);
        assert_eq!(adj.edge_count(), 2);
        assert!(adj.has_edge(0, 1));
        assert!(!adj.has_edge(1, 0));
        assert!(adj.adjacent(1, 0));
        assert_eq!(adj.predecessors(2), &[1]);
    }

    #[test]
    fn symmetrized_counts_each_pair_twice() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 0), (1, 2)]);
        let sym = adj.symmetrized();
        assert_eq!(adj.undirected_edge_count(), 2);
        assert_eq!(sym.edge_count(), 4);
        assert!(sym.has_edge(2, 1));
    }

    #[test]
    fn from_graph_matches_edge_list() {
        let mut g = DiGraph::<(), ()>::new();
        let a = g.add_node(());
        let b = g.add_node(());
        let _ = g.add_edge(a, b, ());
        let _ = g.add_edge(a, b, ());
        let adj = Adjacency::from_graph(&g);
        assert_eq!(adj.node_count(), 2);
        assert_eq!(adj.edge_count(), 1);
    }

    #[test]
    fn induced_keeps_internal_edges_only() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let sub = adj.induced(&[1, 2, 3]);
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2)]);
    }
}
