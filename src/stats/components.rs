//! Strong and weak connected components.

use super::adjacency::Adjacency;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use serde::Serialize;

/// A partition of nodes into components.
///
/// Component ids are assigned in order of each component's lowest node
/// index, so the labelling is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Components {
    /// Component id of each node.
    pub membership: Vec<usize>,
    /// Size of each component, indexed by id.
    pub sizes: Vec<usize>,
}

impl Components {
    fn from_raw_labels(raw: &[usize]) -> Self {
        let mut remap = vec![usize::MAX; raw.len()];
        let mut membership = Vec::with_capacity(raw.len());
        let mut sizes = Vec::new();
        for &r in raw {
            if remap[r] == usize::MAX {
                remap[r] = sizes.len();
                sizes.push(0);
            }
            let id = remap[r];
            sizes[id] += 1;
            membership.push(id);
        }
        Self { membership, sizes }
    }

    /// Number of components.
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Size of the largest component (0 for an empty graph).
    pub fn largest(&self) -> usize {
        self.sizes.iter().copied().max().unwrap_or(0)
    }

    /// Component sizes, largest first.
    pub fn sizes_descending(&self) -> Vec<usize> {
        let mut s = self.sizes.clone();
        s.sort_unstable_by(|a, b| b.cmp(a));
        s
    }

    /// Node indices of component `id`.
    pub fn members(&self, id: usize) -> Vec<usize> {
        self.membership
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == id)
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether everything is in one component.
    pub fn is_connected(&self) -> bool {
        self.count() <= 1
    }
}

fn to_petgraph(adj: &Adjacency) -> DiGraph<(), ()> {
    let n = adj.node_count();
    let mut g = DiGraph::with_capacity(n, adj.edge_count());
    for _ in 0..n {
        let _ = g.add_node(());
    }
    for (i, j) in adj.edges() {
        let _ = g.add_edge(NodeIndex::new(i), NodeIndex::new(j), ());
    }
    g
}

/// Maximal sets of mutually reachable nodes.
pub fn strong_components(adj: &Adjacency) -> Components {
    let g = to_petgraph(adj);
    let mut raw = vec![0usize; adj.node_count()];
    for (c, scc) in tarjan_scc(&g).iter().enumerate() {
        for v in scc {
            raw[v.index()] = c;
        }
    }
    // Tarjan emits components in reverse topological order; relabel by
    // lowest node index.
    let mut first_seen = vec![usize::MAX; raw.len()];
    for (v, &c) in raw.iter().enumerate() {
        first_seen[c] = first_seen[c].min(v);
    }
    let canonical: Vec<usize> = raw.iter().map(|&c| first_seen[c]).collect();
    Components::from_raw_labels(&canonical)
}

/// Maximal sets of nodes connected when edge direction is ignored.
pub fn weak_components(adj: &Adjacency) -> Components {
    let n = adj.node_count();
    let mut uf = UnionFind::<usize>::new(n);
    for (i, j) in adj.edges() {
        let _ = uf.union(i, j);
    }
    let raw: Vec<usize> = (0..n).map(|v| uf.find(v)).collect();
    Components::from_raw_labels(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_components() {
        // A->B, B->A, B->C, C->D
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 0), (1, 2), (2, 3)]);
        let weak = weak_components(&adj);
        assert_eq!(weak.count(), 1);
        assert_eq!(weak.sizes, vec![4]);

        let strong = strong_components(&adj);
        assert_eq!(strong.count(), 3);
        assert_eq!(strong.membership[0], strong.membership[1]);
        assert_ne!(strong.membership[1], strong.membership[2]);
        assert_ne!(strong.membership[2], strong.membership[3]);
        assert_eq!(strong.sizes_descending(), vec![2, 1, 1]);
    }

    #[test]
    fn labels_follow_lowest_index() {
        let adj = Adjacency::from_edges(5, &[(3, 4), (4, 3), (0, 1)]);
        let weak = weak_components(&adj);
        assert_eq!(weak.membership, vec![0, 0, 1, 2, 2]);
        let strong = strong_components(&adj);
        assert_eq!(strong.membership, vec![0, 1, 2, 3, 3]);
        assert_eq!(strong.members(3), vec![3, 4]);
    }

    #[test]
    fn cycle_is_one_strong_component() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        assert!(strong_components(&adj).is_connected());
    }
}
