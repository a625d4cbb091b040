//! Whole-graph ratios: density, reciprocity, transitivity.

use super::adjacency::Adjacency;

/// Edge density `m / (n (n - 1))`.
///
/// Zero for graphs with fewer than two nodes.
pub fn density(adj: &Adjacency) -> f64 {
    let n = adj.node_count();
    if n < 2 {
        return 0.0;
    }
    adj.edge_count() as f64 / (n * (n - 1)) as f64
}

/// Counts of connected dyads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct DyadCensus {
    /// Unordered pairs with edges in both directions.
    pub mutual: usize,
    /// Unordered pairs with exactly one directed edge.
    pub asymmetric: usize,
    /// Unordered pairs with no edge.
    pub null: usize,
}

/// Classify every unordered pair of nodes.
pub fn dyad_census(adj: &Adjacency) -> DyadCensus {
    let n = adj.node_count();
    let mut census = DyadCensus::default();
    for i in 0..n {
        for &j in adj.neighbors(i) {
            if j <= i {
                continue;
            }
            if adj.has_edge(i, j) && adj.has_edge(j, i) {
                census.mutual += 1;
            } else {
                census.asymmetric += 1;
            }
        }
    }
    let pairs = n * n.saturating_sub(1) / 2;
    census.null = pairs - census.mutual - census.asymmetric;
    census
}

/// Fraction of connected unordered pairs whose tie is reciprocated.
///
/// Zero for an edgeless graph.
pub fn reciprocity(adj: &Adjacency) -> f64 {
    let census = dyad_census(adj);
    let connected = census.mutual + census.asymmetric;
    if connected == 0 {
        return 0.0;
    }
    census.mutual as f64 / connected as f64
}

/// Fraction of directed edges whose reverse edge is also present.
pub fn edge_reciprocity(adj: &Adjacency) -> f64 {
    if adj.edge_count() == 0 {
        return 0.0;
    }
    let census = dyad_census(adj);
    (2 * census.mutual) as f64 / adj.edge_count() as f64
}

/// Triangle and open-triad counts on the symmetrized graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct TriadCounts {
    /// Node triples with all three undirected edges.
    pub triangles: usize,
    /// Node triples with exactly two undirected edges.
    pub open: usize,
}

/// Count closed and open triples of the symmetrized graph.
pub fn triad_counts(adj: &Adjacency) -> TriadCounts {
    let n = adj.node_count();
    let mut triangles = 0usize;
    let mut centered = 0usize;
    for u in 0..n {
        let nu = adj.neighbors(u);
        let d = nu.len();
        centered += d * d.saturating_sub(1) / 2;
        for &v in nu.iter().filter(|&&v| v > u) {
            triangles += adj
                .neighbors(v)
                .iter()
                .filter(|&&w| w > v && adj.adjacent(u, w))
                .count();
        }
    }
    TriadCounts {
        triangles,
        open: centered - 3 * triangles,
    }
}

/// Among node triples with at least two of three undirected edges, the
/// fraction that are closed triangles.
///
/// Zero when no such triple exists.
pub fn transitivity(adj: &Adjacency) -> f64 {
    let t = triad_counts(adj);
    let denom = t.triangles + t.open;
    if denom == 0 {
        return 0.0;
    }
    t.triangles as f64 / denom as f64
}

/// Global clustering coefficient: `3 x triangles / connected triples`.
///
/// Each triangle closes three centered two-paths, so this weights closed
/// triples three times as heavily as [`transitivity`].
pub fn global_clustering(adj: &Adjacency) -> f64 {
    let t = triad_counts(adj);
    let denom = 3 * t.triangles + t.open;
    if denom == 0 {
        return 0.0;
    }
    (3 * t.triangles) as f64 / denom as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scenario() -> Adjacency {
        // A->B, B->A, B->C, C->D
        Adjacency::from_edges(4, &[(0, 1), (1, 0), (1, 2), (2, 3)])
    }

    #[test]
    fn density_of_scenario() {
        assert_relative_eq!(density(&scenario()), 4.0 / 12.0);
    }

    #[test]
    fn reciprocity_counts_dyads() {
        let adj = scenario();
        assert_relative_eq!(reciprocity(&adj), 1.0 / 3.0);
        assert_relative_eq!(edge_reciprocity(&adj), 0.5);
        let census = dyad_census(&adj);
        assert_eq!(census.mutual, 1);
        assert_eq!(census.asymmetric, 2);
        assert_eq!(census.null, 3);
    }

    #[test]
    fn reciprocity_extremes() {
        let one_way = Adjacency::from_edges(3, &[(0, 1), (1, 2)]);
        assert_eq!(reciprocity(&one_way), 0.0);
        let mutual = Adjacency::from_edges(3, &[(0, 1), (1, 0), (1, 2), (2, 1)]);
        assert_eq!(reciprocity(&mutual), 1.0);
    }

    #[test]
    fn triangle_is_fully_transitive() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(triad_counts(&adj), TriadCounts { triangles: 1, open: 0 });
        assert_eq!(transitivity(&adj), 1.0);
        assert_eq!(global_clustering(&adj), 1.0);
    }

    #[test]
    fn triangle_with_pendant() {
        // Triangle 0-1-2 plus pendant 2-3: open triples centred at 2 are
        // {0,2,3} and {1,2,3}.
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 2), (2, 0), (2, 3)]);
        let t = triad_counts(&adj);
        assert_eq!(t.triangles, 1);
        assert_eq!(t.open, 2);
        assert_relative_eq!(transitivity(&adj), 1.0 / 3.0);
        assert_relative_eq!(global_clustering(&adj), 3.0 / 5.0);
    }

    #[test]
    fn path_has_no_closure() {
        assert_eq!(transitivity(&scenario()), 0.0);
    }

    #[test]
    fn tiny_graphs_are_zero() {
        let adj = Adjacency::from_edges(1, &[]);
        assert_eq!(density(&adj), 0.0);
        assert_eq!(reciprocity(&adj), 0.0);
        assert_eq!(transitivity(&adj), 0.0);
    }
}
