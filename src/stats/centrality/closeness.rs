//! Closeness centrality over directed shortest paths.
//!
//! `C(v) = 1 / Σ_u d(v, u)` over the nodes `u` reachable from `v`. Nodes
//! that cannot reach anyone score zero. With normalization the value is
//! multiplied by the number of reachable nodes, i.e. it becomes the
//! inverse mean distance.

use super::CentralityScores;
use crate::stats::adjacency::Adjacency;
use crate::stats::paths::bfs_distances;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Closeness centrality configuration.
#[derive(Debug, Clone, Default)]
pub struct ClosenessConfig {
    /// Follow incoming instead of outgoing edges.
    pub incoming: bool,
    /// Report inverse mean distance instead of inverse total distance.
    pub normalized: bool,
}

fn score(dist: &[Option<usize>], source: usize, normalized: bool) -> f64 {
    let (sum, reached) = dist
        .iter()
        .enumerate()
        .filter(|&(u, _)| u != source)
        .filter_map(|(_, d)| *d)
        .fold((0usize, 0usize), |(s, c), d| (s + d, c + 1));
    if sum == 0 {
        return 0.0;
    }
    if normalized {
        reached as f64 / sum as f64
    } else {
        1.0 / sum as f64
    }
}

/// Closeness of every node.
pub fn closeness_centrality(adj: &Adjacency, config: &ClosenessConfig) -> CentralityScores {
    let reversed;
    let view = if config.incoming {
        let edges: Vec<(usize, usize)> = adj.edges().map(|(i, j)| (j, i)).collect();
        reversed = Adjacency::from_edges(adj.node_count(), &edges);
        &reversed
    } else {
        adj
    };

    let n = view.node_count();
    #[cfg(feature = "parallel")]
    let values: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|v| score(&bfs_distances(view, v), v, config.normalized))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let values: Vec<f64> = (0..n)
        .map(|v| score(&bfs_distances(view, v), v, config.normalized))
        .collect();

    CentralityScores::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn star_center_is_closest() {
        // 0 <-> {1, 2, 3}
        let adj = Adjacency::from_edges(
            4,
            &[(0, 1), (1, 0), (0, 2), (2, 0), (0, 3), (3, 0)],
        );
        let s = closeness_centrality(&adj, &ClosenessConfig::default());
        assert_relative_eq!(s.values()[0], 1.0 / 3.0);
        assert_relative_eq!(s.values()[1], 1.0 / 5.0);
        assert_eq!(s.argmax(), Some(0));
    }

    #[test]
    fn unreachable_nodes_are_excluded() {
        // 0 -> 1 -> 2; node 2 reaches nobody.
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2)]);
        let s = closeness_centrality(&adj, &ClosenessConfig::default());
        assert_relative_eq!(s.values()[0], 1.0 / 3.0);
        assert_relative_eq!(s.values()[1], 1.0);
        assert_eq!(s.values()[2], 0.0);

        let norm = closeness_centrality(
            &adj,
            &ClosenessConfig {
                normalized: true,
                ..Default::default()
            },
        );
        assert_relative_eq!(norm.values()[0], 2.0 / 3.0);
    }

    #[test]
    fn incoming_reverses_direction() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2)]);
        let s = closeness_centrality(
            &adj,
            &ClosenessConfig {
                incoming: true,
                ..Default::default()
            },
        );
        assert_eq!(s.values()[0], 0.0);
        assert_relative_eq!(s.values()[2], 1.0 / 3.0);
    }
}
