//! Shortest-path lengths and diameter.
//!
//! All graphs here are unweighted, so single-source distances are a BFS.
//! Pairs with no path are excluded from every aggregate; whether that
//! happened is reported through [`PathSummary::connected`].

use super::adjacency::Adjacency;
use serde::Serialize;
use std::collections::VecDeque;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Directed BFS distances from `source`; `None` where unreachable.
pub fn bfs_distances(adj: &Adjacency, source: usize) -> Vec<Option<usize>> {
    let n = adj.node_count();
    let mut dist = vec![None; n];
    if source >= n {
        return dist;
    }
    dist[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(u) = queue.pop_front() {
        let du = dist[u].unwrap_or(0);
        for &v in adj.successors(u) {
            if dist[v].is_none() {
                dist[v] = Some(du + 1);
                queue.push_back(v);
            }
        }
    }
    dist
}

/// Distance rows for every source, in source order.
pub fn all_pairs_distances(adj: &Adjacency) -> Vec<Vec<Option<usize>>> {
    let n = adj.node_count();
    #[cfg(feature = "parallel")]
    {
        (0..n)
            .into_par_iter()
            .map(|s| bfs_distances(adj, s))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(|s| bfs_distances(adj, s)).collect()
    }
}

/// Aggregate shortest-path statistics over ordered pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSummary {
    /// Longest shortest path among reachable ordered pairs.
    pub diameter: usize,
    /// One ordered pair realizing the diameter (lowest source, then target).
    pub endpoints: Option<(usize, usize)>,
    /// Mean shortest-path length among reachable ordered pairs.
    pub mean_distance: f64,
    /// Ordered pairs `(i, j)`, `i != j`, with a path.
    pub reachable_pairs: usize,
    /// All ordered pairs `(i, j)`, `i != j`.
    pub total_pairs: usize,
    /// Whether every ordered pair is reachable.
    pub connected: bool,
}

/// Summarize directed shortest paths of `adj`.
///
/// For the undirected diameter pass [`Adjacency::symmetrized`], or use
/// [`undirected_path_summary`].
pub fn path_summary(adj: &Adjacency) -> PathSummary {
    let n = adj.node_count();
    let rows = all_pairs_distances(adj);

    let mut diameter = 0;
    let mut endpoints = None;
    let mut total = 0usize;
    let mut reachable = 0usize;
    for (s, row) in rows.iter().enumerate() {
        for (t, d) in row.iter().enumerate() {
            if s == t {
                continue;
            }
            if let Some(d) = *d {
                reachable += 1;
                total += d;
                if endpoints.is_none() || d > diameter {
                    diameter = d;
                    endpoints = Some((s, t));
                }
            }
        }
    }

    let total_pairs = n * n.saturating_sub(1);
    let summary = PathSummary {
        diameter,
        endpoints,
        mean_distance: if reachable > 0 {
            total as f64 / reachable as f64
        } else {
            0.0
        },
        reachable_pairs: reachable,
        total_pairs,
        connected: reachable == total_pairs,
    };
    if !summary.connected {
        tracing::warn!(
            reachable = summary.reachable_pairs,
            total = summary.total_pairs,
            "graph not fully reachable; diameter restricted to reachable pairs"
        );
    }
    summary
}

/// Summarize shortest paths of the symmetrized graph.
pub fn undirected_path_summary(adj: &Adjacency) -> PathSummary {
    path_summary(&adj.symmetrized())
}

/// Directed diameter over reachable pairs.
pub fn diameter(adj: &Adjacency) -> usize {
    path_summary(adj).diameter
}

/// Undirected diameter over reachable pairs.
pub fn undirected_diameter(adj: &Adjacency) -> usize {
    undirected_path_summary(adj).diameter
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bfs_on_chain() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(
            bfs_distances(&adj, 0),
            vec![Some(0), Some(1), Some(2), Some(3)]
        );
        assert_eq!(bfs_distances(&adj, 3), vec![None, None, None, Some(0)]);
    }

    #[test]
    fn directed_chain_is_not_connected() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let s = path_summary(&adj);
        assert_eq!(s.diameter, 3);
        assert_eq!(s.endpoints, Some((0, 3)));
        assert_eq!(s.reachable_pairs, 6);
        assert_eq!(s.total_pairs, 12);
        assert!(!s.connected);
        assert_relative_eq!(s.mean_distance, 10.0 / 6.0);
    }

    #[test]
    fn undirected_view_reaches_everything() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let s = undirected_path_summary(&adj);
        assert!(s.connected);
        assert_eq!(s.diameter, 3);
    }

    #[test]
    fn directed_cycle_diameter() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(diameter(&adj), 3);
        assert_eq!(undirected_diameter(&adj), 2);
    }

    #[test]
    fn empty_and_isolated_graphs() {
        let s = path_summary(&Adjacency::from_edges(0, &[]));
        assert_eq!(s.diameter, 0);
        assert!(s.connected);
        let s = path_summary(&Adjacency::from_edges(3, &[]));
        assert_eq!(s.endpoints, None);
        assert_eq!(s.reachable_pairs, 0);
    }
}
