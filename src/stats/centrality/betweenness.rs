//! Betweenness centrality (Brandes 2001) on directed shortest paths.
//!
//! For each node `v`, the sum over ordered pairs `(s, t)` with
//! `s != v != t` of the fraction of shortest `s -> t` paths that pass
//! through `v`.

use super::CentralityScores;
use crate::stats::adjacency::Adjacency;
use std::collections::VecDeque;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Betweenness centrality configuration.
#[derive(Debug, Clone, Default)]
pub struct BetweennessConfig {
    /// Divide by `(n - 1)(n - 2)`, the number of ordered pairs excluding `v`.
    pub normalized: bool,
}

/// Dependencies of every node on paths from `s`.
fn single_source(adj: &Adjacency, s: usize) -> Vec<f64> {
    let n = adj.node_count();
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![usize::MAX; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut order = Vec::with_capacity(n);

    sigma[s] = 1.0;
    dist[s] = 0;
    let mut queue = VecDeque::from([s]);
    while let Some(v) = queue.pop_front() {
        order.push(v);
        for &w in adj.successors(v) {
            if dist[w] == usize::MAX {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                preds[w].push(v);
            }
        }
    }

    let mut delta = vec![0.0f64; n];
    for &w in order.iter().rev() {
        for &v in &preds[w] {
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
    }
    delta[s] = 0.0;
    delta
}

/// Betweenness of every node.
pub fn betweenness_centrality(adj: &Adjacency, config: &BetweennessConfig) -> CentralityScores {
    let n = adj.node_count();

    #[cfg(feature = "parallel")]
    let mut values = (0..n)
        .into_par_iter()
        .map(|s| single_source(adj, s))
        .reduce(
            || vec![0.0; n],
            |mut acc, d| {
                for (a, x) in acc.iter_mut().zip(d) {
                    *a += x;
                }
                acc
            },
        );
    #[cfg(not(feature = "parallel"))]
    let mut values = (0..n).fold(vec![0.0; n], |mut acc, s| {
        for (a, x) in acc.iter_mut().zip(single_source(adj, s)) {
            *a += x;
        }
        acc
    });

    if config.normalized && n > 2 {
        let scale = ((n - 1) * (n - 2)) as f64;
        for v in &mut values {
            *v /= scale;
        }
    }
    CentralityScores::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn directed_path_middle() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2)]);
        let s = betweenness_centrality(&adj, &BetweennessConfig::default());
        assert_eq!(s.values(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn split_shortest_paths_share_credit() {
        // Two shortest routes 0 -> 3: via 1 and via 2.
        let adj = Adjacency::from_edges(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let s = betweenness_centrality(&adj, &BetweennessConfig::default());
        assert_relative_eq!(s.values()[1], 0.5);
        assert_relative_eq!(s.values()[2], 0.5);
        assert_eq!(s.values()[0], 0.0);
    }

    #[test]
    fn bidirectional_star_center() {
        let adj = Adjacency::from_edges(
            4,
            &[(0, 1), (1, 0), (0, 2), (2, 0), (0, 3), (3, 0)],
        );
        let raw = betweenness_centrality(&adj, &BetweennessConfig::default());
        // All 6 ordered leaf pairs route through the centre.
        assert_relative_eq!(raw.values()[0], 6.0);
        let norm = betweenness_centrality(&adj, &BetweennessConfig { normalized: true });
        assert_relative_eq!(norm.values()[0], 1.0);
        assert_eq!(norm.argmax(), Some(0));
    }
}
