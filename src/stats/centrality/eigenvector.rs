//! Eigenvector centrality by power iteration.
//!
//! The dominant eigenvector is only unique (Perron-Frobenius) when the
//! adjacency matrix is irreducible, so a disconnected view is an error
//! rather than a silently arbitrary answer. Iterating on `A + I` has the
//! same dominant eigenvector as `A` and avoids oscillation on bipartite
//! graphs.

use super::CentralityScores;
use crate::error::{Error, Result};
use crate::stats::adjacency::Adjacency;
use crate::stats::components::{strong_components, weak_components};

/// Eigenvector centrality configuration.
#[derive(Debug, Clone)]
pub struct EigenvectorConfig {
    /// Use directed in-edges (`x_v = Σ_{u -> v} x_u`) instead of the
    /// symmetrized graph.
    pub directed: bool,
    /// Maximum power iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the max-norm change.
    pub tol: f64,
}

impl Default for EigenvectorConfig {
    fn default() -> Self {
        Self {
            directed: false,
            max_iter: 1000,
            tol: 1e-10,
        }
    }
}

/// Eigenvector centrality, scaled so the largest value is 1.
pub fn eigenvector_centrality(adj: &Adjacency, config: &EigenvectorConfig) -> Result<CentralityScores> {
    let n = adj.node_count();
    if n == 0 {
        return Err(Error::EmptyInput);
    }

    let components = if config.directed {
        strong_components(adj).count()
    } else {
        weak_components(adj).count()
    };
    if components > 1 {
        return Err(Error::DisconnectedGraph { components });
    }

    let mut x = vec![1.0; n];
    for iter in 0..config.max_iter {
        let mut next = x.clone();
        for (v, slot) in next.iter_mut().enumerate() {
            let sources = if config.directed {
                adj.predecessors(v)
            } else {
                adj.neighbors(v)
            };
            *slot += sources.iter().map(|&u| x[u]).sum::<f64>();
        }
        let max = next.iter().copied().fold(0.0, f64::max);
        if max <= 0.0 {
            return Err(Error::Undefined {
                statistic: "eigenvector centrality",
                reason: "power iteration collapsed to zero",
            });
        }
        for v in &mut next {
            *v /= max;
        }
        let change = x
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        x = next;
        if change < config.tol {
            tracing::debug!(iterations = iter + 1, "eigenvector centrality converged");
            return Ok(CentralityScores::new(x));
        }
    }

    Err(Error::ConvergenceFailure {
        algorithm: "eigenvector centrality",
        iterations: config.max_iter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn star_center_dominates() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (0, 2), (0, 3)]);
        let s = eigenvector_centrality(&adj, &EigenvectorConfig::default()).unwrap();
        assert_relative_eq!(s.values()[0], 1.0);
        // Star K_{1,3}: leaves score 1 / sqrt(3).
        assert_relative_eq!(s.values()[1], 1.0 / 3f64.sqrt(), epsilon = 1e-8);
        assert_eq!(s.argmax(), Some(0));
    }

    #[test]
    fn regular_graph_is_uniform() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let s = eigenvector_centrality(&adj, &EigenvectorConfig::default()).unwrap();
        for &v in s.values() {
            assert_relative_eq!(v, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn disconnected_is_rejected() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (2, 3)]);
        let err = eigenvector_centrality(&adj, &EigenvectorConfig::default()).unwrap_err();
        assert!(matches!(err, Error::DisconnectedGraph { components: 2 }));
    }

    #[test]
    fn directed_requires_strong_connectivity() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2)]);
        let config = EigenvectorConfig {
            directed: true,
            ..Default::default()
        };
        assert!(eigenvector_centrality(&adj, &config).is_err());

        let cycle = Adjacency::from_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        let s = eigenvector_centrality(&cycle, &config).unwrap();
        assert_relative_eq!(s.values()[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn iteration_limit_is_reported() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (0, 2), (0, 3)]);
        let config = EigenvectorConfig {
            max_iter: 1,
            ..Default::default()
        };
        let err = eigenvector_centrality(&adj, &config).unwrap_err();
        assert!(matches!(err, Error::ConvergenceFailure { iterations: 1, .. }));
    }
}
