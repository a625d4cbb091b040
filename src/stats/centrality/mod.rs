//! Node centrality measures.
//!
//! | Measure | Question answered | Cost |
//! |---------|-------------------|------|
//! | Degree | How much grooming does a monkey receive? | O(V) |
//! | Closeness | How few steps to reach everyone else? | O(VE) |
//! | Betweenness | How often on shortest paths between others? | O(VE) |
//! | Eigenvector | Tied to other well-tied monkeys? | O(E × iterations) |
//!
//! Every measure returns a [`CentralityScores`] indexed by node id.
//!
//! # References
//!
//! - Freeman (1979). "Centrality in social networks: conceptual clarification"
//! - Brandes (2001). "A faster algorithm for betweenness centrality"
//! - Bonacich (1987). "Power and centrality: a family of measures"

mod betweenness;
mod closeness;
mod degree;
mod eigenvector;

pub use betweenness::{betweenness_centrality, BetweennessConfig};
pub use closeness::{closeness_centrality, ClosenessConfig};
pub use degree::{degree_centrality, DegreeMode};
pub use eigenvector::{eigenvector_centrality, EigenvectorConfig};

use serde::Serialize;

/// Per-node centrality values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CentralityScores {
    values: Vec<f64>,
}

impl CentralityScores {
    /// Wrap raw values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Values indexed by node id.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of node `i`.
    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied()
    }

    /// Number of nodes scored.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no nodes were scored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Node with the highest score; ties go to the lowest index.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &v) in self.values.iter().enumerate() {
            if v.is_nan() {
                continue;
            }
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((i, v)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// The `k` highest-scoring nodes, descending; ties by lowest index.
    pub fn top_k(&self, k: usize) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self
            .values
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        let s = CentralityScores::new(vec![1.0, 3.0, 3.0, 2.0]);
        assert_eq!(s.argmax(), Some(1));
        assert_eq!(s.top_k(2), vec![(1, 3.0), (2, 3.0)]);
    }

    #[test]
    fn argmax_skips_nan() {
        let s = CentralityScores::new(vec![f64::NAN, 0.5]);
        assert_eq!(s.argmax(), Some(1));
        assert_eq!(CentralityScores::new(vec![]).argmax(), None);
    }
}
