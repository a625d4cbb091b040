//! Degree sequences and their summaries.

use super::adjacency::Adjacency;
use serde::Serialize;
use std::collections::BTreeMap;

/// In-degree of every node.
pub fn in_degrees(adj: &Adjacency) -> Vec<usize> {
    (0..adj.node_count())
        .map(|i| adj.predecessors(i).len())
        .collect()
}

/// Out-degree of every node.
pub fn out_degrees(adj: &Adjacency) -> Vec<usize> {
    (0..adj.node_count())
        .map(|i| adj.successors(i).len())
        .collect()
}

/// Frequency of each degree value, ascending.
pub fn degree_histogram(degrees: &[usize]) -> BTreeMap<usize, usize> {
    let mut hist = BTreeMap::new();
    for &d in degrees {
        *hist.entry(d).or_insert(0) += 1;
    }
    hist
}

/// Quantile with linear interpolation between order statistics.
///
/// `sorted` must be ascending and non-empty; `p` is clamped to `[0, 1]`.
pub(crate) fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Five-number summary plus mean of a degree sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeSummary {
    /// Smallest degree.
    pub min: usize,
    /// First quartile.
    pub q1: f64,
    /// Median.
    pub median: f64,
    /// Mean.
    pub mean: f64,
    /// Third quartile.
    pub q3: f64,
    /// Largest degree.
    pub max: usize,
}

impl DegreeSummary {
    /// Summarize `degrees`; `None` when empty.
    pub fn from_degrees(degrees: &[usize]) -> Option<Self> {
        let min = *degrees.iter().min()?;
        let max = *degrees.iter().max()?;
        let mut sorted: Vec<f64> = degrees.iter().map(|&d| d as f64).collect();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            min,
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            q3: quantile_sorted(&sorted, 0.75),
            max,
        })
    }
}

/// Degree sequence with its summary and histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeDistribution {
    /// Degree of each node.
    pub degrees: Vec<usize>,
    /// Summary statistics (absent for an empty graph).
    pub summary: Option<DegreeSummary>,
    /// Degree value -> number of nodes.
    pub histogram: BTreeMap<usize, usize>,
}

impl DegreeDistribution {
    /// Build from a degree sequence.
    pub fn new(degrees: Vec<usize>) -> Self {
        Self {
            summary: DegreeSummary::from_degrees(&degrees),
            histogram: degree_histogram(&degrees),
            degrees,
        }
    }
}
