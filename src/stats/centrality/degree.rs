use super::CentralityScores;
use crate::stats::adjacency::Adjacency;
use serde::{Deserialize, Serialize};

/// Which edges count toward a node's degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeMode {
    /// Grooming received.
    #[default]
    In,
    /// Grooming given.
    Out,
    /// Both.
    Total,
}

/// Raw degree of every node.
///
/// In-degree by default: being groomed is read as a marker of status.
pub fn degree_centrality(adj: &Adjacency, mode: DegreeMode) -> CentralityScores {
    CentralityScores::new(
        (0..adj.node_count())
            .map(|i| {
                let d = match mode {
                    DegreeMode::In => adj.predecessors(i).len(),
                    DegreeMode::Out => adj.successors(i).len(),
                    DegreeMode::Total => adj.predecessors(i).len() + adj.successors(i).len(),
                };
                d as f64
            })
            .collect(),
    )
}
