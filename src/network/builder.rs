use super::GroomingNetwork;
use crate::attributes::Monkey;
use crate::error::{Error, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One grooming observation: `groomer` groomed `groomed`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// Monkey doing the grooming.
    pub groomer: String,
    /// Monkey being groomed.
    pub groomed: String,
}

impl Observation {
    /// Create an observation.
    pub fn new(groomer: impl Into<String>, groomed: impl Into<String>) -> Self {
        Self {
            groomer: groomer.into(),
            groomed: groomed.into(),
        }
    }
}

/// What to do with repeated observations of the same ordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep one edge and count the repeats.
    #[default]
    Collapse,
    /// Fail with [`Error::DuplicateEdge`].
    Reject,
}

/// Bookkeeping from network construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BuildSummary {
    /// Observations read.
    pub observations: usize,
    /// Observations discarded as repeats of an existing edge.
    pub duplicate_observations: usize,
    /// Observations discarded because groomer and groomed coincide.
    pub self_loops: usize,
}

/// Builds a [`GroomingNetwork`] from attribute and observation tables.
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    duplicates: DuplicatePolicy,
}

impl NetworkBuilder {
    /// Builder with the collapsing duplicate policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duplicate policy.
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Build the network.
    ///
    /// Node order follows `monkeys`; edge order follows the first occurrence
    /// of each ordered pair in `observations`.
    pub fn build(&self, monkeys: Vec<Monkey>, observations: &[Observation]) -> Result<GroomingNetwork> {
        if monkeys.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut graph = DiGraph::with_capacity(monkeys.len(), observations.len());
        let mut index: HashMap<String, NodeIndex> = HashMap::with_capacity(monkeys.len());
        for monkey in monkeys {
            if index.contains_key(&monkey.name) {
                return Err(Error::DuplicateNode { name: monkey.name });
            }
            let name = monkey.name.clone();
            let idx = graph.add_node(monkey);
            let _ = index.insert(name, idx);
        }

        let lookup = |name: &str| {
            index.get(name).copied().ok_or_else(|| Error::UnknownNode {
                name: name.to_string(),
            })
        };

        let mut summary = BuildSummary {
            observations: observations.len(),
            ..Default::default()
        };
        let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::with_capacity(observations.len());
        for obs in observations {
            let (s, t) = (lookup(&obs.groomer)?, lookup(&obs.groomed)?);
            if s == t {
                summary.self_loops += 1;
                continue;
            }
            if !seen.insert((s, t)) {
                if self.duplicates == DuplicatePolicy::Reject {
                    return Err(Error::DuplicateEdge {
                        groomer: obs.groomer.clone(),
                        groomed: obs.groomed.clone(),
                    });
                }
                summary.duplicate_observations += 1;
                continue;
            }
            let _ = graph.add_edge(s, t, ());
        }

        if summary.duplicate_observations > 0 {
            tracing::warn!(
                count = summary.duplicate_observations,
                "collapsed repeated grooming observations"
            );
        }
        if summary.self_loops > 0 {
            tracing::warn!(count = summary.self_loops, "dropped self-grooming observations");
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built grooming network"
        );

        Ok(GroomingNetwork::from_parts(graph, summary))
    }
}
