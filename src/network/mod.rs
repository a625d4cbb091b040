//! The grooming network: monkeys as nodes, grooming as directed edges.
//!
//! [`NetworkBuilder`] turns an attribute table and an observation list into
//! a [`GroomingNetwork`], rejecting unknown or duplicated identifiers.
//! Repeated observations of the same ordered pair collapse to a single edge
//! (or are rejected, see [`DuplicatePolicy`]); nothing is weighted.
//!
//! ```rust
//! use troop::attributes::{Age, Gender, Monkey, SleepLoc};
//! use troop::network::{NetworkBuilder, Observation};
//!
//! let monkeys = vec![
//!     Monkey::new("Ava", Age::Senior, Gender::Female, SleepLoc::Loc1),
//!     Monkey::new("Bo", Age::Juvenile, Gender::Male, SleepLoc::Loc2),
//! ];
//! let observations = vec![Observation::new("Ava", "Bo"), Observation::new("Ava", "Bo")];
//! let network = NetworkBuilder::new().build(monkeys, &observations).unwrap();
//! assert_eq!(network.size(), 1);
//! assert_eq!(network.build_summary().duplicate_observations, 1);
//! ```

mod builder;
pub mod validate;

pub use builder::{BuildSummary, DuplicatePolicy, NetworkBuilder, Observation};
pub use validate::{HealthCheck, HealthReport, Severity, ValidationIssue, ValidationReport};

use crate::attributes::{Covariate, Monkey, SleepLoc};
use crate::error::{Error, Result};
use crate::stats::Adjacency;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// A simple directed grooming graph with per-monkey attributes.
#[derive(Debug, Clone)]
pub struct GroomingNetwork {
    graph: DiGraph<Monkey, ()>,
    index: HashMap<String, NodeIndex>,
    summary: BuildSummary,
}

impl GroomingNetwork {
    fn from_parts(graph: DiGraph<Monkey, ()>, summary: BuildSummary) -> Self {
        let index = graph
            .node_indices()
            .map(|i| (graph[i].name.clone(), i))
            .collect();
        Self {
            graph,
            index,
            summary,
        }
    }

    /// Underlying petgraph graph; node weights are the monkeys.
    pub fn graph(&self) -> &DiGraph<Monkey, ()> {
        &self.graph
    }

    /// Number of monkeys.
    pub fn order(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct directed grooming edges.
    pub fn size(&self) -> usize {
        self.graph.edge_count()
    }

    /// What happened while building.
    pub fn build_summary(&self) -> &BuildSummary {
        &self.summary
    }

    /// Monkey at node `i`.
    pub fn monkey(&self, i: usize) -> Option<&Monkey> {
        self.graph.node_weight(NodeIndex::new(i))
    }

    /// Monkeys in node order.
    pub fn monkeys(&self) -> impl Iterator<Item = &Monkey> + '_ {
        self.graph.node_weights()
    }

    /// Name of node `i`.
    pub fn name(&self, i: usize) -> Option<&str> {
        self.monkey(i).map(|m| m.name.as_str())
    }

    /// Node id of the monkey called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).map(|i| i.index())
    }

    /// Level index of every monkey for `covariate`, in node order.
    pub fn labels(&self, covariate: Covariate) -> Vec<usize> {
        self.monkeys().map(|m| covariate.level_of(m)).collect()
    }

    /// Grooming edges as `(groomer, groomed)` names.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].name.as_str(),
                self.graph[e.target()].name.as_str(),
            )
        })
    }

    /// Simple directed view for the statistics engine.
    pub fn adjacency(&self) -> Adjacency {
        Adjacency::from_graph(&self.graph)
    }

    /// Subgraph induced by the monkeys satisfying `keep`.
    ///
    /// Node order is preserved; only edges with both endpoints kept survive.
    pub fn induced_subgraph<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Monkey) -> bool,
    {
        let graph = self
            .graph
            .filter_map(|_, m| keep(m).then(|| m.clone()), |_, _| Some(()));
        Self::from_parts(graph, BuildSummary::default())
    }

    /// Subgraph of the monkeys sleeping at `loc`.
    pub fn sleep_location_subgraph(&self, loc: SleepLoc) -> Self {
        self.induced_subgraph(|m| m.sleep_loc == loc)
    }

    /// Node ids at each sleeping location, in [`SleepLoc::ALL`] order.
    ///
    /// Fails unless both locations are occupied.
    pub fn sleep_partition(&self) -> Result<[Vec<usize>; 2]> {
        let mut groups: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (i, m) in self.monkeys().enumerate() {
            groups[m.sleep_loc as usize].push(i);
        }
        if let Some(loc) = SleepLoc::ALL.iter().find(|l| groups[**l as usize].is_empty()) {
            return Err(Error::Validation(format!("no monkeys sleep at {loc}")));
        }
        Ok(groups)
    }
}
