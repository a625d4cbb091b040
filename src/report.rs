//! Descriptive report over the full network and each sleeping site.

use crate::attributes::{Covariate, SleepLoc};
use crate::error::Result;
use crate::network::{GroomingNetwork, HealthCheck, HealthReport};
use crate::stats::centrality::CentralityScores;
use crate::stats::{
    describe, modularity, nominal_assortativity, Computed, DescribeConfig, DescriptiveStats,
};
use serde::Serialize;
use std::fmt;

/// Highest-scoring monkey for one centrality measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leader {
    /// Monkey name.
    pub monkey: String,
    /// Score.
    pub score: f64,
}

/// Top monkey per centrality measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaders {
    /// By degree centrality.
    pub degree: Option<Leader>,
    /// By closeness.
    pub closeness: Option<Leader>,
    /// By betweenness.
    pub betweenness: Option<Leader>,
    /// By eigenvector centrality, when defined.
    pub eigenvector: Option<Leader>,
}

/// Community structure along one covariate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovariateMixing {
    /// Covariate partitioning the monkeys.
    pub covariate: Covariate,
    /// Modularity of the partition on the undirected collapse.
    pub modularity: Computed<f64>,
    /// Nominal assortativity.
    pub assortativity: Computed<f64>,
}

/// Everything computed for one (sub)graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphReport {
    /// Human-readable scope, e.g. `full network` or `SleepLoc = Loc1`.
    pub scope: String,
    /// Structural statistics.
    pub stats: DescriptiveStats,
    /// Modularity and assortativity per covariate.
    pub mixing: Vec<CovariateMixing>,
    /// Top monkeys by centrality.
    pub leaders: Leaders,
}

impl GraphReport {
    /// Describe `network` under the label `scope`.
    pub fn build(scope: impl Into<String>, network: &GroomingNetwork, config: &DescribeConfig) -> Self {
        let adj = network.adjacency();
        let stats = describe(&adj, config);
        let mixing = Covariate::ALL
            .iter()
            .map(|&covariate| {
                let labels = network.labels(covariate);
                CovariateMixing {
                    covariate,
                    modularity: modularity(&adj, &labels).into(),
                    assortativity: nominal_assortativity(&adj, &labels, config.assortativity_directed)
                        .into(),
                }
            })
            .collect();

        let top = |scores: &CentralityScores| {
            scores.argmax().and_then(|i| {
                Some(Leader {
                    monkey: network.name(i)?.to_string(),
                    score: scores.get(i)?,
                })
            })
        };
        let c = &stats.centrality;
        let leaders = Leaders {
            degree: top(&c.degree),
            closeness: top(&c.closeness),
            betweenness: top(&c.betweenness),
            eigenvector: c.eigenvector.value().and_then(top),
        };

        Self {
            scope: scope.into(),
            stats,
            mixing,
            leaders,
        }
    }

    /// Mixing figures for `covariate`.
    pub fn mixing_for(&self, covariate: Covariate) -> Option<&CovariateMixing> {
        self.mixing.iter().find(|m| m.covariate == covariate)
    }
}

fn computed(value: &Computed<f64>) -> String {
    match value {
        Computed::Value(v) => format!("{v:.3}"),
        Computed::Unavailable { reason } => format!("n/a ({reason})"),
    }
}

fn leader(l: &Option<Leader>) -> String {
    match l {
        Some(l) => format!("{} ({:.3})", l.monkey, l.score),
        None => "n/a".into(),
    }
}

impl fmt::Display for GraphReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.stats;
        writeln!(f, "## {}", self.scope)?;
        writeln!(
            f,
            "{} monkeys and {} directed grooming edges give a density of {:.3}.",
            s.order, s.size, s.density
        )?;
        writeln!(
            f,
            "Of the {} connected pairs, {} groom each other (reciprocity {:.3}); {:.3} of edges are returned.",
            s.dyads.mutual + s.dyads.asymmetric,
            s.dyads.mutual,
            s.reciprocity,
            s.edge_reciprocity
        )?;
        writeln!(
            f,
            "Transitivity is {:.3} ({} closed of {} two-edge triples); global clustering {:.3}.",
            s.transitivity,
            s.triads.triangles,
            s.triads.triangles + s.triads.open,
            s.global_clustering
        )?;
        writeln!(
            f,
            "Components: {} strong (largest {}), {} weak (largest {}).",
            s.strong_components.count(),
            s.strong_components.largest(),
            s.weak_components.count(),
            s.weak_components.largest()
        )?;
        for (label, paths) in [("directed", &s.directed_paths), ("undirected", &s.undirected_paths)] {
            write!(
                f,
                "The {label} diameter is {} (mean distance {:.2})",
                paths.diameter, paths.mean_distance
            )?;
            if paths.connected {
                writeln!(f, ".")?;
            } else {
                writeln!(
                    f,
                    ", over the {} of {} ordered pairs that are reachable.",
                    paths.reachable_pairs, paths.total_pairs
                )?;
            }
        }
        writeln!(
            f,
            "The largest clique has {} monkeys; there are {} maximal cliques of size {} and {} complete subgraphs of that size.",
            s.cliques.clique_number,
            s.cliques.maximal_of_target_size,
            s.cliques.target_size,
            s.cliques.cliques_of_target_size
        )?;
        for (label, dist) in [("In", &s.in_degree), ("Out", &s.out_degree)] {
            if let Some(d) = &dist.summary {
                writeln!(
                    f,
                    "{label}-degree: min {}, Q1 {:.1}, median {:.1}, mean {:.2}, Q3 {:.1}, max {}.",
                    d.min, d.q1, d.median, d.mean, d.q3, d.max
                )?;
            }
        }
        for m in &self.mixing {
            writeln!(
                f,
                "{}: modularity {}, assortativity {}.",
                m.covariate,
                computed(&m.modularity),
                computed(&m.assortativity)
            )?;
        }
        writeln!(f, "Most central monkeys:")?;
        writeln!(f, "  degree       {}", leader(&self.leaders.degree))?;
        writeln!(f, "  closeness    {}", leader(&self.leaders.closeness))?;
        writeln!(f, "  betweenness  {}", leader(&self.leaders.betweenness))?;
        match &s.centrality.eigenvector {
            Computed::Value(_) => writeln!(f, "  eigenvector  {}", leader(&self.leaders.eigenvector)),
            Computed::Unavailable { reason } => writeln!(f, "  eigenvector  n/a ({reason})"),
        }
    }
}

/// Descriptive report: network health, the full graph, each sleeping site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkReport {
    /// Data checks.
    pub health: HealthReport,
    /// Full network.
    pub full: GraphReport,
    /// One report per sleeping location, in [`SleepLoc::ALL`] order.
    pub sleep_locations: Vec<GraphReport>,
}

impl NetworkReport {
    /// Describe the network and its sleeping-site subgraphs.
    ///
    /// Fails if either sleeping location is empty.
    pub fn build(network: &GroomingNetwork, config: &DescribeConfig) -> Result<Self> {
        let health = network.health_check();
        network.sleep_partition()?;

        let full = GraphReport::build("full network", network, config);
        let sleep_locations = SleepLoc::ALL
            .iter()
            .map(|&loc| {
                let sub = network.sleep_location_subgraph(loc);
                GraphReport::build(format!("SleepLoc = {loc}"), &sub, config)
            })
            .collect();
        tracing::info!(
            monkeys = network.order(),
            edges = network.size(),
            "descriptive report built"
        );

        Ok(Self {
            health,
            full,
            sleep_locations,
        })
    }
}

impl fmt::Display for NetworkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.health)?;
        writeln!(f, "{}", self.full)?;
        for sub in &self.sleep_locations {
            writeln!(f, "{sub}")?;
        }
        Ok(())
    }
}
