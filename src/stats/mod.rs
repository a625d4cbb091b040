//! Descriptive statistics for directed social networks.
//!
//! Every statistic works on an [`Adjacency`]: a simple directed graph over
//! nodes `0..n` built from a petgraph `DiGraph` or an edge list. The same
//! functions serve the full network and any induced subgraph; nothing here
//! knows about monkeys or sleeping sites.
//!
//! ## Directed vs symmetrized
//!
//! | Statistic | View |
//! |-----------|------|
//! | density, reciprocity, degrees | directed |
//! | strong components, diameter, closeness, betweenness | directed |
//! | weak components | direction ignored |
//! | undirected diameter, transitivity, cliques, modularity | symmetrized |
//! | eigenvector centrality | symmetrized by default |
//! | nominal assortativity | directed by default |
//!
//! ## Degenerate inputs
//!
//! Ratios over empty denominators (density of a single node, reciprocity of
//! an edgeless graph, transitivity without two-paths) are reported as zero.
//! Statistics with no meaningful value (modularity of an edgeless graph,
//! assortativity when every endpoint shares a category, eigenvector
//! centrality on a disconnected view) return an error instead; [`describe`]
//! records those as [`Computed::Unavailable`].

mod adjacency;
mod basic;
pub mod centrality;
mod cliques;
mod components;
mod degree;
mod mixing;
mod paths;

pub use adjacency::Adjacency;
pub use basic::{
    density, dyad_census, edge_reciprocity, global_clustering, reciprocity, transitivity,
    triad_counts, DyadCensus, TriadCounts,
};
pub use cliques::{
    clique_number, clique_summary, count_cliques_of_size, count_maximal_cliques_of_size,
    maximal_cliques, CliqueSummary,
};
pub use components::{strong_components, weak_components, Components};
pub use degree::{degree_histogram, in_degrees, out_degrees, DegreeDistribution, DegreeSummary};
pub(crate) use degree::quantile_sorted;
pub use mixing::{
    mixing_matrix, modularity, modularity_with_resolution, nominal_assortativity,
};
pub use paths::{
    all_pairs_distances, bfs_distances, diameter, path_summary, undirected_diameter,
    undirected_path_summary, PathSummary,
};

use crate::error::Result;
use centrality::{
    betweenness_centrality, closeness_centrality, degree_centrality, eigenvector_centrality,
    BetweennessConfig, CentralityScores, ClosenessConfig, DegreeMode, EigenvectorConfig,
};
use serde::{Deserialize, Serialize};

/// A value that may legitimately be unavailable for a given graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Computed<T> {
    /// The computed value.
    Value(T),
    /// Why it could not be computed.
    Unavailable {
        /// Error message.
        reason: String,
    },
}

impl<T> Computed<T> {
    /// The value, if computed.
    pub fn value(&self) -> Option<&T> {
        match self {
            Computed::Value(v) => Some(v),
            Computed::Unavailable { .. } => None,
        }
    }
}

impl<T> From<Result<T>> for Computed<T> {
    fn from(r: Result<T>) -> Self {
        match r {
            Ok(v) => Computed::Value(v),
            Err(e) => Computed::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

/// Knobs for [`describe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescribeConfig {
    /// Clique size to count.
    pub clique_size: usize,
    /// Edges counted by degree centrality.
    pub degree_mode: DegreeMode,
    /// Inverse mean distance instead of inverse total distance.
    pub closeness_normalized: bool,
    /// Divide betweenness by `(n - 1)(n - 2)`.
    pub betweenness_normalized: bool,
    /// Directed eigenvector centrality (in-edges) instead of symmetrized.
    pub eigenvector_directed: bool,
    /// Power iteration limit.
    pub eigenvector_max_iter: usize,
    /// Power iteration tolerance.
    pub eigenvector_tol: f64,
    /// Directed edge set for assortativity.
    pub assortativity_directed: bool,
}

impl Default for DescribeConfig {
    fn default() -> Self {
        let eig = EigenvectorConfig::default();
        Self {
            clique_size: 6,
            degree_mode: DegreeMode::In,
            closeness_normalized: false,
            betweenness_normalized: false,
            eigenvector_directed: eig.directed,
            eigenvector_max_iter: eig.max_iter,
            eigenvector_tol: eig.tol,
            assortativity_directed: true,
        }
    }
}

impl DescribeConfig {
    /// Eigenvector settings.
    pub fn eigenvector(&self) -> EigenvectorConfig {
        EigenvectorConfig {
            directed: self.eigenvector_directed,
            max_iter: self.eigenvector_max_iter,
            tol: self.eigenvector_tol,
        }
    }
}

/// The four centrality measures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralitySet {
    /// Degree centrality.
    pub degree: CentralityScores,
    /// Closeness centrality.
    pub closeness: CentralityScores,
    /// Betweenness centrality.
    pub betweenness: CentralityScores,
    /// Eigenvector centrality.
    pub eigenvector: Computed<CentralityScores>,
}

/// Every structural statistic of one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    /// Number of nodes.
    pub order: usize,
    /// Number of directed edges.
    pub size: usize,
    /// Edge density.
    pub density: f64,
    /// Mutual / asymmetric / null dyads.
    pub dyads: DyadCensus,
    /// Reciprocated fraction of connected dyads.
    pub reciprocity: f64,
    /// Reciprocated fraction of directed edges.
    pub edge_reciprocity: f64,
    /// Closed and open triples.
    pub triads: TriadCounts,
    /// Closed fraction of node triples with two or more edges.
    pub transitivity: f64,
    /// Global clustering coefficient.
    pub global_clustering: f64,
    /// Strong components.
    pub strong_components: Components,
    /// Weak components.
    pub weak_components: Components,
    /// Directed shortest paths.
    pub directed_paths: PathSummary,
    /// Shortest paths on the symmetrized graph.
    pub undirected_paths: PathSummary,
    /// Clique structure.
    pub cliques: CliqueSummary,
    /// In-degree distribution.
    pub in_degree: DegreeDistribution,
    /// Out-degree distribution.
    pub out_degree: DegreeDistribution,
    /// Centrality scores.
    pub centrality: CentralitySet,
}

/// Compute every descriptive statistic of `adj`.
pub fn describe(adj: &Adjacency, config: &DescribeConfig) -> DescriptiveStats {
    let span = tracing::debug_span!("describe", nodes = adj.node_count(), edges = adj.edge_count());
    let _guard = span.enter();

    let centrality = CentralitySet {
        degree: degree_centrality(adj, config.degree_mode),
        closeness: closeness_centrality(
            adj,
            &ClosenessConfig {
                incoming: false,
                normalized: config.closeness_normalized,
            },
        ),
        betweenness: betweenness_centrality(
            adj,
            &BetweennessConfig {
                normalized: config.betweenness_normalized,
            },
        ),
        eigenvector: eigenvector_centrality(adj, &config.eigenvector()).into(),
    };

    DescriptiveStats {
        order: adj.node_count(),
        size: adj.edge_count(),
        density: density(adj),
        dyads: dyad_census(adj),
        reciprocity: reciprocity(adj),
        edge_reciprocity: edge_reciprocity(adj),
        triads: triad_counts(adj),
        transitivity: transitivity(adj),
        global_clustering: global_clustering(adj),
        strong_components: strong_components(adj),
        weak_components: weak_components(adj),
        directed_paths: path_summary(adj),
        undirected_paths: undirected_path_summary(adj),
        cliques: clique_summary(adj, config.clique_size),
        in_degree: DegreeDistribution::new(in_degrees(adj)),
        out_degree: DegreeDistribution::new(out_degrees(adj)),
        centrality,
    }
}
