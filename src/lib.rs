//! # troop
//!
//! Social network analysis of grooming observations in a primate troop.
//!
//! Monkeys are nodes carrying categorical attributes (age, gender, sleeping
//! location); an observed grooming act `a → b` is a directed edge. From two
//! CSV tables the crate builds the network and then
//!
//! - describes it ([`stats`], [`report`]): density, reciprocity,
//!   transitivity, components, paths, cliques, degree distributions,
//!   centrality, modularity and assortativity per covariate, for the full
//!   network and each sleeping site;
//! - fits dyadic exponential random graph models ([`ergm`]) with exact
//!   likelihood, Wald tests and simulated goodness of fit;
//! - fits Bernoulli stochastic block models ([`sbm`]) by variational EM,
//!   selects the block count by ICL and cross-tabulates the blocks against
//!   the covariates.
//!
//! [`pipeline::run`] chains everything from an [`config::AnalysisConfig`].
//!
//! **Default build** includes the `troop` command-line binary (`cli`
//! feature). The `parallel` feature runs per-source searches on rayon.

pub mod attributes;
pub mod config;
pub mod dataset;
pub mod ergm;
/// Error types used across `troop`.
pub mod error;
pub mod metrics;
pub mod network;
pub mod pipeline;
pub mod report;
pub mod sbm;
pub mod special;
pub mod stats;

pub use attributes::{Age, Covariate, Gender, Monkey, SleepLoc};
pub use config::AnalysisConfig;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use metrics::{ari, nmi, ContingencyTable};
pub use network::{GroomingNetwork, NetworkBuilder, Observation};
pub use pipeline::{AnalysisOutcome, Stages};
pub use report::NetworkReport;
