//! Analysis configuration.
//!
//! Every section has defaults, so an empty file (or no file) reproduces the
//! standard run:
//!
//! ```toml
//! [data]
//! nodes = "data/monkeys.csv"
//! edges = "data/grooming.csv"
//! duplicates = "collapse"
//!
//! [stats]
//! clique_size = 6
//!
//! [ergm]
//! seed = 1234
//! gof_simulations = 100
//!
//! [[ergm.models]]
//! name = "homophily"
//! terms = [{ term = "edges" }, { term = "nodematch", covariate = "age" }]
//!
//! [sbm]
//! min_blocks = 1
//! max_blocks = 6
//!
//! [crosstab]
//! continuity_correction = true
//! ```

use crate::ergm::{DyadicMle, NamedModel};
use crate::error::{Error, Result};
use crate::network::DuplicatePolicy;
use crate::sbm::BernoulliSbm;
use crate::stats::DescribeConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Input tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Node attribute CSV.
    pub nodes: Option<PathBuf>,
    /// Grooming observation CSV.
    pub edges: Option<PathBuf>,
    /// Treatment of repeated observations.
    pub duplicates: DuplicatePolicy,
}

/// ERGM fitting and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErgmConfig {
    /// Models to fit, in report order.
    pub models: Vec<NamedModel>,
    /// Seed for goodness-of-fit simulation.
    pub seed: u64,
    /// Simulated graphs per goodness-of-fit check.
    pub gof_simulations: usize,
    /// Newton iteration limit.
    pub max_iter: usize,
    /// Newton convergence tolerance.
    pub tol: f64,
}

impl Default for ErgmConfig {
    fn default() -> Self {
        Self {
            models: NamedModel::defaults(),
            seed: 1234,
            gof_simulations: 100,
            max_iter: 100,
            tol: 1e-8,
        }
    }
}

impl ErgmConfig {
    /// Estimator with these settings.
    pub fn estimator(&self) -> DyadicMle {
        DyadicMle::new().with_max_iter(self.max_iter).with_tol(self.tol)
    }
}

/// Block model fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SbmConfig {
    /// Smallest block count tried.
    pub min_blocks: usize,
    /// Largest block count tried.
    pub max_blocks: usize,
    /// Seed for initialization.
    pub seed: u64,
    /// Random restarts per block count.
    pub restarts: usize,
    /// EM iteration limit per start.
    pub max_iter: usize,
    /// Relative EM tolerance.
    pub tol: f64,
}

impl Default for SbmConfig {
    fn default() -> Self {
        Self {
            min_blocks: 1,
            max_blocks: 6,
            seed: 1234,
            restarts: 4,
            max_iter: 500,
            tol: 1e-8,
        }
    }
}

impl SbmConfig {
    /// Block counts to try.
    pub fn range(&self) -> RangeInclusive<usize> {
        self.min_blocks..=self.max_blocks
    }

    /// Estimator with these settings.
    pub fn estimator(&self) -> BernoulliSbm {
        BernoulliSbm::new()
            .with_seed(self.seed)
            .with_restarts(self.restarts)
            .with_max_iter(self.max_iter)
            .with_tol(self.tol)
    }
}

/// Block vs covariate tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossTabConfig {
    /// Yates correction on 2x2 tables.
    pub continuity_correction: bool,
}

impl Default for CrossTabConfig {
    fn default() -> Self {
        Self {
            continuity_correction: true,
        }
    }
}

/// Full analysis configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input tables.
    pub data: DataConfig,
    /// Descriptive statistics.
    pub stats: DescribeConfig,
    /// ERGM section.
    pub ergm: ErgmConfig,
    /// SBM section.
    pub sbm: SbmConfig,
    /// Cross-tabulation section.
    pub crosstab: CrossTabConfig,
}

impl AnalysisConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// Relative data paths are resolved against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_toml(&std::fs::read_to_string(path)?)?;
        if let Some(dir) = path.parent() {
            for p in [&mut config.data.nodes, &mut config.data.edges].into_iter().flatten() {
                if p.is_relative() {
                    *p = dir.join(&*p);
                }
            }
        }
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Reject inconsistent settings.
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &'static str, message: &str| {
            Err(Error::InvalidParameter {
                name,
                message: message.to_string(),
            })
        };
        if self.sbm.min_blocks == 0 || self.sbm.min_blocks > self.sbm.max_blocks {
            return invalid("sbm.min_blocks", "block range must be non-empty and start at 1 or more");
        }
        if self.ergm.models.is_empty() {
            return invalid("ergm.models", "at least one model is required");
        }
        let mut names = HashSet::new();
        if let Some(m) = self.ergm.models.iter().find(|m| !names.insert(m.name.as_str())) {
            return Err(Error::InvalidParameter {
                name: "ergm.models",
                message: format!("model name '{}' used twice", m.name),
            });
        }
        if self.ergm.gof_simulations == 0 {
            return invalid("ergm.gof_simulations", "must be > 0");
        }
        if self.ergm.max_iter == 0 || self.sbm.max_iter == 0 || self.stats.eigenvector_max_iter == 0 {
            return invalid("max_iter", "iteration limits must be > 0");
        }
        if !(self.ergm.tol > 0.0 && self.sbm.tol > 0.0 && self.stats.eigenvector_tol > 0.0) {
            return invalid("tol", "tolerances must be positive");
        }
        if self.stats.clique_size < 2 {
            return invalid("stats.clique_size", "must be at least 2");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Covariate;
    use crate::ergm::Term;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.stats.clique_size, 6);
        assert_eq!(config.sbm.range(), 1..=6);
        let names: Vec<&str> = config.ergm.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["homophily", "reciprocity", "differential"]);
        assert!(config.crosstab.continuity_correction);
    }

    #[test]
    fn sections_override_defaults() {
        let text = r#"
            [data]
            duplicates = "reject"

            [sbm]
            max_blocks = 3

            [[ergm.models]]
            name = "sex"
            terms = [{ term = "edges" }, { term = "nodematch", covariate = "gender" }]
        "#;
        let config = AnalysisConfig::from_toml(text).unwrap();
        assert_eq!(config.data.duplicates, DuplicatePolicy::Reject);
        assert_eq!(config.sbm.range(), 1..=3);
        assert_eq!(config.ergm.models.len(), 1);
        assert_eq!(
            config.ergm.models[0].terms.terms()[1],
            Term::nodematch(Covariate::Gender)
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            AnalysisConfig::from_toml("[sbm]\nmin_blocks = 4\nmax_blocks = 2\n"),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(AnalysisConfig::from_toml("[ergm]\ngof_simulations = 0\n").is_err());
        assert!(AnalysisConfig::from_toml("[ergm]\nmodels = []\n").is_err());
        assert!(matches!(
            AnalysisConfig::from_toml("[sbm]\nmax_blocks = \"six\"\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn relative_paths_follow_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("troop.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[data]\nnodes = \"nodes.csv\"\nedges = \"/abs/edges.csv\"").unwrap();
        let config = AnalysisConfig::from_path(&path).unwrap();
        assert_eq!(config.data.nodes, Some(dir.path().join("nodes.csv")));
        assert_eq!(config.data.edges, Some(PathBuf::from("/abs/edges.csv")));
    }
}
