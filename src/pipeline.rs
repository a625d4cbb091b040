//! End-to-end analysis: load, build, describe, fit ERGMs and block models.
//!
//! Model failures (non-convergence, singular information) are recorded in
//! the outcome next to the models that did fit; only data problems abort
//! the run.

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::ergm::{goodness_of_fit, ErgmData, ErgmEstimator, ErgmFit, GoodnessOfFit};
use crate::error::{Error, Result};
use crate::network::{GroomingNetwork, HealthCheck};
use crate::report::NetworkReport;
use crate::sbm::{cross_tabulate_all, select_blocks, BlockModelSelection, CovariateAssociation};
use crate::stats::Computed;
use serde::Serialize;
use std::fmt;

/// Which parts of the analysis to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    /// Descriptive report.
    pub describe: bool,
    /// ERGM fits and goodness of fit.
    pub ergm: bool,
    /// Block model selection and cross-tabulation.
    pub sbm: bool,
}

impl Stages {
    /// Everything.
    pub const ALL: Stages = Stages {
        describe: true,
        ergm: true,
        sbm: true,
    };

    /// Only the descriptive report.
    pub const DESCRIBE: Stages = Stages {
        describe: true,
        ergm: false,
        sbm: false,
    };

    /// Only the ERGMs.
    pub const ERGM: Stages = Stages {
        describe: false,
        ergm: true,
        sbm: false,
    };

    /// Only the block models.
    pub const SBM: Stages = Stages {
        describe: false,
        ergm: false,
        sbm: true,
    };
}

/// One named ERGM with its diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelOutcome {
    /// Model name from the configuration.
    pub name: String,
    /// Term formula.
    pub formula: String,
    /// Fit, or why it failed.
    pub fit: Computed<ErgmFit>,
    /// Goodness of fit, when the fit succeeded.
    pub gof: Option<Computed<GoodnessOfFit>>,
}

/// Selected block model and its covariate comparisons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SbmOutcome {
    /// Fits for every candidate count.
    pub selection: BlockModelSelection,
    /// Selected blocks against each covariate.
    pub associations: Vec<CovariateAssociation>,
}

/// Everything the analysis produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    /// Descriptive report.
    pub report: Option<NetworkReport>,
    /// ERGM fits, in configuration order.
    pub ergm: Vec<ModelOutcome>,
    /// Block model results.
    pub sbm: Option<Computed<SbmOutcome>>,
}

impl AnalysisOutcome {
    /// Successfully fitted model with the lowest AIC.
    pub fn best_ergm(&self) -> Option<&ModelOutcome> {
        self.ergm
            .iter()
            .filter_map(|m| m.fit.value().map(|f| (m, f.aic)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(m, _)| m)
    }
}

/// Load the tables named in `config` and build the network.
pub fn load_network(config: &AnalysisConfig) -> Result<GroomingNetwork> {
    let (Some(nodes), Some(edges)) = (&config.data.nodes, &config.data.edges) else {
        return Err(Error::InvalidParameter {
            name: "data",
            message: "both node and edge tables must be given".into(),
        });
    };
    Dataset::load(nodes, edges)?.build(config.data.duplicates)
}

/// Fit every configured ERGM.
pub fn fit_ergms(network: &GroomingNetwork, config: &AnalysisConfig) -> Vec<ModelOutcome> {
    let data = ErgmData::from_network(network);
    let estimator = config.ergm.estimator();
    config
        .ergm
        .models
        .iter()
        .map(|model| {
            let span = tracing::info_span!("ergm", model = %model.name);
            let _guard = span.enter();
            let fit = estimator.fit(&data, &model.terms);
            let gof = match &fit {
                Ok(f) => {
                    tracing::info!(aic = f.aic, "model fitted");
                    Some(
                        goodness_of_fit(f, &data, config.ergm.gof_simulations, config.ergm.seed)
                            .into(),
                    )
                }
                Err(e) => {
                    tracing::warn!(error = %e, "model failed");
                    None
                }
            };
            ModelOutcome {
                name: model.name.clone(),
                formula: model.terms.to_string(),
                fit: fit.into(),
                gof,
            }
        })
        .collect()
}

/// Select a block model and cross-tabulate it against the covariates.
pub fn fit_block_models(network: &GroomingNetwork, config: &AnalysisConfig) -> Result<SbmOutcome> {
    let adj = network.adjacency();
    let selection = select_blocks(&config.sbm.estimator(), &adj, config.sbm.range())?;
    let associations = match selection.best() {
        Some(best) => cross_tabulate_all(best, network, config.crosstab.continuity_correction)?,
        None => Vec::new(),
    };
    if let Some(k) = selection.best_n_blocks() {
        tracing::info!(n_blocks = k, "selected block model");
    }
    Ok(SbmOutcome {
        selection,
        associations,
    })
}

/// Run the requested stages on an already built network.
///
/// Fails if the network does not pass its health check.
pub fn analyze(network: &GroomingNetwork, config: &AnalysisConfig, stages: Stages) -> Result<AnalysisOutcome> {
    config.validate()?;
    let health = network.health_check();
    if !health.is_healthy() {
        return Err(Error::Validation(health.validation.to_string()));
    }

    let report = if stages.describe {
        Some(NetworkReport::build(network, &config.stats)?)
    } else {
        None
    };
    let ergm = if stages.ergm {
        fit_ergms(network, config)
    } else {
        Vec::new()
    };
    let sbm: Option<Computed<SbmOutcome>> =
        stages.sbm.then(|| fit_block_models(network, config).into());

    Ok(AnalysisOutcome { report, ergm, sbm })
}

/// Load, build and run every stage.
pub fn run(config: &AnalysisConfig) -> Result<AnalysisOutcome> {
    let network = load_network(config)?;
    analyze(&network, config, Stages::ALL)
}

impl fmt::Display for ModelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}", self.name)?;
        match &self.fit {
            Computed::Value(fit) => {
                writeln!(f, "{fit}")?;
                match &self.gof {
                    Some(Computed::Value(gof)) => write!(f, "{gof}")?,
                    Some(Computed::Unavailable { reason }) => {
                        writeln!(f, "Goodness of fit unavailable: {reason}")?
                    }
                    None => {}
                }
            }
            Computed::Unavailable { reason } => {
                writeln!(f, "Formula: {}", self.formula)?;
                writeln!(f, "Fit failed: {reason}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for SbmOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>8} {:>14}", "blocks", "ICL")?;
        for c in self.selection.candidates() {
            match c.icl() {
                Some(icl) => writeln!(f, "{:>8} {:>14.2}", c.n_blocks, icl)?,
                None => writeln!(f, "{:>8} {:>14}", c.n_blocks, "failed")?,
            }
        }
        let Some(best) = self.selection.best() else {
            return Ok(());
        };
        writeln!(
            f,
            "ICL selects {} block(s); sizes {:?}, proportions {:?}.",
            best.n_blocks,
            best.block_sizes(),
            best.proportions
                .iter()
                .map(|p| (p * 1000.0).round() / 1000.0)
                .collect::<Vec<_>>()
        )?;
        writeln!(f, "Connectivity (row grooms column):")?;
        for row in &best.connectivity {
            let cells: Vec<String> = row.iter().map(|p| format!("{p:.3}")).collect();
            writeln!(f, "  {}", cells.join("  "))?;
        }
        for a in &self.associations {
            writeln!(f, "Blocks vs {}:", a.covariate)?;
            write!(f, "{}", a.table)?;
            match &a.chi_squared {
                Computed::Value(t) => writeln!(
                    f,
                    "  X-squared = {:.3}, df = {}, p-value = {:.4}{}",
                    t.statistic,
                    t.df,
                    t.p_value,
                    if t.corrected { " (Yates)" } else { "" }
                )?,
                Computed::Unavailable { reason } => writeln!(f, "  chi-squared: n/a ({reason})")?,
            }
            writeln!(f, "  NMI = {:.3}, ARI = {:.3}", a.nmi, a.ari)?;
        }
        Ok(())
    }
}

impl fmt::Display for AnalysisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(report) = &self.report {
            writeln!(f, "# Descriptive statistics\n")?;
            writeln!(f, "{report}")?;
        }
        if !self.ergm.is_empty() {
            writeln!(f, "# Exponential random graph models\n")?;
            for model in &self.ergm {
                writeln!(f, "{model}")?;
            }
            if let Some(best) = self.best_ergm() {
                writeln!(f, "Lowest AIC: {}\n", best.name)?;
            }
        }
        match &self.sbm {
            Some(Computed::Value(sbm)) => {
                writeln!(f, "# Stochastic block model\n")?;
                write!(f, "{sbm}")?;
            }
            Some(Computed::Unavailable { reason }) => {
                writeln!(f, "# Stochastic block model\n")?;
                writeln!(f, "Block model selection failed: {reason}")?;
            }
            None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Age, Gender, Monkey, SleepLoc};
    use crate::network::{NetworkBuilder, Observation};
    use rand::prelude::*;

    fn network() -> GroomingNetwork {
        let monkeys = vec![
            Monkey::new("a", Age::Juvenile, Gender::Female, SleepLoc::Loc1),
            Monkey::new("b", Age::Senior, Gender::Female, SleepLoc::Loc1),
            Monkey::new("c", Age::Senior, Gender::Male, SleepLoc::Loc1),
            Monkey::new("d", Age::Juvenile, Gender::Male, SleepLoc::Loc2),
            Monkey::new("e", Age::Senior, Gender::Female, SleepLoc::Loc2),
            Monkey::new("f", Age::Juvenile, Gender::Male, SleepLoc::Loc2),
        ];
        let obs: Vec<Observation> = [
            ("a", "b"),
            ("b", "a"),
            ("b", "c"),
            ("c", "a"),
            ("d", "e"),
            ("e", "f"),
            ("f", "d"),
            ("e", "d"),
            ("c", "d"),
            ("a", "e"),
        ]
        .iter()
        .map(|(s, t)| Observation::new(*s, *t))
        .collect();
        NetworkBuilder::new().build(monkeys, &obs).unwrap()
    }

    /// Forty monkeys with crossed attributes and Bernoulli(0.15) grooming.
    fn random_troop(seed: u64) -> GroomingNetwork {
        let n = 40;
        let monkeys: Vec<Monkey> = (0..n)
            .map(|i| {
                Monkey::new(
                    format!("m{i:02}"),
                    if i % 2 == 0 { Age::Juvenile } else { Age::Senior },
                    if (i / 2) % 2 == 0 { Gender::Female } else { Gender::Male },
                    if (i / 4) % 2 == 0 { SleepLoc::Loc1 } else { SleepLoc::Loc2 },
                )
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut obs = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if i != j && rng.random::<f64>() < 0.15 {
                    obs.push(Observation::new(format!("m{i:02}"), format!("m{j:02}")));
                }
            }
        }
        NetworkBuilder::new().build(monkeys, &obs).unwrap()
    }

    fn quick_config() -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        config.ergm.gof_simulations = 20;
        config.sbm.max_blocks = 3;
        config.sbm.restarts = 1;
        config
    }

    fn network_without_mutuals() -> GroomingNetwork {
        let net = random_troop(5);
        let adj = net.adjacency();
        let one_way: Vec<Observation> = adj
            .edges()
            .filter(|&(i, j)| i < j || !adj.has_edge(j, i))
            .map(|(i, j)| Observation::new(net.name(i).unwrap(), net.name(j).unwrap()))
            .collect();
        NetworkBuilder::new()
            .build(net.monkeys().cloned().collect(), &one_way)
            .unwrap()
    }

    #[test]
    fn stages_are_respected() {
        let outcome = analyze(&network(), &quick_config(), Stages::DESCRIBE).unwrap();
        assert!(outcome.report.is_some());
        assert!(outcome.ergm.is_empty());
        assert!(outcome.sbm.is_none());
    }

    #[test]
    fn every_default_model_fits_with_diagnostics() {
        let config = quick_config();
        let outcome = analyze(&random_troop(3), &config, Stages::ERGM).unwrap();
        let names: Vec<&str> = outcome.ergm.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["homophily", "reciprocity", "differential"]);
        for m in &outcome.ergm {
            let (Computed::Value(fit), Some(Computed::Value(gof))) = (&m.fit, &m.gof) else {
                panic!("{} did not fit: {:?}", m.name, m.fit);
            };
            assert!(fit.aliased().is_empty());
            assert!(fit.residual_deviance < fit.null_deviance);
            assert_eq!(gof.simulations, config.ergm.gof_simulations);
            assert!(gof.statistic("model").is_some());
        }
        assert!(outcome.best_ergm().is_some());
    }

    #[test]
    fn failed_models_carry_no_diagnostics() {
        // No pair grooms back, so any model with mutual runs off to -inf.
        let outcome = analyze(&network_without_mutuals(), &quick_config(), Stages::ERGM).unwrap();
        for m in &outcome.ergm {
            assert_eq!(m.fit.value().is_some(), m.gof.is_some(), "{}", m.name);
        }
        assert!(outcome.ergm[0].fit.value().is_some());
        assert!(outcome.ergm[1].fit.value().is_none());
    }

    #[test]
    fn sbm_outcome_has_every_candidate() {
        let outcome = analyze(&network(), &quick_config(), Stages::SBM).unwrap();
        let Some(Computed::Value(sbm)) = &outcome.sbm else {
            panic!("block models should fit");
        };
        assert_eq!(sbm.selection.candidates().len(), 3);
        assert_eq!(sbm.associations.len(), 3);
        let text = outcome.to_string();
        assert!(text.contains("ICL selects"));
    }

    #[test]
    fn unhealthy_network_is_refused() {
        let net = network().sleep_location_subgraph(SleepLoc::Loc1);
        assert!(matches!(
            analyze(&net, &quick_config(), Stages::ALL),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn missing_paths_are_reported() {
        assert!(matches!(
            load_network(&AnalysisConfig::default()),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
