//! End-to-end run from CSV files and a TOML configuration.

use rand::prelude::*;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use troop::config::AnalysisConfig;
use troop::pipeline;
use troop::stats::Computed;
use troop::Error;

const NODES: &str = "\
Name,Age,Gender,SleepLoc
Ava,Senior,Female,Loc1
Bea,Juvenile,Female,Loc1
Cal,Senior,Male,Loc1
Dot,Juvenile,Female,Loc1
Eli,Senior,Male,Loc2
Fay,Juvenile,Female,Loc2
Gus,Senior,Male,Loc2
Hal,Juvenile,Male,Loc2
";

const EDGES: &str = "\
groomer,groomed
Ava,Bea
Bea,Ava
Ava,Cal
Cal,Dot
Dot,Ava
Bea,Dot
Dot,Bea
Ava,Bea
Eli,Fay
Fay,Gus
Gus,Eli
Gus,Hal
Hal,Gus
Hal,Fay
Cal,Eli
Fay,Ava
";

const CONFIG: &str = r#"
[data]
nodes = "nodes.csv"
edges = "edges.csv"

[stats]
clique_size = 3

[ergm]
gof_simulations = 20

[sbm]
max_blocks = 3
restarts = 1
"#;

fn write_inputs(dir: &Path) {
    fs::write(dir.join("nodes.csv"), NODES).unwrap();
    fs::write(dir.join("edges.csv"), EDGES).unwrap();
    fs::write(dir.join("troop.toml"), CONFIG).unwrap();
}

/// Forty monkeys with crossed attributes and seeded Bernoulli(0.15) grooming.
fn write_random_troop(dir: &Path, seed: u64) {
    let n = 40;
    let mut nodes = String::from("Name,Age,Gender,SleepLoc\n");
    for i in 0..n {
        let age = ["Juvenile", "Senior"][i % 2];
        let gender = ["Female", "Male"][(i / 2) % 2];
        let loc = ["Loc1", "Loc2"][(i / 4) % 2];
        writeln!(nodes, "m{i:02},{age},{gender},{loc}").unwrap();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = String::from("groomer,groomed\n");
    for i in 0..n {
        for j in 0..n {
            if i != j && rng.random::<f64>() < 0.15 {
                writeln!(edges, "m{i:02},m{j:02}").unwrap();
            }
        }
    }
    fs::write(dir.join("nodes.csv"), nodes).unwrap();
    fs::write(dir.join("edges.csv"), edges).unwrap();
    fs::write(dir.join("troop.toml"), CONFIG).unwrap();
}

#[test]
fn full_run_from_files() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    let config = AnalysisConfig::from_path(dir.path().join("troop.toml")).unwrap();
    let outcome = pipeline::run(&config).unwrap();

    let report = outcome.report.as_ref().unwrap();
    assert_eq!(report.full.stats.order, 8);
    // The repeated Ava -> Bea observation collapses.
    assert_eq!(report.full.stats.size, 15);
    assert_eq!(report.sleep_locations.len(), 2);
    assert_eq!(report.full.stats.cliques.target_size, 3);

    assert_eq!(outcome.ergm.len(), 3);
    for m in &outcome.ergm {
        // Either a fit with diagnostics or a reason, never half of each.
        assert_eq!(m.fit.value().is_some(), m.gof.is_some(), "{}", m.name);
    }

    let Some(Computed::Value(sbm)) = &outcome.sbm else {
        panic!("block model selection failed");
    };
    assert_eq!(sbm.selection.candidates().len(), 3);
    assert!(sbm.selection.best().is_some());

    let text = outcome.to_string();
    assert!(text.contains("# Descriptive statistics"));
    assert!(text.contains("# Exponential random graph models"));
    assert!(text.contains("# Stochastic block model"));

    let json = serde_json::to_value(&outcome).unwrap();
    assert!(json.get("report").is_some());
    assert!(json["ergm"].is_array());
}

#[test]
fn default_models_fit_a_random_troop() {
    let dir = tempfile::tempdir().unwrap();
    write_random_troop(dir.path(), 17);
    let config = AnalysisConfig::from_path(dir.path().join("troop.toml")).unwrap();
    let outcome = pipeline::run(&config).unwrap();

    let names: Vec<&str> = outcome.ergm.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["homophily", "reciprocity", "differential"]);
    for m in &outcome.ergm {
        let (Computed::Value(fit), Some(Computed::Value(gof))) = (&m.fit, &m.gof) else {
            panic!("{} did not fit: {:?}", m.name, m.fit);
        };
        assert_eq!(fit.n_nodes, 40);
        assert_eq!(fit.rank, fit.coefficients.len());
        assert!(fit.coefficients.iter().all(|c| c.std_error.is_finite()));
        assert!(fit.residual_deviance < fit.null_deviance);
        assert_eq!(gof.simulations, 20);
    }
    assert!(outcome.best_ergm().is_some());
    assert!(!outcome.to_string().contains("Aliased"));
}

#[test]
fn strict_duplicates_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    let mut config = AnalysisConfig::from_path(dir.path().join("troop.toml")).unwrap();
    config.data.duplicates = troop::network::DuplicatePolicy::Reject;
    assert!(matches!(
        pipeline::run(&config),
        Err(Error::DuplicateEdge { .. })
    ));
}

#[test]
fn unknown_monkey_in_edges_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    fs::write(dir.path().join("edges.csv"), "groomer,groomed\nAva,Zed\n").unwrap();
    let config = AnalysisConfig::from_path(dir.path().join("troop.toml")).unwrap();
    assert!(matches!(
        pipeline::run(&config),
        Err(Error::UnknownNode { .. })
    ));
}
