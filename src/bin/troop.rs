use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use troop::config::AnalysisConfig;
use troop::network::DuplicatePolicy;
use troop::pipeline::{self, Stages};

#[derive(Parser)]
#[command(name = "troop")]
#[command(about = "Grooming network analysis: descriptive statistics, ERGMs and block models", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "TROOP_CONFIG")]
    config: Option<PathBuf>,

    /// Node attribute CSV (overrides the configuration)
    #[arg(long, global = true)]
    nodes: Option<PathBuf>,

    /// Grooming observation CSV (overrides the configuration)
    #[arg(long, global = true)]
    edges: Option<PathBuf>,

    /// Reject repeated observations instead of collapsing them
    #[arg(long, global = true)]
    strict: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole analysis
    Run,

    /// Descriptive statistics for the network and each sleeping site
    Describe,

    /// Fit the configured ERGMs
    Ergm {
        /// Simulated graphs per goodness-of-fit check
        #[arg(long)]
        simulations: Option<usize>,

        /// Simulation seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Select a block model by ICL
    Sbm {
        /// Largest block count tried
        #[arg(long)]
        max_blocks: Option<usize>,

        /// Initialization seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_path(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(nodes) = &cli.nodes {
        config.data.nodes = Some(nodes.clone());
    }
    if let Some(edges) = &cli.edges {
        config.data.edges = Some(edges.clone());
    }
    if cli.strict {
        config.data.duplicates = DuplicatePolicy::Reject;
    }
    match &cli.command {
        Commands::Ergm { simulations, seed } => {
            if let Some(s) = simulations {
                config.ergm.gof_simulations = *s;
            }
            if let Some(s) = seed {
                config.ergm.seed = *s;
            }
        }
        Commands::Sbm { max_blocks, seed } => {
            if let Some(k) = max_blocks {
                config.sbm.max_blocks = *k;
            }
            if let Some(s) = seed {
                config.sbm.seed = *s;
            }
        }
        Commands::Run | Commands::Describe | Commands::Config => {}
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("troop=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let stages = match cli.command {
        Commands::Run => Stages::ALL,
        Commands::Describe => Stages::DESCRIBE,
        Commands::Ergm { .. } => Stages::ERGM,
        Commands::Sbm { .. } => Stages::SBM,
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            return Ok(());
        }
    };

    let network = pipeline::load_network(&config).context("failed to load the grooming network")?;
    let outcome = pipeline::analyze(&network, &config, stages).context("analysis failed")?;

    match cli.format {
        OutputFormat::Text => print!("{outcome}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_path_can_come_from_the_environment() {
        let command = Cli::command();
        let config = command
            .get_arguments()
            .find(|a| a.get_id() == "config")
            .unwrap();
        assert_eq!(config.get_env(), Some(std::ffi::OsStr::new("TROOP_CONFIG")));
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "troop", "sbm", "--max-blocks", "4", "--config", "troop.toml", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("troop.toml")));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Commands::Sbm {
                max_blocks: Some(4),
                seed: None
            }
        ));
    }
}
