use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use retail_core::{DbCredentials, EtlConfig, Vocabulary};
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_FILTER: &str = "retail_etl=info,retail_clean=info,retail_storage=info";

#[derive(Parser)]
#[command(name = "retail-etl")]
#[command(about = "Cleans retail customer and sales extracts and loads them into SQLite")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a customer profile extract
    Customers(RunArgs),
    /// Normalize a sales extract and derive the category and product tables
    Sales(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// TOML config file; flags below override its values
    #[arg(long, env = "RETAIL_ETL_CONFIG")]
    config: Option<PathBuf>,
    /// Raw CSV extract to clean
    #[arg(long, env = "RETAIL_ETL_SOURCE")]
    source: Option<PathBuf>,
    /// Directory for cleaned CSVs and the run report
    #[arg(long, env = "RETAIL_ETL_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
    /// sqlx connection URL, e.g. sqlite://retail.db
    #[arg(long, env = "RETAIL_ETL_DATABASE_URL")]
    database_url: Option<String>,
    /// TOML file replacing parts of the built-in vocabulary
    #[arg(long, env = "RETAIL_ETL_VOCABULARY")]
    vocabulary: Option<PathBuf>,
    /// Write cleaned files only
    #[arg(long)]
    skip_load: bool,
}

impl RunArgs {
    fn resolve(&self) -> anyhow::Result<(EtlConfig, Vocabulary)> {
        let mut config = match &self.config {
            Some(path) => EtlConfig::from_toml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => EtlConfig::default(),
        };

        if let Some(source) = &self.source {
            config.source_path = source.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(url) = &self.database_url {
            let max_connections = config.db_credentials.as_ref().map(|db| db.max_connections);
            let mut credentials = DbCredentials::new(url.as_str());
            if let Some(max) = max_connections {
                credentials.max_connections = max;
            }
            config.db_credentials = Some(credentials);
        }
        if let Some(vocabulary) = &self.vocabulary {
            config.vocabulary_path = Some(vocabulary.clone());
        }
        if self.skip_load {
            config.db_credentials = None;
        }
        config.validate().context("invalid configuration")?;

        let vocabulary = match &config.vocabulary_path {
            Some(path) => Vocabulary::from_toml_file(path)
                .with_context(|| format!("loading vocabulary {}", path.display()))?,
            None => Vocabulary::default(),
        };

        Ok((config, vocabulary))
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Customers(args) => {
            let (config, vocabulary) = args.resolve()?;
            commands::run_customers(&config, &vocabulary).await?;
        }
        Commands::Sales(args) => {
            let (config, vocabulary) = args.resolve()?;
            commands::run_sales(&config, &vocabulary).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
