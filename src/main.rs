//! rainrank
//!
//! Command-line entry point: rank every capital city by raininess, score a
//! single city by name, or smoke-check the upstream providers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rainrank_service::capitals::load_capitals;
use rainrank_service::cities::WorldCities;
use rainrank_service::config::{Config, DEFAULT_CONFIG_FILE};
use rainrank_service::ingest::open_meteo::OpenMeteoClient;
use rainrank_service::logging::init_logging;
use rainrank_service::ranker::{self, RankOptions};
use rainrank_service::report;
use rainrank_service::verify;

#[derive(Parser)]
#[command(name = "rainrank")]
#[command(author, version, about = "Rank capital cities by raininess", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "RAINRANK_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every capital city and write the ranked report (default)
    Rank {
        /// Number of rows to print
        #[arg(long)]
        top: Option<usize>,

        /// Ranked CSV output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Capital-city input table
        #[arg(long)]
        capitals: Option<PathBuf>,

        /// Seconds to wait between cities
        #[arg(long)]
        delay: Option<u64>,
    },

    /// Look up one city in the reference table and print its raininess
    Score {
        /// City name, exactly as in the reference table
        city: String,

        /// ISO country code, e.g. GB
        country: String,
    },

    /// Check that both Open-Meteo endpoints answer for a few capitals
    Verify {
        /// Number of capitals to check
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    init_logging(&config.logging).context("initialising logging")?;

    let command = cli.command.unwrap_or(Commands::Rank {
        top: None,
        output: None,
        capitals: None,
        delay: None,
    });

    match command {
        Commands::Rank { top, output, capitals, delay } => {
            if let Some(top) = top {
                config.batch.top_n = top;
            }
            if let Some(output) = output {
                config.tables.output = output;
            }
            if let Some(capitals) = capitals {
                config.tables.capitals = capitals;
            }
            if let Some(delay) = delay {
                config.batch.request_delay_secs = delay;
            }
            run_rank(&config)
        }
        Commands::Score { city, country } => run_score(&config, &city, &country),
        Commands::Verify { limit } => run_verify(&config, limit),
    }
}

fn run_rank(config: &Config) -> Result<()> {
    let capitals = load_capitals(&config.tables.capitals)
        .context("reading the capital-city table")?;
    let client = OpenMeteoClient::new(&config.providers).context("building HTTP client")?;

    tracing::info!(
        cities = capitals.len(),
        delay_secs = config.batch.request_delay_secs,
        "starting ranking run"
    );

    let options = RankOptions {
        scoring: config.scoring.clone(),
        delay: config.batch.request_delay(),
    };
    let ranked = ranker::rank_cities(&client, &capitals, &options);

    println!("{}", report::format_top(&ranked, config.batch.top_n));
    report::save_report(&config.tables.output, &ranked).context("writing ranked report")?;
    Ok(())
}

fn run_score(config: &Config, city: &str, country: &str) -> Result<()> {
    let table = WorldCities::from_path(&config.tables.world_cities)
        .context("reading the world city table")?;

    let Some(location) = table.find(city, country) else {
        println!("{city}, {country}: not found in {}", config.tables.world_cities.display());
        return Ok(());
    };

    let client = OpenMeteoClient::new(&config.providers).context("building HTTP client")?;
    let score = ranker::score_city(&client, city, country, location, &config.scoring)
        .with_context(|| format!("scoring {city}, {country}"))?;

    println!("Raininess of {city}, {country} {location}: {score:.2}");
    Ok(())
}

fn run_verify(config: &Config, limit: usize) -> Result<()> {
    let capitals = load_capitals(&config.tables.capitals)
        .context("reading the capital-city table")?;
    let client = OpenMeteoClient::new(&config.providers).context("building HTTP client")?;

    let sample = &capitals[..limit.min(capitals.len())];
    let report = verify::verify_all(&client, sample, config.batch.request_delay());

    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.summary.total > 0 && report.summary.working == 0 {
        anyhow::bail!("no provider check fully succeeded");
    }
    Ok(())
}
