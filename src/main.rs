use std::collections::BTreeSet;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{LevelFilter, info, warn};
use nba_stats_pipeline::{
    Consolidator, IngestOptions, Ingestor, ObjectStoreGateway, PerMode, S3BlobStore, SEASON_LABEL,
    ScrapingContext, SeasonType,
    config::{LoadFromEnv, ScrapingConfig, SeasonFormat, StoreConfig},
};

#[derive(Parser)]
#[command(
    name = "nba_stats_pipeline",
    version,
    about = "Scrape NBA player stats into a MinIO bucket and consolidate them"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every season after --first-season and store one CSV per unit.
    Ingest {
        #[arg(long, default_value = "1996-97")]
        first_season: String,
        /// Repeat to select several; all season types when omitted.
        #[arg(long = "season-type", value_enum)]
        season_types: Vec<SeasonType>,
        #[arg(long, value_enum, default_value_t = PerMode::Totals)]
        per_mode: PerMode,
        #[arg(long, env = "RAW_BUCKET", default_value = "raw-nba")]
        bucket: String,
    },
    /// Merge all raw CSV objects into one unified CSV.
    Consolidate {
        #[arg(long, env = "RAW_BUCKET", default_value = "raw-nba")]
        source_bucket: String,
        #[arg(long, env = "TRUSTED_BUCKET", default_value = "trusted-nba")]
        dest_bucket: String,
        #[arg(long, default_value = "nba__unified.csv")]
        dest_key: String,
    },
    /// Print the seasons offered by the stats leaders page.
    Seasons,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Ingest {
            first_season,
            season_types,
            per_mode,
            bucket,
        } => {
            SeasonFormat::new()?.validate(&first_season)?;
            let season_types: BTreeSet<SeasonType> = if season_types.is_empty() {
                SeasonType::ALL.into_iter().collect()
            } else {
                season_types.into_iter().collect()
            };
            let options = IngestOptions {
                first_season,
                season_types,
                per_mode,
                bucket,
            };
            run_ingest(&options).await
        }
        Command::Consolidate {
            source_bucket,
            dest_bucket,
            dest_key,
        } => run_consolidate(&source_bucket, &dest_bucket, &dest_key).await,
        Command::Seasons => list_seasons().await,
    }
}

fn store_gateway() -> anyhow::Result<ObjectStoreGateway<S3BlobStore>> {
    let store_config = StoreConfig::load_from_env()?;
    info!("Using object store at {}", store_config.endpoint);
    Ok(ObjectStoreGateway::new(S3BlobStore::new(&store_config)))
}

async fn run_ingest(options: &IngestOptions) -> anyhow::Result<()> {
    let context = ScrapingContext::new(ScrapingConfig::load_from_env()?)?;
    let gateway = store_gateway()?;

    let report = Ingestor::new(&context, &gateway)
        .run(options)
        .await
        .context("ingestion aborted")?;

    for failed in &report.failed {
        warn!("Not stored: {} ({})", failed.unit, failed.error);
    }
    Ok(())
}

async fn run_consolidate(
    source_bucket: &str,
    dest_bucket: &str,
    dest_key: &str,
) -> anyhow::Result<()> {
    let gateway = store_gateway()?;
    let report = Consolidator::new(&gateway)
        .consolidate(source_bucket, dest_bucket, dest_key)
        .await
        .with_context(|| format!("failed to consolidate bucket '{source_bucket}'"))?;
    if report.written {
        info!(
            "Unified table has {} rows and {} columns",
            report.rows,
            report.columns.len()
        );
    }
    Ok(())
}

async fn list_seasons() -> anyhow::Result<()> {
    let context = ScrapingContext::new(ScrapingConfig::load_from_env()?)?;
    let catalog = context
        .dropdown_scraper
        .discover(&context.request_client)
        .await;
    let seasons = catalog.lookup(SEASON_LABEL);
    if seasons.is_empty() {
        let mut labels: Vec<&str> = catalog.labels().collect();
        labels.sort_unstable();
        warn!("No '{SEASON_LABEL}' dropdown found; page offers {labels:?}");
    }
    for season in seasons {
        println!("{season}");
    }
    Ok(())
}
