//! Season discovery driven fetch-and-store of raw stats tables.

use std::collections::BTreeSet;

use log::{error, info, warn};

use crate::{
    config::SeasonFormat,
    error::Result,
    scraping_context::ScrapingContext,
    store::{BlobStore, ObjectStoreGateway},
    work_unit::{PerMode, SeasonType, WorkUnit},
};

/// Label of the dropdown listing the available seasons.
pub const SEASON_LABEL: &str = "Season";

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Only seasons strictly greater than this one are fetched.
    pub first_season: String,
    pub season_types: BTreeSet<SeasonType>,
    pub per_mode: PerMode,
    pub bucket: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUnit {
    pub unit: WorkUnit,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub stored: Vec<String>,
    pub failed: Vec<FailedUnit>,
    pub skipped_seasons: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct WorkPlan {
    pub units: Vec<WorkUnit>,
    pub skipped_seasons: Vec<String>,
}

/// Expands the catalog seasons into work units.
///
/// Seasons are compared as plain strings, which orders `YYYY-YY` values
/// correctly. Units follow catalog order, then [`SeasonType::ALL`] order.
pub fn plan_work(
    seasons: &[String],
    first_season: &str,
    season_types: &BTreeSet<SeasonType>,
    per_mode: PerMode,
) -> WorkPlan {
    let mut plan = WorkPlan::default();
    for season in seasons {
        if season.as_str() <= first_season {
            plan.skipped_seasons.push(season.clone());
            continue;
        }
        for season_type in SeasonType::ALL {
            if season_types.contains(&season_type) {
                plan.units
                    .push(WorkUnit::new(season.clone(), season_type, per_mode));
            }
        }
    }
    plan
}

pub struct Ingestor<'a, B> {
    context: &'a ScrapingContext,
    gateway: &'a ObjectStoreGateway<B>,
}

impl<'a, B: BlobStore> Ingestor<'a, B> {
    pub fn new(context: &'a ScrapingContext, gateway: &'a ObjectStoreGateway<B>) -> Self {
        Self { context, gateway }
    }

    /// Fetches and stores every planned unit, one at a time.
    ///
    /// A unit that fails is logged and recorded in the report; the run keeps
    /// going. Only a failure to prepare the bucket aborts the run.
    pub async fn run(&self, options: &IngestOptions) -> Result<IngestReport> {
        let catalog = self
            .context
            .dropdown_scraper
            .discover(&self.context.request_client)
            .await;
        let seasons = catalog.lookup(SEASON_LABEL);
        info!("Discovered {} seasons", seasons.len());
        warn_on_unexpected_format(&self.context.season_format, seasons);

        let plan = plan_work(
            seasons,
            &options.first_season,
            &options.season_types,
            options.per_mode,
        );
        for season in &plan.skipped_seasons {
            warn!(
                "Season {season} is not greater than {}. Skipping...",
                options.first_season
            );
        }

        let mut report = IngestReport {
            skipped_seasons: plan.skipped_seasons,
            ..IngestReport::default()
        };
        if plan.units.is_empty() {
            info!("Nothing to ingest");
            return Ok(report);
        }

        self.gateway.ensure_bucket(&options.bucket).await?;
        for unit in plan.units {
            let key = unit.object_key();
            match self.ingest_unit(&unit, &options.bucket, &key).await {
                Ok(()) => report.stored.push(key),
                Err(e) => {
                    error!("Failed to ingest {unit}: {e}");
                    report.failed.push(FailedUnit {
                        unit,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Ingestion finished: {} stored, {} failed, {} seasons skipped",
            report.stored.len(),
            report.failed.len(),
            report.skipped_seasons.len()
        );
        Ok(report)
    }

    async fn ingest_unit(&self, unit: &WorkUnit, bucket: &str, key: &str) -> Result<()> {
        let table = self
            .context
            .stats_client
            .fetch(&self.context.request_client, unit)
            .await?;
        self.gateway.put(bucket, key, &table).await
    }
}

fn warn_on_unexpected_format(season_format: &SeasonFormat, seasons: &[String]) {
    for season in seasons {
        if !season_format.is_valid(season) {
            warn!("Season {season:?} is not in YYYY-YY form; comparing it as text");
        }
    }
}
