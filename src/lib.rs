mod consolidate;
mod dropdown_scraper;
mod error;
mod ingest;
mod ratelimit;
mod requests;
mod s3;
mod scraping_context;
mod stats_client;
mod stats_table;
mod store;
mod text_manipulators;
mod work_unit;

pub mod config;

pub use consolidate::{ConsolidationReport, Consolidator};
pub use dropdown_scraper::{DimensionCatalog, DropdownScraper};
pub use error::{Error, Result};
pub use ingest::{
    FailedUnit, IngestOptions, IngestReport, Ingestor, SEASON_LABEL, WorkPlan, plan_work,
};
pub use ratelimit::RateLimiter;
pub use requests::RequestClient;
pub use s3::S3BlobStore;
pub use scraping_context::ScrapingContext;
pub use stats_client::StatsClient;
pub use stats_table::{Cell, StatsTable};
pub use store::{BlobStore, MemoryBlobStore, ObjectStoreGateway};
pub use work_unit::{PerMode, SeasonType, WorkUnit};
