use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, de::DeserializeOwned};

pub const DEFAULT_STATS_URL: &str = "https://stats.nba.com/stats/leaguedashplayerstats";
pub const DEFAULT_LEADERS_URL: &str = "https://www.nba.com/stats/leaders";
pub const DEFAULT_DROPDOWN_CLASS: &str = "DropDown_select__4pIg9";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Connection settings for the MinIO / S3 compatible object store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(rename = "minio_endpoint", default = "default_endpoint")]
    pub endpoint: String,
    #[serde(rename = "minio_root_user", default = "default_credential")]
    pub access_key: String,
    #[serde(rename = "minio_root_password", default = "default_credential")]
    pub secret_key: String,
    #[serde(rename = "aws_region", default = "default_region")]
    pub region: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            access_key: default_credential(),
            secret_key: default_credential(),
            region: default_region(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:9000".to_string()
}

fn default_credential() -> String {
    "admin-minio".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// The env config env vars needed for scraping.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapingConfig {
    #[serde(rename = "nba_stats_url", default = "default_stats_url")]
    pub stats_url: String,
    #[serde(rename = "nba_leaders_url", default = "default_leaders_url")]
    pub leaders_url: String,
    #[serde(rename = "nba_dropdown_class", default = "default_dropdown_class")]
    pub dropdown_class: String,
    #[serde(default = "default_timeout")]
    pub http_timeout_seconds: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            stats_url: default_stats_url(),
            leaders_url: default_leaders_url(),
            dropdown_class: default_dropdown_class(),
            http_timeout_seconds: default_timeout(),
        }
    }
}

fn default_stats_url() -> String {
    DEFAULT_STATS_URL.to_string()
}

fn default_leaders_url() -> String {
    DEFAULT_LEADERS_URL.to_string()
}

fn default_dropdown_class() -> String {
    DEFAULT_DROPDOWN_CLASS.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECONDS
}

/// Recognises season identifiers of the form `YYYY-YY`.
pub struct SeasonFormat {
    season_regex: Regex,
}

impl SeasonFormat {
    pub fn new() -> anyhow::Result<Self> {
        let season_regex = Regex::new(r"^\d{4}-\d{2}$")?;
        Ok(Self { season_regex })
    }

    pub fn is_valid(&self, season: &str) -> bool {
        self.season_regex.is_match(season)
    }

    pub fn validate(&self, season: &str) -> anyhow::Result<()> {
        if !self.is_valid(season) {
            return Err(anyhow::anyhow!(
                "season must look like YYYY-YY, got: {}",
                season
            ));
        }
        Ok(())
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
