use std::time::Duration;

use crate::{
    config::{ScrapingConfig, SeasonFormat},
    dropdown_scraper::DropdownScraper,
    ratelimit::RateLimiter,
    requests::RequestClient,
    stats_client::StatsClient,
};

/// Everything a run needs to talk to the remote stats site.
pub struct ScrapingContext {
    pub scraping_config: ScrapingConfig,
    pub season_format: SeasonFormat,
    pub request_client: RequestClient,
    pub stats_client: StatsClient,
    pub dropdown_scraper: DropdownScraper,
}

impl ScrapingContext {
    pub fn new(scraping_config: ScrapingConfig) -> anyhow::Result<Self> {
        Self::with_rate_limiter(scraping_config, RateLimiter::new())
    }

    pub fn with_rate_limiter(
        scraping_config: ScrapingConfig,
        rate_limiter: RateLimiter,
    ) -> anyhow::Result<Self> {
        let season_format = SeasonFormat::new()?;
        let timeout = Duration::from_secs(scraping_config.http_timeout_seconds);
        let request_client = RequestClient::with_rate_limiter(timeout, rate_limiter)?;
        let stats_client = StatsClient::new(scraping_config.stats_url.clone());
        let dropdown_scraper = DropdownScraper::new(
            scraping_config.leaders_url.clone(),
            &scraping_config.dropdown_class,
        )?;
        Ok(ScrapingContext {
            scraping_config,
            season_format,
            request_client,
            stats_client,
            dropdown_scraper,
        })
    }
}
