use std::time::Duration;

use reqwest::{
    Client, ClientBuilder, Response,
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT},
};

use crate::ratelimit::RateLimiter;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:91.0) Gecko/20100101 Firefox/91.0";

pub struct RequestClient {
    client: Client,
    // HTML pages are fetched without the stats API headers.
    page_client: Client,
    rate_limiter: RateLimiter,
}

impl RequestClient {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Self::with_rate_limiter(timeout, RateLimiter::new())
    }

    pub fn with_rate_limiter(timeout: Duration, rate_limiter: RateLimiter) -> reqwest::Result<Self> {
        let client = ClientBuilder::new()
            .default_headers(default_headers())
            .timeout(timeout)
            .build()?;
        let page_client = ClientBuilder::new().timeout(timeout).build()?;
        Ok(Self {
            client,
            page_client,
            rate_limiter,
        })
    }

    pub async fn fetch_url_response(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> reqwest::Result<Response> {
        // Wait until we're allowed to make a request according to our
        // self-imposed rate-limiting policy.
        self.rate_limiter.wait_until_ready().await;

        self.client.get(url).query(query).send().await
    }

    /// Fetches an HTML page body with a plain GET, treating any non-success
    /// status as an error.
    pub async fn fetch_url_body(&self, url: &str) -> reqwest::Result<String> {
        self.rate_limiter.wait_until_ready().await;

        let response = self.page_client.get(url).send().await?;
        let body = response.error_for_status()?.text().await?;
        Ok(body)
    }
}

// The stats endpoint drops requests that don't look like they came from the
// stats.nba.com front end.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(REFERER, HeaderValue::from_static("https://stats.nba.com/"));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
    headers.insert("x-nba-stats-token", HeaderValue::from_static("true"));
    headers
}
