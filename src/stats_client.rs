use log::{debug, info};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{Error, Result},
    requests::RequestClient,
    stats_table::StatsTable,
    work_unit::WorkUnit,
};

/// Query parameters held at their neutral defaults for every request.
const NEUTRAL_PARAMS: &[(&str, &str)] = &[
    ("College", ""),
    ("Conference", ""),
    ("Country", ""),
    ("DateFrom", ""),
    ("DateTo", ""),
    ("Division", ""),
    ("DraftPick", ""),
    ("DraftYear", ""),
    ("GameScope", ""),
    ("GameSegment", ""),
    ("Height", ""),
    ("LastNGames", "0"),
    ("LeagueID", "00"),
    ("Location", ""),
    ("MeasureType", "Base"),
    ("Month", "0"),
    ("OpponentTeamID", "0"),
    ("Outcome", ""),
    ("PORound", "0"),
    ("PaceAdjust", "N"),
    ("Period", "0"),
    ("PlayerExperience", ""),
    ("PlayerPosition", ""),
    ("PlusMinus", "N"),
    ("Rank", "N"),
    ("SeasonSegment", ""),
    ("ShotClockRange", ""),
    ("StarterBench", ""),
    ("TeamID", "0"),
    ("VsConference", ""),
    ("VsDivision", ""),
    ("Weight", ""),
];

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets")]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    headers: Vec<String>,
    #[serde(rename = "rowSet")]
    row_set: Vec<Vec<Value>>,
}

/// Client for the league player stats endpoint.
pub struct StatsClient {
    endpoint: String,
}

impl StatsClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Fetches the first result set for one unit. No retries.
    pub async fn fetch(
        &self,
        request_client: &RequestClient,
        unit: &WorkUnit,
    ) -> Result<StatsTable> {
        let mut query: Vec<(&str, &str)> = NEUTRAL_PARAMS.to_vec();
        query.push(("PerMode", unit.per_mode.as_param()));
        query.push(("Season", &unit.season));
        query.push(("SeasonType", unit.season_type.as_param()));

        info!("Fetching stats for {unit}");
        let response = request_client
            .fetch_url_response(&self.endpoint, &query)
            .await
            .map_err(|e| Error::RemoteFetch {
                status: e.status().map(|s| s.as_u16()),
                url: self.endpoint.clone(),
            })?;

        let url = response.url().to_string();
        let status = response.status();
        debug!("Status code {status} from {url}");
        if status != StatusCode::OK {
            return Err(Error::RemoteFetch {
                status: Some(status.as_u16()),
                url,
            });
        }

        let body = response.text().await.map_err(|_| Error::RemoteFetch {
            status: Some(status.as_u16()),
            url: url.clone(),
        })?;
        parse_stats_body(&body, &url)
    }
}

fn parse_stats_body(body: &str, url: &str) -> Result<StatsTable> {
    let response: StatsResponse =
        serde_json::from_str(body).map_err(|e| Error::malformed(e.to_string(), url))?;
    let Some(first) = response.result_sets.into_iter().next() else {
        return Err(Error::malformed("resultSets is empty", url));
    };
    if first.headers.is_empty() {
        return Err(Error::malformed("resultSets[0].headers is empty", url));
    }
    StatsTable::from_json(first.headers, first.row_set)
        .map_err(|e| Error::malformed(e.to_string(), url))
}
