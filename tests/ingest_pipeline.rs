use std::collections::BTreeSet;

use nba_stats_pipeline::{
    Cell, Consolidator, IngestOptions, Ingestor, MemoryBlobStore, ObjectStoreGateway, PerMode,
    RateLimiter, ScrapingContext, SeasonType,
    config::{DEFAULT_DROPDOWN_CLASS, ScrapingConfig},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const LEADERS_PATH: &str = "/stats/leaders";
const STATS_PATH: &str = "/stats/leaguedashplayerstats";

fn leaders_page(seasons: &[&str]) -> String {
    let options: String = seasons
        .iter()
        .map(|season| format!("<option>{season}</option>"))
        .collect();
    format!(
        r#"<html><body>
             <label><p>Season</p>
               <select class="{DEFAULT_DROPDOWN_CLASS}">{options}</select>
             </label>
             <label><p>Per Mode</p>
               <select class="{DEFAULT_DROPDOWN_CLASS}"><option>Totals</option></select>
             </label>
           </body></html>"#
    )
}

fn stats_body(points: i64) -> serde_json::Value {
    json!({
        "resultSets": [{
            "headers": ["PLAYER_ID", "PLAYER_NAME", "PTS"],
            "rowSet": [[2544, "LeBron James", points]]
        }]
    })
}

fn context_for(server: &MockServer) -> ScrapingContext {
    let config = ScrapingConfig {
        stats_url: format!("{}{STATS_PATH}", server.uri()),
        leaders_url: format!("{}{LEADERS_PATH}", server.uri()),
        dropdown_class: DEFAULT_DROPDOWN_CLASS.to_string(),
        http_timeout_seconds: 5,
    };
    ScrapingContext::with_rate_limiter(config, RateLimiter::unthrottled())
        .expect("Failed to create scraping context")
}

fn options(season_types: &[SeasonType]) -> IngestOptions {
    IngestOptions {
        first_season: "1996-97".to_string(),
        season_types: season_types.iter().copied().collect::<BTreeSet<_>>(),
        per_mode: PerMode::Totals,
        bucket: "raw-nba".to_string(),
    }
}

async fn mount_leaders(server: &MockServer, seasons: &[&str]) {
    Mock::given(method("GET"))
        .and(path(LEADERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(leaders_page(seasons)))
        .mount(server)
        .await;
}

async fn mount_stats(server: &MockServer, points: i64) {
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(points)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn stores_one_object_per_unit_after_first_season() {
    let server = MockServer::start().await;
    mount_leaders(&server, &["2023-24", "1997-98", "1996-97"]).await;
    mount_stats(&server, 30).await;

    let context = context_for(&server);
    let gateway = ObjectStoreGateway::new(MemoryBlobStore::new());
    let report = Ingestor::new(&context, &gateway)
        .run(&options(&[SeasonType::RegularSeason, SeasonType::Playoffs]))
        .await
        .unwrap();

    assert_eq!(
        report.stored,
        vec![
            "nba__2023-24_Playoffs_Totals.csv",
            "nba__2023-24_Regular Season_Totals.csv",
            "nba__1997-98_Playoffs_Totals.csv",
            "nba__1997-98_Regular Season_Totals.csv",
        ]
    );
    assert!(report.failed.is_empty());
    assert_eq!(report.skipped_seasons, vec!["1996-97"]);

    let stored = gateway
        .get("raw-nba", "nba__1997-98_Playoffs_Totals.csv")
        .await
        .unwrap();
    assert_eq!(stored.columns(), ["PLAYER_ID", "PLAYER_NAME", "PTS"]);
    assert_eq!(
        stored.rows()[0],
        vec![Cell::Int(2544), Cell::from("LeBron James"), Cell::Int(30)]
    );
}

#[tokio::test]
async fn failed_unit_does_not_stop_the_run() {
    let server = MockServer::start().await;
    mount_leaders(&server, &["2023-24", "1997-98"]).await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .and(query_param("Season", "1997-98"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_stats(&server, 12).await;

    let context = context_for(&server);
    let gateway = ObjectStoreGateway::new(MemoryBlobStore::new());
    let report = Ingestor::new(&context, &gateway)
        .run(&options(&[SeasonType::Ist]))
        .await
        .unwrap();

    assert_eq!(report.stored, vec!["nba__2023-24_IST_Totals.csv"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].unit.season, "1997-98");
    assert_eq!(report.failed[0].unit.season_type, SeasonType::Ist);
    assert!(report.failed[0].error.contains("500"));
}

#[tokio::test]
async fn store_failure_for_one_unit_is_tolerated() {
    let server = MockServer::start().await;
    mount_leaders(&server, &["2023-24"]).await;
    mount_stats(&server, 8).await;

    let context = context_for(&server);
    let gateway = ObjectStoreGateway::new(MemoryBlobStore::new());
    gateway
        .blobs()
        .reject_key("nba__2023-24_All Star_Totals.csv")
        .unwrap();

    let report = Ingestor::new(&context, &gateway)
        .run(&options(&SeasonType::ALL))
        .await
        .unwrap();

    assert_eq!(report.stored.len(), 5);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].unit.season_type, SeasonType::AllStar);
}

#[tokio::test]
async fn response_without_columns_is_a_failed_unit() {
    let server = MockServer::start().await;
    mount_leaders(&server, &["2023-24"]).await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "resultSets": [{ "headers": [], "rowSet": [] }] })),
        )
        .mount(&server)
        .await;

    let context = context_for(&server);
    let gateway = ObjectStoreGateway::new(MemoryBlobStore::new());
    let report = Ingestor::new(&context, &gateway)
        .run(&options(&[SeasonType::Playoffs]))
        .await
        .unwrap();

    assert!(report.stored.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(gateway.blobs().put_count(), 0);
}

#[tokio::test]
async fn reingesting_overwrites_the_same_key() {
    let server = MockServer::start().await;
    mount_leaders(&server, &["2023-24"]).await;
    mount_stats(&server, 10).await;

    let context = context_for(&server);
    let gateway = ObjectStoreGateway::new(MemoryBlobStore::new());
    let ingestor = Ingestor::new(&context, &gateway);
    ingestor.run(&options(&[SeasonType::Playoffs])).await.unwrap();

    server.reset().await;
    mount_leaders(&server, &["2023-24"]).await;
    mount_stats(&server, 99).await;
    ingestor.run(&options(&[SeasonType::Playoffs])).await.unwrap();

    let keys = gateway.list("raw-nba").await.unwrap();
    assert_eq!(keys, vec!["nba__2023-24_Playoffs_Totals.csv"]);
    let latest = gateway.get("raw-nba", &keys[0]).await.unwrap();
    assert_eq!(latest.rows()[0][2], Cell::Int(99));
}

#[tokio::test]
async fn unreachable_leaders_page_means_an_empty_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LEADERS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(1)))
        .expect(0)
        .mount(&server)
        .await;

    let context = context_for(&server);
    let gateway = ObjectStoreGateway::new(MemoryBlobStore::new());
    let report = Ingestor::new(&context, &gateway)
        .run(&options(&SeasonType::ALL))
        .await
        .unwrap();

    assert!(report.stored.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(gateway.blobs().put_count(), 0);
}

#[tokio::test]
async fn ingested_objects_consolidate_into_one_table() {
    let server = MockServer::start().await;
    mount_leaders(&server, &["2023-24", "2022-23"]).await;
    mount_stats(&server, 21).await;

    let context = context_for(&server);
    let gateway = ObjectStoreGateway::new(MemoryBlobStore::new());
    Ingestor::new(&context, &gateway)
        .run(&options(&[SeasonType::RegularSeason, SeasonType::PlayIn]))
        .await
        .unwrap();

    let report = Consolidator::new(&gateway)
        .consolidate("raw-nba", "trusted-nba", "nba__unified.csv")
        .await
        .unwrap();

    assert_eq!(report.objects_read, 4);
    assert_eq!(report.rows, 4);
    let unified = gateway
        .get("trusted-nba", "nba__unified.csv")
        .await
        .unwrap();
    assert_eq!(unified.columns(), ["PLAYER_ID", "PLAYER_NAME", "PTS"]);
}
