use chrono::NaiveDate;
use linksync::config::{HttpConfig, SheetNames};
use linksync::export::{ImportOutcome, NewLinksImporter};
use linksync::healthcheck::{HealthCheckOptions, HealthChecker, StopReason};
use linksync::probe::ReqwestProbe;
use linksync::store::{RetryPolicy, SheetsStore};
use linksync::RateLimiter;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a spreadsheet store pointed at the mock API
fn create_store(server: &MockServer) -> SheetsStore {
    SheetsStore::new(
        reqwest::Client::new(),
        &server.uri(),
        "sheet123",
        "token-abc",
        RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
        },
    )
}

#[tokio::test]
async fn test_import_new_links_through_api() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spreadsheets/sheet123/values/NEW_LINKS%21C2%3AC"))
        .and(header("authorization", "Bearer token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "NEW_LINKS!C2:C1000",
            "majorDimension": "ROWS",
            "values": [["https://a.example/"], [""], ["https://b.example/"]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/spreadsheets/sheet123/values/LINKS_STATUS%21A%3AZZZ:append"))
        .and(query_param("insertDataOption", "INSERT_ROWS"))
        .and(body_json(json!({
            "values": [["", "https://a.example/"], ["", "https://b.example/"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updates": { "updatedRows": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = create_store(&server);
    let mut limiter = RateLimiter::new(60);
    let importer = NewLinksImporter::new(&store, "NEW_LINKS", "LINKS_STATUS");

    let outcome = importer.import_new_links(&mut limiter).await.unwrap();
    assert_eq!(outcome, ImportOutcome::Imported(2));
}

#[tokio::test]
async fn test_transient_read_failure_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spreadsheets/sheet123/values/NEW_LINKS%21C2%3AC"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/spreadsheets/sheet123/values/NEW_LINKS%21C2%3AC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["#N/A"]]
        })))
        .mount(&server)
        .await;

    let store = create_store(&server);
    let mut limiter = RateLimiter::new(60);
    let importer = NewLinksImporter::new(&store, "NEW_LINKS", "LINKS_STATUS");

    let outcome = importer.import_new_links(&mut limiter).await.unwrap();
    assert_eq!(outcome, ImportOutcome::NoData);
}

#[tokio::test]
async fn test_healthcheck_through_api() {
    let server = MockServer::start().await;
    let page_url = format!("{}/page", server.uri());

    Mock::given(method("GET"))
        .and(path("/spreadsheets/sheet123/values/NEXT_CHECK%21A2%3AF101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [[2, page_url, "", "", "", ""]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/spreadsheets/sheet123/values:batchUpdate"))
        .and(body_json(json!({
            "valueInputOption": "USER_ENTERED",
            "data": [{
                "range": "LINKS_STATUS!E2:H2",
                "values": [["=DATE(2024,5,1)", "200", "", ""]]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalUpdatedRows": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = create_store(&server);
    let probe = ReqwestProbe::from_config(&HttpConfig::default()).unwrap();
    let mut limiter = RateLimiter::new(60);
    let options = HealthCheckOptions {
        runtime: Duration::from_secs(60),
        max_links: 0,
        batch_size: 20,
        query_size: 100,
        today: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    };

    let mut checker = HealthChecker::new(&store, &probe, &SheetNames::default(), &[]);
    let report = checker.run(&mut limiter, &options).await.unwrap();

    assert_eq!(report.probed, 1);
    assert_eq!(report.rows_written, 1);
    assert_eq!(report.stop, StopReason::EndOfData);
}
