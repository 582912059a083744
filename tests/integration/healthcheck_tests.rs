use chrono::NaiveDate;
use linksync::config::{HttpConfig, SheetNames};
use linksync::healthcheck::{HealthCheckOptions, HealthChecker, StopReason};
use linksync::probe::ReqwestProbe;
use linksync::store::{MemoryStore, Row};
use linksync::RateLimiter;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a probe configuration for tests
fn create_http_config() -> HttpConfig {
    HttpConfig {
        timeout: 5,
        user_agent: "linksync-test/1.0".to_string(),
        ..HttpConfig::default()
    }
}

fn options() -> HealthCheckOptions {
    HealthCheckOptions {
        runtime: Duration::from_secs(60),
        max_links: 0,
        batch_size: 20,
        query_size: 100,
        today: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    }
}

fn row(cells: &[&str]) -> Row {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Returns columns E:H of a status sheet row
fn status_cells(store: &MemoryStore, row_index: usize) -> Vec<String> {
    let sheet = store.sheet("LINKS_STATUS");
    sheet[row_index - 1][4..8].to_vec()
}

#[tokio::test]
async fn test_healthcheck_against_live_server() {
    let server = MockServer::start().await;
    let port = server.address().port();

    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(path("/same-domain"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let first = format!("http://127.0.0.1:{}/ok", port);
    let second = format!("http://localhost:{}/missing", port);
    let third = format!("http://127.0.0.1:{}/same-domain", port);

    let store = MemoryStore::new();
    store.set_sheet(
        "NEXT_CHECK",
        vec![
            row(&["row", "url", "checked", "redirect", "error", "status"]),
            row(&["2", &first]),
            row(&["3", &second, "2024-04-01", "", "http-bad-status: Not Found", "404"]),
            row(&["4", &third]),
            row(&["5", "ftp://files.example/pub"]),
        ],
    );

    let probe = ReqwestProbe::from_config(&create_http_config()).unwrap();
    let mut limiter = RateLimiter::new(60);
    let excluded = vec!["mailto".to_string(), "ftp".to_string()];

    let mut checker = HealthChecker::new(&store, &probe, &SheetNames::default(), &excluded);
    let report = checker.run(&mut limiter, &options()).await.unwrap();

    assert_eq!(report.probed, 2);
    assert_eq!(report.skipped_duplicate_domain, 1);
    assert_eq!(report.skipped_excluded_protocol, 1);
    assert_eq!(report.rows_written, 2);
    assert_eq!(report.stop, StopReason::EndOfData);

    assert_eq!(
        status_cells(&store, 2),
        row(&["=DATE(2024,5,1)", "200", "", ""])
    );
    assert_eq!(
        status_cells(&store, 3),
        row(&["=DATE(2024,5,1)", "404", "", "http-bad-status: Not Found"])
    );
}

#[tokio::test]
async fn test_healthcheck_records_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/old-home"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/new-home", server.uri()).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/new-home"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    store.set_sheet(
        "NEXT_CHECK",
        vec![
            row(&["row", "url"]),
            row(&["7", &format!("{}/old-home#intro", server.uri())]),
        ],
    );

    let probe = ReqwestProbe::from_config(&create_http_config()).unwrap();
    let mut limiter = RateLimiter::new(60);

    let mut checker = HealthChecker::new(&store, &probe, &SheetNames::default(), &[]);
    let report = checker.run(&mut limiter, &options()).await.unwrap();

    assert_eq!(report.probed, 1);
    assert_eq!(
        status_cells(&store, 7),
        row(&[
            "=DATE(2024,5,1)",
            "200",
            &format!("{}/new-home", server.uri()),
            ""
        ])
    );
}

#[tokio::test]
async fn test_healthcheck_records_connect_failure() {
    let store = MemoryStore::new();
    store.set_sheet(
        "NEXT_CHECK",
        vec![row(&["row", "url"]), row(&["2", "http://127.0.0.1:1/down"])],
    );

    let probe = ReqwestProbe::from_config(&create_http_config()).unwrap();
    let mut limiter = RateLimiter::new(60);

    let mut checker = HealthChecker::new(&store, &probe, &SheetNames::default(), &[]);
    let report = checker.run(&mut limiter, &options()).await.unwrap();

    assert_eq!(report.probed, 1);
    let cells = status_cells(&store, 2);
    assert_eq!(cells[1], "999");
    assert!(cells[3].starts_with("http-connect-error"));
}

#[tokio::test]
async fn test_healthcheck_with_empty_queue() {
    let store = MemoryStore::new();
    store.set_sheet("NEXT_CHECK", vec![row(&["row", "url"]), row(&["#N/A"])]);

    let probe = ReqwestProbe::from_config(&create_http_config()).unwrap();
    let mut limiter = RateLimiter::new(60);

    let mut checker = HealthChecker::new(&store, &probe, &SheetNames::default(), &[]);
    let report = checker.run(&mut limiter, &options()).await.unwrap();

    assert_eq!(report.probed, 0);
    assert_eq!(report.rows_written, 0);
    assert_eq!(report.stop, StopReason::EndOfData);
    assert!(store.sheet("LINKS_STATUS").is_empty());
}
