use linksync::config::{LinkTextPolicy, SheetNames};
use linksync::export::{sync_links, ExportOptions, ImportOutcome, LinkExporter};
use linksync::source::{initialize_schema, open_source};
use linksync::store::{MemoryStore, StoreCall};
use linksync::RateLimiter;
use rusqlite::{params, Connection};
use std::path::Path;
use tempfile::TempDir;

/// Writes a source database with the given links to a temporary directory
fn create_source(dir: &TempDir, links: &[(i64, i64, &str)]) -> std::path::PathBuf {
    let path = dir.path().join("links.sqlite");
    let conn = Connection::open(&path).unwrap();
    initialize_schema(&conn).unwrap();
    conn.execute_batch(
        "INSERT INTO page (page_id, page_title) VALUES (1, 'Main_Page'), (2, 'Help_Desk');",
    )
    .unwrap();
    for (id, from, url) in links {
        conn.execute(
            "INSERT INTO externallinks (el_id, el_from, el_to) VALUES (?1, ?2, ?3)",
            params![id, from, url],
        )
        .unwrap();
    }
    path
}

fn excluded() -> Vec<String> {
    vec!["mailto".to_string(), "ftp".to_string()]
}

fn header() -> Vec<String> {
    vec!["url".to_string(), "page id".to_string(), "title".to_string()]
}

fn open(path: &Path) -> linksync::source::SqliteLinkSource {
    open_source(path).unwrap()
}

#[tokio::test]
async fn test_three_rows_in_two_chunks() {
    let dir = TempDir::new().unwrap();
    let path = create_source(
        &dir,
        &[
            (1, 1, "HTTPS://Alpha.Example/Path"),
            (2, 1, "https://beta.example/"),
            (3, 2, "https://gamma.example/q?x=1"),
        ],
    );
    let source = open(&path);
    let store = MemoryStore::new();
    store.set_sheet("ALL_LINKS", vec![header()]);
    let mut limiter = RateLimiter::new(60);

    let exporter = LinkExporter::new(&source, &store, "ALL_LINKS", &excluded());
    let options = ExportOptions {
        chunk_size: 2,
        max_links: 0,
        resume_after: None,
        link_text: LinkTextPolicy::Never,
    };
    let report = exporter.export(&mut limiter, &options).await.unwrap();

    assert_eq!(report.appended, 3);
    assert_eq!(report.chunks, 2);

    let appends: Vec<usize> = store
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            StoreCall::Append { rows, .. } => Some(rows),
            _ => None,
        })
        .collect();
    assert_eq!(appends, vec![2, 1]);

    let urls: Vec<String> = store
        .sheet("ALL_LINKS")
        .into_iter()
        .skip(1)
        .map(|row| row[0].clone())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://alpha.example/path",
            "https://beta.example/",
            "https://gamma.example/q?x=1",
        ]
    );
}

#[tokio::test]
async fn test_rerun_rebuilds_export() {
    let dir = TempDir::new().unwrap();
    let path = create_source(
        &dir,
        &[(1, 1, "https://alpha.example/"), (2, 2, "https://beta.example/")],
    );
    let source = open(&path);
    let store = MemoryStore::new();
    store.set_sheet("ALL_LINKS", vec![header()]);
    let mut limiter = RateLimiter::new(60);

    let exporter = LinkExporter::new(&source, &store, "ALL_LINKS", &excluded());
    let options = ExportOptions {
        link_text: LinkTextPolicy::Never,
        ..ExportOptions::default()
    };
    exporter.export(&mut limiter, &options).await.unwrap();
    exporter.export(&mut limiter, &options).await.unwrap();

    let exported: Vec<Vec<String>> = store
        .sheet("ALL_LINKS")
        .into_iter()
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();
    assert_eq!(exported.len(), 3);
    assert_eq!(exported[1], vec!["https://alpha.example/", "1", "Main Page"]);
    assert_eq!(exported[2], vec!["https://beta.example/", "2", "Help Desk"]);
}

#[tokio::test]
async fn test_link_text_from_page_html() {
    let dir = TempDir::new().unwrap();
    let path = create_source(
        &dir,
        &[(1, 1, "https://alpha.example/guide"), (2, 2, "https://alpha.example/guide")],
    );
    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO page_html (page_id, html) VALUES (1, ?1)",
        params![r#"<ul><li><a href="https://Alpha.example/guide">Setup guide</a></li></ul>"#],
    )
    .unwrap();
    drop(conn);

    let source = open(&path);
    let store = MemoryStore::new();
    let mut limiter = RateLimiter::new(60);

    let exporter = LinkExporter::new(&source, &store, "ALL_LINKS", &excluded());
    let report = exporter
        .export(&mut limiter, &ExportOptions::default())
        .await
        .unwrap();

    assert_eq!(report.link_text_lookups, 1);
    let sheet = store.sheet("ALL_LINKS");
    assert_eq!(sheet[0][3], "Setup guide");
    assert_eq!(sheet[1][3], "");
}

#[tokio::test]
async fn test_sync_links_imports_new_links() {
    let dir = TempDir::new().unwrap();
    let path = create_source(
        &dir,
        &[(1, 1, "https://alpha.example/"), (2, 1, "mailto://help@alpha.example")],
    );
    let source = open(&path);
    let store = MemoryStore::new();
    store.set_sheet("ALL_LINKS", vec![header()]);
    store.set_sheet(
        "NEW_LINKS",
        vec![
            vec!["page".to_string(), "title".to_string(), "url".to_string()],
            vec!["1".to_string(), "Main Page".to_string(), "https://alpha.example/".to_string()],
        ],
    );
    store.set_sheet("LINKS_STATUS", vec![vec!["row".to_string(), "url".to_string()]]);
    let mut limiter = RateLimiter::new(60);

    let report = sync_links(
        &source,
        &store,
        &SheetNames::default(),
        &excluded(),
        &mut limiter,
        &ExportOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.export.appended, 1);
    assert_eq!(report.export.excluded, 1);
    assert_eq!(report.import, ImportOutcome::Imported(1));
    assert_eq!(
        store.sheet("LINKS_STATUS")[1],
        vec!["".to_string(), "https://alpha.example/".to_string()]
    );
}

#[tokio::test]
async fn test_sync_links_with_no_new_links() {
    let dir = TempDir::new().unwrap();
    let path = create_source(&dir, &[(1, 1, "https://alpha.example/")]);
    let source = open(&path);
    let store = MemoryStore::new();
    store.set_sheet(
        "NEW_LINKS",
        vec![
            vec!["page".to_string(), "title".to_string(), "url".to_string()],
            vec![String::new(), String::new(), "#N/A".to_string()],
        ],
    );
    let mut limiter = RateLimiter::new(60);

    let report = sync_links(
        &source,
        &store,
        &SheetNames::default(),
        &excluded(),
        &mut limiter,
        &ExportOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.import, ImportOutcome::NoData);
    assert!(store.sheet("LINKS_STATUS").is_empty());
}
