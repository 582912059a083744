//! Source table definitions
//!
//! The source database is owned by the wiki; Linksync only reads it. This
//! schema describes the subset of tables the reader relies on and is used to
//! build fixture databases.

/// SQL schema for the tables the link source reads
pub const SCHEMA_SQL: &str = r#"
-- External links, one row per link occurrence
CREATE TABLE IF NOT EXISTS externallinks (
    el_id INTEGER PRIMARY KEY AUTOINCREMENT,
    el_from INTEGER NOT NULL,
    el_to TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_externallinks_from ON externallinks(el_from);

-- Pages the links were found on
CREATE TABLE IF NOT EXISTS page (
    page_id INTEGER PRIMARY KEY,
    page_title TEXT NOT NULL
);

-- Rendered page bodies, used for link text lookup
CREATE TABLE IF NOT EXISTS page_html (
    page_id INTEGER PRIMARY KEY REFERENCES page(page_id),
    html TEXT NOT NULL
);
"#;

/// Highest link identifier
pub const MAX_ID_SQL: &str = "SELECT MAX(el.el_id) FROM externallinks el";

/// One chunk of links after a given identifier, joined with page titles
pub const LINKS_AFTER_SQL: &str = "
    SELECT el.el_id, el.el_from, el.el_to, p.page_title
    FROM externallinks el
    LEFT JOIN page p ON p.page_id = el.el_from
    WHERE el.el_id > ?1
    ORDER BY el.el_id
    LIMIT ?2";

/// Rendered body of one page
pub const PAGE_HTML_SQL: &str = "SELECT html FROM page_html WHERE page_id = ?1";

/// Checks whether the optional page body table exists
pub const HAS_PAGE_HTML_SQL: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='page_html'";

/// Creates the source tables
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
