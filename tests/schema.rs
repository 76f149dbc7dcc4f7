//! Schema tests
//!
//! Inspects the created SQLite schema directly to confirm the constraints
//! the upsert layer relies on.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::{Connection, Result as SqliteResult};

use crease::config::DEFAULT_BASE_URL;
use crease::repository::{DbContext, SCHEMA_SQL};

/// Represents a SQLite index
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexInfo {
    name: String,
    table: String,
    columns: Vec<String>,
    unique: bool,
}

/// Extract every named index from a SQLite connection
fn extract_indexes(conn: &Connection) -> SqliteResult<BTreeMap<String, IndexInfo>> {
    let mut indexes = BTreeMap::new();

    let mut stmt = conn.prepare(
        "SELECT name, tbl_name FROM sqlite_master WHERE type='index' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let rows: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<SqliteResult<Vec<_>>>()?;

    for (name, table) in rows {
        let mut info = conn.prepare(&format!("PRAGMA index_info(\"{}\")", name))?;
        let columns = info
            .query_map([], |row| row.get::<_, String>(2))?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut list = conn.prepare(&format!("PRAGMA index_list(\"{}\")", table))?;
        let unique = list
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, bool>(2)?)))?
            .collect::<SqliteResult<Vec<_>>>()?
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, u)| u)
            .unwrap_or(false);

        indexes.insert(
            name.clone(),
            IndexInfo {
                name,
                table,
                columns,
                unique,
            },
        );
    }
    Ok(indexes)
}

fn fresh_schema() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA_SQL).unwrap();
    conn
}

#[test]
fn provider_ids_have_unique_indexes() {
    let conn = fresh_schema();
    let indexes = extract_indexes(&conn).unwrap();

    let unique: BTreeSet<(String, String)> = indexes
        .values()
        .filter(|i| i.unique && i.columns.len() == 1)
        .map(|i| (i.table.clone(), i.columns[0].clone()))
        .collect();

    for (table, column) in [
        ("teams", "team_id"),
        ("players", "player_id"),
        ("series", "series_id"),
        ("matches", "match_id"),
        ("teams", "slug"),
        ("players", "slug"),
        ("series", "slug"),
        ("team_categories", "slug"),
        ("series_categories", "slug"),
    ] {
        assert!(
            unique.contains(&(table.to_string(), column.to_string())),
            "missing unique index on {}.{}",
            table,
            column
        );
    }
}

#[test]
fn match_state_is_a_closed_set() {
    let conn = fresh_schema();
    let insert = |state: &str| {
        conn.execute(
            "INSERT INTO matches (match_id, state, created_at, updated_at) VALUES (?1, ?2, 'now', 'now')",
            (format!("m-{}", state), state),
        )
    };
    for ok in ["Live", "Innings Break", "Complete", "Upcoming"] {
        insert(ok).unwrap();
    }
    assert!(insert("Preview").is_err());
    assert!(insert("Stumps").is_err());
}

#[test]
fn schema_is_reapplicable() {
    let conn = fresh_schema();
    conn.execute_batch(SCHEMA_SQL).unwrap();
}

#[tokio::test]
async fn initialize_seeds_categories_and_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crease.db");
    let ctx = DbContext::new(&path);
    ctx.initialize(DEFAULT_BASE_URL).await.unwrap();
    ctx.initialize(DEFAULT_BASE_URL).await.unwrap();

    let conn = Connection::open(&path).unwrap();
    let count = |table: &str| -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    };
    assert_eq!(count("team_categories"), 4);
    assert_eq!(count("series_categories"), 5);
    assert_eq!(count("scrape_settings"), 1);
    assert_eq!(count("profile_scrape_settings"), 4);
    assert_eq!(count("series_scrape_settings"), 5);
    assert_eq!(count("match_scrape_settings"), 1);
    assert_eq!(count("live_score_scrape_settings"), 1);

    let enabled: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM profile_scrape_settings WHERE auto_scrape_enabled",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(enabled, 0);
}
