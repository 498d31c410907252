//! Database operations: connection, schema bootstrap, and the insert/clear
//! statements used by the two generator stages.
//!
//! All writes go through prepared (cached) statements; the generator wraps
//! each user (and each follower) in a transaction, so helpers here take a
//! plain [`Connection`] and work equally inside or outside one.

use crate::identity::Identity;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::Connection;
use std::path::Path;

/// Connect to the store at `path`. Creates the file if it doesn't exist.
pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("rusqlite connection refused. DB location: {}", path.display()))?;
    Ok(conn)
}

/// Create every table the generator touches, if missing.
///
/// The catalog tables (`song`, `song_genre`) are owned by the external
/// catalog loader; they are created here too so that a fresh database can
/// hold fixtures, but the generator itself never writes to them. With
/// `force`, existing generated-side tables are dropped first.
pub fn init_schema(conn: &Connection, force: bool) -> Result<()> {
    if force {
        conn.execute_batch(
            "DROP TABLE IF EXISTS user;
             DROP TABLE IF EXISTS listen;
             DROP TABLE IF EXISTS rating;
             DROP TABLE IF EXISTS collection;
             DROP TABLE IF EXISTS song_within_collection;
             DROP TABLE IF EXISTS user_follow;",
        )
        .context("failed to DROP generated tables for forced re-init")?;
    }

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS song (
            song_id      TEXT PRIMARY KEY,
            group_id     TEXT,
            title        TEXT,
            release_date TEXT
        );
        CREATE TABLE IF NOT EXISTS song_genre (
            song_id TEXT NOT NULL,
            genre   TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS user (
            username      TEXT PRIMARY KEY,
            password      TEXT NOT NULL,
            first_name    TEXT NOT NULL,
            last_name     TEXT NOT NULL,
            email         TEXT NOT NULL,
            display_name  TEXT NOT NULL,
            creation_date TIMESTAMP NOT NULL,
            last_accessed TIMESTAMP NOT NULL
        );
        CREATE TABLE IF NOT EXISTS listen (
            listener_username TEXT NOT NULL,
            song_id           TEXT NOT NULL,
            date_of_view      TIMESTAMP NOT NULL
        );
        CREATE TABLE IF NOT EXISTS rating (
            rater_username TEXT NOT NULL,
            song_id        TEXT NOT NULL,
            rating         INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS collection (
            collection_id  TEXT PRIMARY KEY,
            owner_username TEXT NOT NULL,
            name           TEXT NOT NULL,
            creation_date  TIMESTAMP NOT NULL
        );
        CREATE TABLE IF NOT EXISTS song_within_collection (
            collection_id TEXT NOT NULL,
            song_id       TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS user_follow (
            follower_username TEXT NOT NULL,
            followed_username TEXT NOT NULL,
            UNIQUE(follower_username, followed_username)
        );",
    )
    .context("invalid SQL while CREATEing generator tables")?;

    Ok(())
}

/// Delete every generated row, leaving the catalog untouched.
///
/// Run at the start of the user stage so a re-run rebuilds from scratch.
pub fn clear_generated(conn: &Connection) -> Result<()> {
    info!("clearing previously generated rows");
    conn.execute_batch(
        "DELETE FROM user;
         DELETE FROM user_follow;
         DELETE FROM listen;
         DELETE FROM rating;
         DELETE FROM collection;
         DELETE FROM song_within_collection;",
    )
    .context("failed to DELETE previously generated rows")?;
    Ok(())
}

/// Delete all follow edges. The follow stage is an idempotent rebuild.
pub fn clear_follows(conn: &Connection) -> Result<()> {
    info!("clearing previous follow edges");
    conn.execute("DELETE FROM user_follow", [])
        .context("failed to DELETE previous follow edges")?;
    Ok(())
}

pub fn insert_user(
    conn: &Connection,
    identity: &Identity,
    password_hash: &str,
    created: DateTime<Utc>,
) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO user (username, password, first_name, last_name, email, display_name, creation_date, last_accessed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    stmt.execute((
        &identity.username,
        password_hash,
        &identity.first_name,
        &identity.last_name,
        &identity.email,
        &identity.display_name,
        created,
        created,
    ))
    .with_context(|| format!("failed to INSERT user '{}'", identity.username))?;
    Ok(())
}

pub fn insert_listen(
    conn: &Connection,
    username: &str,
    song_id: &str,
    at: DateTime<Utc>,
) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO listen (listener_username, song_id, date_of_view) VALUES (?1, ?2, ?3)",
    )?;
    stmt.execute((username, song_id, at))
        .with_context(|| format!("failed to INSERT listen ({username}, {song_id})"))?;
    Ok(())
}

pub fn insert_rating(conn: &Connection, username: &str, song_id: &str, rating: u32) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO rating (rater_username, song_id, rating) VALUES (?1, ?2, ?3)",
    )?;
    stmt.execute((username, song_id, rating))
        .with_context(|| format!("failed to INSERT rating ({username}, {song_id})"))?;
    Ok(())
}

pub fn insert_collection(
    conn: &Connection,
    collection_id: &str,
    owner: &str,
    name: &str,
    at: DateTime<Utc>,
) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO collection (collection_id, owner_username, name, creation_date)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    stmt.execute((collection_id, owner, name, at))
        .with_context(|| format!("failed to INSERT collection '{collection_id}' for '{owner}'"))?;
    Ok(())
}

pub fn insert_collection_member(
    conn: &Connection,
    collection_id: &str,
    song_id: &str,
) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO song_within_collection (collection_id, song_id) VALUES (?1, ?2)",
    )?;
    stmt.execute((collection_id, song_id))
        .with_context(|| format!("failed to INSERT member ({collection_id}, {song_id})"))?;
    Ok(())
}

pub fn insert_follow(conn: &Connection, follower: &str, followed: &str) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO user_follow (follower_username, followed_username) VALUES (?1, ?2)",
    )?;
    stmt.execute((follower, followed))
        .with_context(|| format!("failed to INSERT follow ({follower} -> {followed})"))?;
    Ok(())
}

/// Load the full username roster in insertion order.
pub fn load_roster(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT username FROM user ORDER BY rowid")
        .context("invalid SQL when SELECTing the user roster")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("cannot query user roster")?;

    let mut roster = Vec::new();
    for row in rows {
        roster.push(row.context("queried username unwrap failed")?);
    }
    Ok(roster)
}

/// Row count of an arbitrary table. Table names come from a fixed internal
/// list, never from user input.
pub fn count_rows(conn: &Connection, table: &str) -> Result<u64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .with_context(|| format!("failed to COUNT rows of {table}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_identity(username: &str) -> Identity {
        Identity {
            username: username.to_string(),
            first_name: "Toby".to_string(),
            last_name: "Fox".to_string(),
            email: format!("{username}@mail.com"),
            display_name: username.to_string(),
        }
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, false).unwrap();
        init_schema(&conn, false).unwrap();
        assert_eq!(count_rows(&conn, "user").unwrap(), 0);
    }

    #[test]
    fn forced_init_drops_generated_rows() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, false).unwrap();
        insert_user(&conn, &test_identity("sansKing"), "hash", Utc::now()).unwrap();
        init_schema(&conn, true).unwrap();
        assert_eq!(count_rows(&conn, "user").unwrap(), 0);
    }

    #[test]
    fn duplicate_username_is_rejected_by_the_store() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, false).unwrap();
        insert_user(&conn, &test_identity("sansKing"), "hash", Utc::now()).unwrap();
        let err = insert_user(&conn, &test_identity("sansKing"), "hash", Utc::now()).unwrap_err();
        assert!(err.to_string().contains("sansKing"));
    }

    #[test]
    fn duplicate_follow_pair_is_rejected_by_the_store() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, false).unwrap();
        insert_follow(&conn, "a", "b").unwrap();
        assert!(insert_follow(&conn, "a", "b").is_err());
        // Reverse direction is a different edge.
        insert_follow(&conn, "b", "a").unwrap();
    }

    #[test]
    fn clear_generated_leaves_catalog_alone() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, false).unwrap();
        conn.execute("INSERT INTO song (song_id, group_id) VALUES ('s1', 'g1')", [])
            .unwrap();
        insert_user(&conn, &test_identity("sansKing"), "hash", Utc::now()).unwrap();
        insert_listen(&conn, "sansKing", "s1", Utc::now()).unwrap();
        clear_generated(&conn).unwrap();
        assert_eq!(count_rows(&conn, "user").unwrap(), 0);
        assert_eq!(count_rows(&conn, "listen").unwrap(), 0);
        assert_eq!(count_rows(&conn, "song").unwrap(), 1);
    }

    #[test]
    fn roster_preserves_insertion_order() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, false).unwrap();
        for name in ["zed", "alpha", "mid"] {
            insert_user(&conn, &test_identity(name), "hash", Utc::now()).unwrap();
        }
        assert_eq!(load_roster(&conn).unwrap(), vec!["zed", "alpha", "mid"]);
    }
}
