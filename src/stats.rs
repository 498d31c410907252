//! Read-only summary report over the generated tables.
//!
//! Prints row counts, rating and collection aggregates, the most-followed
//! users, and the per-genre listen share next to the catalog's own genre
//! share. Useful as a sanity check that the designed biases actually show
//! up in the data.

use crate::catalog::GENRES;
use crate::db;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::collections::HashMap;
use std::io::Write;

const GENERATED_TABLES: [&str; 6] = [
    "user",
    "listen",
    "rating",
    "collection",
    "song_within_collection",
    "user_follow",
];

/// Print the report to stdout.
pub fn print_report(conn: &Connection) -> Result<()> {
    report(conn, &mut std::io::stdout())
}

/// Write the report to any sink. Split out so tests can capture it.
pub fn report<W: Write>(conn: &Connection, out: &mut W) -> Result<()> {
    writeln!(out, "== row counts ==")?;
    for table in GENERATED_TABLES {
        writeln!(out, "{table:>24}  {}", db::count_rows(conn, table)?)?;
    }

    let avg_rating: Option<f64> = conn
        .query_row("SELECT AVG(rating) FROM rating", [], |r| r.get(0))
        .context("failed to aggregate ratings")?;
    let avg_collection: Option<f64> = conn
        .query_row(
            "SELECT AVG(n) FROM (SELECT COUNT(*) AS n FROM song_within_collection GROUP BY collection_id)",
            [],
            |r| r.get(0),
        )
        .context("failed to aggregate collection sizes")?;

    writeln!(out, "\n== aggregates ==")?;
    writeln!(out, "average rating           {}", fmt_avg(avg_rating))?;
    writeln!(out, "average collection size  {}", fmt_avg(avg_collection))?;

    writeln!(out, "\n== most followed ==")?;
    let mut stmt = conn
        .prepare(
            "SELECT followed_username, COUNT(*) AS c FROM user_follow
             GROUP BY followed_username ORDER BY c DESC, followed_username LIMIT 5",
        )
        .context("invalid SQL when ranking followed users")?;
    let rows = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, u64>(1)?)))
        .context("cannot query follower ranking")?;
    for row in rows {
        let (username, followers) = row.context("queried ranking row unwrap failed")?;
        writeln!(out, "{username:>24}  {followers}")?;
    }

    let catalog_tags = genre_counts(conn, "SELECT genre, COUNT(*) FROM song_genre GROUP BY genre")?;
    let listen_tags = genre_counts(
        conn,
        "SELECT sg.genre, COUNT(*) FROM listen l
         JOIN song_genre sg ON sg.song_id = l.song_id GROUP BY sg.genre",
    )?;
    let catalog_total: u64 = catalog_tags.values().sum();
    let listen_total: u64 = listen_tags.values().sum();

    writeln!(out, "\n== genre share (catalog vs listens) ==")?;
    for genre in GENRES {
        let catalog_share = share(catalog_tags.get(genre).copied(), catalog_total);
        let listen_share = share(listen_tags.get(genre).copied(), listen_total);
        writeln!(out, "{genre:>16}  {catalog_share:>7}  {listen_share:>7}")?;
    }

    Ok(())
}

fn genre_counts(conn: &Connection, sql: &str) -> Result<HashMap<String, u64>> {
    let mut stmt = conn.prepare(sql).context("invalid SQL in genre aggregation")?;
    let rows = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, u64>(1)?)))
        .context("cannot query genre aggregation")?;

    let mut counts = HashMap::new();
    for row in rows {
        let (genre, count) = row.context("queried genre count unwrap failed")?;
        counts.insert(genre, count);
    }
    Ok(counts)
}

fn fmt_avg(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn share(count: Option<u64>, total: u64) -> String {
    if total == 0 {
        return "n/a".to_string();
    }
    format!("{:.1}%", count.unwrap_or(0) as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn report_renders_counts_and_shares() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn, false).unwrap();
        conn.execute_batch(
            "INSERT INTO song (song_id, group_id) VALUES ('s1', 'g1'), ('s2', 'g1');
             INSERT INTO song_genre (song_id, genre) VALUES ('s1', 'rock'), ('s2', 'pop');",
        )
        .unwrap();
        for _ in 0..3 {
            db::insert_listen(&conn, "sansKing", "s1", Utc::now()).unwrap();
        }
        db::insert_listen(&conn, "sansKing", "s2", Utc::now()).unwrap();
        db::insert_rating(&conn, "sansKing", "s1", 5).unwrap();
        db::insert_rating(&conn, "sansKing", "s2", 3).unwrap();
        db::insert_follow(&conn, "a", "sansKing").unwrap();

        let mut buf = Vec::new();
        report(&conn, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("average rating           4.00"));
        // 3 of 4 listens are rock.
        assert!(text.contains("rock"));
        assert!(text.contains("75.0%"));
        assert!(text.contains("sansKing  1"));
    }

    #[test]
    fn report_handles_an_empty_database() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn, false).unwrap();
        let mut buf = Vec::new();
        report(&conn, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("average rating           n/a"));
    }
}
