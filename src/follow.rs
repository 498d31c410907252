//! Follow graph generation by preferential attachment.
//!
//! Every user starts with weight 1 (the self-seed, so everyone is initially
//! followable). Each accepted follow bumps the followed user's weight, so
//! already-popular users are proportionally more likely to gain the next
//! follower. Selection is a roulette-wheel walk over the weight table in
//! fixed roster order; a linear scan is fine at thousands of users.
//!
//! Collisions (self-pick, or a candidate already followed in this attempt
//! sequence) resolve by probing forward with wraparound until an eligible
//! candidate is found, bounded by the table length. That makes self-follows
//! and duplicate pairs impossible; when no candidate at all is eligible
//! (tiny rosters), the attempt is skipped.

use crate::db;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use std::collections::HashSet;

/// Parameters of one follow-graph build.
#[derive(Debug, Clone, Copy)]
pub struct FollowOptions {
    /// Follow attempts per user.
    pub per_user: u32,
    /// RNG seed; equal seeds over equal rosters reproduce equal graphs.
    pub seed: u64,
}

impl FollowOptions {
    pub fn new(per_user: u32, seed: u64) -> Self {
        Self { per_user, seed }
    }
}

/// Outcome of a finished follow stage.
#[derive(Debug, Clone)]
pub struct FollowSummary {
    /// Persisted follow edges.
    pub edges: u64,
    /// Attempts that found no eligible candidate (only happens on rosters
    /// smaller than the attempt count).
    pub skipped_attempts: u64,
    /// Final (username, weight) table. For every user,
    /// weight == follower count + 1.
    pub final_weights: Vec<(String, u64)>,
}

/// Rebuild the directed follow graph over the current roster.
///
/// Clears all existing follow edges first; re-running is always safe.
pub fn run(conn: &mut Connection, opts: &FollowOptions) -> Result<FollowSummary> {
    let roster = db::load_roster(conn)?;
    if roster.is_empty() {
        bail!("user roster is empty; run user generation before the follow stage");
    }

    db::clear_follows(conn)?;

    let mut weights: Vec<u64> = vec![1; roster.len()];
    let mut total_weight: u64 = roster.len() as u64;
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut edges: u64 = 0;
    let mut skipped_attempts: u64 = 0;

    info!(
        "building follow graph: {} users, {} attempts each (seed {})",
        roster.len(),
        opts.per_user,
        opts.seed
    );

    for (self_idx, follower) in roster.iter().enumerate() {
        let tx = conn.transaction().context("starting follow transaction failed")?;
        let mut followed: HashSet<usize> = HashSet::new();

        for _ in 0..opts.per_user {
            let draw = rng.gen_range(0..total_weight);
            let picked = pick_weighted(&weights, draw);
            let Some(idx) = resolve_candidate(picked, self_idx, &followed, weights.len()) else {
                skipped_attempts += 1;
                continue;
            };

            db::insert_follow(&tx, follower, &roster[idx])
                .with_context(|| format!("follow stage aborted at follower '{follower}'"))?;
            followed.insert(idx);
            weights[idx] += 1;
            total_weight += 1;
            edges += 1;
        }

        tx.commit().context("committing follow transaction failed")?;
        debug!("'{follower}' now follows {} users", followed.len());
    }

    info!("follow stage done: {edges} edges ({skipped_attempts} attempts skipped)");
    Ok(FollowSummary {
        edges,
        skipped_attempts,
        final_weights: roster.into_iter().zip(weights).collect(),
    })
}

/// Roulette-wheel selection: the first index whose cumulative weight
/// exceeds `draw`. `draw` must be below the total weight.
#[must_use]
pub fn pick_weighted(weights: &[u64], draw: u64) -> usize {
    let mut cumulative = 0;
    for (idx, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if draw < cumulative {
            return idx;
        }
    }
    weights.len() - 1
}

/// Probe forward (wrapping) from `picked` to the first candidate that is
/// neither the follower itself nor already followed in this attempt
/// sequence. `None` when the whole table is ineligible.
fn resolve_candidate(
    picked: usize,
    self_idx: usize,
    followed: &HashSet<usize>,
    len: usize,
) -> Option<usize> {
    let mut idx = picked;
    for _ in 0..len {
        if idx != self_idx && !followed.contains(&idx) {
            return Some(idx);
        }
        idx = (idx + 1) % len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use chrono::Utc;

    fn roster_conn(names: &[&str]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn, false).unwrap();
        for name in names {
            let identity = Identity {
                username: (*name).to_string(),
                first_name: "Toby".to_string(),
                last_name: "Fox".to_string(),
                email: format!("{name}@mail.com"),
                display_name: (*name).to_string(),
            };
            db::insert_user(&conn, &identity, "hash", Utc::now()).unwrap();
        }
        conn
    }

    #[test]
    fn weighted_pick_walks_cumulative_weights() {
        assert_eq!(pick_weighted(&[1, 1, 1], 0), 0);
        assert_eq!(pick_weighted(&[1, 1, 1], 1), 1);
        assert_eq!(pick_weighted(&[1, 1, 1], 2), 2);
        assert_eq!(pick_weighted(&[3, 1], 2), 0);
        assert_eq!(pick_weighted(&[3, 1], 3), 1);
    }

    #[test]
    fn candidate_resolution_skips_self_and_duplicates() {
        let followed: HashSet<usize> = [1usize].into_iter().collect();
        assert_eq!(resolve_candidate(0, 0, &followed, 4), Some(2));
        // Wraps past the end of the table.
        assert_eq!(resolve_candidate(3, 3, &HashSet::new(), 4), Some(0));
        // Everything ineligible.
        let all: HashSet<usize> = [1usize].into_iter().collect();
        assert_eq!(resolve_candidate(0, 0, &all, 2), None);
    }

    #[test]
    fn no_self_follows_and_no_duplicate_pairs() {
        let mut conn = roster_conn(&["a", "b", "c", "d", "e"]);
        run(&mut conn, &FollowOptions::new(10, 17)).unwrap();

        let selfs: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM user_follow WHERE follower_username = followed_username",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(selfs, 0);

        let pairs: u64 = db::count_rows(&conn, "user_follow").unwrap();
        let distinct: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM (SELECT DISTINCT follower_username, followed_username FROM user_follow)",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(pairs, distinct);
    }

    #[test]
    fn small_roster_saturates_and_skips_the_rest() {
        // 5 users, 10 attempts each: everyone can follow at most the 4
        // others, the remaining 6 attempts per user are skipped.
        let mut conn = roster_conn(&["a", "b", "c", "d", "e"]);
        let summary = run(&mut conn, &FollowOptions::new(10, 17)).unwrap();
        assert_eq!(summary.edges, 20);
        assert_eq!(summary.skipped_attempts, 30);
    }

    #[test]
    fn singleton_roster_produces_no_edges() {
        let mut conn = roster_conn(&["loner"]);
        let summary = run(&mut conn, &FollowOptions::new(10, 1)).unwrap();
        assert_eq!(summary.edges, 0);
        assert_eq!(summary.skipped_attempts, 10);
    }

    #[test]
    fn final_weight_is_follower_count_plus_one() {
        let mut conn = roster_conn(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let summary = run(&mut conn, &FollowOptions::new(3, 99)).unwrap();

        for (username, weight) in &summary.final_weights {
            let followers: u64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM user_follow WHERE followed_username = ?1",
                    [username],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(*weight, followers + 1, "weight drifted for '{username}'");
        }
    }

    #[test]
    fn empty_roster_is_a_configuration_error() {
        let mut conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn, false).unwrap();
        assert!(run(&mut conn, &FollowOptions::new(10, 1)).is_err());
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut conn = roster_conn(&["a", "b", "c", "d", "e", "f"]);
        let first = run(&mut conn, &FollowOptions::new(4, 7)).unwrap();
        let second = run(&mut conn, &FollowOptions::new(4, 7)).unwrap();
        assert_eq!(first.edges, second.edges);
        assert_eq!(db::count_rows(&conn, "user_follow").unwrap(), second.edges);
    }
}
