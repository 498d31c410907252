//! User/activity generation: synthetic users with statistically biased
//! listening behavior.
//!
//! For each user the generator samples a personality profile, persists a
//! `user` row, assembles a play list against the catalog index, derives a
//! rating per play, and emits `listen`/`rating` rows plus bounded-size
//! collections. All randomness flows through one seeded RNG in a fixed
//! single-threaded order, so a run is reproducible from its seed.
//!
//! Run-scoped bookkeeping (username registry, collection id sequence) lives
//! in an explicit state struct threaded through the loop; there are no
//! module-level globals.

use crate::catalog::{CatalogIndex, GENRES};
use crate::db;
use crate::identity::{self, UsernameRegistry};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;

/// A collection seals the moment it reaches this many songs.
pub const COLLECTION_CAP: usize = 6;

/// Stored ratings are capped here; the listen count uses the uncapped value.
pub const MAX_RATING: u32 = 5;

/// Every synthetic account gets the same plaintext credential. These are
/// fixture accounts; a shared known password is intentional.
pub const FIXTURE_PASSWORD: &str = "password";

const FAVORITE_GENRE_COUNT: usize = 3;
const FAVORITE_GROUP_COUNT: usize = 10;

/// Parameters of one generation run.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Number of users to generate.
    pub users: u32,
    /// RNG seed; equal seeds reproduce equal runs.
    pub seed: u64,
    /// bcrypt cost for the fixture password hash. Tests lower this; the
    /// hash is computed once per run either way.
    pub bcrypt_cost: u32,
}

impl GeneratorOptions {
    pub fn new(users: u32, seed: u64) -> Self {
        Self { users, seed, bcrypt_cost: bcrypt::DEFAULT_COST }
    }
}

/// Row counts emitted by a finished run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub users: u64,
    pub listens: u64,
    pub ratings: u64,
    pub collections: u64,
}

/// A sampled per-user personality. Created fresh per user, discarded once
/// that user's activity is fully emitted.
#[derive(Debug, Clone)]
pub(crate) struct Profile {
    /// Straight bump to every rating, uniform in {0, 1, 2}.
    pub(crate) happiness: u32,
    /// Plays drawn from favorite-genre buckets.
    pub(crate) genre_driven: usize,
    /// Plays drawn uniformly from the whole catalog.
    pub(crate) random: usize,
    /// 3 favorite genres, drawn with replacement; duplicates allowed.
    pub(crate) favorite_genres: Vec<&'static str>,
    /// 10 favorite groups, drawn with replacement; each contributes exactly
    /// one play of its representative song.
    pub(crate) favorite_groups: Vec<String>,
}

impl Profile {
    fn sample<R: Rng>(rng: &mut R, catalog: &CatalogIndex) -> Self {
        let happiness = rng.gen_range(0..=2);
        // Stinginess: share of activity spent inside favorite genres,
        // uniform in [0.1, 1.0).
        let stinginess = rng.gen::<f64>() * 0.9 + 0.1;
        let activity = rng.gen_range(5..=40u32);
        let (genre_driven, random) = split_activity(activity, stinginess);

        let favorite_genres = (0..FAVORITE_GENRE_COUNT)
            .map(|_| GENRES[rng.gen_range(0..GENRES.len())])
            .collect();
        let groups = catalog.groups();
        let favorite_groups = (0..FAVORITE_GROUP_COUNT)
            .map(|_| groups[rng.gen_range(0..groups.len())].clone())
            .collect();

        Self { happiness, genre_driven, random, favorite_genres, favorite_groups }
    }
}

/// Split total activity into genre-driven and uniform-random plays.
pub(crate) fn split_activity(activity: u32, stinginess: f64) -> (usize, usize) {
    let genre_driven = (f64::from(activity) * stinginess) as usize;
    (genre_driven, activity as usize - genre_driven)
}

/// The in-progress collection of one user. Never carries across users.
struct CollectionState {
    name: String,
    songs: Vec<String>,
}

impl CollectionState {
    fn fresh<R: Rng>(rng: &mut R) -> Self {
        Self { name: identity::sample_collection_name(rng), songs: Vec::new() }
    }
}

/// Bookkeeping that spans the whole run.
struct RunState {
    registry: UsernameRegistry,
    /// Monotonic sequence behind `#N` collection ids. Owned here, never
    /// derived from a database MAX(id).
    collection_seq: u64,
    summary: RunSummary,
}

/// Derive the uncapped rating of one play.
///
/// `coin` is the per-play uniform {0, 1} draw. Group membership in the
/// favorites adds 1, a favorite genre tag on the song itself adds 2, so the
/// uncapped range is 1..=8. Storage caps at [`MAX_RATING`]; listen emission
/// does not.
#[must_use]
pub fn uncapped_rating(coin: u32, happiness: u32, has_fav_group: bool, has_fav_genre: bool) -> u32 {
    1 + coin + happiness + u32::from(has_fav_group) + if has_fav_genre { 2 } else { 0 }
}

/// Does any of the song's own genre tags intersect the favorites?
///
/// Scoped deliberately to the current song's tags, not the whole catalog's
/// tag table.
pub(crate) fn song_has_favorite_genre(
    catalog: &CatalogIndex,
    song_id: &str,
    favorites: &[&str],
) -> bool {
    catalog
        .genres_of(song_id)
        .iter()
        .any(|tag| favorites.contains(&tag.as_str()))
}

/// Generate the full synthetic roster and its listening activity.
///
/// Clears all previously generated rows first, so re-running rebuilds from
/// scratch. Each user commits in its own transaction; any persistence
/// failure aborts the run with the offending key in the error chain.
pub fn run(
    conn: &mut Connection,
    catalog: &CatalogIndex,
    opts: &GeneratorOptions,
) -> Result<RunSummary> {
    if opts.users == 0 {
        bail!("roster size must be positive (got 0)");
    }
    if catalog.groups().is_empty() {
        bail!("catalog has no groups; cannot sample favorite groups");
    }

    db::clear_generated(conn)?;

    // One hash serves every fixture account.
    let password_hash = bcrypt::hash(FIXTURE_PASSWORD, opts.bcrypt_cost)
        .context("failed to hash the fixture password")?;

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut state = RunState {
        registry: UsernameRegistry::new(),
        collection_seq: 0,
        summary: RunSummary::default(),
    };

    info!("generating {} users (seed {})", opts.users, opts.seed);
    for n in 0..opts.users {
        let tx = conn.transaction().context("starting user transaction failed")?;
        generate_user(&tx, &mut rng, catalog, &password_hash, &mut state)
            .with_context(|| format!("user generation aborted at user #{n}"))?;
        tx.commit().context("committing user transaction failed")?;

        if (n + 1) % 100 == 0 {
            info!("generated {}/{} users", n + 1, opts.users);
        }
    }

    info!(
        "user stage done: {} users, {} listens, {} ratings, {} collections",
        state.summary.users, state.summary.listens, state.summary.ratings,
        state.summary.collections
    );
    Ok(state.summary)
}

/// Generate and persist one user plus all of their activity.
fn generate_user<R: Rng>(
    conn: &Connection,
    rng: &mut R,
    catalog: &CatalogIndex,
    password_hash: &str,
    state: &mut RunState,
) -> Result<()> {
    let profile = Profile::sample(rng, catalog);
    let who = identity::sample_identity(rng, &mut state.registry);
    debug!(
        "user '{}': happiness {}, {} genre plays, {} random plays",
        who.username, profile.happiness, profile.genre_driven, profile.random
    );

    db::insert_user(conn, &who, password_hash, Utc::now())?;
    state.summary.users += 1;

    let mut collection = CollectionState::fresh(rng);
    let playlist = assemble_playlist(rng, catalog, &profile)
        .with_context(|| format!("failed to assemble play list for '{}'", who.username))?;

    for song_id in &playlist {
        process_song(conn, rng, catalog, &who.username, &profile, song_id, &mut collection, state)
            .with_context(|| {
                format!("failed to emit activity for ('{}', '{song_id}')", who.username)
            })?;
    }

    // End of the user's session: a partial collection still gets persisted.
    if !collection.songs.is_empty() {
        seal_collection(conn, &who.username, &collection, state)?;
    }

    Ok(())
}

/// Build the candidate play list: genre-driven plays first, then uniform
/// random plays, then exactly one representative song per favorite-group
/// entry. The order is fixed and never shuffled.
fn assemble_playlist<R: Rng>(
    rng: &mut R,
    catalog: &CatalogIndex,
    profile: &Profile,
) -> Result<Vec<String>> {
    let mut playlist =
        Vec::with_capacity(profile.genre_driven + profile.random + profile.favorite_groups.len());

    for _ in 0..profile.genre_driven {
        let genre = profile.favorite_genres[rng.gen_range(0..profile.favorite_genres.len())];
        let bucket = catalog.songs_in_genre(genre)?;
        playlist.push(bucket[rng.gen_range(0..bucket.len())].clone());
    }

    let all = catalog.all_songs();
    for _ in 0..profile.random {
        playlist.push(all[rng.gen_range(0..all.len())].clone());
    }

    for group in &profile.favorite_groups {
        playlist.push(catalog.representative_song(group)?.to_string());
    }

    Ok(playlist)
}

/// Emit all rows for one play-list occurrence: `uncapped` listen rows, one
/// capped rating row, and a probabilistic collection append (sealing the
/// collection when it hits [`COLLECTION_CAP`]). Returns the uncapped rating.
///
/// A song recurring in the play list is fully reprocessed on each
/// occurrence, fresh listens and a fresh rating row included.
#[allow(clippy::too_many_arguments)]
fn process_song<R: Rng>(
    conn: &Connection,
    rng: &mut R,
    catalog: &CatalogIndex,
    username: &str,
    profile: &Profile,
    song_id: &str,
    collection: &mut CollectionState,
    state: &mut RunState,
) -> Result<u32> {
    let has_fav_group = catalog
        .group_of(song_id)
        .map_or(false, |group| profile.favorite_groups.iter().any(|fav| fav.as_str() == group));
    let has_fav_genre = song_has_favorite_genre(catalog, song_id, &profile.favorite_genres);

    let uncapped = uncapped_rating(rng.gen_range(0..=1), profile.happiness, has_fav_group, has_fav_genre);
    for _ in 0..uncapped {
        db::insert_listen(conn, username, song_id, Utc::now())?;
    }
    state.summary.listens += u64::from(uncapped);

    let capped = uncapped.min(MAX_RATING);
    db::insert_rating(conn, username, song_id, capped)?;
    state.summary.ratings += 1;

    // Better-rated songs are proportionally more likely to be kept.
    if rng.gen::<f64>() < f64::from(capped) / f64::from(MAX_RATING) {
        collection.songs.push(song_id.to_string());
        if collection.songs.len() >= COLLECTION_CAP {
            seal_collection(conn, username, collection, state)?;
            *collection = CollectionState::fresh(rng);
        }
    }

    Ok(uncapped)
}

/// Persist the collection row and its membership under a fresh `#N` id.
fn seal_collection(
    conn: &Connection,
    owner: &str,
    collection: &CollectionState,
    state: &mut RunState,
) -> Result<()> {
    let id = format!("#{}", state.collection_seq);
    state.collection_seq += 1;

    db::insert_collection(conn, &id, owner, &collection.name, Utc::now())?;
    for song_id in &collection.songs {
        db::insert_collection_member(conn, &id, song_id)?;
    }
    state.summary.collections += 1;
    trace!("sealed collection {id} ({} songs) for '{owner}'", collection.songs.len());
    Ok(())
}
