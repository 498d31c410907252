//! # Listengen - Synthetic Listener Generator
//!
//! Offline batch tool that populates a relational music-listening database
//! with synthetic users, listens, ratings, collections and a follow graph.
//! The catalog (songs, groups, genre tags) is loaded separately and treated
//! as read-only input.
//!
//! ## Usage
//!
//! ```bash
//! # Create the tables
//! listengen init-schema --db userData.db
//!
//! # Generate 2000 users and their activity
//! listengen seed-users --seed 42 --db userData.db
//!
//! # Build the follow graph
//! listengen seed-follows --seed 42 --db userData.db
//!
//! # Inspect the result
//! listengen stats --db userData.db
//! ```

mod catalog;
mod cli;
mod completion;
mod config;
mod db;
mod follow;
mod generator;
mod identity;
mod stats;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::info;
use rand::Rng;

/// Pick the RNG seed for a stage: CLI flag wins, then the config file, then
/// a fresh one from entropy. The chosen seed is always logged so any run can
/// be reproduced after the fact.
fn resolve_seed(cli_seed: Option<u64>, config_seed: Option<u64>) -> u64 {
    let seed = cli_seed
        .or(config_seed)
        .unwrap_or_else(|| rand::thread_rng().gen());
    info!("using RNG seed {seed}");
    seed
}

/// Main entry point.
///
/// Initializes logging, parses command-line arguments, and routes commands
/// to the appropriate module functions. Logging is controlled via
/// `RUST_LOG`, e.g. `RUST_LOG=debug listengen seed-users`.
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let run_config = config::RunConfig::load_default()?;

    match args.command {
        cli::Command::InitSchema { db, force } => {
            let db_path = config::resolve_db_path(db)?;
            info!("initializing schema at {}", db_path.display());
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn, force)?;
            println!("Schema ready at {}", db_path.display());
        }
        cli::Command::SeedUsers { count, seed, db } => {
            let db_path = config::resolve_db_path(db)?;
            let mut conn = db::connect(&db_path)?;
            db::init_schema(&conn, false)?;

            let index = catalog::CatalogIndex::build(&conn)?;
            let seed = resolve_seed(seed, run_config.seed);
            let opts =
                generator::GeneratorOptions::new(count.unwrap_or(run_config.users), seed);

            let summary = generator::run(&mut conn, &index, &opts)?;
            println!(
                "Generated {} users, {} listens, {} ratings, {} collections (seed {seed})",
                summary.users, summary.listens, summary.ratings, summary.collections
            );
        }
        cli::Command::SeedFollows { per_user, seed, db } => {
            let db_path = config::resolve_db_path(db)?;
            let mut conn = db::connect(&db_path)?;

            let seed = resolve_seed(seed, run_config.seed);
            let opts = follow::FollowOptions::new(
                per_user.unwrap_or(run_config.follows_per_user),
                seed,
            );

            let summary = follow::run(&mut conn, &opts)?;
            println!("Inserted {} follow edges (seed {seed})", summary.edges);
        }
        cli::Command::Run { count, per_user, seed, db } => {
            let db_path = config::resolve_db_path(db)?;
            let mut conn = db::connect(&db_path)?;
            db::init_schema(&conn, false)?;

            let index = catalog::CatalogIndex::build(&conn)?;
            let seed = resolve_seed(seed, run_config.seed);

            let user_opts =
                generator::GeneratorOptions::new(count.unwrap_or(run_config.users), seed);
            let users = generator::run(&mut conn, &index, &user_opts)?;

            let follow_opts = follow::FollowOptions::new(
                per_user.unwrap_or(run_config.follows_per_user),
                seed,
            );
            let follows = follow::run(&mut conn, &follow_opts)?;

            println!(
                "Generated {} users, {} listens, {} ratings, {} collections, {} follow edges (seed {seed})",
                users.users, users.listens, users.ratings, users.collections, follows.edges
            );
        }
        cli::Command::Stats { db } => {
            let db_path = config::resolve_db_path(db)?;
            let conn = db::connect(&db_path)?;
            stats::print_report(&conn)?;
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(&shell), &mut cmd);
        }
    }

    Ok(())
}
