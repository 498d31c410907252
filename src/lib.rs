//! Synthetic listener and activity generator for a music database.
//!
//! Listengen populates a relational music-listening store with statistically
//! plausible fixture data: users with sampled personality profiles, listen and
//! rating rows biased by favorite genres and groups, bounded-size song
//! collections, and a directed follow graph built by preferential attachment.
//!
//! Core modules:
//! - [`catalog`] - In-memory catalog index (songs, groups, genre buckets)
//! - [`generator`] - User/activity generation (users, listens, ratings, collections)
//! - [`follow`] - Preferential-attachment follow graph generation
//! - [`db`] - Database schema and insert operations
//!
//! ### Supporting Modules
//!
//! - [`identity`] - Username/name/email sampling and collision handling
//! - [`stats`] - Read-only summary report over the generated tables
//! - [`config`] - Configuration and data directory management
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use listengen::{db, catalog, generator, follow};
//!
//! let mut conn = db::connect(&listengen::config::get_db_path()?)?;
//! db::init_schema(&conn, false)?;
//!
//! // Catalog tables must already be populated by the external loader.
//! let index = catalog::CatalogIndex::build(&conn)?;
//!
//! let opts = generator::GeneratorOptions::new(2000, 42);
//! let summary = generator::run(&mut conn, &index, &opts)?;
//! println!("generated {} users, {} listens", summary.users, summary.listens);
//!
//! let follows = follow::run(&mut conn, &follow::FollowOptions::new(10, 42))?;
//! println!("inserted {} follow edges", follows.edges);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Determinism
//!
//! Both stages thread a single seeded [`rand::rngs::StdRng`] through every
//! draw, in a fixed single-threaded order. Re-running with the same catalog,
//! roster size, and seed reproduces the same users, ratings, collections and
//! follow edges (generation timestamps are wall-clock and therefore excluded
//! from the reproducibility contract).
//!
//! ## Error Handling
//!
//! All public functions return `Result<T, anyhow::Error>`. Configuration
//! errors (empty genre/group buckets, zero roster size) abort the run with a
//! diagnostic naming the offending key; store errors propagate with context.

pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod db;
pub mod follow;
pub mod generator;
pub mod identity;
pub mod stats;
