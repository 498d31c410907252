//! Command-line interface definitions, parsed with clap derive macros.
//!
//! ## Commands
//!
//! - `init-schema`: create the database tables
//! - `seed-users`: generate the synthetic roster and its listening activity
//! - `seed-follows`: build the follow graph over the finished roster
//! - `run`: both stages back to back
//! - `stats`: print a summary report of the generated data
//! - `completion`: generate shell completion scripts
//!
//! ## Examples
//!
//! ```bash
//! listengen init-schema --db userData.db
//! listengen seed-users --count 2000 --seed 42 --db userData.db
//! listengen seed-follows --seed 42 --db userData.db
//! listengen stats --db userData.db
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// All functionality is accessed through subcommands; the defaults for
/// omitted flags come from the optional `config.json` in the data directory.
#[derive(Parser)]
#[command(name = "listengen")]
#[command(about = "Listengen: synthetic listener, rating and follow-graph generator")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Create the database tables if missing
    ///
    /// Creates the generated-side tables (user, listen, rating, collection,
    /// song_within_collection, user_follow) and empty catalog tables. The
    /// catalog itself is loaded by an external tool.
    InitSchema {
        /// Path to the database file (default: platform data directory)
        #[arg(long, env = "LISTENGEN_DB")]
        db: Option<PathBuf>,

        /// Drop and recreate the generated-side tables
        #[arg(long)]
        force: bool,
    },

    /// Generate synthetic users, listens, ratings and collections
    ///
    /// Clears all previously generated rows first; the catalog must already
    /// be loaded. Re-running with the same seed and catalog reproduces the
    /// same data.
    SeedUsers {
        /// Number of users to generate (default from config, 2000)
        #[arg(long)]
        count: Option<u32>,

        /// RNG seed; omitted means a fresh seed, logged for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Path to the database file (default: platform data directory)
        #[arg(long, env = "LISTENGEN_DB")]
        db: Option<PathBuf>,
    },

    /// Build the preferential-attachment follow graph
    ///
    /// Requires a finished user roster. Clears existing follow edges first;
    /// re-running is always safe.
    SeedFollows {
        /// Follow attempts per user (default from config, 10)
        #[arg(long)]
        per_user: Option<u32>,

        /// RNG seed; omitted means a fresh seed, logged for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Path to the database file (default: platform data directory)
        #[arg(long, env = "LISTENGEN_DB")]
        db: Option<PathBuf>,
    },

    /// Run both stages: seed-users followed by seed-follows
    Run {
        /// Number of users to generate (default from config, 2000)
        #[arg(long)]
        count: Option<u32>,

        /// Follow attempts per user (default from config, 10)
        #[arg(long)]
        per_user: Option<u32>,

        /// RNG seed shared by both stages
        #[arg(long)]
        seed: Option<u64>,

        /// Path to the database file (default: platform data directory)
        #[arg(long, env = "LISTENGEN_DB")]
        db: Option<PathBuf>,
    },

    /// Print a summary report of the generated data
    Stats {
        /// Path to the database file (default: platform data directory)
        #[arg(long, env = "LISTENGEN_DB")]
        db: Option<PathBuf>,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn seed_users_parses_flags() {
        let args = Args::parse_from([
            "listengen",
            "seed-users",
            "--count",
            "50",
            "--seed",
            "42",
            "--db",
            "/tmp/test.db",
        ]);
        match args.command {
            Command::SeedUsers { count, seed, db } => {
                assert_eq!(count, Some(50));
                assert_eq!(seed, Some(42));
                assert_eq!(db, Some(PathBuf::from("/tmp/test.db")));
            }
            _ => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn flags_default_to_none() {
        let args = Args::parse_from(["listengen", "seed-follows"]);
        match args.command {
            Command::SeedFollows { per_user, seed, db } => {
                assert_eq!(per_user, None);
                assert_eq!(seed, None);
                assert_eq!(db, None);
            }
            _ => panic!("parsed the wrong subcommand"),
        }
    }
}
