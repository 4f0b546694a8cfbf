//! Command-line interface parsing for the cineasts cache tool
//!
//! This module handles parsing of CLI arguments using clap and resolves them
//! into a `StartupConfig`: the storage directory, the log level and the action
//! to run against the local store.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use thiserror::Error;

use crate::cache::{Kind, LocalStore, UnknownKind};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified record kind is not recognized
    #[error("Invalid kind: '{0}'. Valid kinds: movie, person")]
    InvalidKind(String),

    /// No `--storage-dir` was given and no default cache directory exists
    #[error("No storage directory available; pass --storage-dir or set CINEASTS_STORAGE_DIR")]
    NoStorageDir,
}

/// cineasts - inspect and fill the local movie/person JSON cache
#[derive(Parser, Debug)]
#[command(name = "cineasts")]
#[command(about = "Local JSON cache for movie and person records")]
#[command(version)]
pub struct Cli {
    /// Directory holding the cached records (defaults to the XDG cache dir)
    #[arg(long, env = "CINEASTS_STORAGE_DIR", value_name = "DIR", global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands; `kind` is "movie" or "person"
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print whether a record is cached
    Has { kind: String, id: String },
    /// Print a cached record as JSON
    Load { kind: String, id: String },
    /// Store a JSON document read from FILE, or stdin when omitted
    Store {
        kind: String,
        id: String,
        file: Option<PathBuf>,
    },
    /// Print the backing file path of a record
    Path { kind: String, id: String },
}

/// Validated action to run against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Has(Kind, String),
    Load(Kind, String),
    Store(Kind, String, Option<PathBuf>),
    Path(Kind, String),
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Root directory of the local store
    pub storage_dir: PathBuf,
    /// Default log level; `RUST_LOG` overrides it
    pub log_level: LevelFilter,
    /// What to do once the store is open
    pub action: Action,
}

/// Parses a record kind argument.
///
/// # Returns
/// * `Ok(Kind)` if the string names a kind
/// * `Err(CliError::InvalidKind)` otherwise
pub fn parse_kind_arg(s: &str) -> Result<Kind, CliError> {
    s.parse::<Kind>().map_err(|UnknownKind(name)| CliError::InvalidKind(name))
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Err(CliError::InvalidKind)` if a kind argument is not recognized
    /// * `Err(CliError::NoStorageDir)` if no storage directory can be resolved
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let action = match &cli.command {
            Command::Has { kind, id } => Action::Has(parse_kind_arg(kind)?, id.clone()),
            Command::Load { kind, id } => Action::Load(parse_kind_arg(kind)?, id.clone()),
            Command::Store { kind, id, file } => {
                Action::Store(parse_kind_arg(kind)?, id.clone(), file.clone())
            }
            Command::Path { kind, id } => Action::Path(parse_kind_arg(kind)?, id.clone()),
        };

        let storage_dir = cli
            .storage_dir
            .clone()
            .or_else(LocalStore::default_dir)
            .ok_or(CliError::NoStorageDir)?;

        Ok(StartupConfig {
            storage_dir,
            log_level: level_for(cli.verbose),
            action,
        })
    }
}
