//! cineasts - inspect and fill the local movie/person JSON cache
//!
//! Reads and writes `movie_<id>.json` / `person_<id>.json` records in the
//! storage directory shared with the movie importer.

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::process;

use clap::Parser;
use log::info;
use serde_json::Value;

use cineasts::cache::LocalStore;
use cineasts::cli::{Action, Cli, StartupConfig};

/// Runs a single action against the opened store, printing results to stdout
fn run(store: &LocalStore, action: &Action) -> Result<(), Box<dyn Error>> {
    match action {
        Action::Has(kind, id) => {
            println!("{}", store.has(*kind, id));
        }
        Action::Load(kind, id) => {
            let document = store.load(*kind, id)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Action::Store(kind, id, file) => {
            let raw = match file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut raw = String::new();
                    io::stdin().read_to_string(&mut raw)?;
                    raw
                }
            };
            let document: Value = serde_json::from_str(&raw)?;
            store.store(*kind, id, &document)?;
            info!("stored {} {}", kind, id);
        }
        Action::Path(kind, id) => {
            println!("{}", store.path_for(*kind, id).display());
        }
    }
    Ok(())
}

/// Prints an error and its chain of causes to stderr
fn report(err: &dyn Error) {
    eprintln!("Error: {}", err);
    let mut cause = err.source();
    while let Some(inner) = cause {
        eprintln!("  caused by: {}", inner);
        cause = inner.source();
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            report(&err);
            process::exit(2);
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();

    let result = LocalStore::open(&config.storage_dir)
        .map_err(Box::<dyn Error>::from)
        .and_then(|store| run(&store, &config.action));

    if let Err(err) = result {
        report(err.as_ref());
        process::exit(1);
    }
}
