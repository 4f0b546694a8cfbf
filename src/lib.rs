//! Cineasts movie catalogue library
//!
//! Exposes the domain model, the local JSON cache and the CLI parsing used by
//! the `cineasts` binary and its integration tests.

pub mod cache;
pub mod cli;
pub mod domain;
