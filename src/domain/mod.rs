//! Domain model for the movie catalogue
//!
//! Users rate movies and befriend each other. Persistence of these entities
//! belongs to the graph store; this module only keeps the in-memory invariants.

pub mod movie;
pub mod role;
pub mod user;

pub use movie::{Movie, Rating};
pub use role::{roles_from_string, roles_to_string, SecurityRole, UnknownRole};
pub use user::{befriend, User, UserError};
