//! User accounts: credentials, friendships and ratings
//!
//! Users are identified by their login. Equality and hashing look at the login
//! only, and the login has no setter so a `User` can safely live in hashed
//! collections. Passwords are always stored as bcrypt hashes; bcrypt generates
//! a fresh salt for every hash.

use bcrypt::DEFAULT_COST;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use uuid::Uuid;

use super::movie::{Movie, Rating};
use super::role::{authorities, SecurityRole};

/// Errors that can occur when creating a user or changing credentials
#[derive(Debug, Error)]
pub enum UserError {
    /// The old password given for a password change does not match
    #[error("Existing password invalid")]
    InvalidPassword,

    /// The new password and its confirmation differ
    #[error("New passwords don't match")]
    PasswordMismatch,

    /// bcrypt failed to hash the password
    #[error("Failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// A registered user of the catalogue
///
/// Friendship is stored as the set of friend logins. `add_friend` only records
/// one side; use [`befriend`] to link two users both ways.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Generated identifier
    id: Uuid,
    /// Unique login, the identity key
    login: String,
    /// Display name
    name: String,
    /// bcrypt hash of the password
    password_hash: String,
    /// Free-text profile info
    #[serde(default)]
    info: Option<String>,
    /// Granted roles, persisted as a comma-separated authority list
    #[serde(with = "authorities", default)]
    roles: Vec<SecurityRole>,
    /// Logins of this user's friends
    #[serde(default)]
    friends: HashSet<String>,
    /// Ratings given by this user
    #[serde(default)]
    ratings: Vec<Rating>,
}

impl User {
    /// Creates a user, hashing `password` with bcrypt's default cost
    pub fn new(
        login: impl Into<String>,
        name: impl Into<String>,
        password: &str,
    ) -> Result<Self, UserError> {
        Self::with_cost(login, name, password, DEFAULT_COST)
    }

    /// Creates a user, hashing `password` with the given bcrypt cost
    pub fn with_cost(
        login: impl Into<String>,
        name: impl Into<String>,
        password: &str,
        cost: u32,
    ) -> Result<Self, UserError> {
        Ok(Self {
            id: Uuid::new_v4(),
            login: login.into(),
            name: name.into(),
            password_hash: bcrypt::hash(password, cost)?,
            info: None,
            roles: Vec::new(),
            friends: HashSet::new(),
            ratings: Vec::new(),
        })
    }

    /// Grants the given roles
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = SecurityRole>) -> Self {
        self.roles.extend(roles);
        self
    }

    /// Generated identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Login, the identity key
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Changes the display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Free-text profile info, if set
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Replaces the profile info
    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = Some(info.into());
    }

    /// Stored bcrypt hash
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Granted roles
    pub fn roles(&self) -> &[SecurityRole] {
        &self.roles
    }

    /// Logins of recorded friends
    pub fn friends(&self) -> &HashSet<String> {
        &self.friends
    }

    /// Ratings given by this user
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Checks a plaintext password against the stored hash
    pub fn check_password(&self, candidate: &str) -> bool {
        bcrypt::verify(candidate, &self.password_hash).unwrap_or(false)
    }

    /// Replaces the password after verifying the old one and the confirmation
    ///
    /// The stored hash is left untouched if either check fails.
    ///
    /// # Returns
    /// * `Err(UserError::InvalidPassword)` if `old` is wrong
    /// * `Err(UserError::PasswordMismatch)` if `new` and `confirm` differ
    pub fn update_password(&mut self, old: &str, new: &str, confirm: &str) -> Result<(), UserError> {
        if !self.check_password(old) {
            return Err(UserError::InvalidPassword);
        }
        if new != confirm {
            return Err(UserError::PasswordMismatch);
        }
        self.password_hash = bcrypt::hash(new, self.hash_cost())?;
        info!("password updated for {}", self.login);
        Ok(())
    }

    /// Records `friend` as a friend of this user, without touching `friend`
    pub fn add_friend(&mut self, friend: &User) {
        self.friends.insert(friend.login.clone());
    }

    /// Whether `other` was added as a friend; `None` is never a friend
    pub fn is_friend(&self, other: Option<&User>) -> bool {
        other.is_some_and(|other| self.friends.contains(&other.login))
    }

    /// Rates a movie, registering the rating on both this user and the movie
    ///
    /// `stars` is not range checked.
    pub fn rate(&mut self, movie: &mut Movie, stars: i32, comment: impl Into<String>) -> Rating {
        let rating = Rating::new(self, movie, stars, comment.into());
        self.ratings.push(rating.clone());
        movie.add_rating(rating.clone());
        rating
    }

    // Cost is the third `$`-separated field of a bcrypt hash, e.g. `$2b$12$...`
    fn hash_cost(&self) -> u32 {
        self.password_hash
            .split('$')
            .nth(2)
            .and_then(|cost| cost.parse().ok())
            .unwrap_or(DEFAULT_COST)
    }
}

/// Makes two users friends of each other
pub fn befriend(a: &mut User, b: &mut User) {
    a.add_friend(b);
    b.add_friend(a);
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.login == other.login
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.login.hash(state);
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.login)
    }
}
