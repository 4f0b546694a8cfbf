//! Movies and the ratings users attach to them

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;

/// A user's rating of a movie
///
/// Ratings are only created through `User::rate`, which registers the same
/// rating on both the user and the movie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rating {
    /// Generated identifier
    pub id: Uuid,
    /// Login of the rating user
    pub user: String,
    /// Id of the rated movie
    pub movie: String,
    /// Star count, not range checked
    pub stars: i32,
    /// Free-text comment
    pub comment: String,
}

impl Rating {
    pub(crate) fn new(user: &User, movie: &Movie, stars: i32, comment: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: user.login().to_string(),
            movie: movie.id().to_string(),
            stars,
            comment,
        }
    }
}

/// A movie in the catalogue together with the ratings it received
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    id: String,
    title: String,
    #[serde(default)]
    ratings: Vec<Rating>,
}

impl Movie {
    /// Creates an unrated movie
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ratings: Vec::new(),
        }
    }

    /// Upstream movie id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Movie title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Ratings received so far
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub(crate) fn add_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);
    }

    /// Mean star count across all ratings, `None` while unrated
    pub fn average_stars(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let total: i64 = self.ratings.iter().map(|r| i64::from(r.stars)).sum();
        Some(total as f64 / self.ratings.len() as f64)
    }
}
