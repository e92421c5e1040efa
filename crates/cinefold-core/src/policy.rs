//! Domain policy constants for enrichment. Kept as overridable parameters so
//! boundary values (one vs. many directors, exactly `cast_limit` principals)
//! can be exercised directly.

use serde::{Deserialize, Serialize};

/// Index into the comma-joined director list that names the primary director.
pub const PRIMARY_DIRECTOR_POSITION: usize = 0;

/// Maximum number of billed cast members kept per movie.
pub const DEFAULT_CAST_LIMIT: usize = 5;

/// Principal categories that count as cast.
pub const ACTING_CATEGORIES: [&str; 2] = ["actor", "actress"];

/// Title kind kept from `title.basics`.
pub const MOVIE_KIND: &str = "movie";

/// What to do with a crew row whose director list has no entry at
/// `director_position`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDirector {
    /// Reject the crew row; the movie leaves the pipeline at the crew join.
    #[default]
    Drop,
    /// Keep the crew row with no director; the director name stays null.
    Retain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentPolicy {
    pub director_position: usize,
    pub cast_limit: usize,
    pub cast_categories: Vec<String>,
    pub title_kind: String,
    pub missing_director: MissingDirector,
}

impl Default for EnrichmentPolicy {
    fn default() -> Self {
        Self {
            director_position: PRIMARY_DIRECTOR_POSITION,
            cast_limit: DEFAULT_CAST_LIMIT,
            cast_categories: ACTING_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            title_kind: MOVIE_KIND.to_string(),
            missing_director: MissingDirector::Drop,
        }
    }
}

impl EnrichmentPolicy {
    pub fn is_cast_category(&self, category: &str) -> bool {
        self.cast_categories.iter().any(|c| c == category)
    }
}
