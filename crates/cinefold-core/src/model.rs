//! Typed entities produced by the table normalizer and the final record shape.

use serde::{Deserialize, Serialize};

use crate::schema::{DataType, Field, Schema};

/// A `title.basics` row that passed the kind filter and normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub tconst: String,
    pub primary_title: Option<String>,
    pub is_adult: Option<bool>,
    pub start_year: i32,
    pub runtime_minutes: i32,
    /// Never empty.
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub tconst: String,
    pub average_rating: f64,
    pub num_votes: i64,
}

/// Crew row reduced to one director by the director-position policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewAssignment {
    pub tconst: String,
    /// `None` only when `MissingDirector::Retain` is in effect.
    pub director: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub nconst: String,
    pub primary_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRole {
    pub tconst: String,
    /// Billing order; lower is billed first.
    pub ordering: i64,
    pub nconst: String,
    pub category: String,
}

/// A movie moving through the key-set joins: title and rating are fixed by
/// the inner joins, the director fields fill in as the joins progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMovie {
    pub title: Title,
    pub rating: Rating,
    pub director_id: Option<String>,
    pub director_name: Option<String>,
}

/// One denormalized movie. Built once by the assembler, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub tconst: String,
    pub primary_title: Option<String>,
    pub is_adult: Option<bool>,
    pub start_year: i32,
    pub runtime_minutes: i32,
    pub genres: Vec<String>,
    pub average_rating: f64,
    pub num_votes: i64,
    pub director_name: Option<String>,
    /// Top-billed cast in billing order; entries are `None` when the person
    /// has no name row.
    pub actors: Vec<Option<String>>,
}

impl MovieRecord {
    pub const COLUMNS: [&'static str; 10] = [
        "tconst",
        "primaryTitle",
        "isAdult",
        "startYear",
        "runtimeMinutes",
        "genres",
        "averageRating",
        "numVotes",
        "directorName",
        "actors",
    ];

    /// Output schema, shared by every sink.
    pub fn schema() -> Schema {
        Schema::new(vec![
            Field::new("tconst", DataType::Utf8, false),
            Field::new("primaryTitle", DataType::Utf8, true),
            Field::new("isAdult", DataType::Boolean, true),
            Field::new("startYear", DataType::Int64, false),
            Field::new("runtimeMinutes", DataType::Int64, false),
            Field::new("genres", DataType::Utf8List, false),
            Field::new("averageRating", DataType::Float64, false),
            Field::new("numVotes", DataType::Int64, false),
            Field::new("directorName", DataType::Utf8, true),
            Field::new("actors", DataType::Utf8List, false),
        ])
    }
}
