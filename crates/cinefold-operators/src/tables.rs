//! Column policies and typing rules for the five source tables.

use cinefold_core::model::{CrewAssignment, Person, PrincipalRole, Rating, Title};
use cinefold_core::observe::TableKind;
use cinefold_core::policy::{EnrichmentPolicy, MissingDirector};

use crate::normalize::{ColumnPolicy, NumericKind, Rejection, RowView, TableSpec};

static TITLE_POLICY: ColumnPolicy = ColumnPolicy {
    read: &["tconst", "titleType", "startYear", "runtimeMinutes", "genres"],
    optional: &["primaryTitle", "isAdult"],
    required: &["tconst", "startYear", "runtimeMinutes", "genres"],
    numeric: &[
        ("startYear", NumericKind::Int),
        ("runtimeMinutes", NumericKind::Int),
    ],
};

impl TableSpec for Title {
    const KIND: TableKind = TableKind::Titles;

    fn policy() -> &'static ColumnPolicy {
        &TITLE_POLICY
    }

    fn keep(row: &RowView<'_>, policy: &EnrichmentPolicy) -> bool {
        row.str("titleType") == Some(policy.title_kind.as_str())
    }

    fn build(row: &RowView<'_>, _policy: &EnrichmentPolicy) -> Result<Self, Rejection> {
        let start_year =
            i32::try_from(row.int("startYear")?).map_err(|_| Rejection::BadNumeric("startYear"))?;
        let runtime_minutes = i32::try_from(row.int("runtimeMinutes")?)
            .map_err(|_| Rejection::BadNumeric("runtimeMinutes"))?;
        let genres = split_list(row.required("genres")?);
        if genres.is_empty() {
            return Err(Rejection::MissingRequired("genres"));
        }
        Ok(Title {
            tconst: row.required("tconst")?.to_string(),
            primary_title: row.str("primaryTitle").map(str::to_string),
            is_adult: row.str("isAdult").and_then(parse_flag),
            start_year,
            runtime_minutes,
            genres,
        })
    }
}

static RATING_POLICY: ColumnPolicy = ColumnPolicy {
    read: &["tconst", "averageRating", "numVotes"],
    optional: &[],
    required: &["tconst", "averageRating", "numVotes"],
    numeric: &[
        ("averageRating", NumericKind::Float),
        ("numVotes", NumericKind::Int),
    ],
};

impl TableSpec for Rating {
    const KIND: TableKind = TableKind::Ratings;

    fn policy() -> &'static ColumnPolicy {
        &RATING_POLICY
    }

    fn build(row: &RowView<'_>, _policy: &EnrichmentPolicy) -> Result<Self, Rejection> {
        Ok(Rating {
            tconst: row.required("tconst")?.to_string(),
            average_rating: row.float("averageRating")?,
            num_votes: row.int("numVotes")?,
        })
    }
}

static CREW_POLICY: ColumnPolicy = ColumnPolicy {
    read: &["tconst", "directors"],
    optional: &[],
    required: &["tconst"],
    numeric: &[],
};

impl TableSpec for CrewAssignment {
    const KIND: TableKind = TableKind::Crew;

    fn policy() -> &'static ColumnPolicy {
        &CREW_POLICY
    }

    /// Keeps only the director at `policy.director_position` of the
    /// comma-joined list.
    fn build(row: &RowView<'_>, policy: &EnrichmentPolicy) -> Result<Self, Rejection> {
        let director = row
            .str("directors")
            .and_then(|list| list.split(',').nth(policy.director_position))
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if director.is_none() && policy.missing_director == MissingDirector::Drop {
            return Err(Rejection::MissingDirector);
        }
        Ok(CrewAssignment {
            tconst: row.required("tconst")?.to_string(),
            director,
        })
    }
}

static PERSON_POLICY: ColumnPolicy = ColumnPolicy {
    read: &["nconst", "primaryName"],
    optional: &[],
    required: &["nconst", "primaryName"],
    numeric: &[],
};

impl TableSpec for Person {
    const KIND: TableKind = TableKind::Names;

    fn policy() -> &'static ColumnPolicy {
        &PERSON_POLICY
    }

    fn build(row: &RowView<'_>, _policy: &EnrichmentPolicy) -> Result<Self, Rejection> {
        Ok(Person {
            nconst: row.required("nconst")?.to_string(),
            primary_name: row.required("primaryName")?.to_string(),
        })
    }
}

static PRINCIPAL_POLICY: ColumnPolicy = ColumnPolicy {
    read: &["tconst", "ordering", "nconst", "category"],
    optional: &[],
    required: &["tconst", "ordering", "nconst", "category"],
    numeric: &[("ordering", NumericKind::Int)],
};

impl TableSpec for PrincipalRole {
    const KIND: TableKind = TableKind::Principals;

    fn policy() -> &'static ColumnPolicy {
        &PRINCIPAL_POLICY
    }

    fn build(row: &RowView<'_>, _policy: &EnrichmentPolicy) -> Result<Self, Rejection> {
        Ok(PrincipalRole {
            tconst: row.required("tconst")?.to_string(),
            ordering: row.int("ordering")?,
            nconst: row.required("nconst")?.to_string(),
            category: row.required("category")?.to_string(),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use cinefold_core::types::{RowBatch, Scalar};

    use super::*;
    use crate::normalize::TableNormalizer;

    fn s(v: &str) -> Scalar {
        if v == "\\N" {
            Scalar::Null
        } else {
            Scalar::Str(v.to_string())
        }
    }

    fn batch(columns: &[&str], rows: &[&[&str]]) -> RowBatch {
        let mut b = RowBatch::with_columns(columns);
        for r in rows {
            b.push_row(r.iter().map(|v| s(v)).collect()).unwrap();
        }
        b
    }

    const TITLE_COLS: [&str; 7] = [
        "tconst",
        "titleType",
        "primaryTitle",
        "isAdult",
        "startYear",
        "runtimeMinutes",
        "genres",
    ];

    #[test]
    fn titles_filter_kind_and_reject_incomplete_rows() {
        let b = batch(
            &TITLE_COLS,
            &[
                &["t1", "movie", "One", "0", "2000", "90", "Drama,Comedy"],
                &["t2", "short", "Two", "0", "2000", "10", "Short"],
                &["t3", "movie", "Three", "0", "2001", "\\N", "Drama"],
                &["t4", "movie", "Four", "0", "n/a", "80", "Drama"],
                &["t5", "movie", "Five", "\\N", "1999", "100", "\\N"],
                &["t6", "movie", "\\N", "1", "1999.0", "100", "Horror"],
            ],
        );
        let norm = TableNormalizer::<Title>::new(&EnrichmentPolicy::default());
        let mut out = Vec::new();
        let stats = norm.normalize_batch(&b, &mut out).unwrap();

        assert_eq!(stats.rows_read, 6);
        assert_eq!(stats.rows_filtered, 1);
        assert_eq!(stats.rejected.missing_required, 2);
        assert_eq!(stats.rejected.bad_numeric, 1);
        assert_eq!(stats.rows_kept, 2);

        assert_eq!(out[0].tconst, "t1");
        assert_eq!(out[0].genres, vec!["Drama", "Comedy"]);
        assert_eq!(out[0].is_adult, Some(false));
        assert_eq!(out[1].tconst, "t6");
        assert_eq!(out[1].start_year, 1999);
        assert_eq!(out[1].primary_title, None);
    }

    #[test]
    fn titles_without_optional_columns_read_as_null() {
        let b = batch(
            &["tconst", "titleType", "startYear", "runtimeMinutes", "genres"],
            &[&["t1", "movie", "2000", "90", "Drama"]],
        );
        let mut out = Vec::new();
        let stats = TableNormalizer::<Title>::new(&EnrichmentPolicy::default())
            .normalize_batch(&b, &mut out)
            .unwrap();
        assert_eq!(stats.rows_kept, 1);
        assert_eq!(out[0].primary_title, None);
        assert_eq!(out[0].is_adult, None);
        assert_eq!(out[0].runtime_minutes, 90);
    }

    #[test]
    fn crew_keeps_only_the_configured_director() {
        let b = batch(
            &["tconst", "directors"],
            &[&["t1", "d1,d2"], &["t2", "d3"], &["t3", "\\N"]],
        );
        let mut out = Vec::new();
        let stats = TableNormalizer::<CrewAssignment>::new(&EnrichmentPolicy::default())
            .normalize_batch(&b, &mut out)
            .unwrap();
        assert_eq!(stats.rejected.missing_director, 1);
        assert_eq!(out[0].director.as_deref(), Some("d1"));
        assert_eq!(out[1].director.as_deref(), Some("d3"));

        let second = EnrichmentPolicy {
            director_position: 1,
            ..Default::default()
        };
        let mut out = Vec::new();
        let stats = TableNormalizer::<CrewAssignment>::new(&second)
            .normalize_batch(&b, &mut out)
            .unwrap();
        assert_eq!(stats.rows_kept, 1);
        assert_eq!(out[0].director.as_deref(), Some("d2"));
    }

    #[test]
    fn crew_retain_policy_keeps_directorless_rows() {
        let b = batch(&["tconst", "directors"], &[&["t3", "\\N"]]);
        let policy = EnrichmentPolicy {
            missing_director: MissingDirector::Retain,
            ..Default::default()
        };
        let mut out = Vec::new();
        TableNormalizer::<CrewAssignment>::new(&policy)
            .normalize_batch(&b, &mut out)
            .unwrap();
        assert_eq!(
            out,
            vec![CrewAssignment {
                tconst: "t3".into(),
                director: None
            }]
        );
    }

    #[test]
    fn principals_require_numeric_ordering() {
        let b = batch(
            &["tconst", "ordering", "nconst", "category"],
            &[&["t1", "1", "p1", "actor"], &["t1", "x", "p2", "actress"]],
        );
        let mut out = Vec::new();
        let stats = TableNormalizer::<PrincipalRole>::new(&EnrichmentPolicy::default())
            .normalize_batch(&b, &mut out)
            .unwrap();
        assert_eq!(stats.rejected.bad_numeric, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ordering, 1);
    }

    #[test]
    fn missing_policy_column_is_a_schema_error() {
        let b = batch(&["tconst", "averageRating"], &[&["t1", "7.5"]]);
        let err = TableNormalizer::<Rating>::new(&EnrichmentPolicy::default())
            .normalize_batch(&b, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, crate::traits::OpError::Schema(_)));
    }
}
