//! Terminal assembly: planned movies left-joined with their cast lists.

use cinefold_core::model::{MovieRecord, PlannedMovie};

use crate::cast::CastAggregate;

/// Build one record per planned movie, in planned order. A movie with no cast
/// entry gets an empty `actors` list.
pub fn assemble(movies: Vec<PlannedMovie>, cast: &CastAggregate) -> Vec<MovieRecord> {
    movies
        .into_iter()
        .map(|m| {
            let actors = cast.get(&m.title.tconst).map(<[_]>::to_vec).unwrap_or_default();
            MovieRecord {
                tconst: m.title.tconst,
                primary_title: m.title.primary_title,
                is_adult: m.title.is_adult,
                start_year: m.title.start_year,
                runtime_minutes: m.title.runtime_minutes,
                genres: m.title.genres,
                average_rating: m.rating.average_rating,
                num_votes: m.rating.num_votes,
                director_name: m.director_name,
                actors,
            }
        })
        .collect()
}
