//! Key-set join planning.
//!
//! titles ⋈ ratings ⋈ crew are inner joins on `tconst`; their result fixes
//! the set of movies in the output. The director-name lookup is a left join
//! and never removes a movie. Every right side is deduplicated first-wins on
//! its key, so no join fans out.

use std::collections::BTreeMap;

use serde::Serialize;

use cinefold_core::keys::WorkingSet;
use cinefold_core::model::{CrewAssignment, Person, PlannedMovie, Rating, Title};
use cinefold_core::observe::{PipelineObserver, Stage, TableKind};
use cinefold_operators::join::dedup_by_key;
use cinefold_operators::{inner_join, left_join, HashIndex};

/// Output of the key-set stage.
#[derive(Debug, Clone)]
pub struct KeySetPlan {
    /// Movies in title-source order, director name filled where resolvable.
    pub movies: Vec<PlannedMovie>,
    /// Identifiers of `movies`; read-only from here on.
    pub working_set: WorkingSet,
    pub stats: KeySetStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeySetStats {
    pub titles_in: usize,
    pub with_rating: usize,
    pub with_crew: usize,
    pub with_director_name: usize,
    /// Rows discarded per table because their key was already seen.
    pub duplicates: BTreeMap<TableKind, usize>,
}

pub struct KeySetPlanner<'o> {
    observer: &'o dyn PipelineObserver,
}

impl<'o> KeySetPlanner<'o> {
    pub fn new(observer: &'o dyn PipelineObserver) -> Self {
        Self { observer }
    }

    /// `names` is shared with the cast stage, so it is passed in indexed.
    pub fn plan(
        &self,
        titles: Vec<Title>,
        ratings: Vec<Rating>,
        crew: Vec<CrewAssignment>,
        names: &HashIndex<Person>,
    ) -> KeySetPlan {
        self.observer.stage_started(Stage::PlanKeySet);
        let mut stats = KeySetStats {
            titles_in: titles.len(),
            ..Default::default()
        };

        let (titles, dup_titles) = dedup_by_key(titles);
        self.note_duplicates(&mut stats, TableKind::Titles, dup_titles);

        let ratings = HashIndex::build(ratings);
        self.note_duplicates(&mut stats, TableKind::Ratings, ratings.duplicates());
        let rated: Vec<PlannedMovie> = inner_join(titles, &ratings, |t: &Title| Some(t.tconst.as_str()))
            .into_iter()
            .map(|(title, rating)| PlannedMovie {
                title,
                rating: rating.clone(),
                director_id: None,
                director_name: None,
            })
            .collect();
        stats.with_rating = rated.len();

        let crew = HashIndex::build(crew);
        self.note_duplicates(&mut stats, TableKind::Crew, crew.duplicates());
        let directed: Vec<PlannedMovie> =
            inner_join(rated, &crew, |m: &PlannedMovie| Some(m.title.tconst.as_str()))
                .into_iter()
                .map(|(mut movie, assignment)| {
                    movie.director_id = assignment.director.clone();
                    movie
                })
                .collect();
        stats.with_crew = directed.len();

        let working_set: WorkingSet = directed.iter().map(|m| m.title.tconst.clone()).collect();

        self.note_duplicates(&mut stats, TableKind::Names, names.duplicates());
        let movies: Vec<PlannedMovie> =
            left_join(directed, names, |m: &PlannedMovie| m.director_id.as_deref())
                .into_iter()
                .map(|(mut movie, person)| {
                    movie.director_name = person.map(|p| p.primary_name.clone());
                    movie
                })
                .collect();
        stats.with_director_name = movies.iter().filter(|m| m.director_name.is_some()).count();

        self.observer.stage_finished(Stage::PlanKeySet, movies.len());
        KeySetPlan {
            movies,
            working_set,
            stats,
        }
    }

    fn note_duplicates(&self, stats: &mut KeySetStats, table: TableKind, count: usize) {
        if count > 0 {
            self.observer.duplicates_dropped(table, count);
            stats.duplicates.insert(table, count);
        }
    }
}
