//! End-to-end pipeline tests over fixture TSV files.


use std::collections::HashSet;

use cinefold_core::config::PipelineConfig;
use cinefold_core::model::MovieRecord;
use cinefold_core::observe::{NoopObserver, Stage, TableKind};
use cinefold_core::policy::MissingDirector;
use cinefold_exec::metrics::Event;
use cinefold_exec::{Pipeline, RecordingObserver};
use test_data_gen::{
    generated_fixture, read_jsonl, scenario_fixture, write_table, Fixture, REQUIRED_TITLE_HEADER,
};

fn build(cfg: PipelineConfig) -> Vec<MovieRecord> {
    Pipeline::new(cfg)
        .expect("valid config")
        .build_records(&NoopObserver)
        .expect("pipeline runs")
        .records
}

fn names(r: &MovieRecord) -> Vec<Option<&str>> {
    r.actors.iter().map(|a| a.as_deref()).collect()
}

#[test]
fn single_movie_scenario() {
    let fx = scenario_fixture();
    let cfg = fx.write();
    let report = Pipeline::new(cfg.clone()).unwrap().run(&NoopObserver).unwrap();
    assert_eq!(report.records, 1);

    let rows = read_jsonl(&cfg.output_path());
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["tconst"], "t1");
    assert_eq!(row["startYear"], 2000);
    assert_eq!(row["runtimeMinutes"], 90);
    assert_eq!(row["genres"], serde_json::json!(["Drama"]));
    assert_eq!(row["averageRating"], 7.5);
    assert_eq!(row["numVotes"], 100);
    assert_eq!(row["directorName"], "Director One");
    assert_eq!(row["actors"], serde_json::json!(["A", "B"]));
    assert_eq!(row["primaryTitle"], "Title t1");
}

#[test]
fn title_source_without_optional_columns() {
    let fx = scenario_fixture();
    let cfg = fx.write();
    write_table(
        fx.path(),
        "title.basics.tsv",
        REQUIRED_TITLE_HEADER,
        &["t1\tmovie\t2000\t90\tDrama".to_string()],
    );
    let records = build(cfg);
    assert_eq!(records.len(), 1);
    let t1 = &records[0];
    assert_eq!(t1.tconst, "t1");
    assert_eq!(t1.primary_title, None);
    assert_eq!(t1.is_adult, None);
    assert_eq!(t1.director_name.as_deref(), Some("Director One"));
    assert_eq!(names(t1), vec![Some("A"), Some("B")]);
}

#[test]
fn null_runtime_drops_the_movie() {
    let mut fx = scenario_fixture();
    fx.title("t2", "movie", "2001", "\\N", "Drama")
        .rating("t2", "8.0", "10")
        .crew("t2", "d1")
        .principal("t2", 1, "p1", "actor");
    let records = build(fx.write());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tconst, "t1");
}

#[test]
fn movie_without_acting_principals_keeps_empty_cast() {
    let mut fx = scenario_fixture();
    fx.title("t3", "movie", "1999", "100", "Horror")
        .rating("t3", "5.5", "7")
        .crew("t3", "d1")
        .principal("t3", 1, "d1", "director")
        .principal("t3", 2, "p2", "writer");
    let records = build(fx.write());
    let t3 = records.iter().find(|r| r.tconst == "t3").expect("t3 kept");
    assert!(t3.actors.is_empty());
    assert_eq!(t3.director_name.as_deref(), Some("Director One"));
}

#[test]
fn missing_rating_or_crew_drops_the_movie() {
    let mut fx = scenario_fixture();
    fx.title("t4", "movie", "1999", "100", "Horror")
        .crew("t4", "d1")
        .title("t5", "movie", "1999", "100", "Horror")
        .rating("t5", "5.0", "3")
        .title("t6", "movie", "1999", "100", "Horror")
        .rating("t6", "5.0", "3")
        .crew("t6", "\\N");
    let ids: Vec<_> = build(fx.write()).into_iter().map(|r| r.tconst).collect();
    assert_eq!(ids, vec!["t1"]);
}

#[test]
fn retain_policy_keeps_directorless_movies() {
    let mut fx = scenario_fixture();
    fx.title("t6", "movie", "1999", "100", "Horror")
        .rating("t6", "5.0", "3")
        .crew("t6", "\\N");
    let mut cfg = fx.write();
    cfg.policy.missing_director = MissingDirector::Retain;
    let records = build(cfg);
    let t6 = records.iter().find(|r| r.tconst == "t6").expect("t6 kept");
    assert_eq!(t6.director_name, None);
}

#[test]
fn unnamed_director_and_cast_do_not_drop_the_movie() {
    let mut fx = Fixture::new();
    fx.title("t1", "movie", "2000", "90", "Drama")
        .rating("t1", "7.5", "100")
        .crew("t1", "ghost")
        .person("p2", "B")
        .principal("t1", 1, "nobody", "actor")
        .principal("t1", 2, "p2", "actress");
    let records = build(fx.write());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].director_name, None);
    assert_eq!(names(&records[0]), vec![None, Some("B")]);
}

#[test]
fn cast_is_top_five_by_billing_order() {
    let mut fx = scenario_fixture();
    fx.person("p3", "C")
        .person("p4", "D")
        .person("p5", "E")
        .person("p6", "F")
        .principal("t1", 6, "p6", "actor")
        .principal("t1", 5, "p5", "actress")
        .principal("t1", 0, "d1", "director")
        .principal("t1", 4, "p4", "actor")
        .principal("t1", 3, "p3", "actor");
    let records = build(fx.write());
    assert_eq!(names(&records[0]), vec![Some("A"), Some("B"), Some("C"), Some("D"), Some("E")]);
}

#[test]
fn exactly_cast_limit_principals_are_all_kept() {
    let mut fx = Fixture::new();
    fx.title("t1", "movie", "2000", "90", "Drama")
        .rating("t1", "7.5", "100")
        .crew("t1", "d1");
    for i in 1..=5 {
        fx.person(&format!("p{i}"), &format!("P{i}"))
            .principal("t1", i, &format!("p{i}"), "actor");
    }
    let records = build(fx.write());
    assert_eq!(records[0].actors.len(), 5);

    let mut cfg = fx.write();
    cfg.policy.cast_limit = 4;
    let records = build(cfg);
    assert_eq!(names(&records[0]), vec![Some("P1"), Some("P2"), Some("P3"), Some("P4")]);
}

#[test]
fn director_position_selects_the_listed_director() {
    let mut fx = scenario_fixture();
    fx.person("d2", "Director Two");
    let mut cfg = fx.write();
    cfg.policy.director_position = 1;
    let records = build(cfg);
    assert_eq!(records[0].director_name.as_deref(), Some("Director Two"));

    // single-director movies have nothing at position 1
    let mut fx = Fixture::new();
    fx.title("t1", "movie", "2000", "90", "Drama")
        .rating("t1", "7.5", "100")
        .crew("t1", "d1");
    let mut cfg = fx.write();
    cfg.policy.director_position = 1;
    assert!(build(cfg).is_empty());
}

#[test]
fn equal_billing_orders_keep_file_order() {
    let mut fx = Fixture::new();
    fx.title("t1", "movie", "2000", "90", "Drama")
        .rating("t1", "7.5", "100")
        .crew("t1", "d1")
        .person("a", "A")
        .person("b", "B")
        .person("c", "C")
        .principal("t1", 2, "b", "actor")
        .principal("t1", 2, "c", "actor")
        .principal("t1", 2, "a", "actor");
    let mut cfg = fx.write();
    cfg.chunk_rows = 1;
    assert_eq!(names(&build(cfg)[0]), vec![Some("B"), Some("C"), Some("A")]);
}

#[test]
fn output_invariants_hold_on_noisy_input() {
    let fx = generated_fixture(400, 7);
    let mut cfg = fx.write();
    cfg.chunk_rows = 97;
    let out = Pipeline::new(cfg).unwrap().build_records(&NoopObserver).unwrap();
    let records = out.records;
    assert!(!records.is_empty());

    let mut seen = HashSet::new();
    for r in &records {
        assert!(seen.insert(r.tconst.clone()), "duplicate {}", r.tconst);
        assert!(!r.genres.is_empty());
        assert!(r.actors.len() <= 5);
        assert!(r.average_rating > 0.0);
    }
    assert_eq!(out.report.working_set_size, records.len());

    // every output movie had a rating, a movie kind, and a director in the sources
    let rated: HashSet<&str> = fx.ratings.iter().map(|l| l.split('\t').next().unwrap()).collect();
    let directed: HashSet<&str> = fx
        .crew
        .iter()
        .filter(|l| !l.contains("\\N\t\\N"))
        .map(|l| l.split('\t').next().unwrap())
        .collect();
    for r in &records {
        assert!(rated.contains(r.tconst.as_str()));
        assert!(directed.contains(r.tconst.as_str()));
    }
}

#[test]
fn chunk_size_does_not_change_the_output() {
    let fx = generated_fixture(300, 42);
    let base = fx.write();

    let mut digests = Vec::new();
    for (chunk_rows, prefetch) in [(1, 0), (1, 2), (1000, 2), (1_000_000, 2), (1_000_000, 0)] {
        let mut cfg = base.clone();
        cfg.chunk_rows = chunk_rows;
        cfg.prefetch_chunks = prefetch;
        let out = Pipeline::new(cfg).unwrap().build_records(&NoopObserver).unwrap();
        digests.push((chunk_rows, prefetch, out.report.output_digest));
    }
    let first = digests[0].2;
    assert!(first.is_some());
    for (chunk_rows, prefetch, d) in &digests {
        assert_eq!(*d, first, "chunk_rows={chunk_rows} prefetch={prefetch}");
    }
}

#[test]
fn streaming_small_tables_matches_loading_them() {
    let fx = generated_fixture(150, 3);
    let loaded = build(fx.write());
    let mut cfg = fx.write();
    cfg.stream_threshold_bytes = 0;
    cfg.chunk_rows = 13;
    assert_eq!(build(cfg), loaded);
}

#[test]
fn repeated_runs_are_identical() {
    let fx = generated_fixture(200, 11);
    let cfg = fx.write();
    let a = Pipeline::new(cfg.clone()).unwrap().run(&NoopObserver).unwrap();
    let first_bytes = std::fs::read(cfg.output_path()).unwrap();
    let b = Pipeline::new(cfg.clone()).unwrap().run(&NoopObserver).unwrap();
    let second_bytes = std::fs::read(cfg.output_path()).unwrap();
    assert_eq!(a.output_digest, b.output_digest);
    assert_eq!(first_bytes, second_bytes);
    assert_ne!(a.id, b.id);
}

#[test]
fn observer_sees_every_stage_and_chunk() {
    let fx = scenario_fixture();
    let mut cfg = fx.write();
    cfg.chunk_rows = 1;
    let obs = RecordingObserver::new();
    let report = Pipeline::new(cfg).unwrap().run(&obs).unwrap();

    let events = obs.events();
    for stage in [
        Stage::Load(TableKind::Names),
        Stage::Load(TableKind::Titles),
        Stage::Load(TableKind::Ratings),
        Stage::Load(TableKind::Crew),
        Stage::PlanKeySet,
        Stage::AggregateCast,
        Stage::Assemble,
        Stage::Write,
    ] {
        assert!(events.contains(&Event::Started(stage)), "missing {stage}");
    }
    assert_eq!(obs.chunks(TableKind::Principals), 2);

    let principals = report.table(TableKind::Principals).unwrap();
    assert_eq!(principals.rows_read, 2);
    assert_eq!(principals.rows_kept, 2);
    assert_eq!(principals.chunks, 2);
    assert_eq!(report.retained_cast_rows, 2);
    assert!(report.peak_cast_bytes > 0);
}

#[test]
fn report_counts_rejections_and_filters() {
    let mut fx = scenario_fixture();
    fx.title("t2", "movie", "2001", "\\N", "Drama")
        .title("t3", "short", "2001", "5", "Short")
        .title("t4", "movie", "soon", "5", "Short")
        .principal("t9", 1, "p1", "actor")
        .principal("t1", 3, "d1", "director");
    let out = Pipeline::new(fx.write()).unwrap().build_records(&NoopObserver).unwrap();
    let titles = out.report.table(TableKind::Titles).unwrap();
    assert_eq!(titles.rows_read, 4);
    assert_eq!(titles.rows_filtered, 1);
    assert_eq!(titles.rejected.missing_required, 1);
    assert_eq!(titles.rejected.bad_numeric, 1);
    assert_eq!(titles.rows_kept, 1);

    let principals = out.report.table(TableKind::Principals).unwrap();
    assert_eq!(principals.rows_read, 4);
    assert_eq!(principals.rows_filtered, 2);
    assert_eq!(principals.rows_kept, 2);
}
