//! Structural failures abort the run and leave no output behind.


use std::fs;
use std::path::Path;

use cinefold_core::config::PipelineConfig;
use cinefold_core::error::Error;
use cinefold_core::observe::NoopObserver;
use cinefold_exec::Pipeline;
use test_data_gen::{generated_fixture, scenario_fixture, write_table, PRINCIPAL_HEADER};

fn assert_no_output(cfg: &PipelineConfig) {
    let out = cfg.output_path();
    assert!(!out.exists(), "{} should not exist", out.display());
    let leftovers: Vec<_> = fs::read_dir(out.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
        .collect();
    assert!(leftovers.is_empty(), "staging file left behind");
}

fn run(cfg: &PipelineConfig) -> Error {
    Pipeline::new(cfg.clone())
        .unwrap()
        .run(&NoopObserver)
        .expect_err("run should fail")
}

#[test]
fn ragged_principals_row_is_fatal() {
    let fx = scenario_fixture();
    let mut cfg = fx.write();
    write_table(
        fx.path(),
        "title.principals.tsv",
        PRINCIPAL_HEADER,
        &[
            "t1\t1\tp1\tactor\t\\N\t\\N".to_string(),
            "t1\t2\tp2\tactress\t\\N".to_string(),
        ],
    );
    for prefetch in [0, 2] {
        cfg.prefetch_chunks = prefetch;
        cfg.chunk_rows = 1;
        let err = run(&cfg);
        assert!(matches!(err, Error::Source { .. }), "{err}");
        assert_no_output(&cfg);
    }
}

#[test]
fn ragged_row_deep_in_a_large_stream_is_fatal() {
    let fx = generated_fixture(200, 5);
    let mut cfg = fx.write();
    let mut rows = fx.principals.clone();
    rows.push("tt0000001\t1".to_string());
    rows.extend(fx.principals.iter().cloned());
    write_table(fx.path(), "title.principals.tsv", PRINCIPAL_HEADER, &rows);
    cfg.chunk_rows = 64;
    assert!(matches!(run(&cfg), Error::Source { .. }));
    assert_no_output(&cfg);
}

#[test]
fn missing_header_column_is_fatal() {
    let fx = scenario_fixture();
    let cfg = fx.write();
    write_table(
        fx.path(),
        "title.ratings.tsv",
        "tconst\taverageRating",
        &["t1\t7.5".to_string()],
    );
    let err = run(&cfg);
    match &err {
        Error::Source { path, message } => {
            assert!(path.ends_with("title.ratings.tsv"));
            assert!(message.contains("numVotes"), "{message}");
        }
        other => panic!("unexpected error {other}"),
    }
    assert_no_output(&cfg);
}

#[test]
fn empty_source_file_is_fatal() {
    let fx = scenario_fixture();
    let cfg = fx.write();
    fs::write(fx.path().join("title.crew.tsv"), "").unwrap();
    assert!(matches!(run(&cfg), Error::Source { .. }));
    assert_no_output(&cfg);
}

#[test]
fn missing_source_file_is_fatal() {
    let fx = scenario_fixture();
    let cfg = fx.write();
    fs::remove_file(fx.path().join("name.basics.tsv")).unwrap();
    assert!(matches!(run(&cfg), Error::Source { .. }));
    assert_no_output(&cfg);
}

#[test]
fn cast_buffer_over_budget_is_fatal() {
    let fx = generated_fixture(200, 9);
    let mut cfg = fx.write();
    cfg.mem_cap_bytes = 256;
    assert!(matches!(run(&cfg), Error::Budget(_)));
    assert_no_output(&cfg);
}

#[test]
fn failed_run_leaves_previous_output_untouched() {
    let fx = scenario_fixture();
    let cfg = fx.write();
    Pipeline::new(cfg.clone()).unwrap().run(&NoopObserver).unwrap();
    let before = fs::read(cfg.output_path()).unwrap();

    fs::remove_file(fx.path().join("title.principals.tsv")).unwrap();
    run(&cfg);
    assert_eq!(fs::read(cfg.output_path()).unwrap(), before);
}

#[test]
fn invalid_config_is_rejected_before_io() {
    let mut cfg = PipelineConfig::new(Path::new("/nonexistent/cinefold"));
    cfg.policy.cast_limit = 0;
    assert!(matches!(Pipeline::new(cfg), Err(Error::Config(_))));
}

#[cfg(not(feature = "parquet"))]
#[test]
fn parquet_without_feature_is_a_sink_error() {
    let fx = scenario_fixture();
    let mut cfg = fx.write();
    cfg.format = cinefold_core::config::OutputFormat::Parquet;
    assert!(matches!(run(&cfg), Error::Sink(_)));
    assert_no_output(&cfg);
}
