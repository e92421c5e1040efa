//! Configuration layering: defaults < environment < YAML < flags.

use std::path::PathBuf;

use cinefold_core::config::{ConfigOverrides, OutputFormat, PipelineConfig, DEFAULT_CHUNK_ROWS};
use cinefold_core::policy::MissingDirector;
use cinefold_planner::parse_config_yaml;

fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn defaults_follow_the_source_dump_conventions() {
    let cfg = PipelineConfig::new("/data");
    assert_eq!(cfg.delimiter, '\t');
    assert_eq!(cfg.null_marker, "\\N");
    assert_eq!(cfg.chunk_rows, DEFAULT_CHUNK_ROWS);
    assert_eq!(cfg.policy.cast_limit, 5);
    assert_eq!(cfg.policy.director_position, 0);
    assert_eq!(cfg.policy.missing_director, MissingDirector::Drop);
    assert_eq!(
        cfg.output_path(),
        PathBuf::from("/data/cleaned_imdb_movies_batch.jsonl")
    );
}

#[test]
fn data_path_falls_back_to_legacy_variable() {
    let o = ConfigOverrides::from_lookup(env(&[("DATA_PATH", "/legacy")])).unwrap();
    assert_eq!(PipelineConfig::from_overrides(&o).unwrap().data_path, PathBuf::from("/legacy"));

    let o = ConfigOverrides::from_lookup(env(&[
        ("DATA_PATH", "/legacy"),
        ("CINEFOLD_DATA_PATH", "/preferred"),
    ]))
    .unwrap();
    assert_eq!(o.data_path, Some(PathBuf::from("/preferred")));
}

#[test]
fn missing_data_path_is_a_config_error() {
    let o = ConfigOverrides::from_lookup(env(&[("CINEFOLD_CHUNK_ROWS", "10")])).unwrap();
    assert!(PipelineConfig::from_overrides(&o).unwrap_err().is_config());
}

#[test]
fn unparseable_values_are_config_errors() {
    for pairs in [
        &[("CINEFOLD_CHUNK_ROWS", "many")][..],
        &[("CINEFOLD_DELIMITER", "::")][..],
        &[("CINEFOLD_MISSING_DIRECTOR", "maybe")][..],
        &[("CINEFOLD_FORMAT", "xml")][..],
    ] {
        let pairs: &'static [(&'static str, &'static str)] = pairs;
        let err = ConfigOverrides::from_lookup(env(pairs)).unwrap_err();
        assert!(err.is_config(), "{pairs:?}");
    }
}

#[test]
fn yaml_overrides_env_and_flags_override_yaml() {
    let env_layer = ConfigOverrides::from_lookup(env(&[
        ("DATA_PATH", "/env"),
        ("CINEFOLD_CHUNK_ROWS", "10"),
        ("CINEFOLD_FORMAT", "csv"),
        ("CINEFOLD_CAST_LIMIT", "3"),
    ]))
    .unwrap();
    let yaml_layer = parse_config_yaml("chunk_rows: 20\nformat: jsonl\nmissing_director: retain\n").unwrap();
    let flag_layer = ConfigOverrides {
        chunk_rows: Some(30),
        ..Default::default()
    };

    let cfg = PipelineConfig::from_overrides(&env_layer.merge(yaml_layer).merge(flag_layer)).unwrap();
    assert_eq!(cfg.data_path, PathBuf::from("/env"));
    assert_eq!(cfg.chunk_rows, 30);
    assert_eq!(cfg.format, OutputFormat::Jsonl);
    assert_eq!(cfg.policy.cast_limit, 3);
    assert_eq!(cfg.policy.missing_director, MissingDirector::Retain);
}

#[test]
fn validation_rejects_degenerate_settings() {
    let base = ConfigOverrides {
        data_path: Some("/d".into()),
        ..Default::default()
    };
    for bad in [
        ConfigOverrides {
            chunk_rows: Some(0),
            ..Default::default()
        },
        ConfigOverrides {
            cast_limit: Some(0),
            ..Default::default()
        },
        ConfigOverrides {
            cast_categories: Some(vec![]),
            ..Default::default()
        },
    ] {
        let err = PipelineConfig::from_overrides(&base.clone().merge(bad)).unwrap_err();
        assert!(err.is_config());
    }
}
