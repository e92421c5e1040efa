//! YAML configuration layer.
//!
//! Keys mirror `ConfigOverrides` field names; unknown keys are rejected.
//!
//! ```yaml
//! data_path: ./imdb
//! chunk_rows: 250000
//! format: csv
//! cast_limit: 5
//! missing_director: drop
//! files:
//!   principals: title.principals.sample.tsv
//! ```

use std::path::Path;

use cinefold_core::config::ConfigOverrides;

use crate::error::{PlanError, Result};

pub fn parse_config_yaml(src: &str) -> Result<ConfigOverrides> {
    if src.trim().is_empty() {
        return Ok(ConfigOverrides::default());
    }
    Ok(serde_yaml::from_str(src)?)
}

/// Read a YAML layer from disk. Relative paths inside it resolve against the
/// file's directory.
pub fn load_config_file(path: &Path) -> Result<ConfigOverrides> {
    let src = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let layer = parse_config_yaml(&src)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(layer.rebase(base))
}
