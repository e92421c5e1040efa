//! Pipeline configuration.
//!
//! Layering, lowest to highest precedence: built-in defaults, environment
//! (`CINEFOLD_*`), an optional YAML document, command-line flags. Each layer
//! is a `ConfigOverrides`; `PipelineConfig::from_overrides` resolves them and
//! fails with `Error::Config` before any file is touched.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::observe::TableKind;
use crate::policy::{EnrichmentPolicy, MissingDirector};

pub const DEFAULT_NULL_MARKER: &str = "\\N";
pub const DEFAULT_CHUNK_ROWS: usize = 1_000_000;
pub const DEFAULT_OUTPUT_STEM: &str = "cleaned_imdb_movies_batch";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub titles: String,
    pub ratings: String,
    pub crew: String,
    pub names: String,
    pub principals: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            titles: "title.basics.tsv".into(),
            ratings: "title.ratings.tsv".into(),
            crew: "title.crew.tsv".into(),
            names: "name.basics.tsv".into(),
            principals: "title.principals.tsv".into(),
        }
    }
}

impl SourceFiles {
    pub fn file_name(&self, table: TableKind) -> &str {
        match table {
            TableKind::Titles => &self.titles,
            TableKind::Ratings => &self.ratings,
            TableKind::Crew => &self.crew,
            TableKind::Names => &self.names,
            TableKind::Principals => &self.principals,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the five source files.
    pub data_path: PathBuf,
    pub files: SourceFiles,

    /// Single-byte field delimiter.
    pub delimiter: char,

    /// Token that stands for a missing value in every source file.
    pub null_marker: String,

    /// Honour `"` quoting in sources. Off for IMDb dumps, whose titles carry
    /// bare quotes.
    pub quoting: bool,

    /// Rows per chunk for streamed sources.
    pub chunk_rows: usize,

    /// Chunks the reader thread may run ahead of the consumer.
    pub prefetch_chunks: usize,

    /// Sources larger than this many bytes are streamed in chunks instead of
    /// loaded whole. The principals source always streams.
    pub stream_threshold_bytes: u64,

    /// Hard cap for the retained cast buffer.
    pub mem_cap_bytes: usize,

    /// Capacity of each source's buffered reader.
    pub read_buffer_bytes: usize,

    /// Output file; defaults to `<data_path>/cleaned_imdb_movies_batch.<ext>`.
    pub output: Option<PathBuf>,
    pub format: OutputFormat,

    pub policy: EnrichmentPolicy,
}

impl PipelineConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            files: SourceFiles::default(),
            delimiter: '\t',
            null_marker: DEFAULT_NULL_MARKER.to_string(),
            quoting: false,
            chunk_rows: DEFAULT_CHUNK_ROWS,
            prefetch_chunks: 2,
            stream_threshold_bytes: 256 * 1024 * 1024,
            mem_cap_bytes: 512 * 1024 * 1024,
            read_buffer_bytes: 1024 * 1024,
            output: None,
            format: OutputFormat::Jsonl,
            policy: EnrichmentPolicy::default(),
        }
    }

    /// Resolve a merged override set into a config. The data path is the only
    /// setting without a default.
    pub fn from_overrides(overrides: &ConfigOverrides) -> Result<Self> {
        let data_path = overrides.data_path.clone().ok_or_else(|| {
            Error::Config(
                "data path is not set (CINEFOLD_DATA_PATH, DATA_PATH, or --data-path)".into(),
            )
        })?;
        let mut cfg = Self::new(data_path);
        cfg.apply(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_overrides(&ConfigOverrides::from_env()?)
    }

    pub fn apply(&mut self, o: &ConfigOverrides) {
        if let Some(p) = &o.data_path {
            self.data_path = p.clone();
        }
        if let Some(f) = &o.files {
            self.files = f.clone();
        }
        if let Some(d) = o.delimiter {
            self.delimiter = d;
        }
        if let Some(m) = &o.null_marker {
            self.null_marker = m.clone();
        }
        if let Some(q) = o.quoting {
            self.quoting = q;
        }
        if let Some(n) = o.chunk_rows {
            self.chunk_rows = n;
        }
        if let Some(n) = o.prefetch_chunks {
            self.prefetch_chunks = n;
        }
        if let Some(n) = o.stream_threshold_bytes {
            self.stream_threshold_bytes = n;
        }
        if let Some(n) = o.mem_cap_bytes {
            self.mem_cap_bytes = n;
        }
        if let Some(n) = o.read_buffer_bytes {
            self.read_buffer_bytes = n;
        }
        if let Some(p) = &o.output {
            self.output = Some(p.clone());
        }
        if let Some(f) = o.format {
            self.format = f;
        }
        if let Some(n) = o.cast_limit {
            self.policy.cast_limit = n;
        }
        if let Some(n) = o.director_position {
            self.policy.director_position = n;
        }
        if let Some(m) = o.missing_director {
            self.policy.missing_director = m;
        }
        if let Some(c) = &o.cast_categories {
            self.policy.cast_categories = c.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if self.chunk_rows == 0 {
            return Err(Error::Config("chunk_rows must be at least 1".into()));
        }
        if self.policy.cast_limit == 0 {
            return Err(Error::Config("cast_limit must be at least 1".into()));
        }
        if self.policy.cast_categories.is_empty() {
            return Err(Error::Config("cast_categories must not be empty".into()));
        }
        if self.read_buffer_bytes == 0 {
            return Err(Error::Config("read_buffer_bytes must be at least 1".into()));
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }

    pub fn source_path(&self, table: TableKind) -> PathBuf {
        self.data_path.join(self.files.file_name(table))
    }

    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(p) => p.clone(),
            None => self
                .data_path
                .join(format!("{}.{}", DEFAULT_OUTPUT_STEM, self.format.extension())),
        }
    }
}

/// One configuration layer. Every field is optional; `merge` lets a higher
/// layer win field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub data_path: Option<PathBuf>,
    pub files: Option<SourceFiles>,
    pub delimiter: Option<char>,
    pub null_marker: Option<String>,
    pub quoting: Option<bool>,
    pub chunk_rows: Option<usize>,
    pub prefetch_chunks: Option<usize>,
    pub stream_threshold_bytes: Option<u64>,
    pub mem_cap_bytes: Option<usize>,
    pub read_buffer_bytes: Option<usize>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub cast_limit: Option<usize>,
    pub director_position: Option<usize>,
    pub missing_director: Option<MissingDirector>,
    pub cast_categories: Option<Vec<String>>,
}

impl ConfigOverrides {
    /// Environment variables:
    /// - `CINEFOLD_DATA_PATH` (falls back to `DATA_PATH`)
    /// - `CINEFOLD_DELIMITER` (`\t`, `tab`, or one character)
    /// - `CINEFOLD_NULL_MARKER`, `CINEFOLD_QUOTING`
    /// - `CINEFOLD_CHUNK_ROWS`, `CINEFOLD_PREFETCH_CHUNKS`
    /// - `CINEFOLD_STREAM_THRESHOLD_BYTES`, `CINEFOLD_MEM_CAP_BYTES`,
    ///   `CINEFOLD_READ_BUFFER_BYTES`
    /// - `CINEFOLD_OUTPUT`, `CINEFOLD_FORMAT`
    /// - `CINEFOLD_CAST_LIMIT`, `CINEFOLD_DIRECTOR_POSITION`,
    ///   `CINEFOLD_MISSING_DIRECTOR` (`drop` | `retain`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut o = ConfigOverrides {
            data_path: lookup("CINEFOLD_DATA_PATH")
                .or_else(|| lookup("DATA_PATH"))
                .map(PathBuf::from),
            null_marker: lookup("CINEFOLD_NULL_MARKER"),
            output: lookup("CINEFOLD_OUTPUT").map(PathBuf::from),
            ..Default::default()
        };

        if let Some(raw) = lookup("CINEFOLD_DELIMITER") {
            o.delimiter = Some(parse_delimiter(&raw)?);
        }
        o.quoting = parse_var(&lookup, "CINEFOLD_QUOTING")?;
        o.chunk_rows = parse_var(&lookup, "CINEFOLD_CHUNK_ROWS")?;
        o.prefetch_chunks = parse_var(&lookup, "CINEFOLD_PREFETCH_CHUNKS")?;
        o.stream_threshold_bytes = parse_var(&lookup, "CINEFOLD_STREAM_THRESHOLD_BYTES")?;
        o.mem_cap_bytes = parse_var(&lookup, "CINEFOLD_MEM_CAP_BYTES")?;
        o.read_buffer_bytes = parse_var(&lookup, "CINEFOLD_READ_BUFFER_BYTES")?;
        o.format = parse_var(&lookup, "CINEFOLD_FORMAT")?;
        o.cast_limit = parse_var(&lookup, "CINEFOLD_CAST_LIMIT")?;
        o.director_position = parse_var(&lookup, "CINEFOLD_DIRECTOR_POSITION")?;

        if let Some(raw) = lookup("CINEFOLD_MISSING_DIRECTOR") {
            o.missing_director = Some(match raw.trim().to_ascii_lowercase().as_str() {
                "drop" => MissingDirector::Drop,
                "retain" => MissingDirector::Retain,
                other => {
                    return Err(Error::Config(format!(
                        "CINEFOLD_MISSING_DIRECTOR: expected 'drop' or 'retain', got '{other}'"
                    )))
                }
            });
        }

        Ok(o)
    }

    /// Field-wise merge; values in `higher` win.
    pub fn merge(self, higher: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            data_path: higher.data_path.or(self.data_path),
            files: higher.files.or(self.files),
            delimiter: higher.delimiter.or(self.delimiter),
            null_marker: higher.null_marker.or(self.null_marker),
            quoting: higher.quoting.or(self.quoting),
            chunk_rows: higher.chunk_rows.or(self.chunk_rows),
            prefetch_chunks: higher.prefetch_chunks.or(self.prefetch_chunks),
            stream_threshold_bytes: higher.stream_threshold_bytes.or(self.stream_threshold_bytes),
            mem_cap_bytes: higher.mem_cap_bytes.or(self.mem_cap_bytes),
            read_buffer_bytes: higher.read_buffer_bytes.or(self.read_buffer_bytes),
            output: higher.output.or(self.output),
            format: higher.format.or(self.format),
            cast_limit: higher.cast_limit.or(self.cast_limit),
            director_position: higher.director_position.or(self.director_position),
            missing_director: higher.missing_director.or(self.missing_director),
            cast_categories: higher.cast_categories.or(self.cast_categories),
        }
    }

    /// Resolve relative paths in this layer against `base` (the directory of
    /// the file the layer was read from).
    pub fn rebase(mut self, base: &Path) -> Self {
        if let Some(p) = self.data_path.take() {
            self.data_path = Some(if p.is_relative() { base.join(p) } else { p });
        }
        if let Some(p) = self.output.take() {
            self.output = Some(if p.is_relative() { base.join(p) } else { p });
        }
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("{key}: cannot parse '{raw}': {e}"))),
    }
}

pub fn parse_delimiter(raw: &str) -> Result<char> {
    match raw {
        "\\t" | "tab" | "TAB" => return Ok('\t'),
        _ => {}
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(Error::Config(format!(
            "delimiter must be a single ASCII character, got '{raw}'"
        ))),
    }
}
