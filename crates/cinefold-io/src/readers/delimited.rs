//! Record Source over delimited flat files.
//!
//! A `DelimitedSource` owns its file handle; dropping it (exhausted or not)
//! closes the file. Rows come out in file order as raw strings, with the
//! configured null marker mapped to `Scalar::Null`. An optional projection
//! restricts the columns materialized; all other cells are skipped without
//! allocation.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cinefold_core::config::PipelineConfig;
use cinefold_core::types::{RowBatch, Scalar};

use crate::buf::BoundedBufReader;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub delimiter: u8,
    pub null_marker: String,
    pub quoting: bool,
    /// Column allow-list, in output order. `None` keeps every header column.
    pub projection: Option<Vec<String>>,
    /// Appended to the projection when the header has them; skipped otherwise.
    pub optional: Vec<String>,
    pub buffer_bytes: usize,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            null_marker: cinefold_core::config::DEFAULT_NULL_MARKER.to_string(),
            quoting: false,
            projection: None,
            optional: Vec::new(),
            buffer_bytes: 1024 * 1024,
        }
    }
}

impl SourceOptions {
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self {
            delimiter: cfg.delimiter_byte(),
            null_marker: cfg.null_marker.clone(),
            quoting: cfg.quoting,
            projection: None,
            optional: Vec::new(),
            buffer_bytes: cfg.read_buffer_bytes,
        }
    }

    pub fn with_projection<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.projection = Some(columns.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    pub fn with_optional<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.optional = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }
}

/// One raw row: column name to string-or-null.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values[idx].as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }
}

pub struct DelimitedSource {
    path: PathBuf,
    reader: csv::Reader<BoundedBufReader<File>>,
    columns: Arc<[String]>,
    /// Positions of `columns` within a full record.
    indices: Vec<usize>,
    null_marker: String,
    record: csv::StringRecord,
    progress: Arc<AtomicU64>,
    file_len: u64,
    exhausted: bool,
}

impl DelimitedSource {
    /// Open `path` and parse its header. Fails if the file cannot be opened,
    /// the header is empty or unreadable, or a projected column is absent.
    pub fn open(path: impl AsRef<Path>, opts: &SourceOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        let file_len = file.metadata().map(|m| m.len()).unwrap_or(0);
        let buffered = BoundedBufReader::with_capacity(opts.buffer_bytes, file);
        let progress = buffered.progress();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(opts.delimiter)
            .quoting(opts.quoting)
            .has_headers(true)
            .flexible(false)
            .from_reader(buffered);

        let header = reader
            .headers()
            .map_err(|e| Error::Header {
                path: path.clone(),
                message: e.to_string(),
            })?
            .clone();
        if header.is_empty() || header.iter().all(|h| h.trim().is_empty()) {
            return Err(Error::Header {
                path,
                message: "file has no header row".into(),
            });
        }

        let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
        let (columns, indices) = match &opts.projection {
            None => (header.clone(), (0..header.len()).collect()),
            Some(wanted) => {
                let mut columns = wanted.clone();
                let mut indices = Vec::with_capacity(wanted.len() + opts.optional.len());
                for name in wanted {
                    let idx = header.iter().position(|h| h == name).ok_or_else(|| {
                        Error::Header {
                            path: path.clone(),
                            message: format!("missing column '{name}'"),
                        }
                    })?;
                    indices.push(idx);
                }
                for name in &opts.optional {
                    if let Some(idx) = header.iter().position(|h| h == name) {
                        columns.push(name.clone());
                        indices.push(idx);
                    }
                }
                (columns, indices)
            }
        };

        Ok(Self {
            path,
            reader,
            columns: columns.into(),
            indices,
            null_marker: opts.null_marker.clone(),
            record: csv::StringRecord::new(),
            progress,
            file_len,
            exhausted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Projected column names, in output order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Size of the underlying file at open time.
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Bytes pulled from the file so far (includes read-ahead).
    pub fn bytes_read(&self) -> u64 {
        self.progress.load(Ordering::Relaxed)
    }

    /// Read the next record into `self.record`. `Ok(false)` at end of file.
    fn advance(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.exhausted = true;
                Ok(false)
            }
            Err(source) => {
                self.exhausted = true;
                let line = source
                    .position()
                    .map(|p| p.line())
                    .unwrap_or_else(|| self.reader.position().line());
                Err(Error::Record {
                    path: self.path.clone(),
                    line,
                    source,
                })
            }
        }
    }

    fn cell(&self, idx: usize) -> Option<&str> {
        self.record
            .get(idx)
            .filter(|raw| *raw != self.null_marker.as_str())
    }

    pub fn next_row(&mut self) -> Result<Option<RawRow>> {
        if !self.advance()? {
            return Ok(None);
        }
        let values = self
            .indices
            .iter()
            .map(|&i| self.cell(i).map(str::to_string))
            .collect();
        Ok(Some(RawRow {
            columns: Arc::clone(&self.columns),
            values,
        }))
    }

    /// Read up to `limit_rows` rows as one batch. `None` once the file is done.
    pub fn next_batch(&mut self, limit_rows: usize) -> Result<Option<RowBatch>> {
        let mut batch = RowBatch::with_columns(&self.columns[..]);
        let mut rows = 0;
        while rows < limit_rows.max(1) {
            if !self.advance()? {
                break;
            }
            for (col, &i) in batch.columns.iter_mut().zip(&self.indices) {
                let v = match self.record.get(i) {
                    Some(raw) => Scalar::from_raw(raw, &self.null_marker),
                    None => Scalar::Null,
                };
                col.values.push(v);
            }
            rows += 1;
        }
        Ok(if rows == 0 { None } else { Some(batch) })
    }

    /// Row-at-a-time iteration.
    pub fn rows(self) -> Rows {
        Rows { source: self }
    }

    /// Bounded chunked iteration; each item holds at most `chunk_rows` rows.
    pub fn chunks(self, chunk_rows: usize) -> Chunks {
        Chunks {
            source: self,
            chunk_rows: chunk_rows.max(1),
            failed: false,
        }
    }
}

pub struct Rows {
    source: DelimitedSource,
}

impl Iterator for Rows {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_row().transpose()
    }
}

pub struct Chunks {
    source: DelimitedSource,
    chunk_rows: usize,
    failed: bool,
}

impl Chunks {
    pub fn source(&self) -> &DelimitedSource {
        &self.source
    }
}

impl Iterator for Chunks {
    type Item = Result<RowBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.source.next_batch(self.chunk_rows) {
            Ok(b) => b.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
