//! Lightweight raw value/column containers for rows read from delimited files.
//!
//! Cells are either text or null; typed values appear after normalization in
//! `cinefold-operators`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Str(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Raw cell from a source: the null marker maps to `Null`.
    pub fn from_raw(raw: &str, null_marker: &str) -> Self {
        if raw == null_marker {
            Scalar::Null
        } else {
            Scalar::Str(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Scalar>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Column-major batch of raw rows. One batch is one chunk of a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowBatch {
    pub columns: Vec<Column>,
}

impl RowBatch {
    /// Empty batch with the given column names.
    pub fn with_columns<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            columns: names.iter().map(|n| Column::new(n.as_ref())).collect(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Append one row; `values` must line up with `columns`.
    pub fn push_row(&mut self, values: Vec<Scalar>) -> Result<(), String> {
        if values.len() != self.columns.len() {
            return Err(format!(
                "row has {} values but batch has {} columns",
                values.len(),
                self.columns.len()
            ));
        }
        for (col, v) in self.columns.iter_mut().zip(values) {
            col.values.push(v);
        }
        Ok(())
    }

    /// Append all rows of `other`, matching columns by name.
    pub fn append(&mut self, other: &RowBatch) -> Result<(), String> {
        for col in &mut self.columns {
            let src = other
                .column(&col.name)
                .ok_or_else(|| format!("column '{}' missing from appended batch", col.name))?;
            col.values.extend(src.values.iter().cloned());
        }
        Ok(())
    }
}
