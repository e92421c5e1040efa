//! Table Normalizer: raw rows in, typed rows out.
//!
//! A row is either kept, filtered by a domain rule (e.g. title kind), or
//! rejected for incompleteness. Filtering and rejection are both silent,
//! counted drops; only a structurally wrong batch (a policy column missing
//! from it) is an error.

use std::marker::PhantomData;

use cinefold_core::observe::TableKind;
use cinefold_core::policy::EnrichmentPolicy;
use cinefold_core::report::{RejectStats, TableStats};
use cinefold_core::types::{Column, RowBatch, Scalar};

use crate::traits::OpError;

/// Why a row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingRequired(&'static str),
    BadNumeric(&'static str),
    MissingDirector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Int,
    Float,
}

/// Which columns are read, which must be non-null, and which must coerce to
/// numbers. Header columns outside `read` and `optional` are dropped at the
/// source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPolicy {
    /// Must appear in the header.
    pub read: &'static [&'static str],
    /// Read when the header has them, null otherwise.
    pub optional: &'static [&'static str],
    pub required: &'static [&'static str],
    pub numeric: &'static [(&'static str, NumericKind)],
}

/// Per-table typing rules.
pub trait TableSpec: Sized + Send + 'static {
    const KIND: TableKind;

    fn policy() -> &'static ColumnPolicy;

    /// Domain filter applied before validation. Filtered rows are not rejections.
    fn keep(_row: &RowView<'_>, _policy: &EnrichmentPolicy) -> bool {
        true
    }

    /// Build the typed row. Required and numeric columns have already been
    /// checked when this runs.
    fn build(row: &RowView<'_>, policy: &EnrichmentPolicy) -> Result<Self, Rejection>;
}

/// Result of normalizing one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Kept(T),
    Filtered,
    Rejected(Rejection),
}

static NULL: Scalar = Scalar::Null;

/// Borrowed view of one row of a batch, addressed by column name.
pub struct RowView<'a> {
    columns: &'a [Option<&'a Column>],
    names: &'a [&'static str],
    row: usize,
}

impl<'a> RowView<'a> {
    fn value(&self, name: &str) -> &'a Scalar {
        let column = self
            .names
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.columns[i]);
        match column {
            Some(c) => &c.values[self.row],
            None => &NULL,
        }
    }

    /// Raw string, or `None` for null.
    pub fn str(&self, name: &str) -> Option<&'a str> {
        self.value(name).as_str()
    }

    pub fn required(&self, name: &'static str) -> Result<&'a str, Rejection> {
        self.str(name).ok_or(Rejection::MissingRequired(name))
    }

    pub fn int(&self, name: &'static str) -> Result<i64, Rejection> {
        let raw = self.required(name)?;
        coerce_int(raw).ok_or(Rejection::BadNumeric(name))
    }

    pub fn float(&self, name: &'static str) -> Result<f64, Rejection> {
        let raw = self.required(name)?;
        coerce_float(raw).ok_or(Rejection::BadNumeric(name))
    }
}

/// Integer coercion. Accepts integral floats such as `"90.0"`.
pub fn coerce_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

pub fn coerce_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

pub struct TableNormalizer<T: TableSpec> {
    policy: EnrichmentPolicy,
    /// `read` then `optional`, the order `resolve` returns columns in.
    names: Vec<&'static str>,
    _table: PhantomData<fn() -> T>,
}

impl<T: TableSpec> TableNormalizer<T> {
    pub fn new(policy: &EnrichmentPolicy) -> Self {
        let columns = T::policy();
        Self {
            policy: policy.clone(),
            names: columns.read.iter().chain(columns.optional).copied().collect(),
            _table: PhantomData,
        }
    }

    /// Columns the source must provide.
    pub fn projection(&self) -> &'static [&'static str] {
        T::policy().read
    }

    /// Columns to take from the source when its header has them.
    pub fn optional(&self) -> &'static [&'static str] {
        T::policy().optional
    }

    fn classify(&self, view: &RowView<'_>) -> Outcome<T> {
        if !T::keep(view, &self.policy) {
            return Outcome::Filtered;
        }
        let policy = T::policy();
        for &col in policy.required {
            if view.str(col).is_none() {
                return Outcome::Rejected(Rejection::MissingRequired(col));
            }
        }
        for &(col, kind) in policy.numeric {
            if let Some(raw) = view.str(col) {
                let ok = match kind {
                    NumericKind::Int => coerce_int(raw).is_some(),
                    NumericKind::Float => coerce_float(raw).is_some(),
                };
                if !ok {
                    return Outcome::Rejected(Rejection::BadNumeric(col));
                }
            }
        }
        match T::build(view, &self.policy) {
            Ok(row) => Outcome::Kept(row),
            Err(r) => Outcome::Rejected(r),
        }
    }

    fn resolve<'b>(&self, batch: &'b RowBatch) -> Result<Vec<Option<&'b Column>>, OpError> {
        let policy = T::policy();
        let mut columns = Vec::with_capacity(self.names.len());
        for name in policy.read {
            let column = batch.column(name).ok_or_else(|| {
                OpError::Schema(format!("{} batch lacks column '{}'", T::KIND, name))
            })?;
            columns.push(Some(column));
        }
        columns.extend(policy.optional.iter().map(|name| batch.column(name)));
        Ok(columns)
    }

    /// Normalize a whole batch, appending kept rows to `out`.
    pub fn normalize_batch(&self, batch: &RowBatch, out: &mut Vec<T>) -> Result<TableStats, OpError> {
        let columns = self.resolve(batch)?;

        let mut stats = TableStats {
            chunks: 1,
            ..Default::default()
        };
        let rows = batch.num_rows();
        out.reserve(rows);
        for row in 0..rows {
            let view = RowView {
                columns: &columns,
                names: &self.names,
                row,
            };
            stats.rows_read += 1;
            match self.classify(&view) {
                Outcome::Kept(t) => {
                    stats.rows_kept += 1;
                    out.push(t);
                }
                Outcome::Filtered => stats.rows_filtered += 1,
                Outcome::Rejected(r) => count_rejection(&mut stats.rejected, r),
            }
        }
        Ok(stats)
    }
}

fn count_rejection(stats: &mut RejectStats, r: Rejection) {
    match r {
        Rejection::MissingRequired(_) => stats.missing_required += 1,
        Rejection::BadNumeric(_) => stats.bad_numeric += 1,
        Rejection::MissingDirector => stats.missing_director += 1,
    }
}
