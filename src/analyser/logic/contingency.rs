use super::types::Dataset;
use crate::error::{ContingentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Cross-tabulated counts of two categorical variables.
///
/// Rows are indexed by `row_labels`, columns by `col_labels`. Labels are the
/// distinct values observed in the source batch, sorted ascending.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContingencyTable {
    pub row_variable: String,
    pub col_variable: String,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Builds a table from explicit labels and a row-major count matrix.
    ///
    /// # Errors
    ///
    /// Fails if the matrix shape does not match the label counts.
    pub fn new(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        counts: Vec<Vec<u64>>,
    ) -> Result<Self> {
        if counts.len() != row_labels.len() {
            return Err(ContingentError::InvalidParameter(format!(
                "{} rows of counts for {} row labels",
                counts.len(),
                row_labels.len()
            )));
        }
        if let Some(bad) = counts.iter().find(|r| r.len() != col_labels.len()) {
            return Err(ContingentError::InvalidParameter(format!(
                "count row of length {} for {} column labels",
                bad.len(),
                col_labels.len()
            )));
        }
        Ok(Self {
            row_variable: String::new(),
            col_variable: String::new(),
            row_labels,
            col_labels,
            counts,
        })
    }

    /// Builds a table with positional labels (`r0`, `r1`, ... / `c0`, ...).
    pub fn from_counts(counts: Vec<Vec<u64>>) -> Result<Self> {
        let rows = counts.len();
        let cols = counts.first().map_or(0, Vec::len);
        Self::new(
            (0..rows).map(|i| format!("r{i}")).collect(),
            (0..cols).map(|j| format!("c{j}")).collect(),
            counts,
        )
    }

    pub fn with_variables(mut self, row: impl Into<String>, col: impl Into<String>) -> Self {
        self.row_variable = row.into();
        self.col_variable = col.into();
        self
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    pub fn is_empty(&self) -> bool {
        let (r, c) = self.shape();
        r == 0 || c == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u64> {
        self.counts.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|r| r.iter().sum()).collect()
    }

    pub fn col_totals(&self) -> Vec<u64> {
        let mut totals = vec![0; self.col_labels.len()];
        for row in &self.counts {
            for (total, &count) in totals.iter_mut().zip(row) {
                *total += count;
            }
        }
        totals
    }

    /// Two-row sub-table used by the post-hoc comparisons. Columns that are
    /// zero in both rows are dropped.
    pub fn row_pair(&self, first: usize, second: usize) -> Result<Self> {
        let (a, b) = match (self.counts.get(first), self.counts.get(second)) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(ContingentError::InvalidParameter(format!(
                    "row pair ({first}, {second}) out of range for {} rows",
                    self.row_labels.len()
                )));
            }
        };
        let keep: Vec<usize> = (0..self.col_labels.len())
            .filter(|&j| a.get(j).copied().unwrap_or(0) + b.get(j).copied().unwrap_or(0) > 0)
            .collect();
        let pick = |row: &[u64]| -> Vec<u64> {
            keep.iter()
                .map(|&j| row.get(j).copied().unwrap_or(0))
                .collect()
        };

        Ok(Self {
            row_variable: self.row_variable.clone(),
            col_variable: self.col_variable.clone(),
            row_labels: vec![
                self.row_labels.get(first).cloned().unwrap_or_default(),
                self.row_labels.get(second).cloned().unwrap_or_default(),
            ],
            col_labels: keep
                .iter()
                .filter_map(|&j| self.col_labels.get(j).cloned())
                .collect(),
            counts: vec![pick(a), pick(b)],
        })
    }

    /// Projects the table onto a canonical label set, filling unseen labels
    /// with zero counts. Observed labels missing from the canonical set are
    /// an error since their counts would be lost.
    ///
    /// # Errors
    ///
    /// Returns an invalid parameter error when an observed label with a
    /// non-zero count is absent from the requested labels.
    pub fn reindex(&self, row_labels: &[String], col_labels: &[String]) -> Result<Self> {
        let row_pos: HashMap<&str, usize> = self
            .row_labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();
        let col_pos: HashMap<&str, usize> = self
            .col_labels
            .iter()
            .enumerate()
            .map(|(j, l)| (l.as_str(), j))
            .collect();

        let covered_rows: BTreeSet<&str> = row_labels.iter().map(String::as_str).collect();
        let covered_cols: BTreeSet<&str> = col_labels.iter().map(String::as_str).collect();
        let totals = (self.row_totals(), self.col_totals());
        for (i, label) in self.row_labels.iter().enumerate() {
            if !covered_rows.contains(label.as_str()) && totals.0.get(i).is_some_and(|&t| t > 0) {
                return Err(ContingentError::InvalidParameter(format!(
                    "row label '{label}' is not part of the canonical set"
                )));
            }
        }
        for (j, label) in self.col_labels.iter().enumerate() {
            if !covered_cols.contains(label.as_str()) && totals.1.get(j).is_some_and(|&t| t > 0) {
                return Err(ContingentError::InvalidParameter(format!(
                    "column label '{label}' is not part of the canonical set"
                )));
            }
        }

        let counts = row_labels
            .iter()
            .map(|r| {
                col_labels
                    .iter()
                    .map(|c| {
                        match (row_pos.get(r.as_str()), col_pos.get(c.as_str())) {
                            (Some(&i), Some(&j)) => self.get(i, j).unwrap_or(0),
                            _ => 0,
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            row_variable: self.row_variable.clone(),
            col_variable: self.col_variable.clone(),
            row_labels: row_labels.to_vec(),
            col_labels: col_labels.to_vec(),
            counts,
        })
    }
}

impl fmt::Display for ContingencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let corner = format!("{} \\ {}", self.row_variable, self.col_variable);
        let label_width = self
            .row_labels
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(corner.chars().count()))
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = self
            .col_labels
            .iter()
            .enumerate()
            .map(|(j, label)| {
                self.counts
                    .iter()
                    .filter_map(|r| r.get(j))
                    .map(|c| c.to_string().len())
                    .chain(std::iter::once(label.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{corner:<label_width$}")?;
        for (label, width) in self.col_labels.iter().zip(&widths) {
            write!(f, "  {label:>width$}")?;
        }
        writeln!(f)?;
        for (label, row) in self.row_labels.iter().zip(&self.counts) {
            write!(f, "{label:<label_width$}")?;
            for (count, width) in row.iter().zip(&widths) {
                write!(f, "  {count:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Cross-tabulates `row` against `col` within `batch`.
///
/// Only categories observed in this batch get a row or column. Absent cells
/// are tallied under `missing_label`, so the table total always equals the
/// batch length.
///
/// # Errors
///
/// Returns a schema error if either column is absent.
pub fn build_contingency_table(
    batch: &Dataset,
    row: &str,
    col: &str,
    missing_label: &str,
) -> Result<ContingencyTable> {
    let row_column = batch.column(row)?;
    let col_column = batch.column(col)?;

    let pairs: Vec<(String, String)> = (0..batch.height())
        .map(|i| {
            (
                row_column.label_or(i, missing_label),
                col_column.label_or(i, missing_label),
            )
        })
        .collect();

    let row_labels: Vec<String> = pairs
        .iter()
        .map(|(r, _)| r.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let col_labels: Vec<String> = pairs
        .iter()
        .map(|(_, c)| c.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let row_pos: HashMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let col_pos: HashMap<&str, usize> = col_labels
        .iter()
        .enumerate()
        .map(|(j, l)| (l.as_str(), j))
        .collect();

    let mut counts = vec![vec![0_u64; col_labels.len()]; row_labels.len()];
    for (r, c) in &pairs {
        if let (Some(&i), Some(&j)) = (row_pos.get(r.as_str()), col_pos.get(c.as_str()))
            && let Some(cell) = counts.get_mut(i).and_then(|cells| cells.get_mut(j))
        {
            *cell += 1;
        }
    }

    Ok(ContingencyTable {
        row_variable: row.to_owned(),
        col_variable: col.to_owned(),
        row_labels,
        col_labels,
        counts,
    })
}
