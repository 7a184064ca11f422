use crate::error::{ContingentError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Reserved category that replaces blank and null-like values.
pub const MISSING_LABEL: &str = "Missing";

/// Default alpha for post-hoc significance flags.
pub const DEFAULT_ALPHA: f64 = 0.05;

// DATA STRUCTURES

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categorical => "Categorical",
            Self::Numeric => "Numeric",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Categorical(Vec<Option<String>>),
    Numeric(Vec<Option<f64>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Categorical(v) => v.len(),
            Self::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Categorical(_) => ColumnKind::Categorical,
            Self::Numeric(_) => ColumnKind::Numeric,
        }
    }

    fn take(&self, indices: &[usize]) -> Self {
        match self {
            Self::Categorical(v) => {
                Self::Categorical(indices.iter().filter_map(|&i| v.get(i).cloned()).collect())
            }
            Self::Numeric(v) => {
                Self::Numeric(indices.iter().filter_map(|&i| v.get(i).copied()).collect())
            }
        }
    }
}

/// Borrowed view of a single cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<'a> {
    Null,
    Text(&'a str),
    Number(f64),
}

impl Value<'_> {
    /// Nulls and NaN both count as absent.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Number(v) => v.is_nan(),
            Self::Text(_) => false,
        }
    }

    /// Textual category label, `None` for absent values.
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some((*s).to_owned()),
            Self::Number(v) if v.is_nan() => None,
            Self::Number(v) => Some(format_number(*v)),
        }
    }

    /// Ascending order with absent values sorted after everything else.
    /// Numbers sort before text when a column mixes both.
    pub fn cmp_nulls_last(&self, other: &Self) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), _) => Ordering::Less,
            _ => Ordering::Greater,
        }
    }
}

/// Renders a numeric cell as a category label. Integral values drop the
/// fractional part so that `3.0` and a CSV `3` share one label.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn categorical<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values.into_iter().map(|v| v.map(Into::into)).collect()),
        }
    }

    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn value(&self, row: usize) -> Value<'_> {
        match &self.data {
            ColumnData::Categorical(v) => match v.get(row) {
                Some(Some(s)) => Value::Text(s.as_str()),
                _ => Value::Null,
            },
            ColumnData::Numeric(v) => match v.get(row) {
                Some(Some(x)) => Value::Number(*x),
                _ => Value::Null,
            },
        }
    }

    /// Category label for a row, with absent values mapped to `missing_label`.
    pub fn label_or(&self, row: usize, missing_label: &str) -> String {
        self.value(row)
            .label()
            .unwrap_or_else(|| missing_label.to_owned())
    }

    pub fn iter(&self) -> impl Iterator<Item = Value<'_>> + '_ {
        (0..self.len()).map(move |i| self.value(i))
    }

    /// Numeric values of the column, failing on a categorical column.
    pub fn numeric_values(&self) -> Result<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Ok(v),
            ColumnData::Categorical(_) => Err(ContingentError::ColumnType(format!(
                "column '{}' is categorical, a numeric column is required",
                self.name
            ))),
        }
    }
}

/// In-memory table of named, equally long columns.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ContingentError::InvalidParameter(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(ContingentError::InvalidParameter(format!(
                    "column '{}' has {} rows, expected {expected}",
                    bad.name,
                    bad.len()
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn ensure_non_empty(&self) -> Result<()> {
        if self.is_empty() {
            Err(ContingentError::EmptyInput("dataset has no records".to_owned()))
        } else {
            Ok(())
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ContingentError::missing_column(name))
    }

    /// Swaps in a column of the same name and length.
    pub(crate) fn replace_column(&mut self, column: Column) -> Result<()> {
        let height = self.height();
        let slot = self
            .columns
            .iter_mut()
            .find(|c| c.name == column.name)
            .ok_or_else(|| ContingentError::missing_column(&column.name))?;
        if column.len() != height {
            return Err(ContingentError::InvalidParameter(format!(
                "replacement for '{}' has {} rows, expected {height}",
                column.name,
                column.len()
            )));
        }
        *slot = column;
        Ok(())
    }

    /// New dataset holding the given rows, in the given order.
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.take(indices),
                })
                .collect(),
        }
    }

    pub fn slice(&self, offset: usize, len: usize) -> Self {
        let end = offset.saturating_add(len).min(self.height());
        let indices: Vec<usize> = (offset.min(end)..end).collect();
        self.take(&indices)
    }
}

/// Identifies where a batch came from.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BatchKey {
    /// The unpartitioned dataset.
    All,
    /// All records sharing one value of the key column.
    Group { column: String, value: String },
    /// Records `start..end` of the sorted dataset.
    Window {
        index: usize,
        start: usize,
        end: usize,
    },
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Group { value, .. } => write!(f, "{value}"),
            Self::Window { index, start, end } => write!(f, "window_{index}_{start}-{end}"),
        }
    }
}

/// An immutable slice of the dataset handed to the contingency builder.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    key: BatchKey,
    data: Dataset,
}

impl Batch {
    pub(crate) fn new(key: BatchKey, data: Dataset) -> Self {
        Self { key, data }
    }

    pub fn key(&self) -> &BatchKey {
        &self.key
    }

    pub fn label(&self) -> String {
        self.key.to_string()
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.height()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// OPTIONS

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CleaningOptions {
    pub missing_label: String,
    /// Compared after trimming; the empty string is always missing.
    pub null_tokens: Vec<String>,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            missing_label: MISSING_LABEL.to_owned(),
            null_tokens: ["nan", "NaN", "None", "null", "NULL", "N/A"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOrder {
    #[default]
    FirstOccurrence,
    SortedKey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowSpec {
    pub size: usize,
    pub step: usize,
    #[serde(default)]
    pub descending: bool,
}

impl WindowSpec {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(ContingentError::InvalidParameter(
                "window_size must be at least 1".to_owned(),
            ));
        }
        if self.step == 0 {
            return Err(ContingentError::InvalidParameter(
                "step must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Multiple-comparison procedure applied to post-hoc p-values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Correction {
    #[default]
    Bonferroni,
    Holm,
}

impl Correction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bonferroni => "bonferroni",
            Self::Holm => "holm",
        }
    }
}

impl FromStr for Correction {
    type Err = ContingentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bonferroni" => Ok(Self::Bonferroni),
            "holm" => Ok(Self::Holm),
            other => Err(ContingentError::InvalidParameter(format!(
                "unknown correction '{other}', expected 'bonferroni' or 'holm'"
            ))),
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters shared by every per-batch analysis.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub alpha: f64,
    /// Yates continuity correction for one-degree-of-freedom tables.
    pub yates_correction: bool,
    pub posthoc_correction: Correction,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            yates_correction: true,
            posthoc_correction: Correction::Bonferroni,
        }
    }
}

impl AnalysisOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ContingentError::InvalidParameter(format!(
                "alpha must lie strictly between 0 and 1, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}
