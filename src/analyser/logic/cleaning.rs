use super::types::{CleaningOptions, Column, ColumnData, Dataset};
use crate::error::Result;

/// Normalises the named categorical columns of `dataset`.
///
/// Each value is trimmed; empty strings, configured null tokens and absent
/// cells become `options.missing_label`. Numeric columns named here are
/// turned into their textual labels. The input is left untouched.
///
/// # Errors
///
/// Returns a schema error if any named column is absent.
pub fn clean_categorical_columns(
    dataset: &Dataset,
    columns: &[&str],
    options: &CleaningOptions,
) -> Result<Dataset> {
    // Resolve every name before doing any work.
    for name in columns {
        dataset.column(name)?;
    }

    let mut cleaned = dataset.clone();
    for name in columns {
        let column = dataset.column(name)?;
        let replaced = clean_column(column, options);
        let missing = count_label(&replaced, &options.missing_label);
        tracing::debug!(
            column = %name,
            missing,
            rows = replaced.len(),
            "Cleaned categorical column"
        );
        cleaned.replace_column(replaced)?;
    }
    Ok(cleaned)
}

/// Trims `raw` and maps blank or null-like text to the missing label.
pub fn normalise_label(raw: Option<&str>, options: &CleaningOptions) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() && !is_null_token(s, options) => s.to_owned(),
        _ => options.missing_label.clone(),
    }
}

fn is_null_token(s: &str, options: &CleaningOptions) -> bool {
    options.null_tokens.iter().any(|t| t == s)
}

fn clean_column(column: &Column, options: &CleaningOptions) -> Column {
    let values: Vec<Option<String>> = match &column.data {
        ColumnData::Categorical(values) => values
            .iter()
            .map(|v| Some(normalise_label(v.as_deref(), options)))
            .collect(),
        ColumnData::Numeric(_) => column
            .iter()
            .map(|v| Some(normalise_label(v.label().as_deref(), options)))
            .collect(),
    };
    Column {
        name: column.name.clone(),
        data: ColumnData::Categorical(values),
    }
}

fn count_label(column: &Column, label: &str) -> usize {
    match &column.data {
        ColumnData::Categorical(values) => values
            .iter()
            .filter(|v| v.as_deref() == Some(label))
            .count(),
        ColumnData::Numeric(_) => 0,
    }
}
