use super::types::{Column, Dataset};
use crate::error::{ContingentError, Result, ResultExt as _};
use polars::prelude::*;
use std::path::Path;

/// Reads a CSV or Parquet file into a [`Dataset`].
///
/// # Errors
///
/// Fails on unreadable or unsupported files and on files without records.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let df = load_df(path)?;
    let dataset = dataset_from_frame(&df)?;
    if dataset.is_empty() {
        return Err(ContingentError::EmptyInput(format!(
            "{} contains no records",
            path.display()
        )));
    }
    tracing::info!(
        path = %path.display(),
        rows = dataset.height(),
        columns = dataset.width(),
        "Loaded dataset"
    );
    Ok(dataset)
}

pub fn load_df(path: &Path) -> Result<DataFrame> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    let df = match ext.as_str() {
        "csv" | "txt" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_has_header(true)
            .finish()?
            .collect()
            .context("Failed to read CSV")?,
        "parquet" => ParquetReader::new(std::fs::File::open(path)?)
            .finish()
            .context("Failed to read Parquet")?,
        _ => {
            return Err(ContingentError::InvalidParameter(format!(
                "Unsupported file extension: {ext}"
            )));
        }
    };
    Ok(df)
}

/// Converts a polars frame column by column. Numeric dtypes become numeric
/// columns; everything else is rendered as text.
pub fn dataset_from_frame(df: &DataFrame) -> Result<Dataset> {
    let mut columns = Vec::with_capacity(df.width());
    for col in df.get_columns() {
        let name = col.name().to_string();
        let series = col.as_materialized_series();
        let column = if series.dtype().is_primitive_numeric() {
            let values = series.cast(&DataType::Float64)?;
            Column::numeric(name, values.f64()?.into_iter().collect())
        } else {
            let values = series.cast(&DataType::String)?;
            Column::categorical(
                name,
                values
                    .str()?
                    .into_iter()
                    .map(|v| v.map(str::to_owned))
                    .collect::<Vec<_>>(),
            )
        };
        columns.push(column);
    }
    Dataset::new(columns)
}
