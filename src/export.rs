//! JSON export of analysis results.

use crate::analyser::logic::{AnalysisReport, SummaryRecord};
use crate::error::{Result, ResultExt as _};
use crate::utils::sanitize_file_stem;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Writes one batch summary to `<out_dir>/<batch>_summary.json` and returns
/// the path written.
///
/// # Errors
///
/// Fails if the directory cannot be created or the file cannot be written.
pub fn export_summary(record: &SummaryRecord, out_dir: &Path) -> Result<PathBuf> {
    write_summary(record, out_dir, &sanitize_file_stem(&record.batch))
}

fn write_summary(record: &SummaryRecord, out_dir: &Path, stem: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let path = out_dir.join(format!("{stem}_summary.json"));
    write_json(record, &path)?;
    tracing::debug!(batch = %record.batch, path = %path.display(), "Exported batch summary");
    Ok(path)
}

/// Writes every summary of `report` into `out_dir`, one file per batch.
///
/// Labels that sanitize to the same stem (`North America` and
/// `North_America`) get `_2`, `_3`, ... suffixes in emission order, so no
/// batch overwrites another.
///
/// # Errors
///
/// Stops at the first failed write.
pub fn export_summaries(report: &AnalysisReport, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let labels: Vec<&str> = report.summaries.iter().map(|s| s.batch.as_str()).collect();
    report
        .summaries
        .iter()
        .zip(unique_file_stems(&labels))
        .map(|(record, stem)| write_summary(record, out_dir, &stem))
        .collect()
}

/// Sanitized stems for `labels`, suffixed until no two compare equal
/// ignoring case.
fn unique_file_stems(labels: &[&str]) -> Vec<String> {
    let mut taken = HashSet::with_capacity(labels.len());
    labels
        .iter()
        .map(|label| {
            let base = sanitize_file_stem(label);
            let mut stem = base.clone();
            let mut n = 1_usize;
            while !taken.insert(stem.to_lowercase()) {
                n += 1;
                stem = format!("{base}_{n}");
            }
            if n > 1 {
                tracing::warn!(
                    batch = %label,
                    stem = %stem,
                    "Batch file name collided, added suffix"
                );
            }
            stem
        })
        .collect()
}

/// Writes the whole run as pretty JSON.
///
/// # Errors
///
/// Fails if the file cannot be written.
pub fn export_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    write_json(report, path)?;
    tracing::info!(
        path = %path.display(),
        batches = report.summaries.len(),
        "Exported analysis report"
    );
    Ok(())
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))
}
