use super::chi_square::{ChiSquareResult, chi_square_test};
use super::contingency::{ContingencyTable, build_contingency_table};
use super::effect_size::cramers_v_from_statistic;
use super::fisher::{FisherResult, fisher_exact};
use super::posthoc::{PostHocResultSet, pairwise_posthoc};
use super::types::{AnalysisOptions, Batch, BatchKey, Dataset};
use crate::error::{ContingentError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Everything computed for one batch.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SummaryRecord {
    pub batch: String,
    pub key: Option<BatchKey>,
    pub records: usize,
    pub table: ContingencyTable,
    pub chi2: ChiSquareResult,
    /// Present only for 2×2 tables.
    pub fisher: Option<FisherResult>,
    pub cramers_v: f64,
    pub posthoc: PostHocResultSet,
}

/// Cooperative cancellation and progress reporting for a batch run.
///
/// Cancellation is honoured only between batches, never mid-test.
#[derive(Clone, Debug, Default)]
pub struct RunControl {
    cancel: Arc<AtomicBool>,
    progress: Arc<AtomicU64>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Number of batches finished so far.
    pub fn completed(&self) -> u64 {
        self.progress.load(Ordering::SeqCst)
    }

    fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ContingentError::Aborted)
        } else {
            Ok(())
        }
    }

    fn tick(&self) {
        self.progress.fetch_add(1, Ordering::SeqCst);
    }
}

/// Runs the full test battery on one batch of data.
///
/// # Errors
///
/// Returns a schema error if `row` or `col` is absent and an empty-input
/// error if the batch has no records.
pub fn summarize_batch(
    label: &str,
    data: &Dataset,
    row: &str,
    col: &str,
    missing_label: &str,
    options: &AnalysisOptions,
) -> Result<SummaryRecord> {
    let table = build_contingency_table(data, row, col, missing_label)?;
    summarize_table(label, table, options)
}

/// Runs the test battery on an already built table.
///
/// # Errors
///
/// Fails on an empty or zero-total table.
pub fn summarize_table(
    label: &str,
    table: ContingencyTable,
    options: &AnalysisOptions,
) -> Result<SummaryRecord> {
    let chi2 = chi_square_test(&table, options.yates_correction)?;
    let fisher = fisher_exact(&table);
    let (rows, cols) = table.shape();
    let cramers_v = cramers_v_from_statistic(chi2.statistic, table.total(), rows.min(cols));
    let posthoc = pairwise_posthoc(
        &table,
        options.alpha,
        options.posthoc_correction,
        options.yates_correction,
    )?;

    tracing::debug!(
        batch = label,
        rows,
        cols,
        chi2 = chi2.statistic,
        p_value = chi2.p_value,
        cramers_v,
        fisher = fisher.is_some(),
        "Summarised batch"
    );

    Ok(SummaryRecord {
        batch: label.to_owned(),
        key: None,
        records: usize::try_from(table.total()).unwrap_or(usize::MAX),
        table,
        chi2,
        fisher,
        cramers_v,
        posthoc,
    })
}

fn summarize_one(
    batch: &Batch,
    row: &str,
    col: &str,
    missing_label: &str,
    options: &AnalysisOptions,
) -> Result<SummaryRecord> {
    let mut record = summarize_batch(
        &batch.label(),
        batch.data(),
        row,
        col,
        missing_label,
        options,
    )?;
    record.key = Some(batch.key().clone());
    record.records = batch.len();
    Ok(record)
}

/// Summarises every batch in emission order.
///
/// # Errors
///
/// Stops at the first failing batch, or with [`ContingentError::Aborted`]
/// once `control` is cancelled.
pub fn summarize_batches(
    batches: &[Batch],
    row: &str,
    col: &str,
    missing_label: &str,
    options: &AnalysisOptions,
    control: &RunControl,
) -> Result<Vec<SummaryRecord>> {
    options.validate()?;
    let mut records = Vec::with_capacity(batches.len());
    for batch in batches {
        control.checkpoint()?;
        records.push(summarize_one(batch, row, col, missing_label, options)?);
        control.tick();
    }
    tracing::info!(batches = records.len(), row, col, "Batch summary complete");
    Ok(records)
}

/// Parallel variant of [`summarize_batches`]; results keep emission order.
///
/// # Errors
///
/// Same as [`summarize_batches`]. Batches already running when the run is
/// cancelled finish, later ones are skipped.
pub fn summarize_batches_parallel(
    batches: &[Batch],
    row: &str,
    col: &str,
    missing_label: &str,
    options: &AnalysisOptions,
    control: &RunControl,
) -> Result<Vec<SummaryRecord>> {
    options.validate()?;
    let records = batches
        .par_iter()
        .map(|batch| -> Result<SummaryRecord> {
            control.checkpoint()?;
            let record = summarize_one(batch, row, col, missing_label, options)?;
            control.tick();
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(
        batches = records.len(),
        row,
        col,
        "Parallel batch summary complete"
    );
    Ok(records)
}
