use super::contingency::ContingencyTable;
use crate::error::{ContingentError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF as _};

/// Outcome of Pearson's chi-square test of independence.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    /// Expected counts under independence, same shape as the observed table.
    pub expected: Vec<Vec<f64>>,
    /// Whether the Yates continuity correction was applied.
    pub corrected: bool,
}

/// Expected frequencies `row_total * col_total / total`.
///
/// # Errors
///
/// Fails on an empty table or a zero total.
pub fn expected_frequencies(table: &ContingencyTable) -> Result<Vec<Vec<f64>>> {
    let total = table.total();
    if table.is_empty() || total == 0 {
        return Err(ContingentError::EmptyInput(format!(
            "contingency table {}x{} has no observations",
            table.shape().0,
            table.shape().1
        )));
    }
    let total = total as f64;
    let col_totals = table.col_totals();
    Ok(table
        .row_totals()
        .into_iter()
        .map(|r| {
            col_totals
                .iter()
                .map(|&c| r as f64 * c as f64 / total)
                .collect()
        })
        .collect())
}

/// Pearson chi-square test with `dof = (R-1)(C-1)`.
///
/// When `correction` is set and the table has exactly one degree of freedom,
/// each `|O - E|` is shrunk by `min(0.5, |O - E|)` (Yates). A table with zero
/// degrees of freedom yields a statistic of 0 and a p-value of 1.
///
/// # Errors
///
/// Fails on an empty or zero-total table, and on tables with an all-zero row
/// or column since their expected frequencies contain zeros.
pub fn chi_square_test(table: &ContingencyTable, correction: bool) -> Result<ChiSquareResult> {
    let expected = expected_frequencies(table)?;
    if expected.iter().flatten().any(|&e| e <= 0.0) {
        return Err(ContingentError::EmptyInput(
            "contingency table has an all-zero row or column".to_owned(),
        ));
    }

    let (rows, cols) = table.shape();
    let dof = (rows - 1) * (cols - 1);
    if dof == 0 {
        return Ok(ChiSquareResult {
            statistic: 0.0,
            p_value: 1.0,
            dof,
            expected,
            corrected: false,
        });
    }

    let yates = correction && dof == 1;
    let mut statistic = 0.0;
    for (observed_row, expected_row) in table.counts().iter().zip(&expected) {
        for (&o, &e) in observed_row.iter().zip(expected_row) {
            let mut diff = (o as f64 - e).abs();
            if yates {
                diff -= diff.min(0.5);
            }
            statistic += diff * diff / e;
        }
    }

    let p_value = chi_square_sf(statistic, dof)?;
    tracing::trace!(statistic, p_value, dof, yates, "Chi-square test");

    Ok(ChiSquareResult {
        statistic,
        p_value,
        dof,
        expected,
        corrected: yates,
    })
}

/// Upper-tail probability of the chi-square distribution.
pub(crate) fn chi_square_sf(statistic: f64, dof: usize) -> Result<f64> {
    let dist =
        ChiSquared::new(dof as f64).map_err(|e| ContingentError::Numeric(e.to_string()))?;
    Ok(dist.sf(statistic).clamp(0.0, 1.0))
}
