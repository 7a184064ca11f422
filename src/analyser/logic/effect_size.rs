use super::chi_square::chi_square_test;
use super::contingency::ContingencyTable;
use crate::error::Result;

/// Cramér's V for `table`, using the chi-square statistic computed with the
/// given continuity `correction`.
///
/// Returns NaN for a zero-total table and exactly `0.0` when either
/// dimension has a single category.
///
/// # Errors
///
/// Propagates chi-square failures (all-zero rows or columns).
pub fn cramers_v(table: &ContingencyTable, correction: bool) -> Result<f64> {
    let n = table.total();
    let (rows, cols) = table.shape();
    if n == 0 {
        return Ok(f64::NAN);
    }
    if rows.min(cols) == 1 {
        return Ok(0.0);
    }
    let chi2 = chi_square_test(table, correction)?;
    Ok(cramers_v_from_statistic(chi2.statistic, n, rows.min(cols)))
}

/// `sqrt(chi2 / (n * (k - 1)))`, clamped to `[0, 1]`.
pub fn cramers_v_from_statistic(statistic: f64, n: u64, k: usize) -> f64 {
    if n == 0 {
        return f64::NAN;
    }
    if k <= 1 {
        return 0.0;
    }
    (statistic / (n as f64 * (k - 1) as f64)).sqrt().clamp(0.0, 1.0)
}
