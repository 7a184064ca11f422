use super::contingency::ContingencyTable;
use serde::{Deserialize, Serialize};
use statrs::function::factorial::ln_binomial;

/// Relative tolerance when comparing table probabilities to the observed one.
const PMF_TOLERANCE: f64 = 1e-7;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct FisherResult {
    /// Sample odds ratio `(a*d) / (b*c)`.
    pub odds_ratio: f64,
    /// Two-sided exact p-value.
    pub p_value: f64,
}

/// Fisher's exact test for a 2×2 table.
///
/// Returns `None` for any other shape. The two-sided p-value sums the
/// hypergeometric probabilities of every table with the observed margins that
/// is no more likely than the observed table. A zero margin gives an undefined
/// odds ratio (NaN) and a p-value of 1.
pub fn fisher_exact(table: &ContingencyTable) -> Option<FisherResult> {
    if table.shape() != (2, 2) {
        return None;
    }
    let cell = |i, j| table.get(i, j).unwrap_or(0);
    let (a, b, c, d) = (cell(0, 0), cell(0, 1), cell(1, 0), cell(1, 1));

    let row1 = a + b;
    let col1 = a + c;
    let n = a + b + c + d;
    if row1 == 0 || c + d == 0 || col1 == 0 || b + d == 0 {
        return Some(FisherResult {
            odds_ratio: f64::NAN,
            p_value: 1.0,
        });
    }

    let odds_ratio = if b > 0 && c > 0 {
        (a as f64 * d as f64) / (b as f64 * c as f64)
    } else {
        f64::INFINITY
    };

    // ln P(X = x) for X ~ Hypergeometric(n, row1, col1)
    let ln_denominator = ln_binomial(n, col1);
    let ln_pmf = |x: u64| ln_binomial(row1, x) + ln_binomial(n - row1, col1 - x) - ln_denominator;

    let lower = (row1 + col1).saturating_sub(n);
    let upper = row1.min(col1);
    let threshold = ln_pmf(a) + PMF_TOLERANCE.ln_1p();
    let p_value: f64 = (lower..=upper)
        .map(ln_pmf)
        .filter(|&lp| lp <= threshold)
        .map(f64::exp)
        .sum();

    Some(FisherResult {
        odds_ratio,
        p_value: p_value.min(1.0),
    })
}
