use super::chi_square::chi_square_test;
use super::contingency::ContingencyTable;
use super::types::Correction;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One pairwise comparison between two row categories.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PairComparison {
    pub row_a: String,
    pub row_b: String,
    pub statistic: f64,
    pub p_value: f64,
    pub p_adjusted: f64,
    pub significant: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PostHocResultSet {
    pub correction: Correction,
    pub alpha: f64,
    pub comparisons: Vec<PairComparison>,
}

impl PostHocResultSet {
    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    pub fn significant(&self) -> impl Iterator<Item = &PairComparison> + '_ {
        self.comparisons.iter().filter(|c| c.significant)
    }
}

/// Pairwise chi-square tests between every pair of row categories.
///
/// Each pair is tested on its 2×C sub-table (see
/// [`ContingencyTable::row_pair`]) and the raw p-values are adjusted for the
/// `C(R, 2)` comparisons. A pair is significant iff its adjusted p-value is
/// below `alpha`. Tables with fewer than two rows give an empty set.
///
/// # Errors
///
/// Propagates chi-square failures on a sub-table.
pub fn pairwise_posthoc(
    table: &ContingencyTable,
    alpha: f64,
    method: Correction,
    yates_correction: bool,
) -> Result<PostHocResultSet> {
    let rows = table.row_labels();
    let mut comparisons = Vec::new();
    for i in 0..rows.len() {
        for j in (i + 1)..rows.len() {
            let sub = table.row_pair(i, j)?;
            let test = chi_square_test(&sub, yates_correction)?;
            comparisons.push(PairComparison {
                row_a: rows.get(i).cloned().unwrap_or_default(),
                row_b: rows.get(j).cloned().unwrap_or_default(),
                statistic: test.statistic,
                p_value: test.p_value,
                p_adjusted: test.p_value,
                significant: false,
            });
        }
    }

    let raw: Vec<f64> = comparisons.iter().map(|c| c.p_value).collect();
    let adjusted = adjust_p_values(&raw, method);
    for (comparison, p_adjusted) in comparisons.iter_mut().zip(adjusted) {
        comparison.p_adjusted = p_adjusted;
        comparison.significant = p_adjusted < alpha;
    }

    tracing::debug!(
        pairs = comparisons.len(),
        significant = comparisons.iter().filter(|c| c.significant).count(),
        %method,
        "Post-hoc comparisons"
    );

    Ok(PostHocResultSet {
        correction: method,
        alpha,
        comparisons,
    })
}

/// Multiple-comparison adjustment, returned in input order.
///
/// Bonferroni: `min(1, p * m)`. Holm: step-down `(m - rank) * p` with running
/// maximum, so adjusted values keep the ordering of the raw ones.
pub fn adjust_p_values(p_values: &[f64], method: Correction) -> Vec<f64> {
    let m = p_values.len() as f64;
    match method {
        Correction::Bonferroni => p_values.iter().map(|p| (p * m).min(1.0)).collect(),
        Correction::Holm => {
            let mut order: Vec<usize> = (0..p_values.len()).collect();
            order.sort_by(|&a, &b| {
                let pa = p_values.get(a).copied().unwrap_or(1.0);
                let pb = p_values.get(b).copied().unwrap_or(1.0);
                pa.total_cmp(&pb)
            });
            let mut adjusted = vec![1.0; p_values.len()];
            let mut running = 0.0_f64;
            for (rank, &idx) in order.iter().enumerate() {
                let p = p_values.get(idx).copied().unwrap_or(1.0);
                running = running.max(((m - rank as f64) * p).min(1.0));
                if let Some(slot) = adjusted.get_mut(idx) {
                    *slot = running;
                }
            }
            adjusted
        }
    }
}
