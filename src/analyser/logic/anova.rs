use super::types::Dataset;
use crate::error::{ContingentError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF as _, FisherSnedecor};
use std::collections::BTreeMap;

/// Result of a one-way ANOVA.
///
/// `Undefined` is not a failure: it signals that fewer than two groups had
/// any observations, so no between-group comparison exists.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnovaOutcome {
    Computed {
        f_statistic: f64,
        p_value: f64,
        groups: usize,
        observations: usize,
    },
    Undefined {
        non_empty_groups: usize,
    },
}

impl AnovaOutcome {
    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Computed { .. })
    }

    /// `(F, p)`, both NaN when undefined.
    pub fn as_pair(&self) -> (f64, f64) {
        match self {
            Self::Computed {
                f_statistic,
                p_value,
                ..
            } => (*f_statistic, *p_value),
            Self::Undefined { .. } => (f64::NAN, f64::NAN),
        }
    }
}

/// One-way ANOVA of `value_column` across the categories of `group_column`.
///
/// Missing values are dropped per group and records without a group label
/// are ignored.
///
/// # Errors
///
/// Returns a schema error if either column is absent, and a column type error
/// if `value_column` is not numeric.
pub fn one_way_anova(
    dataset: &Dataset,
    value_column: &str,
    group_column: &str,
) -> Result<AnovaOutcome> {
    let values = dataset.column(value_column)?.numeric_values()?;
    let groups_column = dataset.column(group_column)?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (row, value) in values.iter().enumerate() {
        let Some(label) = groups_column.value(row).label() else {
            continue;
        };
        let bucket = groups.entry(label).or_default();
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            bucket.push(v);
        }
    }

    let samples: Vec<Vec<f64>> = groups.into_values().filter(|g| !g.is_empty()).collect();
    if samples.len() < 2 {
        tracing::warn!(
            value_column,
            group_column,
            non_empty_groups = samples.len(),
            "ANOVA needs at least two non-empty groups"
        );
        return Ok(AnovaOutcome::Undefined {
            non_empty_groups: samples.len(),
        });
    }

    f_oneway(&samples)
}

/// F-test for equal means over already-split samples.
///
/// Empty samples are ignored; fewer than two non-empty ones give
/// [`AnovaOutcome::Undefined`].
pub fn f_oneway(samples: &[Vec<f64>]) -> Result<AnovaOutcome> {
    let samples: Vec<&Vec<f64>> = samples.iter().filter(|s| !s.is_empty()).collect();
    let k = samples.len();
    let n: usize = samples.iter().map(|s| s.len()).sum();
    if k < 2 {
        return Ok(AnovaOutcome::Undefined {
            non_empty_groups: k,
        });
    }

    let grand_mean = samples.iter().copied().flatten().sum::<f64>() / n as f64;
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in &samples {
        let mean = group.iter().sum::<f64>() / group.len() as f64;
        ss_between += group.len() as f64 * (mean - grand_mean).powi(2);
        ss_within += group.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    }

    let df_between = (k - 1) as f64;
    let df_within = n - k;
    let computed = |f_statistic, p_value| AnovaOutcome::Computed {
        f_statistic,
        p_value,
        groups: k,
        observations: n,
    };

    if df_within == 0 {
        return Ok(computed(f64::NAN, f64::NAN));
    }
    if ss_within == 0.0 {
        return Ok(if ss_between == 0.0 {
            computed(f64::NAN, f64::NAN)
        } else {
            computed(f64::INFINITY, 0.0)
        });
    }

    let df_within = df_within as f64;
    let f_statistic = (ss_between / df_between) / (ss_within / df_within);
    let dist = FisherSnedecor::new(df_between, df_within)
        .map_err(|e| ContingentError::Numeric(e.to_string()))?;
    let p_value = dist.sf(f_statistic).clamp(0.0, 1.0);

    Ok(computed(f_statistic, p_value))
}
