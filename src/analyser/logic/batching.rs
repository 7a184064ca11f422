use super::types::{Batch, BatchKey, BatchOrder, Dataset, WindowSpec};
use crate::error::Result;
use std::collections::HashMap;

/// Splits `dataset` into one batch per distinct value of `column`.
///
/// With [`BatchOrder::FirstOccurrence`] batches follow the order in which each
/// key first appears; [`BatchOrder::SortedKey`] sorts them by key label.
/// Records keep their relative order inside a batch. Absent keys are grouped
/// under `missing_label` so that no record is dropped.
///
/// # Errors
///
/// Returns a schema error if `column` is absent.
pub fn partition_by_key(
    dataset: &Dataset,
    column: &str,
    order: BatchOrder,
    missing_label: &str,
) -> Result<Vec<Batch>> {
    let key_column = dataset.column(column)?;

    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for row in 0..dataset.height() {
        let key = key_column.label_or(row, missing_label);
        match positions.get(&key) {
            Some(&slot) => {
                if let Some((_, rows)) = groups.get_mut(slot) {
                    rows.push(row);
                }
            }
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push((key, vec![row]));
            }
        }
    }

    if order == BatchOrder::SortedKey {
        groups.sort_by(|a, b| a.0.cmp(&b.0));
    }

    tracing::debug!(column, batches = groups.len(), ?order, "Partitioned by key");

    Ok(groups
        .into_iter()
        .map(|(value, rows)| {
            Batch::new(
                BatchKey::Group {
                    column: column.to_owned(),
                    value,
                },
                dataset.take(&rows),
            )
        })
        .collect())
}

/// Sorts `dataset` by `order_column` and cuts it into overlapping windows.
///
/// Each window holds `spec.size` consecutive records and the next one starts
/// `spec.step` records later. The last window may be shorter, and iteration
/// stops at the first window that reaches the end of the data. Sorting is
/// stable and places absent values last in either direction.
///
/// # Errors
///
/// Returns a schema error if `order_column` is absent, and an invalid
/// parameter error if `spec.size` or `spec.step` is zero.
pub fn sliding_window(
    dataset: &Dataset,
    order_column: &str,
    spec: WindowSpec,
) -> Result<Vec<Batch>> {
    spec.validate()?;
    let key = dataset.column(order_column)?;

    let mut order: Vec<usize> = (0..dataset.height()).collect();
    order.sort_by(|&a, &b| {
        let (va, vb) = (key.value(a), key.value(b));
        match (va.is_null(), vb.is_null()) {
            (false, false) if spec.descending => vb.cmp_nulls_last(&va),
            _ => va.cmp_nulls_last(&vb),
        }
    });
    let sorted = dataset.take(&order);

    let n = sorted.height();
    let mut batches = Vec::new();
    let mut start = 0;
    while start < n {
        let end = (start + spec.size).min(n);
        batches.push(Batch::new(
            BatchKey::Window {
                index: batches.len(),
                start,
                end,
            },
            sorted.slice(start, end - start),
        ));
        if end == n {
            break;
        }
        start += spec.step;
    }

    tracing::debug!(
        order_column,
        size = spec.size,
        step = spec.step,
        batches = batches.len(),
        "Built sliding windows"
    );
    Ok(batches)
}
