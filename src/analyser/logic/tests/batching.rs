use super::survey_dataset;
use crate::analyser::logic::*;
use anyhow::Result;

fn ordered_dataset(n: usize) -> Result<Dataset> {
    // Order column is shuffled so sorting is observable.
    let order: Vec<Option<f64>> = (0..n).map(|i| Some(((i * 7) % n) as f64)).collect();
    let tag: Vec<Option<String>> = (0..n).map(|i| Some(format!("r{}", (i * 7) % n))).collect();
    Ok(Dataset::new(vec![
        Column::numeric("t", order),
        Column::categorical("tag", tag),
    ])?)
}

fn order_values(batch: &Batch) -> Vec<f64> {
    batch
        .data()
        .column("t")
        .expect("order column")
        .iter()
        .map(|v| match v {
            Value::Number(x) => x,
            _ => f64::NAN,
        })
        .collect()
}

#[test]
fn test_by_key_first_occurrence_order() -> Result<()> {
    let ds = Dataset::new(vec![Column::categorical(
        "k",
        vec![Some("A"), Some("A"), Some("B"), Some("B"), Some("B")],
    )])?;
    let batches = partition_by_key(&ds, "k", BatchOrder::FirstOccurrence, MISSING_LABEL)?;

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].label(), "A");
    assert_eq!(batches[0].len(), 2);
    assert_eq!(batches[1].label(), "B");
    assert_eq!(batches[1].len(), 3);
    Ok(())
}

#[test]
fn test_by_key_sorted_order() -> Result<()> {
    let ds = Dataset::new(vec![Column::categorical(
        "k",
        vec![Some("z"), Some("a"), Some("m"), Some("a")],
    )])?;
    let labels: Vec<String> = partition_by_key(&ds, "k", BatchOrder::SortedKey, MISSING_LABEL)?
        .iter()
        .map(Batch::label)
        .collect();
    assert_eq!(labels, vec!["a", "m", "z"]);
    Ok(())
}

#[test]
fn test_by_key_keeps_every_record() -> Result<()> {
    let ds = survey_dataset();
    let batches = partition_by_key(&ds, "region", BatchOrder::FirstOccurrence, MISSING_LABEL)?;
    let total: usize = batches.iter().map(Batch::len).sum();
    assert_eq!(total, ds.height(), "Null keys form their own batch");
    assert!(batches.iter().any(|b| b.label() == MISSING_LABEL));
    Ok(())
}

#[test]
fn test_by_key_missing_column() {
    let ds = survey_dataset();
    let err = partition_by_key(&ds, "ghost", BatchOrder::FirstOccurrence, MISSING_LABEL)
        .unwrap_err();
    assert!(err.is_schema_error());
}

#[test]
fn test_sliding_window_overlapping() -> Result<()> {
    let ds = ordered_dataset(10)?;
    let spec = WindowSpec {
        size: 4,
        step: 3,
        descending: false,
    };
    let batches = sliding_window(&ds, "t", spec)?;

    assert_eq!(batches.len(), 3);
    assert_eq!(order_values(&batches[0]), vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(order_values(&batches[1]), vec![3.0, 4.0, 5.0, 6.0]);
    assert_eq!(order_values(&batches[2]), vec![6.0, 7.0, 8.0, 9.0]);
    assert_eq!(
        batches[2].key(),
        &BatchKey::Window {
            index: 2,
            start: 6,
            end: 10
        }
    );
    Ok(())
}

#[test]
fn test_sliding_window_short_tail_and_coverage() -> Result<()> {
    let ds = ordered_dataset(10)?;
    let spec = WindowSpec {
        size: 4,
        step: 4,
        descending: false,
    };
    let batches = sliding_window(&ds, "t", spec)?;

    assert_eq!(batches.len(), 3);
    assert!(batches.iter().all(|b| b.len() <= spec.size));
    assert_eq!(batches.last().unwrap().len(), 2);

    // Removing the overlap (none here) reconstructs the sorted dataset.
    let covered: Vec<f64> = batches.iter().flat_map(order_values).collect();
    let expected: Vec<f64> = (0..10).map(|i| i as f64).collect();
    assert_eq!(covered, expected);
    Ok(())
}

#[test]
fn test_sliding_window_coverage_with_overlap() -> Result<()> {
    let ds = ordered_dataset(9)?;
    let spec = WindowSpec {
        size: 5,
        step: 2,
        descending: false,
    };
    let batches = sliding_window(&ds, "t", spec)?;

    // Keep the first `step` records of each window, and all of the final one.
    let mut covered = Vec::new();
    for (i, batch) in batches.iter().enumerate() {
        let values = order_values(batch);
        if i + 1 == batches.len() {
            covered.extend(values);
        } else {
            covered.extend(values.into_iter().take(spec.step));
        }
    }
    let expected: Vec<f64> = (0..9).map(|i| i as f64).collect();
    assert_eq!(covered, expected);
    Ok(())
}

#[test]
fn test_sliding_window_descending_nulls_last() -> Result<()> {
    let ds = Dataset::new(vec![Column::numeric(
        "t",
        vec![Some(2.0), None, Some(5.0), Some(1.0)],
    )])?;
    let spec = WindowSpec {
        size: 10,
        step: 1,
        descending: true,
    };
    let batches = sliding_window(&ds, "t", spec)?;
    assert_eq!(batches.len(), 1, "One window reaches the end immediately");

    let values: Vec<Value<'_>> = batches[0].data().column("t")?.iter().collect();
    assert_eq!(
        values,
        vec![
            Value::Number(5.0),
            Value::Number(2.0),
            Value::Number(1.0),
            Value::Null
        ]
    );
    Ok(())
}

#[test]
fn test_sliding_window_rejects_zero_step() -> Result<()> {
    let ds = ordered_dataset(5)?;
    let spec = WindowSpec {
        size: 2,
        step: 0,
        descending: false,
    };
    let err = sliding_window(&ds, "t", spec).unwrap_err();
    assert!(matches!(
        err,
        crate::error::ContingentError::InvalidParameter(_)
    ));
    Ok(())
}

#[test]
fn test_sliding_window_rejects_zero_size() -> Result<()> {
    let ds = ordered_dataset(5)?;
    let spec = WindowSpec {
        size: 0,
        step: 1,
        descending: false,
    };
    assert!(sliding_window(&ds, "t", spec).is_err());
    Ok(())
}

#[test]
fn test_sliding_window_missing_order_column() -> Result<()> {
    let ds = ordered_dataset(5)?;
    let spec = WindowSpec {
        size: 2,
        step: 1,
        descending: false,
    };
    assert!(sliding_window(&ds, "ghost", spec).unwrap_err().is_schema_error());
    Ok(())
}

#[test]
fn test_sliding_window_text_order_column() -> Result<()> {
    let ds = Dataset::new(vec![Column::categorical(
        "day",
        vec![Some("2024-03-02"), Some("2024-01-15"), Some("2024-02-01")],
    )])?;
    let spec = WindowSpec {
        size: 2,
        step: 1,
        descending: false,
    };
    let batches = sliding_window(&ds, "day", spec)?;
    assert_eq!(batches.len(), 2);
    assert_eq!(
        batches[0].data().column("day")?.value(0),
        Value::Text("2024-01-15")
    );
    Ok(())
}
