//! Integration tests for the full analysis workflow
//!
//! These tests run the complete pipeline on fixture files and verify the
//! end-to-end results.

use contingent::analyser::logic::*;
use contingent::error::ContingentError;
use contingent::export::{export_report, export_summaries};
use std::path::PathBuf;

fn survey() -> PathBuf {
    PathBuf::from("testdata/survey.csv")
}

#[test]
fn test_load_survey_fixture() {
    let dataset = load_dataset(&survey()).expect("fixture loads");
    assert_eq!(dataset.height(), 11);
    assert_eq!(
        dataset.column_names(),
        vec!["Region", "Satisfaction", "BatchID", "Day", "Price"]
    );
    assert_eq!(
        dataset.column("Price").expect("Price column").kind(),
        ColumnKind::Numeric
    );
    assert_eq!(
        dataset.column("Day").expect("Day column").kind(),
        ColumnKind::Categorical
    );
}

#[test]
fn test_analyze_whole_file() {
    let request = AnalysisRequest::new("Region", "Satisfaction");
    let report = analyze_file_flow(&survey(), &request, &RunControl::new())
        .expect("Analysis should succeed for the survey fixture");

    assert_eq!(report.records, 11);
    assert_eq!(report.source.as_deref(), Some("testdata/survey.csv"));
    assert_eq!(report.summaries.len(), 1);

    let table = &report.summaries[0].table;
    assert_eq!(table.row_labels(), ["North", "South"], "Whitespace is trimmed");
    assert_eq!(table.col_labels(), ["Missing", "Negative", "Positive"]);
    assert_eq!(table.counts(), [vec![1, 1, 4], vec![0, 4, 1]]);
    assert!(report.summaries[0].fisher.is_none());
}

#[test]
fn test_analyze_by_batch() {
    let request = AnalysisRequest::new("Region", "Satisfaction").with_strategy(
        BatchStrategy::ByKey {
            column: "BatchID".to_owned(),
            order: BatchOrder::FirstOccurrence,
        },
    );
    let report = analyze_file_flow(&survey(), &request, &RunControl::new())
        .expect("Batched analysis should succeed");

    let labels: Vec<&str> = report.summaries.iter().map(|s| s.batch.as_str()).collect();
    assert_eq!(labels, vec!["B1", "B2", "B3"]);
    let sizes: Vec<usize> = report.summaries.iter().map(|s| s.records).collect();
    assert_eq!(sizes, vec![4, 4, 3]);

    // B1 is a perfectly separated 2x2 table.
    let b1 = &report.summaries[0];
    let fisher = b1.fisher.expect("2x2 table");
    assert!((fisher.p_value - 1.0 / 3.0).abs() < 1e-9, "p = {}", fisher.p_value);
    assert_eq!(fisher.odds_ratio, 0.0);
    assert!(b1.chi2.corrected);

    let b2 = &report.summaries[1];
    assert_eq!(b2.table.shape(), (2, 3));
    assert!(b2.fisher.is_none());
}

#[test]
fn test_analyze_sliding_window() {
    let request = AnalysisRequest::new("Region", "Satisfaction").with_strategy(
        BatchStrategy::Window {
            column: "Day".to_owned(),
            spec: WindowSpec {
                size: 4,
                step: 4,
                descending: false,
            },
        },
    );
    let report = analyze_file_flow(&survey(), &request, &RunControl::new())
        .expect("Windowed analysis should succeed");

    let labels: Vec<&str> = report.summaries.iter().map(|s| s.batch.as_str()).collect();
    assert_eq!(labels, vec!["window_0_0-4", "window_1_4-8", "window_2_8-11"]);
    let total: usize = report.summaries.iter().map(|s| s.records).sum();
    assert_eq!(total, 11);
}

#[test]
fn test_anova_on_fixture() {
    let dataset = load_dataset(&survey()).expect("fixture loads");
    let report = anova_flow(&dataset, "Price", "Region", &CleaningOptions::default())
        .expect("ANOVA should succeed");
    let (f, p) = report.outcome.as_pair();
    assert!(f > 100.0, "Regions are far apart, F = {f}");
    assert!(p < 1e-6, "p = {p}");
}

#[test]
fn test_missing_column_is_schema_error() {
    let request = AnalysisRequest::new("Region", "Mood");
    let err = analyze_file_flow(&survey(), &request, &RunControl::new()).unwrap_err();
    assert!(err.is_schema_error(), "unexpected error: {err}");
}

#[test]
fn test_empty_and_unsupported_files() {
    let request = AnalysisRequest::new("Region", "Satisfaction");
    let empty = analyze_file_flow(
        &PathBuf::from("testdata/empty.csv"),
        &request,
        &RunControl::new(),
    );
    assert!(empty.is_err(), "Header-only file has no records");

    let unsupported = load_dataset(&PathBuf::from("testdata/survey.xlsx"));
    assert!(matches!(
        unsupported,
        Err(ContingentError::InvalidParameter(_))
    ));
}

#[test]
fn test_export_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let request = AnalysisRequest::new("Region", "Satisfaction").with_strategy(
        BatchStrategy::ByKey {
            column: "BatchID".to_owned(),
            order: BatchOrder::SortedKey,
        },
    );
    let report = analyze_file_flow(&survey(), &request, &RunControl::new())
        .expect("Batched analysis should succeed");

    let written = export_summaries(&report, dir.path()).expect("summaries written");
    let names: Vec<String> = written
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    assert_eq!(
        names,
        vec!["B1_summary.json", "B2_summary.json", "B3_summary.json"]
    );

    let report_path = dir.path().join("report.json");
    export_report(&report, &report_path).expect("report written");
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).expect("readable"))
            .expect("valid JSON");
    assert_eq!(json["records"], 11);
    assert_eq!(json["summaries"][0]["batch"], "B1");
}
