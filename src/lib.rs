//! # contingent - batched contingency-table analysis
//!
//! contingent cross-tabulates two categorical variables, optionally per batch
//! of records, and runs a fixed battery of tests on every table: Pearson's
//! chi-square (with Yates correction for 2×2), Fisher's exact test where it
//! applies, Cramér's V and pairwise post-hoc chi-square tests with a
//! multiple-comparison correction. A one-way ANOVA covers numeric outcomes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use contingent::analyser::logic::{AnalysisRequest, BatchOrder, BatchStrategy, RunControl};
//! use contingent::analyser::logic::analyze_file_flow;
//! use std::path::Path;
//!
//! # fn example() -> contingent::error::Result<()> {
//! let request = AnalysisRequest::new("Region", "Satisfaction").with_strategy(
//!     BatchStrategy::ByKey {
//!         column: "BatchID".to_owned(),
//!         order: BatchOrder::FirstOccurrence,
//!     },
//! );
//! let report = analyze_file_flow(Path::new("survey.csv"), &request, &RunControl::new())?;
//!
//! for summary in &report.summaries {
//!     println!("{}: p = {:.4}", summary.batch, summary.chi2.p_value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`analyser::logic`]: cleaning, batching, tables, tests and orchestration
//! - [`config`]: persisted analysis settings
//! - [`export`]: JSON output of summaries and whole runs
//! - [`error`]: error types and handling utilities
//! - [`logging`]: tracing setup for the binary
//! - [`utils`]: formatting helpers
//!
//! ## Not-applicable results
//!
//! Fisher's test only exists for 2×2 tables and ANOVA needs two non-empty
//! groups. Those cases are `Option::None` and [`analyser::logic::AnovaOutcome::Undefined`]
//! rather than errors.

#![warn(clippy::all, rust_2018_idioms)]

pub mod analyser;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod utils;
