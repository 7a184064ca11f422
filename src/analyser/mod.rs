//! Contingency analysis of categorical data.
//!
//! [`logic`] holds the whole pipeline: cleaning, batching, table
//! construction, the statistical tests and the per-batch orchestrator.

pub mod logic;
