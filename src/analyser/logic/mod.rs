pub mod anova;
pub mod batching;
pub mod chi_square;
pub mod cleaning;
pub mod contingency;
pub mod effect_size;
pub mod fisher;
pub mod flows;
pub mod io;
pub mod posthoc;
pub mod summary;
pub mod synthetic;
pub mod types;

pub use anova::{AnovaOutcome, f_oneway, one_way_anova};
pub use batching::{partition_by_key, sliding_window};
pub use chi_square::{ChiSquareResult, chi_square_test, expected_frequencies};
pub use cleaning::{clean_categorical_columns, normalise_label};
pub use contingency::{ContingencyTable, build_contingency_table};
pub use effect_size::{cramers_v, cramers_v_from_statistic};
pub use fisher::{FisherResult, fisher_exact};
pub use flows::{
    AnalysisReport, AnalysisRequest, AnovaReport, BatchStrategy, analyze_file_flow, anova_flow,
    demo_flow, prepare_batches, run_analysis,
};
pub use io::{dataset_from_frame, load_dataset, load_df};
pub use posthoc::{PairComparison, PostHocResultSet, adjust_p_values, pairwise_posthoc};
pub use summary::{
    RunControl, SummaryRecord, summarize_batch, summarize_batches, summarize_batches_parallel,
    summarize_table,
};
pub use synthetic::generate_synthetic_dataset;
pub use types::{
    AnalysisOptions, Batch, BatchKey, BatchOrder, CleaningOptions, Column, ColumnData,
    ColumnKind, Correction, DEFAULT_ALPHA, Dataset, MISSING_LABEL, Value, WindowSpec,
};
