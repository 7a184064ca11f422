use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use contingent::analyser::logic::*;
use contingent::config::{AnalysisConfig, load_or_default};
use contingent::export::{export_report, export_summaries};
use contingent::utils::{fmt_opt, fmt_p};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "contingent",
    version,
    about = "Batched contingency-table analysis for categorical data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cross-tabulate two categorical columns, optionally per batch
    Analyze(AnalyzeArgs),
    /// One-way ANOVA of a numeric column across the groups of a categorical one
    Anova {
        /// Input file (CSV or Parquet)
        #[arg(short, long)]
        file: PathBuf,

        /// Numeric column
        #[arg(long)]
        value: String,

        /// Grouping column
        #[arg(long)]
        group: String,

        /// Path to a JSON analysis configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the full pipeline on a seeded synthetic dataset
    Demo {
        #[arg(long, default_value_t = 2000)]
        rows: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Directory for JSON exports
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input file (CSV or Parquet)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Row variable of the contingency table
    #[arg(long)]
    pub row: String,

    /// Column variable of the contingency table
    #[arg(long)]
    pub col: String,

    /// Extra categorical columns to normalise (row, col and the batch key always are)
    #[arg(long, num_args = 1..)]
    pub clean: Vec<String>,

    /// Batch by the distinct values of this column
    #[arg(long, conflicts_with = "window_by")]
    pub batch_by: Option<String>,

    /// Batch with a sliding window over this ordering column
    #[arg(long, requires = "window_size")]
    pub window_by: Option<String>,

    /// Records per window
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Records the window advances each time
    #[arg(long, default_value_t = 1)]
    pub step: usize,

    /// Sort the ordering column descending
    #[arg(long)]
    pub descending: bool,

    /// Emit by-key batches in sorted key order instead of first occurrence
    #[arg(long)]
    pub sorted_keys: bool,

    /// Significance level
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Disable the Yates continuity correction
    #[arg(long)]
    pub no_yates: bool,

    /// Post-hoc multiple-comparison correction (bonferroni or holm)
    #[arg(long)]
    pub posthoc: Option<Correction>,

    /// Summarise batches in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Path to a JSON analysis configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for JSON exports
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Builds the request from file settings, with flags taking precedence.
    fn to_request(&self, config: &AnalysisConfig) -> Result<AnalysisRequest> {
        let mut options = config.analysis_options();
        if let Some(alpha) = self.alpha {
            options.alpha = alpha;
        }
        if self.no_yates {
            options.yates_correction = false;
        }
        if let Some(posthoc) = self.posthoc {
            options.posthoc_correction = posthoc;
        }

        let order = if self.sorted_keys {
            BatchOrder::SortedKey
        } else {
            config.batch_order
        };
        let strategy = match (&self.batch_by, &self.window_by) {
            (Some(column), _) => BatchStrategy::ByKey {
                column: column.clone(),
                order,
            },
            (None, Some(column)) => BatchStrategy::Window {
                column: column.clone(),
                spec: WindowSpec {
                    size: self
                        .window_size
                        .context("--window-size is required with --window-by")?,
                    step: self.step,
                    descending: self.descending,
                },
            },
            (None, None) => BatchStrategy::Whole,
        };

        let mut request = AnalysisRequest::new(&self.row, &self.col).with_strategy(strategy);
        for column in &self.clean {
            if !request.clean.contains(column) {
                request.clean.push(column.clone());
            }
        }
        request.options = options;
        request.cleaning = config.cleaning.clone();
        request.parallel = self.parallel || config.parallel;
        Ok(request)
    }
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Anova {
            file,
            value,
            group,
            config,
        } => handle_anova(&file, &value, &group, config.as_deref()),
        Commands::Demo { rows, seed, output } => handle_demo(rows, seed, output.as_deref()),
    }
}

fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = load_or_default(args.config.as_deref())?;
    let request = args.to_request(&config)?;
    let report = analyze_file_flow(&args.file, &request, &RunControl::new())
        .with_context(|| format!("Analysis of {} failed", args.file.display()))?;

    print_report(&report);
    if let Some(out_dir) = &args.output {
        write_outputs(&report, out_dir)?;
    }
    Ok(())
}

fn handle_anova(file: &Path, value: &str, group: &str, config: Option<&Path>) -> Result<()> {
    let config = load_or_default(config)?;
    let dataset = load_dataset(file).with_context(|| format!("Failed to load {}", file.display()))?;
    let report = anova_flow(&dataset, value, group, &config.cleaning)?;
    print_anova(&report);
    Ok(())
}

fn handle_demo(rows: usize, seed: u64, output: Option<&Path>) -> Result<()> {
    let config = load_or_default(None)?;
    let report = demo_flow(rows, seed, config.analysis_options(), &RunControl::new())?;
    print_report(&report);
    let out_dir = output.unwrap_or_else(|| Path::new("output_demo"));
    write_outputs(&report, out_dir)
}

fn write_outputs(report: &AnalysisReport, out_dir: &Path) -> Result<()> {
    let written = export_summaries(report, out_dir)?;
    let report_path = out_dir.join("report.json");
    export_report(report, &report_path)?;
    println!(
        "Wrote {} batch summaries and {} to {}",
        written.len(),
        report_path.display(),
        out_dir.display()
    );
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!(
        "{} x {} over {} records, {} batch(es) [{}]",
        report.row_variable,
        report.col_variable,
        report.records,
        report.summaries.len(),
        report.source.as_deref().unwrap_or("in-memory")
    );
    for summary in &report.summaries {
        print_summary(summary);
    }
    if let Some(anova) = &report.anova {
        print_anova(anova);
    }
}

fn print_summary(summary: &SummaryRecord) {
    println!();
    println!("== Batch {} ({} records) ==", summary.batch, summary.records);
    println!("{}", summary.table);
    println!(
        "Chi-square: {} (dof {}, p = {}{})",
        fmt_opt(Some(summary.chi2.statistic)),
        summary.chi2.dof,
        fmt_p(summary.chi2.p_value),
        if summary.chi2.corrected { ", Yates" } else { "" }
    );
    if let Some(fisher) = &summary.fisher {
        println!(
            "Fisher exact: odds ratio {}, p = {}",
            fmt_opt(Some(fisher.odds_ratio)),
            fmt_p(fisher.p_value)
        );
    }
    println!("Cramér's V: {}", fmt_opt(Some(summary.cramers_v)));

    let posthoc = &summary.posthoc;
    if posthoc.is_empty() {
        return;
    }
    println!(
        "Post-hoc ({}, alpha {}): {} of {} pairs significant",
        posthoc.correction,
        posthoc.alpha,
        posthoc.significant().count(),
        posthoc.len()
    );
    for c in &posthoc.comparisons {
        println!(
            "  {} vs {}: chi2 {}, p {}, adj {}{}",
            c.row_a,
            c.row_b,
            fmt_opt(Some(c.statistic)),
            fmt_p(c.p_value),
            fmt_p(c.p_adjusted),
            if c.significant { " *" } else { "" }
        );
    }
}

fn print_anova(report: &AnovaReport) {
    println!();
    println!("== ANOVA {} ~ {} ==", report.value_column, report.group_column);
    match &report.outcome {
        AnovaOutcome::Computed {
            f_statistic,
            p_value,
            groups,
            observations,
        } => println!(
            "F = {}, p = {} ({groups} groups, {observations} observations)",
            fmt_opt(Some(*f_statistic)),
            fmt_p(*p_value)
        ),
        AnovaOutcome::Undefined { non_empty_groups } => println!(
            "Not computed: {non_empty_groups} non-empty group(s), need at least 2"
        ),
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    fn analyze_args(extra: &[&str]) -> AnalyzeArgs {
        let mut argv = vec!["contingent", "analyze", "-f", "data.csv", "--row", "a", "--col", "b"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Analyze(args) => args,
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_flags_override_config() -> Result<()> {
        let mut config = AnalysisConfig::default();
        config.posthoc_correction = Correction::Holm;
        config.batch_order = BatchOrder::SortedKey;

        let args = analyze_args(&["--alpha", "0.01", "--no-yates", "--batch-by", "k"]);
        let request = args.to_request(&config)?;
        assert_eq!(request.options.alpha, 0.01);
        assert!(!request.options.yates_correction);
        assert_eq!(request.options.posthoc_correction, Correction::Holm);
        assert_eq!(
            request.strategy,
            BatchStrategy::ByKey {
                column: "k".to_owned(),
                order: BatchOrder::SortedKey
            }
        );
        assert_eq!(request.clean, vec!["a", "b", "k"]);

        let args = analyze_args(&["--posthoc", "bonferroni"]);
        let request = args.to_request(&config)?;
        assert_eq!(request.options.posthoc_correction, Correction::Bonferroni);
        assert_eq!(request.strategy, BatchStrategy::Whole);
        Ok(())
    }

    #[test]
    fn test_window_flags() -> Result<()> {
        let args = analyze_args(&["--window-by", "t", "--window-size", "50", "--step", "10"]);
        let request = args.to_request(&AnalysisConfig::default())?;
        assert_eq!(
            request.strategy,
            BatchStrategy::Window {
                column: "t".to_owned(),
                spec: WindowSpec {
                    size: 50,
                    step: 10,
                    descending: false
                }
            }
        );
        Ok(())
    }

    #[test]
    fn test_conflicting_batch_flags_rejected() {
        let base = ["contingent", "analyze", "-f", "x.csv", "--row", "a", "--col", "b"];
        let parse = |extra: &[&str]| Cli::try_parse_from(base.iter().chain(extra).copied());

        assert!(parse(&["--batch-by", "k", "--window-by", "t", "--window-size", "3"]).is_err());
        assert!(parse(&["--window-by", "t"]).is_err(), "window size is required");
        assert!(parse(&["--posthoc", "fdr"]).is_err());
        assert!(parse(&["--posthoc", "holm"]).is_ok());
    }
}
