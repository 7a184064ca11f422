//! # contingent command-line entry point
//!
//! ```text
//! main()
//!   │
//!   ├─> Initialize logging (stderr + rotating files)
//!   ├─> Parse CLI arguments (clap)
//!   └─> Execute the subcommand
//! ```
//!
//! ```bash
//! contingent analyze -f survey.csv --row Region --col Satisfaction --batch-by BatchID
//! contingent anova -f survey.csv --value Price --group PropertyType
//! contingent demo --rows 2000 --seed 42
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Reports go to stdout

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    // Set RUST_LOG=debug for per-batch detail
    contingent::logging::init()?;

    let cli = cli::Cli::parse();
    let result = cli::run_command(cli.command);
    if let Err(err) = &result {
        tracing::error!("{err:#}");
    }
    result
}
