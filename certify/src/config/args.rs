//! Command-line argument parsing for certification runs

use clap::{Parser, Subcommand, ValueEnum};
use gaussint::exact::{MAX_NDIGITS, MAX_WORKING_PREC};

/// Create and check reference values for four-center integrals
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to an optional YAML configuration file
    #[arg(short, long, global = true)]
    pub config_file: Option<String>,

    /// Override output file: (default stdout)
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Log debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compute reference values for every entry of an input description
    Create {
        /// Input description (shells only)
        #[arg(long)]
        infile: String,

        /// Reference file to write. Existing data is overwritten
        #[arg(long)]
        outfile: String,

        /// Integral to compute
        #[arg(long, value_enum)]
        integral: IntegralKind,

        /// Significant decimal digits written per value
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_NDIGITS as i64))]
        ndigits: u32,
    },

    /// Check the engines against a reference file
    Run {
        /// Reference file
        #[arg(long)]
        file: String,

        /// Integral to compute
        #[arg(long, value_enum)]
        integral: IntegralKind,

        /// Comparison mode
        #[arg(long, value_enum, default_value_t = TestMode::Interval)]
        mode: TestMode,

        /// Precision (bits) the references are rounded to in interval mode
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_WORKING_PREC as i64))]
        target_prec: Option<u32>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegralKind {
    /// Four-center overlap
    Overlap4,
    /// Four-center overlap, one Cartesian component of four primitives
    Overlap4Single,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
    /// Certified intervals, checked for containment in the references
    Interval,
    /// Double precision, relative tolerance
    Double,
    /// Double precision through the interval oracle, bit-exact
    Exact,
}
