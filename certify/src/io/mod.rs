//! Input/Output operations for certification runs
//!
//! This module handles reference files, logging setup, and result reports.

mod output;
pub mod testfile;

pub use output::{print_results, setup_output};
pub use testfile::{
    read_integral_data, read_single_data, read_test_data, write_integral_data, IntegralData,
    IntegralEntry, PrimitiveRecord, ShellRecord, SingleEntry, TestEntry,
};
