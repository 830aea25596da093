//! Configuration management for certification runs
//!
//! Every value is optional in the YAML file; `with_defaults` fills in what
//! is missing, and command-line arguments take precedence over both.

mod args;

pub use args::{Args, Command, IntegralKind, TestMode};

use serde::{Deserialize, Serialize};

/// Working precision of the high-precision recomputation in exact mode.
pub const DEFAULT_EXACT_PREC: u32 = 512;

/// Certified bits the exact-mode recomputation must reach.
pub const DEFAULT_MIN_ACCURACY_BITS: i64 = 64;

/// Main configuration structure
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub precision: PrecisionParams,
}

impl Config {
    pub fn with_defaults(mut self) -> Self {
        self.precision = self.precision.with_defaults();
        self
    }
}

/// Precision parameters of the comparison modes
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PrecisionParams {
    /// Bits the references are rounded to in interval mode; derived from the
    /// file's digit count when unset.
    pub target_prec: Option<u32>,
    pub exact_prec: Option<u32>,
    pub min_accuracy_bits: Option<i64>,
    pub double_tolerance: Option<f64>,
}

impl Default for PrecisionParams {
    fn default() -> Self {
        PrecisionParams {
            target_prec: None,
            exact_prec: Some(DEFAULT_EXACT_PREC),
            min_accuracy_bits: Some(DEFAULT_MIN_ACCURACY_BITS),
            double_tolerance: Some(gaussint::reference::DOUBLE_TOLERANCE),
        }
    }
}

impl PrecisionParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.target_prec.is_none() {
            self.target_prec = defaults.target_prec;
        }
        if self.exact_prec.is_none() {
            self.exact_prec = defaults.exact_prec;
        }
        if self.min_accuracy_bits.is_none() {
            self.min_accuracy_bits = defaults.min_accuracy_bits;
        }
        if self.double_tolerance.is_none() {
            self.double_tolerance = defaults.double_tolerance;
        }
        self
    }
}
