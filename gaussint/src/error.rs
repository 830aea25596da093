//! Errors raised by the looping engines and the precision oracle.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegralError {
    /// Angular momentum below zero.
    #[error("invalid angular momentum {0}: must be non-negative")]
    InvalidAngularMomentum(i32),

    #[error("shell has no primitives")]
    NoPrimitives,

    #[error("shell has no general contractions")]
    NoGeneralContractions,

    #[error("exponent array has length {found}, expected nprim = {expected}")]
    ExponentLength { found: usize, expected: usize },

    #[error("coefficient array has length {found}, expected nprim*ngeneral = {expected}")]
    CoefficientLength { found: usize, expected: usize },

    #[error("output buffer holds {found} values but {required} are required")]
    OutputTooSmall { found: usize, required: usize },

    #[error("unable to parse '{0}' as a real number")]
    Parse(String),

    /// The working precision picked for an exact computation did not deliver
    /// the accuracy floor. This is a calibration bug, not a property of the
    /// input.
    #[error(
        "insufficient precision: {achieved} certified bits at working precision {working_prec}, \
         at least {required} required"
    )]
    InsufficientPrecision {
        achieved: i64,
        required: i64,
        working_prec: u32,
    },

    #[error(
        "could not reach {target} bits of accuracy below the working precision cap \
         of {max_prec} bits"
    )]
    PrecisionExhausted { target: u32, max_prec: u32 },
}

pub type Result<T> = std::result::Result<T, IntegralError>;
