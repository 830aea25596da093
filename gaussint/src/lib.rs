// Looping engines for four-center Gaussian integrals, in double precision
// and in certified interval arithmetic.

pub mod cartesian;
pub mod error;
pub mod exact;
pub mod interval;
pub mod kernel;
pub mod kernels;
pub mod loops;
pub mod real;
pub mod reference;
pub mod shell;
mod loops_test;

pub use cartesian::{cartesians, ncart, Cartesian};
pub use error::{IntegralError, Result};
pub use interval::Interval;
pub use kernel::{
    CartesianLoop, ContractedLoop, PrimitiveGaussian, PrimitiveKernel, ShellKernel, SingleKernel,
};
pub use real::Real;
pub use shell::{nintegrals4, PrimitiveText, Shell, ShellText};
