//! Kernel contracts.
//!
//! A kernel computes the actual integral values; the loop engines only decide
//! which values are requested and where they land. Kernels come in three
//! granularities, and the adapters in this module lift a finer one into a
//! coarser one by running a loop engine around it.

use crate::cartesian::Cartesian;
use crate::error::Result;
use crate::loops::{cartloop4, loop4};
use crate::real::Real;
use crate::shell::Shell;
use nalgebra::Vector3;

/// One primitive Gaussian of a shell: angular momentum, center and exponent.
#[derive(Debug)]
pub struct PrimitiveGaussian<'a, T: Real> {
    pub am: i32,
    pub center: &'a Vector3<T>,
    pub alpha: &'a T,
}

impl<T: Real> Clone for PrimitiveGaussian<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Real> Copy for PrimitiveGaussian<'_, T> {}

/// Integral over one Cartesian component on each of four primitives.
pub trait SingleKernel<T: Real> {
    fn single(
        &self,
        lmn: [Cartesian; 4],
        centers: [&Vector3<T>; 4],
        alpha: [&T; 4],
        prec: u32,
    ) -> T;
}

/// All Cartesian components of one primitive quartet, written row-major with
/// center 1 slowest into `output[..ncart1 * ncart2 * ncart3 * ncart4]`.
pub trait PrimitiveKernel<T: Real> {
    fn primitive(
        &self,
        output: &mut [T],
        gaussians: [PrimitiveGaussian<'_, T>; 4],
        prec: u32,
    ) -> Result<()>;
}

/// The complete contracted output of a shell quartet.
pub trait ShellKernel<T: Real> {
    fn contracted(&self, output: &mut [T], shells: [&Shell<T>; 4], prec: u32) -> Result<()>;
}

/// Runs a [`SingleKernel`] over every Cartesian quadruple.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartesianLoop<K>(pub K);

impl<T: Real, K: SingleKernel<T>> PrimitiveKernel<T> for CartesianLoop<K> {
    fn primitive(
        &self,
        output: &mut [T],
        gaussians: [PrimitiveGaussian<'_, T>; 4],
        prec: u32,
    ) -> Result<()> {
        cartloop4(output, gaussians, prec, &self.0)
    }
}

/// Runs a [`PrimitiveKernel`] over every primitive quartet and contracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractedLoop<K>(pub K);

impl<T: Real, K: PrimitiveKernel<T>> ShellKernel<T> for ContractedLoop<K> {
    fn contracted(&self, output: &mut [T], shells: [&Shell<T>; 4], prec: u32) -> Result<()> {
        loop4(output, shells, prec, &self.0)
    }
}
