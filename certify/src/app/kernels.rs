use crate::config::IntegralKind;
use gaussint::kernels::Overlap4;
use gaussint::{CartesianLoop, ContractedLoop, Real, ShellKernel, SingleKernel};

impl IntegralKind {
    pub fn name(self) -> &'static str {
        match self {
            IntegralKind::Overlap4 => "overlap4",
            IntegralKind::Overlap4Single => "overlap4_single",
        }
    }

    /// Whether reference files for this kind hold single-component entries.
    pub fn is_single(self) -> bool {
        matches!(self, IntegralKind::Overlap4Single)
    }

    /// Kernel for one Cartesian component of four primitives.
    pub fn single_kernel<T: Real>(self) -> Box<dyn SingleKernel<T>> {
        match self {
            IntegralKind::Overlap4 | IntegralKind::Overlap4Single => Box::new(Overlap4),
        }
    }

    /// Contracted-quartet kernel evaluating this integral over `T`.
    pub fn shell_kernel<T: Real>(self) -> Box<dyn ShellKernel<T>> {
        match self {
            IntegralKind::Overlap4 | IntegralKind::Overlap4Single => {
                Box::new(ContractedLoop(CartesianLoop(Overlap4)))
            }
        }
    }
}
