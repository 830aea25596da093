//! Integral kernels that plug into the loop engines.

pub mod overlap;

pub use overlap::Overlap4;
