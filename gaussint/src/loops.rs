//! Cartesian and contraction loop engines.
//!
//! Both engines are generic over [`Real`], so the same code serves double
//! precision and interval evaluation. Value order in every buffer is
//! row-major over the four centers, center 1 slowest, with Cartesian
//! components in canonical order (see [`crate::cartesian`]).

use crate::cartesian::{ncart, CartesianIter};
use crate::error::{IntegralError, Result};
use crate::kernel::{PrimitiveGaussian, PrimitiveKernel, SingleKernel};
use crate::real::Real;
use crate::shell::{nintegrals4, Shell};
use itertools::iproduct;
use tracing::trace;

/// Evaluates `kernel` once per Cartesian quadruple of four primitives,
/// writing `output[0..ncart1*ncart2*ncart3*ncart4]` in order.
///
/// Angular momenta and the output length are checked before any slot is
/// written.
pub fn cartloop4<T, K>(
    output: &mut [T],
    gaussians: [PrimitiveGaussian<'_, T>; 4],
    prec: u32,
    kernel: &K,
) -> Result<()>
where
    T: Real,
    K: SingleKernel<T> + ?Sized,
{
    let [g1, g2, g3, g4] = gaussians;
    let (c1, c2, c3, c4) = (
        CartesianIter::new(g1.am)?,
        CartesianIter::new(g2.am)?,
        CartesianIter::new(g3.am)?,
        CartesianIter::new(g4.am)?,
    );

    let required: usize = gaussians.iter().map(|g| ncart(g.am)).product();
    if output.len() < required {
        return Err(IntegralError::OutputTooSmall {
            found: output.len(),
            required,
        });
    }

    let centers = [g1.center, g2.center, g3.center, g4.center];
    let alpha = [g1.alpha, g2.alpha, g3.alpha, g4.alpha];
    for (slot, (a, b, c, d)) in output.iter_mut().zip(iproduct!(c1, c2, c3, c4)) {
        *slot = kernel.single([a, b, c, d], centers, alpha, prec);
    }
    Ok(())
}

/// Contracts a shell quartet: for every primitive quartet the kernel fills a
/// scratch buffer of Cartesian values, which is scaled by the product of the
/// four coefficients and accumulated into each general-contraction block.
///
/// The output holds `ngeneral1*ngeneral2*ngeneral3*ngeneral4` blocks, block
/// index row-major with center 1 slowest, each block laid out like the
/// output of [`cartloop4`]. Only the first [`nintegrals4`] values are
/// touched; they are zeroed first. Shells and output length are validated
/// before anything is written.
pub fn loop4<T, K>(output: &mut [T], shells: [&Shell<T>; 4], prec: u32, kernel: &K) -> Result<()>
where
    T: Real,
    K: PrimitiveKernel<T> + ?Sized,
{
    for shell in shells {
        shell.validate()?;
    }
    let nint = nintegrals4(shells);
    if output.len() < nint {
        return Err(IntegralError::OutputTooSmall {
            found: output.len(),
            required: nint,
        });
    }

    let [s1, s2, s3, s4] = shells;
    let ncart1234 = s1.ncart() * s2.ncart() * s3.ncart() * s4.ncart();
    trace!(
        am = ?[s1.am, s2.am, s3.am, s4.am],
        nint,
        "contracting shell quartet"
    );

    let output = &mut output[..nint];
    for value in output.iter_mut() {
        *value = T::zero(prec);
    }
    let mut scratch = vec![T::zero(prec); ncart1234];

    for (i, j, k, l) in iproduct!(0..s1.nprim, 0..s2.nprim, 0..s3.nprim, 0..s4.nprim) {
        let gaussians = [
            s1.primitive(i),
            s2.primitive(j),
            s3.primitive(k),
            s4.primitive(l),
        ];
        kernel.primitive(&mut scratch, gaussians, prec)?;

        let generals = iproduct!(0..s1.ngeneral, 0..s2.ngeneral, 0..s3.ngeneral, 0..s4.ngeneral);
        for (block, (m, n, o, p)) in generals.enumerate() {
            let coeff = s1
                .coeff(m, i)
                .mul(s2.coeff(n, j))
                .mul(s3.coeff(o, k))
                .mul(s4.coeff(p, l));
            let start = block * ncart1234;
            for (value, prim) in output[start..start + ncart1234].iter_mut().zip(&scratch) {
                *value = value.add(&coeff.mul(prim));
            }
        }
    }
    Ok(())
}
