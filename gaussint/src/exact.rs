//! Precision oracle: evaluates double-precision inputs with interval
//! arithmetic and returns results that are certified to the last bit.

use crate::cartesian::Cartesian;
use crate::error::{IntegralError, Result};
use crate::interval::{Interval, ACCURACY_EXACT};
use crate::kernel::{ShellKernel, SingleKernel};
use crate::shell::{nintegrals4, PrimitiveText, Shell, ShellText};
use nalgebra::Vector3;
use rug::Float;
use std::f64::consts::LOG10_2;
use tracing::debug;

/// Decimal digits targeted by the exact wrappers.
pub const EXACT_TARGET_DIGITS: u32 = 32;

/// Certified bits the exact wrappers must reach. Falling short means the
/// working precision budget is miscalibrated.
pub const EXACT_MIN_ACCURACY_BITS: i64 = 64;

/// Guard digits added on top of a requested number of decimal digits.
pub const GUARD_DIGITS: u32 = 8;

/// Extra bits the target drivers start with.
pub const TARGET_GUARD_BITS: u32 = 16;

/// Upper bound for the working precision of the target drivers.
pub const MAX_WORKING_PREC: u32 = 8192;

/// Largest digit count whose working precision stays below the cap.
pub const MAX_NDIGITS: u32 = 2400;

const SCALE_PREC: u32 = 64;

const MIN_SCRATCH_PREC: u32 = 2;

/// Bits needed to carry `ndigits` decimal digits plus guard digits.
pub fn working_precision(ndigits: u32) -> u32 {
    (ndigits.saturating_add(GUARD_DIGITS) as f64 / LOG10_2).ceil() as u32
}

/// Bits represented by `ndigits` decimal digits, rounded down.
pub fn digits_to_bits(ndigits: u32) -> u32 {
    (ndigits as f64 / LOG10_2).floor() as u32
}

/// Smallest relative accuracy over `values`. Exact values (including exact
/// zeros) do not lower the result; an empty slice is exact.
pub fn min_accuracy_bits(values: &[Interval]) -> i64 {
    values
        .iter()
        .filter(|v| !v.is_exact())
        .map(Interval::rel_accuracy_bits)
        .min()
        .unwrap_or(ACCURACY_EXACT)
}

/// Replaces values that vanish to within `bits` bits of the largest midpoint
/// in `values` by exact zeros, and returns how many were replaced.
///
/// A value that is zero by symmetry but computed from inexact inputs comes
/// out as a small ball around zero whose relative accuracy never improves.
/// When every midpoint is zero the bound is absolute, `2^-bits`.
pub fn settle_zeros(values: &mut [Interval], bits: u32) -> usize {
    let mut scale = Float::new(SCALE_PREC);
    for value in values.iter().filter(|v| v.is_finite()) {
        let magnitude = Float::with_val(SCALE_PREC, value.midpoint().abs_ref());
        if magnitude > scale {
            scale = magnitude;
        }
    }
    if scale.is_zero() {
        scale = Float::with_val(SCALE_PREC, 1);
    }
    let bound = scale >> bits;

    let mut nsettled = 0;
    for value in values.iter_mut() {
        if value.is_finite()
            && !value.is_exact()
            && value.rel_accuracy_bits() < bits as i64
            && value.radius() <= &bound
            && value.contains_zero()
        {
            *value = Interval::zero(value.prec());
            nsettled += 1;
        }
    }
    nsettled
}

fn check_accuracy(values: &[Interval], working_prec: u32) -> Result<()> {
    let achieved = min_accuracy_bits(values);
    if achieved < EXACT_MIN_ACCURACY_BITS {
        return Err(IntegralError::InsufficientPrecision {
            achieved,
            required: EXACT_MIN_ACCURACY_BITS,
            working_prec,
        });
    }
    Ok(())
}

fn to_intervals(shells: [&Shell<f64>; 4], prec: u32) -> [Shell<Interval>; 4] {
    shells.map(|s| s.map(|&x| Interval::from_f64(x, prec)))
}

/// One Cartesian component for four primitives, computed with intervals and
/// rounded to the nearest double.
pub fn integral4_single_exact<K>(
    lmn: [Cartesian; 4],
    centers: [&Vector3<f64>; 4],
    alpha: [f64; 4],
    kernel: &K,
) -> Result<f64>
where
    K: SingleKernel<Interval> + ?Sized,
{
    let prec = working_precision(EXACT_TARGET_DIGITS);
    let centers = centers.map(|c| c.map(|x| Interval::from_f64(x, prec)));
    let alpha = alpha.map(|a| Interval::from_f64(a, prec));

    let mut value = [single_at(lmn, &centers, &alpha, prec, kernel)];
    settle_zeros(&mut value, EXACT_MIN_ACCURACY_BITS as u32);
    check_accuracy(&value, prec)?;
    Ok(value[0].mid_f64())
}

/// Contracted quartet in double precision, computed with intervals.
///
/// Every output value is the double nearest to a midpoint certified to at
/// least [`EXACT_MIN_ACCURACY_BITS`] bits.
pub fn integral4_exact<K>(output: &mut [f64], shells: [&Shell<f64>; 4], kernel: &K) -> Result<()>
where
    K: ShellKernel<Interval> + ?Sized,
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

    let prec = working_precision(EXACT_TARGET_DIGITS);
    let [s1, s2, s3, s4] = &to_intervals(shells, prec);
    let mut values = vec![Interval::zero(prec); nint];
    kernel.contracted(&mut values, [s1, s2, s3, s4], prec)?;

    settle_zeros(&mut values, EXACT_MIN_ACCURACY_BITS as u32);
    check_accuracy(&values, prec)?;
    for (out, value) in output.iter_mut().zip(&values) {
        *out = value.mid_f64();
    }
    debug!(nint, working_prec = prec, "exact quartet done");
    Ok(())
}

/// Raises the working precision until every value carries `target_bits`
/// certified bits. `compute` fills `output` at the given working precision
/// and returns how many values it wrote. Returns the working precision that
/// succeeded.
fn drive_to_target<F>(output: &mut [Interval], target_bits: u32, mut compute: F) -> Result<u32>
where
    F: FnMut(&mut [Interval], u32) -> Result<usize>,
{
    if target_bits > MAX_WORKING_PREC {
        return Err(IntegralError::PrecisionExhausted {
            target: target_bits,
            max_prec: MAX_WORKING_PREC,
        });
    }
    let mut prec = target_bits
        .saturating_add(TARGET_GUARD_BITS)
        .min(MAX_WORKING_PREC);
    loop {
        let nint = compute(output, prec)?;
        let values = &mut output[..nint];
        let nsettled = settle_zeros(values, target_bits);

        let achieved = min_accuracy_bits(values);
        if achieved >= target_bits as i64 {
            debug!(
                target_bits,
                working_prec = prec,
                achieved,
                nsettled,
                "target accuracy reached"
            );
            return Ok(prec);
        }
        if prec >= MAX_WORKING_PREC {
            return Err(IntegralError::PrecisionExhausted {
                target: target_bits,
                max_prec: MAX_WORKING_PREC,
            });
        }
        debug!(target_bits, working_prec = prec, achieved, "raising working precision");
        prec = (prec + prec / 2).min(MAX_WORKING_PREC);
    }
}

fn contract_into<K>(
    output: &mut [Interval],
    shells: [&Shell<Interval>; 4],
    prec: u32,
    kernel: &K,
) -> Result<usize>
where
    K: ShellKernel<Interval> + ?Sized,
{
    let nint = nintegrals4(shells);
    if output.len() < nint {
        return Err(IntegralError::OutputTooSmall {
            found: output.len(),
            required: nint,
        });
    }
    kernel.contracted(output, shells, prec)?;
    Ok(nint)
}

/// Contracted quartet of double inputs with at least `target_bits` certified
/// bits in every value.
pub fn integral4_target<K>(
    output: &mut [Interval],
    shells: [&Shell<f64>; 4],
    target_bits: u32,
    kernel: &K,
) -> Result<u32>
where
    K: ShellKernel<Interval> + ?Sized,
{
    for shell in shells {
        shell.validate()?;
    }
    drive_to_target(output, target_bits, |output, prec| {
        let [s1, s2, s3, s4] = &to_intervals(shells, prec);
        contract_into(output, [s1, s2, s3, s4], prec, kernel)
    })
}

/// Like [`integral4_target`], but the inputs are decimal strings that are
/// parsed again at every working precision.
pub fn integral4_target_str<K>(
    output: &mut [Interval],
    shells: [&ShellText; 4],
    target_bits: u32,
    kernel: &K,
) -> Result<u32>
where
    K: ShellKernel<Interval> + ?Sized,
{
    drive_to_target(output, target_bits, |output, prec| {
        let s1 = shells[0].parse(prec)?;
        let s2 = shells[1].parse(prec)?;
        let s3 = shells[2].parse(prec)?;
        let s4 = shells[3].parse(prec)?;
        contract_into(output, [&s1, &s2, &s3, &s4], prec, kernel)
    })
}

/// One Cartesian component of four double-precision primitives with at least
/// `target_bits` certified bits. Returns the value and the working precision.
pub fn integral4_single_target<K>(
    lmn: [Cartesian; 4],
    centers: [&Vector3<f64>; 4],
    alpha: [f64; 4],
    target_bits: u32,
    kernel: &K,
) -> Result<(Interval, u32)>
where
    K: SingleKernel<Interval> + ?Sized,
{
    let mut output = [Interval::zero(MIN_SCRATCH_PREC)];
    let prec = drive_to_target(&mut output, target_bits, |output, prec| {
        let centers = centers.map(|c| c.map(|x| Interval::from_f64(x, prec)));
        let alpha = alpha.map(|a| Interval::from_f64(a, prec));
        output[0] = single_at(lmn, &centers, &alpha, prec, kernel);
        Ok(1)
    })?;
    let [value] = output;
    Ok((value, prec))
}

/// Like [`integral4_single_target`], with decimal inputs parsed again at
/// every working precision.
pub fn integral4_single_target_str<K>(
    primitives: [&PrimitiveText; 4],
    target_bits: u32,
    kernel: &K,
) -> Result<(Interval, u32)>
where
    K: SingleKernel<Interval> + ?Sized,
{
    let [l1, l2, l3, l4] = primitives.map(PrimitiveText::cartesian);
    let lmn = [l1?, l2?, l3?, l4?];

    let mut output = [Interval::zero(MIN_SCRATCH_PREC)];
    let prec = drive_to_target(&mut output, target_bits, |output, prec| {
        let [p1, p2, p3, p4] = primitives.map(|p| p.parse::<Interval>(prec));
        let [(c1, a1), (c2, a2), (c3, a3), (c4, a4)] = [p1?, p2?, p3?, p4?];
        output[0] = single_at(lmn, &[c1, c2, c3, c4], &[a1, a2, a3, a4], prec, kernel);
        Ok(1)
    })?;
    let [value] = output;
    Ok((value, prec))
}

fn single_at<K>(
    lmn: [Cartesian; 4],
    centers: &[Vector3<Interval>; 4],
    alpha: &[Interval; 4],
    prec: u32,
    kernel: &K,
) -> Interval
where
    K: SingleKernel<Interval> + ?Sized,
{
    kernel.single(
        lmn,
        [&centers[0], &centers[1], &centers[2], &centers[3]],
        [&alpha[0], &alpha[1], &alpha[2], &alpha[3]],
        prec,
    )
}
