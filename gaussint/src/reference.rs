//! Comparison of computed values against recorded decimal references.
//!
//! A reference value printed with `ndigits` significant digits is only known
//! up to one unit in its last digit. It is turned into an interval wide
//! enough to cover that, and a computed interval passes when it lies inside.

use crate::error::Result;
use crate::exact::digits_to_bits;
use crate::interval::Interval;

/// Relative tolerance for double-precision comparisons.
pub const DOUBLE_TOLERANCE: f64 = 1e-13;

/// Bits parsed beyond the digits a reference carries.
pub const REFERENCE_GUARD_BITS: u32 = 16;

/// Interval covering a reference value recorded with `ndigits` significant
/// digits, rounded to `target_prec` bits. The literal `"0"` is an exact zero.
pub fn reference_interval(text: &str, ndigits: u32, target_prec: u32) -> Result<Interval> {
    if text == "0" {
        return Ok(Interval::zero(target_prec));
    }
    let integral_bits = digits_to_bits(ndigits);
    let round_bits = digits_to_bits(ndigits.saturating_sub(1));
    let parsed = Interval::parse(text, integral_bits.saturating_add(REFERENCE_GUARD_BITS))?;
    Ok(parsed.add_error_ulp(round_bits).set_round(target_prec))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Identical midpoint and radius.
    Equal,
    /// The reference interval contains the computed one.
    Contained,
    Mismatch,
}

impl Verdict {
    pub fn passed(self) -> bool {
        self != Verdict::Mismatch
    }
}

pub fn compare_interval(computed: &Interval, reference: &Interval) -> Verdict {
    if computed == reference {
        Verdict::Equal
    } else if reference.contains(computed) {
        Verdict::Contained
    } else {
        Verdict::Mismatch
    }
}

/// A failed comparison, kept for the batch report.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Entry the value belongs to.
    pub entry: usize,
    /// Position of the value within the entry.
    pub index: usize,
    pub calculated: String,
    pub reference: String,
}

/// Compares one computed interval against a reference string.
///
/// Returns `Ok(None)` on a pass; on failure both values are rendered with
/// `2 * ndigits` digits and their radii.
pub fn check_reference(
    computed: &Interval,
    text: &str,
    ndigits: u32,
    target_prec: u32,
    entry: usize,
    index: usize,
) -> Result<Option<Mismatch>> {
    let reference = reference_interval(text, ndigits, target_prec)?;
    if compare_interval(computed, &reference).passed() {
        return Ok(None);
    }
    let digits = 2 * ndigits as usize;
    Ok(Some(Mismatch {
        entry,
        index,
        calculated: computed.to_string_with_radius(digits),
        reference: reference.to_string_with_radius(digits),
    }))
}

/// `a == b`, or their relative difference is below `tolerance`.
pub fn almost_equal(a: f64, b: f64, tolerance: f64) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff / scale < tolerance
}

/// A double result passes if it reproduces either the recorded reference or
/// the high-precision recomputation exactly.
pub fn exact_matches(computed: f64, recorded: f64, recomputed: f64) -> bool {
    computed == recorded || computed == recomputed
}
