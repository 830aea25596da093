//! Batch runners for the three comparison modes.
//!
//! Interval mode counts failed values; double and exact modes count failed
//! entries, however many of their values differ.

use super::entries::Evaluate;
use crate::config::IntegralKind;
use crate::io::{print_results, read_test_data, IntegralEntry, SingleEntry, TestEntry};
use color_eyre::eyre::{bail, ensure, eyre, Result, WrapErr};
use gaussint::exact::{min_accuracy_bits, settle_zeros, working_precision, MAX_WORKING_PREC};
use gaussint::real::DOUBLE_PREC;
use gaussint::reference::{
    almost_equal, check_reference, exact_matches, Mismatch, REFERENCE_GUARD_BITS,
};
use gaussint::Real;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub nfailed: usize,
    pub nentries: usize,
    pub nvalues: usize,
    pub mismatches: Vec<Mismatch>,
}

fn parse_double(text: &str) -> Result<f64> {
    <f64 as Real>::parse_decimal(text, DOUBLE_PREC)
        .wrap_err_with(|| format!("Invalid reference value: {}", text))
}

fn report_failed_entry<E: TestEntry>(entry: &E, lines: &[String]) {
    warn!("Entry failed test:\n{}\n{}", entry.describe(), lines.join("\n"));
}

/// Certified intervals computed from the decimal inputs must lie inside the
/// references rounded to `target_prec` bits (default: derived from the
/// file's digit count).
pub fn run_test(path: &str, kind: IntegralKind, target_prec: Option<u32>) -> Result<BatchReport> {
    if kind.is_single() {
        run_interval::<SingleEntry>(path, kind, target_prec)
    } else {
        run_interval::<IntegralEntry>(path, kind, target_prec)
    }
}

/// Double-precision engine against the references, relative `tolerance`.
pub fn run_test_d(path: &str, kind: IntegralKind, tolerance: f64) -> Result<BatchReport> {
    if kind.is_single() {
        run_double::<SingleEntry>(path, kind, tolerance)
    } else {
        run_double::<IntegralEntry>(path, kind, tolerance)
    }
}

/// Results of the exact wrapper must reproduce, bit for bit, either the
/// reference value or a recomputation with `exact_prec` bits from the same
/// double inputs. A recomputation with fewer than `required_bits` certified
/// bits aborts the run.
pub fn run_test_exact(
    path: &str,
    kind: IntegralKind,
    exact_prec: u32,
    required_bits: i64,
) -> Result<BatchReport> {
    if kind.is_single() {
        run_exact::<SingleEntry>(path, kind, exact_prec, required_bits)
    } else {
        run_exact::<IntegralEntry>(path, kind, exact_prec, required_bits)
    }
}

fn run_interval<E: Evaluate>(
    path: &str,
    kind: IntegralKind,
    target_prec: Option<u32>,
) -> Result<BatchReport> {
    let data = read_test_data::<E>(path, 4, false)?;
    let ndigits = data.ndigits()?;
    let target_prec = target_prec.unwrap_or_else(|| working_precision(ndigits));
    ensure!(
        target_prec <= MAX_WORKING_PREC,
        "Target precision {} above the maximum of {} bits",
        target_prec,
        MAX_WORKING_PREC
    );
    let computed_bits = target_prec
        .checked_add(REFERENCE_GUARD_BITS)
        .ok_or_else(|| eyre!("Target precision {} out of range", target_prec))?;
    info!(
        "Interval test of {} ({} entries, {} digits, target precision {})",
        kind.name(),
        data.entries.len(),
        ndigits,
        target_prec
    );

    let mut report = BatchReport {
        nentries: data.entries.len(),
        ..Default::default()
    };
    for (i, entry) in data.entries.iter().enumerate() {
        let (values, _) = entry
            .certified(kind, computed_bits)
            .wrap_err_with(|| format!("Failed to compute entry {}", i))?;

        for (j, (value, text)) in values.iter().zip(entry.integrals()).enumerate() {
            report.nvalues += 1;
            if let Some(miss) = check_reference(value, text, ndigits, target_prec, i, j)? {
                warn!(
                    "Entry failed test:\n   Calculated: {}\n    Reference: {}",
                    miss.calculated, miss.reference
                );
                report.nfailed += 1;
                report.mismatches.push(miss);
            }
        }
    }

    print_results(report.nfailed, report.nvalues);
    Ok(report)
}

fn run_double<E: Evaluate>(path: &str, kind: IntegralKind, tolerance: f64) -> Result<BatchReport> {
    let data = read_test_data::<E>(path, 4, false)?;
    info!(
        "Double precision test of {} ({} entries, tolerance {:e})",
        kind.name(),
        data.entries.len(),
        tolerance
    );

    let mut report = BatchReport {
        nentries: data.entries.len(),
        ..Default::default()
    };
    for (i, entry) in data.entries.iter().enumerate() {
        let values = entry
            .double(kind)
            .wrap_err_with(|| format!("Failed to compute entry {}", i))?;

        let mut lines = Vec::new();
        for (j, (&value, text)) in values.iter().zip(entry.integrals()).enumerate() {
            report.nvalues += 1;
            let reference = parse_double(text)?;
            if almost_equal(value, reference, tolerance) {
                continue;
            }
            let reldiff = (reference - value).abs() / reference.abs().max(value.abs());
            lines.push(format!(
                "   Calculated: {:.17e}\n    Reference: {:.17e}\nRelative Diff: {:e}",
                value, reference, reldiff
            ));
            report.mismatches.push(Mismatch {
                entry: i,
                index: j,
                calculated: format!("{:.17e}", value),
                reference: format!("{:.17e}", reference),
            });
        }
        if !lines.is_empty() {
            report_failed_entry(entry, &lines);
            report.nfailed += 1;
        }
    }

    print_results(report.nfailed, report.nentries);
    Ok(report)
}

fn run_exact<E: Evaluate>(
    path: &str,
    kind: IntegralKind,
    exact_prec: u32,
    required_bits: i64,
) -> Result<BatchReport> {
    let data = read_test_data::<E>(path, 4, false)?;
    ensure!(
        exact_prec <= MAX_WORKING_PREC,
        "Recomputation precision {} above the maximum of {} bits",
        exact_prec,
        MAX_WORKING_PREC
    );
    let settle_bits = u32::try_from(required_bits.max(0)).unwrap_or(u32::MAX);
    info!(
        "Exact double precision test of {} ({} entries, recomputed with {} bits)",
        kind.name(),
        data.entries.len(),
        exact_prec
    );

    let mut report = BatchReport {
        nentries: data.entries.len(),
        ..Default::default()
    };
    for (i, entry) in data.entries.iter().enumerate() {
        let values = entry
            .exact(kind)
            .wrap_err_with(|| format!("Failed to compute entry {}", i))?;
        let mut recomputed = entry
            .recomputed(kind, exact_prec)
            .wrap_err_with(|| format!("Failed to recompute entry {}", i))?;
        settle_zeros(&mut recomputed, settle_bits);
        let achieved = min_accuracy_bits(&recomputed);
        if achieved < required_bits {
            bail!(
                "Not enough bits in the recomputation of entry {}: {} < {} at {} bits",
                i,
                achieved,
                required_bits,
                exact_prec
            );
        }

        let mut lines = Vec::new();
        let expected = recomputed.iter().zip(entry.integrals());
        for (j, (&value, (hp, text))) in values.iter().zip(expected).enumerate() {
            report.nvalues += 1;
            let recorded = parse_double(text)?;
            let reference = hp.mid_f64();
            if exact_matches(value, recorded, reference) {
                continue;
            }
            lines.push(format!(
                "     Calculated: {:.17e}\n      Reference: {:.17e}\n File Reference: {:.17e}",
                value, reference, recorded
            ));
            report.mismatches.push(Mismatch {
                entry: i,
                index: j,
                calculated: format!("{:.17e}", value),
                reference: format!("{:.17e}", reference),
            });
        }
        if !lines.is_empty() {
            report_failed_entry(entry, &lines);
            report.nfailed += 1;
        }
    }

    print_results(report.nfailed, report.nentries);
    Ok(report)
}
