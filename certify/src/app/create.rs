use super::entries::Evaluate;
use crate::config::IntegralKind;
use crate::io::{read_test_data, write_integral_data, IntegralEntry, SingleEntry};
use color_eyre::eyre::{ensure, Result, WrapErr};
use gaussint::exact::{working_precision, MAX_NDIGITS};
use tracing::{debug, info};

/// Computes reference values for every entry of `infile` and writes them,
/// with `ndigits` significant digits, to `outfile`. Returns the number of
/// values written.
pub fn create_test(
    infile: &str,
    outfile: &str,
    kind: IntegralKind,
    ndigits: u32,
    header: &str,
) -> Result<usize> {
    ensure!(
        (1..=MAX_NDIGITS).contains(&ndigits),
        "Digit count {} outside 1..={}",
        ndigits,
        MAX_NDIGITS
    );
    if kind.is_single() {
        create_entries::<SingleEntry>(infile, outfile, kind, ndigits, header)
    } else {
        create_entries::<IntegralEntry>(infile, outfile, kind, ndigits, header)
    }
}

fn create_entries<E: Evaluate>(
    infile: &str,
    outfile: &str,
    kind: IntegralKind,
    ndigits: u32,
    header: &str,
) -> Result<usize> {
    let mut data = read_test_data::<E>(infile, 4, true)?;
    data.ndigits = Some(ndigits);
    data.header.push_str(header);

    let target = working_precision(ndigits);
    info!(
        "Computing {} entries of {} with {} certified bits",
        data.entries.len(),
        kind.name(),
        target
    );

    let mut nvalues = 0;
    for (i, entry) in data.entries.iter_mut().enumerate() {
        let (values, prec) = entry
            .certified(kind, target)
            .wrap_err_with(|| format!("Failed to compute entry {}", i))?;
        debug!(entry = i, working_prec = prec, nint = values.len(), "entry computed");

        nvalues += values.len();
        entry.set_integrals(
            values
                .iter()
                .map(|v| v.to_decimal(ndigits as usize))
                .collect(),
        );
    }

    write_integral_data(outfile, &data)?;
    info!("{} reference values written to: {}", nvalues, outfile);
    Ok(nvalues)
}
