//! Reference file model and YAML reading/writing.
//!
//! An input description lists shell quartets; a reference file additionally
//! records the digit count and the computed values of every entry.

use color_eyre::eyre::{bail, ensure, Result, WrapErr};
use gaussint::cartesian::ncart;
use gaussint::exact::MAX_NDIGITS;
use gaussint::{PrimitiveText, Real, Shell, ShellText};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;

/// Shape and values shared by the entry kinds of a test file.
pub trait TestEntry {
    /// Checks the description part of the entry against `ncenter` centers.
    fn validate(&self, ncenter: usize) -> Result<()>;

    /// Number of values the entry produces.
    fn nintegrals(&self) -> usize;

    fn integrals(&self) -> &[String];

    fn set_integrals(&mut self, values: Vec<String>);

    /// Labels and positions of the centers, for failure reports.
    fn describe(&self) -> String;
}

/// One shell of an entry: a nuclear charge label plus the shell itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellRecord {
    pub z: u32,
    #[serde(flatten)]
    pub shell: ShellText,
}

/// A quartet of contracted shells and all of its values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegralEntry {
    pub shells: Vec<ShellRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrals: Vec<String>,
}

impl IntegralEntry {
    pub fn shell_texts(&self) -> Result<[&ShellText; 4]> {
        match self.shells.as_slice() {
            [a, b, c, d] => Ok([&a.shell, &b.shell, &c.shell, &d.shell]),
            other => bail!("entry has {} shells, expected 4", other.len()),
        }
    }

    /// The four shells parsed at `prec` bits.
    pub fn shells<T: Real>(&self, prec: u32) -> Result<[Shell<T>; 4]> {
        let [a, b, c, d] = self.shell_texts()?;
        Ok([a.parse(prec)?, b.parse(prec)?, c.parse(prec)?, d.parse(prec)?])
    }
}

impl TestEntry for IntegralEntry {
    fn validate(&self, ncenter: usize) -> Result<()> {
        ensure!(
            self.shells.len() == ncenter,
            "{} shells, expected {}",
            self.shells.len(),
            ncenter
        );
        for record in &self.shells {
            let shell = &record.shell;
            ensure!(shell.am >= 0, "negative angular momentum {}", shell.am);
            ensure!(
                shell.nprim > 0 && shell.ngeneral > 0,
                "shell without primitives or general contractions"
            );
            ensure!(
                shell.alpha.len() == shell.nprim,
                "{} exponents for {} primitives",
                shell.alpha.len(),
                shell.nprim
            );
            ensure!(
                shell.coeff.len() == shell.nprim * shell.ngeneral,
                "{} coefficients, expected {}",
                shell.coeff.len(),
                shell.nprim * shell.ngeneral
            );
        }
        Ok(())
    }

    fn nintegrals(&self) -> usize {
        self.shells
            .iter()
            .map(|s| ncart(s.shell.am) * s.shell.ngeneral)
            .product()
    }

    fn integrals(&self) -> &[String] {
        &self.integrals
    }

    fn set_integrals(&mut self, values: Vec<String>) {
        self.integrals = values;
    }

    fn describe(&self) -> String {
        self.shells
            .iter()
            .map(|s| {
                format!(
                    "{} {} {} {} {}",
                    s.z, s.shell.am, s.shell.xyz[0], s.shell.xyz[1], s.shell.xyz[2]
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One primitive of a single-component entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveRecord {
    pub z: u32,
    #[serde(flatten)]
    pub primitive: PrimitiveText,
}

/// One Cartesian component of four uncontracted primitives; a reference
/// file records exactly one value for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleEntry {
    pub primitives: Vec<PrimitiveRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrals: Vec<String>,
}

impl SingleEntry {
    pub fn primitive_texts(&self) -> Result<[&PrimitiveText; 4]> {
        match self.primitives.as_slice() {
            [a, b, c, d] => Ok([&a.primitive, &b.primitive, &c.primitive, &d.primitive]),
            other => bail!("entry has {} primitives, expected 4", other.len()),
        }
    }
}

impl TestEntry for SingleEntry {
    fn validate(&self, ncenter: usize) -> Result<()> {
        ensure!(
            self.primitives.len() == ncenter,
            "{} primitives, expected {}",
            self.primitives.len(),
            ncenter
        );
        for record in &self.primitives {
            record.primitive.cartesian()?;
        }
        Ok(())
    }

    fn nintegrals(&self) -> usize {
        1
    }

    fn integrals(&self) -> &[String] {
        &self.integrals
    }

    fn set_integrals(&mut self, values: Vec<String>) {
        self.integrals = values;
    }

    fn describe(&self) -> String {
        self.primitives
            .iter()
            .map(|p| {
                let [lx, ly, lz] = p.primitive.lmn;
                let [x, y, z] = &p.primitive.xyz;
                format!("{} {} {} {} {} {} {}", p.z, lx, ly, lz, x, y, z)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntegralData<E = IntegralEntry> {
    #[serde(default)]
    pub header: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndigits: Option<u32>,
    pub entries: Vec<E>,
}

impl<E: TestEntry> IntegralData<E> {
    /// Checks the shape of every entry. Reference files must also carry a
    /// digit count and one value per integral.
    pub fn validate(&self, ncenter: usize, is_input: bool) -> Result<()> {
        for (i, entry) in self.entries.iter().enumerate() {
            entry
                .validate(ncenter)
                .wrap_err_with(|| format!("Invalid entry {}", i))?;
            if !is_input {
                ensure!(
                    entry.integrals().len() == entry.nintegrals(),
                    "entry {}: {} reference values, expected {}",
                    i,
                    entry.integrals().len(),
                    entry.nintegrals()
                );
            }
        }
        if !is_input {
            let ndigits = self.ndigits()?;
            ensure!(
                (1..=MAX_NDIGITS).contains(&ndigits),
                "digit count {} outside 1..={}",
                ndigits,
                MAX_NDIGITS
            );
        }
        Ok(())
    }

    /// Digit count of a reference file.
    pub fn ndigits(&self) -> Result<u32> {
        match self.ndigits {
            Some(n) => Ok(n),
            None => bail!("reference file has no digit count"),
        }
    }
}

/// Reads and validates an input description (`is_input`) or a reference
/// file of any entry kind.
pub fn read_test_data<E>(path: &str, ncenter: usize, is_input: bool) -> Result<IntegralData<E>>
where
    E: TestEntry + DeserializeOwned,
{
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read integral file: {}", path))?;
    let data = serde_yml::from_str::<IntegralData<E>>(&content)
        .wrap_err_with(|| format!("Failed to parse integral file: {}", path))?;
    data.validate(ncenter, is_input)
        .wrap_err_with(|| format!("Invalid integral file: {}", path))?;
    Ok(data)
}

/// Shell-quartet entries.
pub fn read_integral_data(path: &str, ncenter: usize, is_input: bool) -> Result<IntegralData> {
    read_test_data(path, ncenter, is_input)
}

/// Single-component entries.
pub fn read_single_data(
    path: &str,
    ncenter: usize,
    is_input: bool,
) -> Result<IntegralData<SingleEntry>> {
    read_test_data(path, ncenter, is_input)
}

pub fn write_integral_data<E: Serialize>(path: &str, data: &IntegralData<E>) -> Result<()> {
    let content = serde_yml::to_string(data).wrap_err("Failed to serialize integral data")?;
    fs::write(path, content)
        .wrap_err_with(|| format!("Unable to write integral file: {}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = r#"
header: "two p shells"
entries:
  - shells:
      - z: 8
        am: 1
        xyz: ["0.0", "0.0", "0.5"]
        nprim: 2
        ngeneral: 1
        alpha: ["1.2", "0.3"]
        coeff: ["0.4", "0.7"]
      - z: 1
        am: 0
        xyz: ["0.1", "0.0", "0.0"]
        nprim: 1
        ngeneral: 2
        alpha: ["0.8"]
        coeff: ["1.0", "0.5"]
      - z: 1
        am: 0
        xyz: ["0.0", "0.2", "0.0"]
        nprim: 1
        ngeneral: 1
        alpha: ["1.5"]
        coeff: ["1.0"]
      - z: 8
        am: 1
        xyz: ["0.0", "0.0", "-0.5"]
        nprim: 1
        ngeneral: 1
        alpha: ["0.6"]
        coeff: ["1.0"]
"#;

    #[test]
    fn test_parse_input() {
        let data: IntegralData = serde_yml::from_str(INPUT).unwrap();
        data.validate(4, true).unwrap();
        assert_eq!(data.ndigits, None);
        assert_eq!(data.entries.len(), 1);

        let entry = &data.entries[0];
        assert_eq!(entry.nintegrals(), 3 * 2 * 1 * 3);
        assert_eq!(entry.shells[0].z, 8);
        assert_eq!(entry.shells[1].shell.coeff, vec!["1.0", "0.5"]);

        let shells: [Shell<f64>; 4] = entry.shells(53).unwrap();
        assert_eq!(shells[3].center.z, -0.5);
        assert_eq!(shells[1].ngeneral, 2);
    }

    #[test]
    fn test_reference_requires_values() {
        let data: IntegralData = serde_yml::from_str(INPUT).unwrap();
        assert!(data.validate(4, false).is_err());
        assert!(data.validate(2, true).is_err());
    }

    #[test]
    fn test_round_trip_through_yaml() {
        let mut data: IntegralData = serde_yml::from_str(INPUT).unwrap();
        data.ndigits = Some(20);
        data.entries[0].integrals = (0..18).map(|i| format!("{}.5e-3", i)).collect();
        data.validate(4, false).unwrap();

        let text = serde_yml::to_string(&data).unwrap();
        let back: IntegralData = serde_yml::from_str(&text).unwrap();
        assert_eq!(back, data);
    }

    const SINGLE: &str = r#"
header: "one component"
ndigits: 20
entries:
  - primitives:
      - z: 8
        lmn: [1, 0, 0]
        xyz: ["0.0", "0.0", "0.0"]
        alpha: "1.0"
      - z: 1
        lmn: [0, 0, 0]
        xyz: ["0.1", "0.0", "0.0"]
        alpha: "1.0"
      - z: 1
        lmn: [0, 0, 0]
        xyz: ["-0.1", "0.0", "0.0"]
        alpha: "1.0"
      - z: 8
        lmn: [0, 1, 1]
        xyz: ["0.0", "0.5", "0.0"]
        alpha: "0.5"
    integrals: ["0"]
"#;

    #[test]
    fn test_parse_single_entries() {
        let data: IntegralData<SingleEntry> = serde_yml::from_str(SINGLE).unwrap();
        data.validate(4, false).unwrap();
        let entry = &data.entries[0];
        assert_eq!(entry.nintegrals(), 1);
        assert_eq!(entry.primitives[3].primitive.lmn, [0, 1, 1]);
        assert_eq!(entry.primitive_texts().unwrap()[1].xyz[0], "0.1");
        assert!(entry.describe().starts_with("8 1 0 0 0.0 0.0 0.0\n"));

        let text = serde_yml::to_string(&data).unwrap();
        let back: IntegralData<SingleEntry> = serde_yml::from_str(&text).unwrap();
        assert_eq!(back, data);

        let mut missing = data.clone();
        missing.entries[0].integrals.clear();
        assert!(missing.validate(4, false).is_err());
        assert!(missing.validate(4, true).is_ok());

        let mut negative = data;
        negative.entries[0].primitives[0].primitive.lmn = [-1, 0, 0];
        assert!(negative.validate(4, true).is_err());
    }

    #[test]
    fn test_digit_count_is_bounded() {
        let mut data: IntegralData<SingleEntry> = serde_yml::from_str(SINGLE).unwrap();
        data.ndigits = Some(u32::MAX);
        assert!(data.validate(4, false).is_err());
        data.ndigits = Some(0);
        assert!(data.validate(4, false).is_err());
    }

    #[test]
    fn test_bad_shell_shape() {
        let mut data: IntegralData = serde_yml::from_str(INPUT).unwrap();
        data.entries[0].shells[0].shell.coeff.pop();
        assert!(data.validate(4, true).is_err());
    }
}
