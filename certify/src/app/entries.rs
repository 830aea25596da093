//! Evaluation of test-file entries by the engines under test.

use crate::config::IntegralKind;
use crate::io::testfile::{IntegralEntry, SingleEntry, TestEntry};
use color_eyre::eyre::Result;
use gaussint::exact::{
    integral4_exact, integral4_single_exact, integral4_single_target_str, integral4_target_str,
};
use gaussint::real::DOUBLE_PREC;
use gaussint::{Cartesian, Interval, PrimitiveText, Shell};
use nalgebra::Vector3;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The engine calls each comparison mode makes for one kind of entry.
pub(crate) trait Evaluate: TestEntry + Serialize + DeserializeOwned {
    /// Values certified to `target_bits` bits from the decimal inputs, and
    /// the working precision that reached them.
    fn certified(&self, kind: IntegralKind, target_bits: u32) -> Result<(Vec<Interval>, u32)>;

    /// Plain double-precision evaluation.
    fn double(&self, kind: IntegralKind) -> Result<Vec<f64>>;

    /// Double inputs through the interval oracle.
    fn exact(&self, kind: IntegralKind) -> Result<Vec<f64>>;

    /// Double inputs evaluated with `prec`-bit intervals.
    fn recomputed(&self, kind: IntegralKind, prec: u32) -> Result<Vec<Interval>>;
}

impl Evaluate for IntegralEntry {
    fn certified(&self, kind: IntegralKind, target_bits: u32) -> Result<(Vec<Interval>, u32)> {
        let kernel = kind.shell_kernel::<Interval>();
        let mut values = vec![Interval::zero(target_bits); self.nintegrals()];
        let prec = integral4_target_str(&mut values, self.shell_texts()?, target_bits, &*kernel)?;
        Ok((values, prec))
    }

    fn double(&self, kind: IntegralKind) -> Result<Vec<f64>> {
        let [s1, s2, s3, s4] = &self.shells::<f64>(DOUBLE_PREC)?;
        let mut values = vec![0.0; self.nintegrals()];
        kind.shell_kernel::<f64>()
            .contracted(&mut values, [s1, s2, s3, s4], DOUBLE_PREC)?;
        Ok(values)
    }

    fn exact(&self, kind: IntegralKind) -> Result<Vec<f64>> {
        let [s1, s2, s3, s4] = &self.shells::<f64>(DOUBLE_PREC)?;
        let mut values = vec![0.0; self.nintegrals()];
        integral4_exact(
            &mut values,
            [s1, s2, s3, s4],
            &*kind.shell_kernel::<Interval>(),
        )?;
        Ok(values)
    }

    fn recomputed(&self, kind: IntegralKind, prec: u32) -> Result<Vec<Interval>> {
        let shells = self.shells::<f64>(DOUBLE_PREC)?;
        let wide: [Shell<Interval>; 4] =
            shells.each_ref().map(|s| s.map(|&x| Interval::from_f64(x, prec)));
        let [w1, w2, w3, w4] = &wide;
        let mut values = vec![Interval::zero(prec); self.nintegrals()];
        kind.shell_kernel::<Interval>()
            .contracted(&mut values, [w1, w2, w3, w4], prec)?;
        Ok(values)
    }
}

/// Components, double-precision centers and exponents of the primitives.
fn double_primitives(
    primitives: [&PrimitiveText; 4],
) -> Result<([Cartesian; 4], [Vector3<f64>; 4], [f64; 4])> {
    let mut lmn = [Cartesian::new(0, 0, 0); 4];
    let mut centers = [Vector3::zeros(); 4];
    let mut alpha = [0.0; 4];
    for (i, primitive) in primitives.into_iter().enumerate() {
        lmn[i] = primitive.cartesian()?;
        (centers[i], alpha[i]) = primitive.parse::<f64>(DOUBLE_PREC)?;
    }
    Ok((lmn, centers, alpha))
}

impl Evaluate for SingleEntry {
    fn certified(&self, kind: IntegralKind, target_bits: u32) -> Result<(Vec<Interval>, u32)> {
        let kernel = kind.single_kernel::<Interval>();
        let (value, prec) =
            integral4_single_target_str(self.primitive_texts()?, target_bits, &*kernel)?;
        Ok((vec![value], prec))
    }

    fn double(&self, kind: IntegralKind) -> Result<Vec<f64>> {
        let (lmn, [c1, c2, c3, c4], [a1, a2, a3, a4]) = double_primitives(self.primitive_texts()?)?;
        let value = kind.single_kernel::<f64>().single(
            lmn,
            [&c1, &c2, &c3, &c4],
            [&a1, &a2, &a3, &a4],
            DOUBLE_PREC,
        );
        Ok(vec![value])
    }

    fn exact(&self, kind: IntegralKind) -> Result<Vec<f64>> {
        let (lmn, [c1, c2, c3, c4], alpha) = double_primitives(self.primitive_texts()?)?;
        let kernel = kind.single_kernel::<Interval>();
        let value = integral4_single_exact(lmn, [&c1, &c2, &c3, &c4], alpha, &*kernel)?;
        Ok(vec![value])
    }

    fn recomputed(&self, kind: IntegralKind, prec: u32) -> Result<Vec<Interval>> {
        let (lmn, centers, alpha) = double_primitives(self.primitive_texts()?)?;
        let [c1, c2, c3, c4] = centers.map(|c| c.map(|x| Interval::from_f64(x, prec)));
        let [a1, a2, a3, a4] = alpha.map(|a| Interval::from_f64(a, prec));
        let value = kind.single_kernel::<Interval>().single(
            lmn,
            [&c1, &c2, &c3, &c4],
            [&a1, &a2, &a3, &a4],
            prec,
        );
        Ok(vec![value])
    }
}
