#[cfg(test)]
mod tests {
    use crate::cartesian::Cartesian;
    use crate::error::IntegralError;
    use crate::exact::{
        integral4_exact, integral4_single_exact, integral4_single_target,
        integral4_single_target_str, integral4_target, integral4_target_str, TARGET_GUARD_BITS,
    };
    use crate::interval::Interval;
    use crate::kernel::{
        CartesianLoop, ContractedLoop, PrimitiveGaussian, PrimitiveKernel, ShellKernel,
        SingleKernel,
    };
    use crate::kernels::Overlap4;
    use crate::loops::{cartloop4, loop4};
    use crate::real::{Real, DOUBLE_PREC};
    use crate::reference::{almost_equal, DOUBLE_TOLERANCE};
    use crate::shell::{nintegrals4, PrimitiveText, Shell, ShellText};
    use nalgebra::Vector3;
    use std::cell::Cell;

    /// Encodes the requested components as a number and counts calls.
    #[derive(Default)]
    struct Recorder {
        calls: Cell<usize>,
    }

    impl SingleKernel<f64> for Recorder {
        fn single(
            &self,
            lmn: [Cartesian; 4],
            _centers: [&Vector3<f64>; 4],
            _alpha: [&f64; 4],
            _prec: u32,
        ) -> f64 {
            self.calls.set(self.calls.get() + 1);
            lmn.iter()
                .fold(0.0, |acc, c| acc * 1000.0 + (c.lx * 100 + c.ly * 10 + c.lz) as f64)
        }
    }

    /// Product of the four exponents for every component.
    struct AlphaProduct;

    impl<T: Real> SingleKernel<T> for AlphaProduct {
        fn single(
            &self,
            _lmn: [Cartesian; 4],
            _centers: [&Vector3<T>; 4],
            alpha: [&T; 4],
            _prec: u32,
        ) -> T {
            alpha[0].mul(alpha[1]).mul(alpha[2]).mul(alpha[3])
        }
    }

    /// Returns a value that cannot meet any accuracy floor.
    struct Blurry;

    impl SingleKernel<Interval> for Blurry {
        fn single(
            &self,
            _lmn: [Cartesian; 4],
            _centers: [&Vector3<Interval>; 4],
            _alpha: [&Interval; 4],
            prec: u32,
        ) -> Interval {
            Interval::from_i64(1, prec).add_error_ulp(10)
        }
    }

    fn quartet<'a>(
        ams: [i32; 4],
        center: &'a Vector3<f64>,
        alpha: &'a f64,
    ) -> [PrimitiveGaussian<'a, f64>; 4] {
        ams.map(|am| PrimitiveGaussian { am, center, alpha })
    }

    fn shell(
        am: i32,
        center: [f64; 3],
        alpha: Vec<f64>,
        coeff: Vec<f64>,
        ngeneral: usize,
    ) -> Shell<f64> {
        Shell::new(am, Vector3::from(center), alpha, coeff, ngeneral).unwrap()
    }

    #[test]
    fn test_all_s_calls_kernel_once() {
        let (origin, alpha) = (Vector3::zeros(), 1.0);
        let kernel = Recorder::default();
        let mut output = vec![f64::NAN; 4];
        let gaussians = quartet([0, 0, 0, 0], &origin, &alpha);
        cartloop4(&mut output, gaussians, DOUBLE_PREC, &kernel).unwrap();
        assert_eq!(kernel.calls.get(), 1);
        assert_eq!(output[0], 0.0);
        assert!(output[1..].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_p_on_first_center_order() {
        let (origin, alpha) = (Vector3::zeros(), 1.0);
        let kernel = Recorder::default();
        let mut output = vec![f64::NAN; 3];
        let gaussians = quartet([1, 0, 0, 0], &origin, &alpha);
        cartloop4(&mut output, gaussians, DOUBLE_PREC, &kernel).unwrap();
        assert_eq!(kernel.calls.get(), 3);
        let scale = 1e9;
        assert_eq!(output, vec![100.0 * scale, 10.0 * scale, 1.0 * scale]);
    }

    #[test]
    fn test_every_slot_written_once() {
        let ams = [1, 2, 0, 1];
        let n = 3 * 6 * 3;
        let (origin, alpha) = (Vector3::zeros(), 1.0);
        let kernel = Recorder::default();
        let mut output = vec![f64::NAN; n + 2];
        cartloop4(&mut output, quartet(ams, &origin, &alpha), DOUBLE_PREC, &kernel).unwrap();

        assert_eq!(kernel.calls.get(), n);
        assert!(output[..n].iter().all(|v| !v.is_nan()));
        assert!(output[n..].iter().all(|v| v.is_nan()));

        // distinct component quadruples give distinct codes
        let mut codes: Vec<u64> = output[..n].iter().map(|&v| v as u64).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), n);

        // center 4 fastest: the first two slots differ only in the last component
        assert_eq!(output[1] - output[0], 10.0 - 100.0);
    }

    #[test]
    fn test_cartloop_rejects_before_writing() {
        let (origin, alpha) = (Vector3::zeros(), 1.0);
        let kernel = Recorder::default();
        let mut output = vec![f64::NAN; 8];
        let too_many = quartet([1, 1, 0, 0], &origin, &alpha);
        assert_eq!(
            cartloop4(&mut output, too_many, DOUBLE_PREC, &kernel).unwrap_err(),
            IntegralError::OutputTooSmall {
                found: 8,
                required: 9
            }
        );
        let negative = quartet([0, -1, 0, 0], &origin, &alpha);
        assert_eq!(
            cartloop4(&mut output, negative, DOUBLE_PREC, &kernel).unwrap_err(),
            IntegralError::InvalidAngularMomentum(-1)
        );
        assert_eq!(kernel.calls.get(), 0);
        assert!(output.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_single_primitive_reduces_to_coefficients() {
        let s1 = shell(1, [0.0, 0.0, 0.0], vec![2.0], vec![0.5, -1.0], 2);
        let s2 = shell(0, [1.0, 0.0, 0.0], vec![3.0], vec![0.25], 1);
        let s3 = shell(0, [0.0, 1.0, 0.0], vec![1.0], vec![4.0], 1);
        let s4 = shell(0, [0.0, 0.0, 1.0], vec![0.5], vec![2.0], 1);
        let shells = [&s1, &s2, &s3, &s4];
        assert_eq!(nintegrals4(shells), 6);

        let mut output = vec![0.0; 6];
        let kernel = CartesianLoop(AlphaProduct);
        loop4(&mut output, shells, DOUBLE_PREC, &kernel).unwrap();

        let prim = 2.0 * 3.0 * 1.0 * 0.5;
        let first = 0.5 * 0.25 * 4.0 * 2.0 * prim;
        let second = -1.0 * 0.25 * 4.0 * 2.0 * prim;
        assert_eq!(output, vec![first, first, first, second, second, second]);
    }

    #[test]
    fn test_contraction_sums_primitives() {
        // with a separable kernel the contraction factorizes per shell
        let s1 = shell(0, [0.0; 3], vec![1.0, 2.0], vec![0.5, 0.25], 1);
        let s2 = shell(0, [0.0; 3], vec![3.0, 0.5, 1.5], vec![1.0, 2.0, -1.0], 1);
        let s3 = shell(1, [0.0; 3], vec![1.0], vec![1.0], 1);
        let s4 = shell(0, [0.0; 3], vec![4.0, 0.25], vec![0.5, 2.0], 1);
        let mut output = vec![f64::NAN; 3];
        let kernel = CartesianLoop(AlphaProduct);
        loop4(&mut output, [&s1, &s2, &s3, &s4], DOUBLE_PREC, &kernel).unwrap();

        let factor =
            |s: &Shell<f64>| -> f64 { s.alpha.iter().zip(&s.coeff).map(|(a, c)| a * c).sum() };
        let expected = factor(&s1) * factor(&s2) * factor(&s3) * factor(&s4);
        for value in output {
            assert!((value - expected).abs() < 1e-14);
        }
    }

    #[test]
    fn test_loop4_validates_first() {
        let good = shell(0, [0.0; 3], vec![1.0], vec![1.0], 1);
        let mut bad = good.clone();
        bad.coeff.push(1.0);

        let mut output = vec![f64::NAN; 4];
        let kernel = CartesianLoop(AlphaProduct);
        let err = loop4(&mut output, [&good, &bad, &good, &good], DOUBLE_PREC, &kernel);
        assert_eq!(
            err.unwrap_err(),
            IntegralError::CoefficientLength {
                found: 2,
                expected: 1
            }
        );

        let p = shell(1, [0.0; 3], vec![1.0], vec![1.0], 1);
        let err = loop4(&mut output, [&p, &p, &good, &good], DOUBLE_PREC, &kernel);
        assert_eq!(
            err.unwrap_err(),
            IntegralError::OutputTooSmall {
                found: 4,
                required: 9
            }
        );
        assert!(output.iter().all(|v| v.is_nan()));
    }

    /// A fused per-primitive kernel plugs in directly.
    struct Ones;

    impl PrimitiveKernel<f64> for Ones {
        fn primitive(
            &self,
            output: &mut [f64],
            gaussians: [PrimitiveGaussian<'_, f64>; 4],
            _prec: u32,
        ) -> crate::error::Result<()> {
            let n: usize = gaussians.iter().map(|g| crate::cartesian::ncart(g.am)).product();
            output[..n].iter_mut().for_each(|v| *v = 1.0);
            Ok(())
        }
    }

    #[test]
    fn test_fused_primitive_kernel() {
        let s = shell(0, [0.0; 3], vec![1.0, 2.0], vec![1.0, 1.0, 2.0, 3.0], 2);
        let mut output = vec![0.0; 16];
        ContractedLoop(Ones)
            .contracted(&mut output, [&s, &s, &s, &s], DOUBLE_PREC)
            .unwrap();
        // block (g1, g2, g3, g4): product of per-shell coefficient sums 2 and 5
        let sums = [2.0, 5.0];
        for (block, value) in output.iter().enumerate() {
            let expected: f64 = (0..4).map(|c| sums[(block >> (3 - c)) & 1]).product();
            assert_eq!(*value, expected);
        }
    }

    fn p_quartet() -> [Shell<f64>; 4] {
        [
            shell(1, [0.1, -0.2, 0.3], vec![1.3, 0.4], vec![0.6, 0.5], 1),
            shell(0, [-0.35, 0.15, 0.05], vec![0.9], vec![1.0], 1),
            shell(1, [0.2, 0.3, -0.25], vec![0.7], vec![1.1], 1),
            shell(2, [0.9, -0.8, 1.1], vec![1.8, 0.6], vec![0.3, 0.8, 0.2, 0.5], 2),
        ]
    }

    #[test]
    fn test_exact_agrees_with_double() {
        let shells = p_quartet();
        let refs = [&shells[0], &shells[1], &shells[2], &shells[3]];
        let nint = nintegrals4(refs);
        assert_eq!(nint, 3 * 3 * 6 * 2);

        let kernel = ContractedLoop(CartesianLoop(Overlap4));
        let mut double = vec![0.0; nint];
        kernel.contracted(&mut double, refs, DOUBLE_PREC).unwrap();
        let mut exact = vec![0.0; nint];
        integral4_exact(&mut exact, refs, &kernel).unwrap();

        for (d, e) in double.iter().zip(&exact) {
            assert!(almost_equal(*d, *e, DOUBLE_TOLERANCE), "{} vs {}", d, e);
        }
    }

    #[test]
    fn test_single_exact() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(0.5, 0.0, 0.0);
        let s = Cartesian::new(0, 0, 0);
        let lmn = [Cartesian::new(1, 0, 0), s, s, s];
        let alpha = [1.0, 0.5, 0.25, 2.0];

        let exact = integral4_single_exact(lmn, [&a, &b, &a, &b], alpha, &Overlap4).unwrap();
        let alpha_refs = [&alpha[0], &alpha[1], &alpha[2], &alpha[3]];
        let double = Overlap4.single(lmn, [&a, &b, &a, &b], alpha_refs, DOUBLE_PREC);
        assert!(almost_equal(exact, double, DOUBLE_TOLERANCE));

        let err = integral4_single_exact(lmn, [&a, &b, &a, &b], alpha, &Blurry).unwrap_err();
        assert!(matches!(err, IntegralError::InsufficientPrecision { required: 64, .. }));
    }

    #[test]
    fn test_exact_rejects_short_output() {
        let shells = p_quartet();
        let refs = [&shells[0], &shells[1], &shells[2], &shells[3]];
        let mut output = vec![0.0; 5];
        let kernel = ContractedLoop(CartesianLoop(Overlap4));
        assert!(matches!(
            integral4_exact(&mut output, refs, &kernel),
            Err(IntegralError::OutputTooSmall { .. })
        ));
    }

    #[test]
    fn test_target_reaches_requested_bits() {
        let shells = p_quartet();
        let refs = [&shells[0], &shells[1], &shells[2], &shells[3]];
        let nint = nintegrals4(refs);
        let kernel = ContractedLoop(CartesianLoop(Overlap4));

        let mut values = vec![Interval::zero(64); nint];
        let prec = integral4_target(&mut values, refs, 150, &kernel).unwrap();
        assert!(prec >= 166);
        assert!(crate::exact::min_accuracy_bits(&values) >= 150);

        let mut double = vec![0.0; nint];
        kernel.contracted(&mut double, refs, DOUBLE_PREC).unwrap();
        for (d, v) in double.iter().zip(&values) {
            assert!(almost_equal(*d, v.mid_f64(), DOUBLE_TOLERANCE));
        }
    }

    #[test]
    fn test_target_str_keeps_decimal_inputs() {
        let text = ShellText {
            am: 0,
            xyz: ["0.1".into(), "0.2".into(), "0.3".into()],
            nprim: 1,
            ngeneral: 1,
            alpha: vec!["0.7".into()],
            coeff: vec!["1.0".into()],
        };
        let origin = ShellText {
            xyz: ["0".into(), "0".into(), "0".into()],
            ..text.clone()
        };
        let kernel = ContractedLoop(CartesianLoop(Overlap4));

        let mut from_text = vec![Interval::zero(64)];
        let texts = [&text, &origin, &text, &origin];
        integral4_target_str(&mut from_text, texts, 200, &kernel).unwrap();

        let d_text: Shell<f64> = text.parse(DOUBLE_PREC).unwrap();
        let d_origin: Shell<f64> = origin.parse(DOUBLE_PREC).unwrap();
        let mut from_double = vec![Interval::zero(64)];
        integral4_target(&mut from_double, [&d_text, &d_origin, &d_text, &d_origin], 200, &kernel)
            .unwrap();

        // same value to double precision, but the double inputs are not 0.1 etc.
        assert!(almost_equal(from_text[0].mid_f64(), from_double[0].mid_f64(), DOUBLE_TOLERANCE));
        assert!(!from_text[0].overlaps(&from_double[0]));
    }

    #[test]
    fn test_target_gives_up_at_cap() {
        let s = shell(0, [0.0; 3], vec![1.0], vec![1.0], 1);
        let mut values = vec![Interval::zero(64)];
        let err = integral4_target(
            &mut values,
            [&s, &s, &s, &s],
            crate::exact::MAX_WORKING_PREC + 100,
            &ContractedLoop(CartesianLoop(Overlap4)),
        )
        .unwrap_err();
        assert!(matches!(err, IntegralError::PrecisionExhausted { .. }));

        let lmn = [Cartesian::new(0, 0, 0); 4];
        let origin = Vector3::zeros();
        let err = integral4_single_target(lmn, [&origin; 4], [1.0; 4], u32::MAX, &Overlap4)
            .unwrap_err();
        assert!(matches!(
            err,
            IntegralError::PrecisionExhausted {
                target: u32::MAX,
                ..
            }
        ));
    }

    fn text_shell(am: i32, xyz: [&str; 3], alpha: &str) -> ShellText {
        ShellText {
            am,
            xyz: xyz.map(String::from),
            nprim: 1,
            ngeneral: 1,
            alpha: vec![alpha.to_string()],
            coeff: vec!["1.0".to_string()],
        }
    }

    #[test]
    fn test_target_str_settles_symmetric_zeros() {
        // p on the midpoint of two s functions at +-0.1: every component
        // vanishes, but 0.1 is inexact in binary
        let p = text_shell(1, ["0", "0", "0"], "1.0");
        let right = text_shell(0, ["0.1", "0", "0"], "1.0");
        let left = text_shell(0, ["-0.1", "0", "0"], "1.0");
        let origin = text_shell(0, ["0", "0", "0"], "1.0");
        let kernel = ContractedLoop(CartesianLoop(Overlap4));

        let target = 120;
        let mut values = vec![Interval::zero(64); 3];
        let prec =
            integral4_target_str(&mut values, [&p, &right, &left, &origin], target, &kernel)
                .unwrap();
        assert_eq!(prec, target + TARGET_GUARD_BITS);
        assert!(values.iter().all(|v| v.is_exact_zero()));
        assert_eq!(values[0].to_decimal(20), "0");

        // moving one center breaks the symmetry and the x component survives
        let shifted = text_shell(0, ["-0.2", "0", "0"], "1.0");
        integral4_target_str(&mut values, [&p, &right, &shifted, &origin], target, &kernel)
            .unwrap();
        assert!(!values[0].is_exact_zero());
        assert!(values[0].rel_accuracy_bits() >= target as i64);
        assert!(values[1].is_exact_zero());
    }

    #[test]
    fn test_single_target_matches_contracted_component() {
        let a = Vector3::new(0.1, -0.2, 0.3);
        let b = Vector3::new(-0.35, 0.15, 0.05);
        let s = Cartesian::new(0, 0, 0);
        let lmn = [Cartesian::new(0, 1, 0), s, Cartesian::new(0, 0, 1), s];
        let alpha = [1.3, 0.9, 0.7, 0.4];

        let (value, prec) =
            integral4_single_target(lmn, [&a, &b, &b, &a], alpha, 150, &Overlap4).unwrap();
        assert!(prec >= 150 + TARGET_GUARD_BITS);
        assert!(value.rel_accuracy_bits() >= 150);

        // component (y, s, z, s) of the p s p s quartet: slot 1 * 3 + 2
        let shells = [
            shell(1, [0.1, -0.2, 0.3], vec![1.3], vec![1.0], 1),
            shell(0, [-0.35, 0.15, 0.05], vec![0.9], vec![1.0], 1),
            shell(1, [-0.35, 0.15, 0.05], vec![0.7], vec![1.0], 1),
            shell(0, [0.1, -0.2, 0.3], vec![0.4], vec![1.0], 1),
        ];
        let mut double = vec![0.0; 9];
        let refs = [&shells[0], &shells[1], &shells[2], &shells[3]];
        ContractedLoop(CartesianLoop(Overlap4))
            .contracted(&mut double, refs, DOUBLE_PREC)
            .unwrap();
        assert!(almost_equal(value.mid_f64(), double[5], DOUBLE_TOLERANCE));
    }

    #[test]
    fn test_single_target_str() {
        let primitive = |lmn: [i32; 3], xyz: [&str; 3], alpha: &str| PrimitiveText {
            lmn,
            xyz: xyz.map(String::from),
            alpha: alpha.to_string(),
        };
        let px = primitive([1, 0, 0], ["0", "0", "0"], "1.0");
        let right = primitive([0, 0, 0], ["0.1", "0", "0"], "1.0");
        let left = primitive([0, 0, 0], ["-0.1", "0", "0"], "1.0");
        let origin = primitive([0, 0, 0], ["0", "0", "0"], "1.0");
        let far = primitive([0, 0, 0], ["0.3", "0.2", "0"], "0.5");

        let (zero, _) =
            integral4_single_target_str([&px, &right, &left, &origin], 100, &Overlap4).unwrap();
        assert!(zero.is_exact_zero());

        let (value, _) =
            integral4_single_target_str([&px, &right, &far, &left], 100, &Overlap4).unwrap();
        assert!(value.rel_accuracy_bits() >= 100);
        assert!(!value.contains_zero());

        let bad = primitive([0, -1, 0], ["0", "0", "0"], "1.0");
        let err = integral4_single_target_str([&bad, &px, &px, &px], 100, &Overlap4).unwrap_err();
        assert_eq!(err, IntegralError::InvalidAngularMomentum(-1));
    }
}
