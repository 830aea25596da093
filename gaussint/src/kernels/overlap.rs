//! Four-center overlap of Cartesian Gaussians,
//! `∫ G1(r) G2(r) G3(r) G4(r) d³r`.
//!
//! The product of the four Gaussians is a single Gaussian centered at
//! `P = Σ αi Ai / γ`, `γ = Σ αi`, times the prefactor
//! `exp(-Σ_{i<j} αi αj |Ai - Aj|² / γ)`. Along each axis the polynomial part
//! `Π (x - Ai)^li` is expanded around `P` and integrated term by term using
//! the Gaussian moments `∫ u^k exp(-γu²) du = (k-1)!! / (2γ)^(k/2) * sqrt(π/γ)`
//! for even `k`.

use crate::cartesian::Cartesian;
use crate::kernel::SingleKernel;
use crate::real::Real;
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, Default)]
pub struct Overlap4;

impl<T: Real> SingleKernel<T> for Overlap4 {
    fn single(
        &self,
        lmn: [Cartesian; 4],
        centers: [&Vector3<T>; 4],
        alpha: [&T; 4],
        prec: u32,
    ) -> T {
        overlap4(lmn, centers, alpha, prec)
    }
}

pub fn overlap4<T: Real>(
    lmn: [Cartesian; 4],
    centers: [&Vector3<T>; 4],
    alpha: [&T; 4],
    prec: u32,
) -> T {
    let gamma = alpha[1..]
        .iter()
        .fold(alpha[0].clone(), |acc, &a| acc.add(a));

    let mut exponent = T::zero(prec);
    for i in 0..4 {
        for j in (i + 1)..4 {
            let mut dist2 = T::zero(prec);
            for d in 0..3 {
                let diff = centers[i][d].sub(&centers[j][d]);
                dist2 = dist2.add(&diff.mul(&diff));
            }
            exponent = exponent.add(&alpha[i].mul(alpha[j]).mul(&dist2));
        }
    }
    let prefactor = exponent.div(&gamma).neg().exp();

    let pi_over_gamma = T::pi(prec).div(&gamma);
    let mut value = prefactor.mul(&pi_over_gamma).mul(&pi_over_gamma.sqrt());
    for d in 0..3 {
        value = value.mul(&axis_factor(d, &lmn, &centers, &alpha, &gamma, prec));
    }
    value
}

/// `∫ Π (x - Ai)^li exp(-γ(x-P)²) dx / sqrt(π/γ)` along axis `d`.
fn axis_factor<T: Real>(
    d: usize,
    lmn: &[Cartesian; 4],
    centers: &[&Vector3<T>; 4],
    alpha: &[&T; 4],
    gamma: &T,
    prec: u32,
) -> T {
    // coefficients of the polynomial in u = x - P, lowest power first
    let mut poly = vec![T::one(prec)];
    for i in 0..4 {
        let l = lmn[i].axis(d);
        if l == 0 {
            continue;
        }

        // P - Ai = Σ_j αj (Aj - Ai) / γ, exactly zero for coincident centers
        let mut shift = T::zero(prec);
        for j in 0..4 {
            if j != i {
                let offset = centers[j][d].sub(&centers[i][d]);
                shift = shift.add(&alpha[j].mul(&offset));
            }
        }
        let shift = shift.div(gamma);

        // multiply by (u + shift), l times
        for _ in 0..l {
            let mut next = vec![T::zero(prec); poly.len() + 1];
            for (k, c) in poly.iter().enumerate() {
                next[k] = next[k].add(&c.mul(&shift));
                next[k + 1] = next[k + 1].add(c);
            }
            poly = next;
        }
    }

    let two_gamma = gamma.add(gamma);
    let mut moment = T::one(prec);
    let mut sum = poly[0].clone();
    for k in (2..poly.len()).step_by(2) {
        moment = moment
            .mul(&T::from_i64(k as i64 - 1, prec))
            .div(&two_gamma);
        sum = sum.add(&poly[k].mul(&moment));
    }
    sum
}
