//! Midpoint-radius interval ("ball") arithmetic over MPFR floats.
//!
//! An [`Interval`] represents every real number in `[mid - rad, mid + rad]`.
//! The midpoint carries the working precision; the radius is a short float
//! that is only ever rounded upward, so each operation returns an interval
//! that provably encloses the exact result of the same operation applied to
//! any points of the operands.
//!
//! Rounding errors are bounded by one ulp of the rounded midpoint at the
//! working precision (twice the true half-ulp bound).

use crate::error::{IntegralError, Result};
use rug::float::{Constant, Round, Special};
use rug::ops::AssignRound;
use rug::Float;
use std::cmp::Ordering;
use std::fmt;

/// Precision (bits) of the radius.
const MAG_PREC: u32 = 64;

/// Smallest precision accepted for a midpoint.
const MIN_PREC: u32 = 2;

/// Accuracy reported for an exact value (zero radius).
pub const ACCURACY_EXACT: i64 = i64::MAX / 2;

#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    mid: Float,
    rad: Float,
}

/// Round `val` upward to radius precision.
fn upward<T>(val: T) -> Float
where
    Float: AssignRound<T, Round = Round, Ordering = Ordering>,
{
    Float::with_val_round(MAG_PREC, val, Round::Up).0
}

/// Round `val` downward to radius precision.
fn downward<T>(val: T) -> Float
where
    Float: AssignRound<T, Round = Round, Ordering = Ordering>,
{
    Float::with_val_round(MAG_PREC, val, Round::Down).0
}

/// One ulp of `value` at `prec` bits; zero for a zero value.
fn ulp(value: &Float, prec: u32) -> Float {
    if value.is_zero() {
        return Float::new(MAG_PREC);
    }
    match value.get_exp() {
        Some(exp) => Float::with_val(MAG_PREC, 1) << (exp - prec as i32),
        None => Float::with_val(MAG_PREC, Special::Infinity),
    }
}

/// Error bound for a midpoint that was rounded to nearest at `prec` bits.
fn rounding_error(value: &Float, prec: u32, dir: Ordering) -> Float {
    if dir == Ordering::Equal {
        Float::new(MAG_PREC)
    } else {
        ulp(value, prec)
    }
}

fn sum_upward(parts: &[Float]) -> Float {
    parts
        .iter()
        .fold(Float::new(MAG_PREC), |acc, part| upward(&acc + part))
}

impl Interval {
    fn rounded<T>(prec: u32, val: T) -> Self
    where
        Float: AssignRound<T, Round = Round, Ordering = Ordering>,
    {
        let prec = prec.max(MIN_PREC);
        let (mid, dir) = Float::with_val_round(prec, val, Round::Nearest);
        let rad = rounding_error(&mid, prec, dir);
        Interval { mid, rad }
    }

    /// Returns `[NaN +/- inf]`, the result of an operation that is undefined
    /// somewhere on its input intervals.
    fn indeterminate(prec: u32) -> Self {
        Interval {
            mid: Float::with_val(prec.max(MIN_PREC), Special::Nan),
            rad: Float::with_val(MAG_PREC, Special::Infinity),
        }
    }

    pub fn zero(prec: u32) -> Self {
        Interval {
            mid: Float::new(prec.max(MIN_PREC)),
            rad: Float::new(MAG_PREC),
        }
    }

    pub fn from_f64(x: f64, prec: u32) -> Self {
        Self::rounded(prec, x)
    }

    pub fn from_i64(n: i64, prec: u32) -> Self {
        Self::rounded(prec, n)
    }

    /// Parses a decimal string, e.g. `"-1.25e-3"`. The radius covers the
    /// binary rounding of the decimal value at `prec` bits.
    pub fn parse(text: &str, prec: u32) -> Result<Self> {
        let parsed =
            Float::parse(text.trim()).map_err(|_| IntegralError::Parse(text.to_string()))?;
        Ok(Self::rounded(prec, parsed))
    }

    /// pi enclosed at `prec` bits.
    pub fn pi(prec: u32) -> Self {
        Self::rounded(prec, Constant::Pi)
    }

    /// Working precision of the midpoint.
    pub fn prec(&self) -> u32 {
        self.mid.prec()
    }

    pub fn midpoint(&self) -> &Float {
        &self.mid
    }

    pub fn radius(&self) -> &Float {
        &self.rad
    }

    pub fn is_finite(&self) -> bool {
        self.mid.is_finite() && self.rad.is_finite()
    }

    pub fn is_exact(&self) -> bool {
        self.rad.is_zero()
    }

    /// Zero midpoint and zero radius.
    pub fn is_exact_zero(&self) -> bool {
        self.mid.is_zero() && self.rad.is_zero()
    }

    /// Midpoint rounded to the nearest double.
    pub fn mid_f64(&self) -> f64 {
        self.mid.to_f64()
    }

    pub fn add(&self, rhs: &Interval) -> Interval {
        let prec = self.prec().max(rhs.prec());
        let (mid, dir) = Float::with_val_round(prec, &self.mid + &rhs.mid, Round::Nearest);
        let err = rounding_error(&mid, prec, dir);
        let rad = sum_upward(&[self.rad.clone(), rhs.rad.clone(), err]);
        Interval { mid, rad }
    }

    pub fn sub(&self, rhs: &Interval) -> Interval {
        let prec = self.prec().max(rhs.prec());
        let (mid, dir) = Float::with_val_round(prec, &self.mid - &rhs.mid, Round::Nearest);
        let err = rounding_error(&mid, prec, dir);
        let rad = sum_upward(&[self.rad.clone(), rhs.rad.clone(), err]);
        Interval { mid, rad }
    }

    pub fn mul(&self, rhs: &Interval) -> Interval {
        let prec = self.prec().max(rhs.prec());
        let (mid, dir) = Float::with_val_round(prec, &self.mid * &rhs.mid, Round::Nearest);
        let err = rounding_error(&mid, prec, dir);

        // |xy - ab| <= |a| ry + |b| rx + rx ry
        let a = self.mid.clone().abs();
        let b = rhs.mid.clone().abs();
        let rad = sum_upward(&[
            upward(&a * &rhs.rad),
            upward(&b * &self.rad),
            upward(&self.rad * &rhs.rad),
            err,
        ]);
        Interval { mid, rad }
    }

    pub fn div(&self, rhs: &Interval) -> Interval {
        let prec = self.prec().max(rhs.prec());
        let b = rhs.mid.clone().abs();
        let b_low = downward(&b - &rhs.rad);
        if b_low.cmp0() != Some(Ordering::Greater) {
            return Self::indeterminate(prec);
        }

        let (mid, dir) = Float::with_val_round(prec, &self.mid / &rhs.mid, Round::Nearest);
        let err = rounding_error(&mid, prec, dir);

        // |x/y - a/b| <= (|a| ry + |b| rx) / (|b| (|b| - ry))
        let a = self.mid.clone().abs();
        let num = sum_upward(&[upward(&a * &rhs.rad), upward(&b * &self.rad)]);
        let den = downward(&b * &b_low);
        let rad = sum_upward(&[upward(&num / &den), err]);
        Interval { mid, rad }
    }

    pub fn neg(&self) -> Interval {
        Interval {
            mid: -self.mid.clone(),
            rad: self.rad.clone(),
        }
    }

    pub fn sqrt(&self) -> Interval {
        let prec = self.prec();
        let low = downward(&self.mid - &self.rad);
        match low.cmp0() {
            Some(Ordering::Greater) | Some(Ordering::Equal) => {}
            _ => return Self::indeterminate(prec),
        }

        let (mid, dir) = Float::with_val_round(prec, self.mid.sqrt_ref(), Round::Nearest);
        let err = rounding_error(&mid, prec, dir);

        let spread = if self.rad.is_zero() {
            Float::new(MAG_PREC)
        } else if low.is_zero() {
            // lower end touches zero: sqrt(m + r) bounds the distance to any point
            upward(upward(&self.mid + &self.rad).sqrt_ref())
        } else {
            // derivative bound 1 / (2 sqrt(m - r))
            let root_low = downward(low.sqrt_ref());
            upward(&self.rad / &root_low) >> 1i32
        };
        Interval {
            mid,
            rad: sum_upward(&[spread, err]),
        }
    }

    pub fn exp(&self) -> Interval {
        let prec = self.prec();
        let (mid, dir) = Float::with_val_round(prec, self.mid.exp_ref(), Round::Nearest);
        let err = rounding_error(&mid, prec, dir);

        // |exp(x) - exp(m)| <= exp(m) (exp(r) - 1)
        let spread = if self.rad.is_zero() {
            Float::new(MAG_PREC)
        } else {
            upward(&upward(self.mid.exp_ref()) * &upward(self.rad.exp_m1_ref()))
        };
        Interval {
            mid,
            rad: sum_upward(&[spread, err]),
        }
    }

    /// Rounds the midpoint to `prec` bits, moving the rounding error into the
    /// radius.
    pub fn set_round(&self, prec: u32) -> Interval {
        let prec = prec.max(MIN_PREC);
        let (mid, dir) = Float::with_val_round(prec, &self.mid, Round::Nearest);
        let err = rounding_error(&mid, prec, dir);
        Interval {
            mid,
            rad: sum_upward(&[self.rad.clone(), err]),
        }
    }

    /// Widens the radius by one ulp of the midpoint at `bits` bits.
    pub fn add_error_ulp(&self, bits: u32) -> Interval {
        Interval {
            mid: self.mid.clone(),
            rad: sum_upward(&[self.rad.clone(), ulp(&self.mid, bits)]),
        }
    }

    /// True if `other` lies entirely inside `self`.
    ///
    /// Endpoints are compared with outward-safe rounding, so a `true` answer
    /// is certain; borderline cases may answer `false`.
    pub fn contains(&self, other: &Interval) -> bool {
        if !self.is_finite() || !other.is_finite() {
            return false;
        }
        let prec = self.prec().max(other.prec()) + 2 * MAG_PREC;
        let self_lo = Float::with_val_round(prec, &self.mid - &self.rad, Round::Up).0;
        let self_hi = Float::with_val_round(prec, &self.mid + &self.rad, Round::Down).0;
        let other_lo = Float::with_val_round(prec, &other.mid - &other.rad, Round::Down).0;
        let other_hi = Float::with_val_round(prec, &other.mid + &other.rad, Round::Up).0;
        self_lo <= other_lo && other_hi <= self_hi
    }

    pub fn contains_point(&self, point: &Float) -> bool {
        self.contains(&Interval {
            mid: point.clone(),
            rad: Float::new(MAG_PREC),
        })
    }

    pub fn contains_zero(&self) -> bool {
        self.contains_point(&Float::new(MIN_PREC))
    }

    /// True unless the intervals are certainly disjoint.
    pub fn overlaps(&self, other: &Interval) -> bool {
        if !self.is_finite() || !other.is_finite() {
            return true;
        }
        let prec = self.prec().max(other.prec()) + 2 * MAG_PREC;
        let self_lo = Float::with_val_round(prec, &self.mid - &self.rad, Round::Down).0;
        let self_hi = Float::with_val_round(prec, &self.mid + &self.rad, Round::Up).0;
        let other_lo = Float::with_val_round(prec, &other.mid - &other.rad, Round::Down).0;
        let other_hi = Float::with_val_round(prec, &other.mid + &other.rad, Round::Up).0;
        self_lo <= other_hi && other_lo <= self_hi
    }

    /// Number of correct leading bits relative to the magnitude of the
    /// midpoint, i.e. roughly `-log2(rad / |mid|)`.
    ///
    /// Exact values report [`ACCURACY_EXACT`]; a nonzero radius around a zero
    /// midpoint, or a non-finite interval, reports `-ACCURACY_EXACT`.
    pub fn rel_accuracy_bits(&self) -> i64 {
        if !self.is_finite() {
            return -ACCURACY_EXACT;
        }
        if self.rad.is_zero() {
            return ACCURACY_EXACT;
        }
        match (self.mid.get_exp(), self.rad.get_exp()) {
            // |mid| >= 2^(em - 1), rad < 2^er
            (Some(em), Some(er)) => em as i64 - er as i64 - 1,
            _ => -ACCURACY_EXACT,
        }
    }

    /// Midpoint printed with `ndigits` significant decimal digits, without the
    /// radius. Zero prints as `"0"`.
    pub fn to_decimal(&self, ndigits: usize) -> String {
        if self.mid.is_zero() {
            return "0".to_string();
        }
        self.mid.to_string_radix(10, Some(ndigits.max(1)))
    }

    /// `[mid +/- rad]` with `ndigits` digits for the midpoint.
    pub fn to_string_with_radius(&self, ndigits: usize) -> String {
        format!(
            "[{} +/- {}]",
            self.to_decimal(ndigits),
            self.rad.to_string_radix(10, Some(3))
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // enough decimal digits for the working precision
        let ndigits = (self.prec() as f64 * std::f64::consts::LOG10_2).ceil() as usize;
        write!(f, "{}", self.to_string_with_radius(ndigits))
    }
}
