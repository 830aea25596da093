//! Numeric abstraction shared by the looping engines.
//!
//! The engines are written once over [`Real`] and instantiated for plain
//! doubles and for [`Interval`]. Every constructor takes a working precision
//! in bits; doubles ignore it.

use crate::error::{IntegralError, Result};
use crate::interval::Interval;
use std::fmt;

/// Precision (bits) of an IEEE double.
pub const DOUBLE_PREC: u32 = 53;

pub trait Real: Clone + PartialEq + fmt::Debug + 'static {
    fn from_f64(x: f64, prec: u32) -> Self;
    fn from_i64(n: i64, prec: u32) -> Self;
    fn parse_decimal(text: &str, prec: u32) -> Result<Self>;
    fn pi(prec: u32) -> Self;

    fn zero(prec: u32) -> Self {
        Self::from_i64(0, prec)
    }

    fn one(prec: u32) -> Self {
        Self::from_i64(1, prec)
    }

    fn prec(&self) -> u32;

    fn add(&self, rhs: &Self) -> Self;
    fn sub(&self, rhs: &Self) -> Self;
    fn mul(&self, rhs: &Self) -> Self;
    fn div(&self, rhs: &Self) -> Self;
    fn neg(&self) -> Self;
    fn sqrt(&self) -> Self;
    fn exp(&self) -> Self;

    /// Integer power by repeated squaring.
    fn powi(&self, n: u32) -> Self {
        let mut result = Self::one(self.prec());
        let mut base = self.clone();
        let mut n = n;
        while n > 0 {
            if n & 1 == 1 {
                result = result.mul(&base);
            }
            n >>= 1;
            if n > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    fn is_exact_zero(&self) -> bool;
    fn to_f64(&self) -> f64;
    fn to_decimal(&self, ndigits: usize) -> String;
}

impl Real for f64 {
    fn from_f64(x: f64, _prec: u32) -> Self {
        x
    }

    fn from_i64(n: i64, _prec: u32) -> Self {
        n as f64
    }

    fn parse_decimal(text: &str, _prec: u32) -> Result<Self> {
        text.trim()
            .parse::<f64>()
            .map_err(|_| IntegralError::Parse(text.to_string()))
    }

    fn pi(_prec: u32) -> Self {
        std::f64::consts::PI
    }

    fn prec(&self) -> u32 {
        DOUBLE_PREC
    }

    fn add(&self, rhs: &Self) -> Self {
        self + rhs
    }

    fn sub(&self, rhs: &Self) -> Self {
        self - rhs
    }

    fn mul(&self, rhs: &Self) -> Self {
        self * rhs
    }

    fn div(&self, rhs: &Self) -> Self {
        self / rhs
    }

    fn neg(&self) -> Self {
        -self
    }

    fn sqrt(&self) -> Self {
        f64::sqrt(*self)
    }

    fn exp(&self) -> Self {
        f64::exp(*self)
    }

    fn is_exact_zero(&self) -> bool {
        *self == 0.0
    }

    fn to_f64(&self) -> f64 {
        *self
    }

    fn to_decimal(&self, ndigits: usize) -> String {
        if *self == 0.0 {
            return "0".to_string();
        }
        format!("{:.*e}", ndigits.max(1) - 1, self)
    }
}

impl Real for Interval {
    fn from_f64(x: f64, prec: u32) -> Self {
        Interval::from_f64(x, prec)
    }

    fn from_i64(n: i64, prec: u32) -> Self {
        Interval::from_i64(n, prec)
    }

    fn parse_decimal(text: &str, prec: u32) -> Result<Self> {
        Interval::parse(text, prec)
    }

    fn pi(prec: u32) -> Self {
        Interval::pi(prec)
    }

    fn zero(prec: u32) -> Self {
        Interval::zero(prec)
    }

    fn prec(&self) -> u32 {
        Interval::prec(self)
    }

    fn add(&self, rhs: &Self) -> Self {
        Interval::add(self, rhs)
    }

    fn sub(&self, rhs: &Self) -> Self {
        Interval::sub(self, rhs)
    }

    fn mul(&self, rhs: &Self) -> Self {
        Interval::mul(self, rhs)
    }

    fn div(&self, rhs: &Self) -> Self {
        Interval::div(self, rhs)
    }

    fn neg(&self) -> Self {
        Interval::neg(self)
    }

    fn sqrt(&self) -> Self {
        Interval::sqrt(self)
    }

    fn exp(&self) -> Self {
        Interval::exp(self)
    }

    fn is_exact_zero(&self) -> bool {
        Interval::is_exact_zero(self)
    }

    fn to_f64(&self) -> f64 {
        self.mid_f64()
    }

    fn to_decimal(&self, ndigits: usize) -> String {
        Interval::to_decimal(self, ndigits)
    }
}
