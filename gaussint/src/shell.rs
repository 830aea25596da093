//! Contracted Gaussian shells.

use crate::cartesian::{ncart, Cartesian};
use crate::error::{IntegralError, Result};
use crate::kernel::PrimitiveGaussian;
use crate::real::Real;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A shell of Cartesian Gaussians sharing one center, one angular momentum
/// and one set of primitive exponents.
///
/// Coefficients are stored with the primitive index fastest:
/// `coeff[g * nprim + p]` multiplies primitive `p` in general contraction `g`.
/// They are used as given, without normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Shell<T: Real> {
    pub am: i32,
    pub center: Vector3<T>,
    pub nprim: usize,
    pub ngeneral: usize,
    pub alpha: Vec<T>,
    pub coeff: Vec<T>,
}

impl<T: Real> Shell<T> {
    pub fn new(
        am: i32,
        center: Vector3<T>,
        alpha: Vec<T>,
        coeff: Vec<T>,
        ngeneral: usize,
    ) -> Result<Self> {
        let shell = Shell {
            am,
            center,
            nprim: alpha.len(),
            ngeneral,
            alpha,
            coeff,
        };
        shell.validate()?;
        Ok(shell)
    }

    pub fn validate(&self) -> Result<()> {
        if self.am < 0 {
            return Err(IntegralError::InvalidAngularMomentum(self.am));
        }
        if self.nprim == 0 {
            return Err(IntegralError::NoPrimitives);
        }
        if self.ngeneral == 0 {
            return Err(IntegralError::NoGeneralContractions);
        }
        if self.alpha.len() != self.nprim {
            return Err(IntegralError::ExponentLength {
                found: self.alpha.len(),
                expected: self.nprim,
            });
        }
        if self.coeff.len() != self.nprim * self.ngeneral {
            return Err(IntegralError::CoefficientLength {
                found: self.coeff.len(),
                expected: self.nprim * self.ngeneral,
            });
        }
        Ok(())
    }

    pub fn ncart(&self) -> usize {
        ncart(self.am)
    }

    /// Number of contracted functions: `ncart * ngeneral`.
    pub fn nfunctions(&self) -> usize {
        self.ncart() * self.ngeneral
    }

    /// Coefficient of primitive `prim` in general contraction `general`.
    pub fn coeff(&self, general: usize, prim: usize) -> &T {
        &self.coeff[general * self.nprim + prim]
    }

    pub fn primitive(&self, prim: usize) -> PrimitiveGaussian<'_, T> {
        PrimitiveGaussian {
            am: self.am,
            center: &self.center,
            alpha: &self.alpha[prim],
        }
    }

    /// Same shell with every number converted by `f`.
    pub fn map<U: Real>(&self, f: impl Fn(&T) -> U) -> Shell<U> {
        Shell {
            am: self.am,
            center: Vector3::new(f(&self.center.x), f(&self.center.y), f(&self.center.z)),
            nprim: self.nprim,
            ngeneral: self.ngeneral,
            alpha: self.alpha.iter().map(&f).collect(),
            coeff: self.coeff.iter().map(&f).collect(),
        }
    }
}

/// Number of values produced for a quartet of shells.
pub fn nintegrals4<T: Real>(shells: [&Shell<T>; 4]) -> usize {
    shells.iter().map(|s| s.nfunctions()).product()
}

/// A shell whose numbers are kept as decimal strings so they can be read at
/// any working precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellText {
    pub am: i32,
    pub xyz: [String; 3],
    pub nprim: usize,
    pub ngeneral: usize,
    pub alpha: Vec<String>,
    pub coeff: Vec<String>,
}

impl ShellText {
    /// Parses every number at `prec` bits and validates the result.
    pub fn parse<T: Real>(&self, prec: u32) -> Result<Shell<T>> {
        let center = Vector3::new(
            T::parse_decimal(&self.xyz[0], prec)?,
            T::parse_decimal(&self.xyz[1], prec)?,
            T::parse_decimal(&self.xyz[2], prec)?,
        );
        let alpha = self
            .alpha
            .iter()
            .map(|a| T::parse_decimal(a, prec))
            .collect::<Result<Vec<T>>>()?;
        let coeff = self
            .coeff
            .iter()
            .map(|c| T::parse_decimal(c, prec))
            .collect::<Result<Vec<T>>>()?;
        let shell = Shell {
            am: self.am,
            center,
            nprim: self.nprim,
            ngeneral: self.ngeneral,
            alpha,
            coeff,
        };
        shell.validate()?;
        Ok(shell)
    }
}

/// One Cartesian component of a primitive Gaussian, in decimal form: the
/// building block of single-component entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveText {
    pub lmn: [i32; 3],
    pub xyz: [String; 3],
    pub alpha: String,
}

impl PrimitiveText {
    pub fn cartesian(&self) -> Result<Cartesian> {
        let [lx, ly, lz] = self.lmn;
        if let Some(&bad) = self.lmn.iter().find(|&&l| l < 0) {
            return Err(IntegralError::InvalidAngularMomentum(bad));
        }
        Ok(Cartesian::new(lx, ly, lz))
    }

    /// Center and exponent parsed at `prec` bits.
    pub fn parse<T: Real>(&self, prec: u32) -> Result<(Vector3<T>, T)> {
        let center = Vector3::new(
            T::parse_decimal(&self.xyz[0], prec)?,
            T::parse_decimal(&self.xyz[1], prec)?,
            T::parse_decimal(&self.xyz[2], prec)?,
        );
        Ok((center, T::parse_decimal(&self.alpha, prec)?))
    }
}
