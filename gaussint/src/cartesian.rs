//! Enumeration of Cartesian angular-momentum components.
//!
//! Components of a shell with angular momentum `am` are the exponent triples
//! `(lx, ly, lz)` with `lx + ly + lz = am`. They are always produced in
//! lexicographic order: `lx` descending, then `ly` descending. For `am = 2`
//! this is `xx, xy, xz, yy, yz, zz`. Output buffers and recorded reference
//! files index components in this order, so it must never change.

use crate::error::{IntegralError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cartesian {
    pub lx: i32,
    pub ly: i32,
    pub lz: i32,
}

impl Cartesian {
    pub fn new(lx: i32, ly: i32, lz: i32) -> Self {
        Self { lx, ly, lz }
    }

    pub fn am(&self) -> i32 {
        self.lx + self.ly + self.lz
    }

    /// Exponent along axis `d` (0 = x, 1 = y, 2 = z).
    pub fn axis(&self, d: usize) -> i32 {
        match d {
            0 => self.lx,
            1 => self.ly,
            _ => self.lz,
        }
    }
}

impl fmt::Display for Cartesian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.am() == 0 {
            return write!(f, "s");
        }
        for (axis, n) in [('x', self.lx), ('y', self.ly), ('z', self.lz)] {
            for _ in 0..n {
                write!(f, "{axis}")?;
            }
        }
        Ok(())
    }
}

/// Number of Cartesian components for angular momentum `am`.
///
/// Negative `am` has no components.
pub fn ncart(am: i32) -> usize {
    if am < 0 {
        return 0;
    }
    let am = am as usize;
    (am + 1) * (am + 2) / 2
}

/// Lazily walks the components of one angular momentum in canonical order.
#[derive(Debug, Clone)]
pub struct CartesianIter {
    am: i32,
    next: Option<Cartesian>,
}

impl CartesianIter {
    pub fn new(am: i32) -> Result<Self> {
        if am < 0 {
            return Err(IntegralError::InvalidAngularMomentum(am));
        }
        Ok(Self {
            am,
            next: Some(Cartesian::new(am, 0, 0)),
        })
    }
}

impl Iterator for CartesianIter {
    type Item = Cartesian;

    fn next(&mut self) -> Option<Cartesian> {
        let current = self.next?;
        self.next = if current.ly > 0 {
            // within a fixed lx, one unit moves from y to z
            Some(Cartesian::new(current.lx, current.ly - 1, current.lz + 1))
        } else if current.lx > 0 {
            let lx = current.lx - 1;
            Some(Cartesian::new(lx, self.am - lx, 0))
        } else {
            None
        };
        Some(current)
    }
}

/// All Cartesian components of `am`, in canonical order.
pub fn cartesians(am: i32) -> Result<Vec<Cartesian>> {
    if am < 0 {
        return Err(IntegralError::InvalidAngularMomentum(am));
    }
    let mut out = Vec::with_capacity(ncart(am));
    for lx in (0..=am).rev() {
        for ly in (0..=(am - lx)).rev() {
            out.push(Cartesian::new(lx, ly, am - lx - ly));
        }
    }
    Ok(out)
}
