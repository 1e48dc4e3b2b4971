//! Stokes vectors and sparse Mueller matrices.

use std::ops::Mul;

use radtrace_math::{Mat4, Vec4};
use serde::{Deserialize, Serialize};

/// Polarization state (I, Q, U, V) relative to a reference x axis.
///
/// I is the statistical weight of a radiation package; Q and U describe
/// linear polarization along the reference axes, V circular polarization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stokes {
    /// Total intensity.
    pub i: f64,
    /// Linear polarization along x (positive) or y (negative).
    pub q: f64,
    /// Linear polarization along the diagonals.
    pub u: f64,
    /// Circular polarization.
    pub v: f64,
}

impl Stokes {
    /// Stokes vector from its four components.
    pub fn new(i: f64, q: f64, u: f64, v: f64) -> Self {
        Self { i, q, u, v }
    }

    /// Unpolarized light of the given intensity.
    pub fn unpolarized(intensity: f64) -> Self {
        Self::new(intensity, 0.0, 0.0, 0.0)
    }

    /// Components as a 4-vector.
    pub fn to_vector(&self) -> Vec4 {
        Vec4::new(self.i, self.q, self.u, self.v)
    }

    /// Stokes vector from a 4-vector.
    pub fn from_vector(v: &Vec4) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    /// Fraction of the intensity that is polarized (0 for zero intensity).
    pub fn degree_of_polarization(&self) -> f64 {
        if self.i <= 0.0 {
            return 0.0;
        }
        (self.q * self.q + self.u * self.u + self.v * self.v).sqrt() / self.i
    }

    /// Express the state relative to a reference frame rotated by `angle`
    /// radians about the propagation axis.
    pub fn rotated(&self, angle: f64) -> Self {
        let (s, c) = (2.0 * angle).sin_cos();
        Self::new(
            self.i,
            self.q * c + self.u * s,
            -self.q * s + self.u * c,
            self.v,
        )
    }

    /// Multiply every component by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.i * factor,
            self.q * factor,
            self.u * factor,
            self.v * factor,
        )
    }
}

impl Default for Stokes {
    fn default() -> Self {
        Self::unpolarized(1.0)
    }
}

// =============================================================================
// Mueller matrix
// =============================================================================

/// A 4x4 Mueller matrix holding only its non-zero entries.
///
/// Most optical models used here are block-diagonal (Rayleigh, grey
/// coatings, depolarizing phase functions), so storing and applying only
/// the non-zero entries keeps the per-event cost down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MuellerMatrix {
    entries: [(u8, u8, f64); 16],
    len: usize,
}

impl MuellerMatrix {
    /// The zero matrix (absorbs everything).
    pub fn zero() -> Self {
        Self {
            entries: [(0, 0, 0.0); 16],
            len: 0,
        }
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        Self::diagonal([1.0; 4])
    }

    /// A diagonal matrix.
    pub fn diagonal(diagonal: [f64; 4]) -> Self {
        let mut m = Self::zero();
        for (k, value) in diagonal.into_iter().enumerate() {
            m.push(k, k, value);
        }
        m
    }

    /// Sparse copy of a dense matrix.
    pub fn from_dense(dense: &Mat4) -> Self {
        let mut m = Self::zero();
        for row in 0..4 {
            for col in 0..4 {
                m.push(row, col, dense[(row, col)]);
            }
        }
        m
    }

    /// Dense copy of this matrix.
    pub fn to_dense(&self) -> Mat4 {
        let mut dense = Mat4::zeros();
        for &(row, col, value) in self.entries() {
            dense[(row as usize, col as usize)] = value;
        }
        dense
    }

    /// Entry at (`row`, `col`); zero when not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries()
            .iter()
            .find(|&&(r, c, _)| r as usize == row && c as usize == col)
            .map_or(0.0, |&(_, _, value)| value)
    }

    /// The (1,1) element: the intensity response to unpolarized light.
    pub fn m11(&self) -> f64 {
        self.get(0, 0)
    }

    /// Number of stored (non-zero) entries.
    pub fn nonzero_count(&self) -> usize {
        self.len
    }

    /// Multiply every entry by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut m = *self;
        for entry in &mut m.entries[..m.len] {
            entry.2 *= factor;
        }
        m
    }

    /// Left-multiply a Stokes vector.
    pub fn apply(&self, stokes: &Stokes) -> Stokes {
        let input = [stokes.i, stokes.q, stokes.u, stokes.v];
        let mut out = [0.0; 4];
        for &(row, col, value) in self.entries() {
            out[row as usize] += value * input[col as usize];
        }
        Stokes::new(out[0], out[1], out[2], out[3])
    }

    fn entries(&self) -> &[(u8, u8, f64)] {
        &self.entries[..self.len]
    }

    fn push(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries[self.len] = (row as u8, col as u8, value);
            self.len += 1;
        }
    }
}

impl Default for MuellerMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul<Stokes> for &MuellerMatrix {
    type Output = Stokes;

    fn mul(self, stokes: Stokes) -> Stokes {
        self.apply(&stokes)
    }
}
