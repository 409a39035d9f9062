// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::backend::{load_padded, store_partial, Backend};
use crate::math::{Precision, Vec3, Vector3};

/// Batch of points or directions stored as three parallel coordinate arrays.
///
/// Conversion to and from `&[Vec3]` is lossless in both directions. Lane
/// backends read `B::LANES` consecutive entries per coordinate with
/// [`Soa3::gather`]; a short tail is padded by repeating the last entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Soa3 {
    x: Vec<Precision>,
    y: Vec<Precision>,
    z: Vec<Precision>,
}

impl Soa3 {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a batch of `len` zero vectors.
    pub fn zeros(len: usize) -> Self {
        Self {
            x: vec![0.0; len],
            y: vec![0.0; len],
            z: vec![0.0; len],
        }
    }

    /// Creates an empty batch with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
        }
    }

    /// Converts from one-vector-per-point layout.
    pub fn from_vectors(points: &[Vec3]) -> Self {
        let mut soa = Self::with_capacity(points.len());
        for p in points {
            soa.push(*p);
        }
        soa
    }

    /// Converts back to one-vector-per-point layout.
    pub fn to_vectors(&self) -> Vec<Vec3> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Appends one entry.
    pub fn push(&mut self, v: Vec3) {
        self.x.push(v.x());
        self.y.push(v.y());
        self.z.push(v.z());
    }

    /// Entry `i`.
    pub fn get(&self, i: usize) -> Vec3 {
        Vec3::new(self.x[i], self.y[i], self.z[i])
    }

    /// Overwrites entry `i`.
    pub fn set(&mut self, i: usize, v: Vec3) {
        self.x[i] = v.x();
        self.y[i] = v.y();
        self.z[i] = v.z();
    }

    /// Truncates or zero-extends to `len` entries.
    pub fn resize(&mut self, len: usize) {
        self.x.resize(len, 0.0);
        self.y.resize(len, 0.0);
        self.z.resize(len, 0.0);
    }

    /// X coordinates.
    pub fn xs(&self) -> &[Precision] {
        &self.x
    }

    /// Y coordinates.
    pub fn ys(&self) -> &[Precision] {
        &self.y
    }

    /// Z coordinates.
    pub fn zs(&self) -> &[Precision] {
        &self.z
    }

    /// Copies the entries `range` into a new batch.
    pub fn slice(&self, range: core::ops::Range<usize>) -> Self {
        Self {
            x: self.x[range.clone()].to_vec(),
            y: self.y[range.clone()].to_vec(),
            z: self.z[range].to_vec(),
        }
    }

    /// Loads `B::LANES` entries starting at `start` as one lane bundle.
    pub fn gather<B: Backend>(&self, start: usize) -> Vector3<B::Float> {
        Vector3::new(
            load_padded::<B>(&self.x, start),
            load_padded::<B>(&self.y, start),
            load_padded::<B>(&self.z, start),
        )
    }

    /// Stores a lane bundle at `start`, dropping lanes past the end.
    pub fn scatter<B: Backend>(&mut self, start: usize, v: &Vector3<B::Float>) {
        store_partial::<B>(v.x(), &mut self.x, start);
        store_partial::<B>(v.y(), &mut self.y, start);
        store_partial::<B>(v.z(), &mut self.z, start);
    }
}

impl From<&[Vec3]> for Soa3 {
    fn from(points: &[Vec3]) -> Self {
        Self::from_vectors(points)
    }
}

impl FromIterator<Vec3> for Soa3 {
    fn from_iter<I: IntoIterator<Item = Vec3>>(iter: I) -> Self {
        let mut soa = Self::new();
        for v in iter {
            soa.push(v);
        }
        soa
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Lanes, Scalar};

    #[test]
    fn vectors_round_trip_losslessly() {
        let pts = vec![
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-0.0, 1e-30, Precision::MAX),
            Vec3::new(4.5, -6.25, 0.1),
        ];
        let soa = Soa3::from_vectors(&pts);
        assert_eq!(soa.len(), 3);
        assert_eq!(soa.xs(), &[1.0, -0.0, 4.5]);
        let back = soa.to_vectors();
        for (a, b) in pts.iter().zip(&back) {
            assert_eq!(a.to_array().map(Precision::to_bits), b.to_array().map(Precision::to_bits));
        }
    }

    #[test]
    fn gather_scatter_handles_tail() {
        let soa: Soa3 = (0..5).map(|i| Vec3::new(i as Precision, 0.0, 0.0)).collect();
        let mut out = Soa3::zeros(5);
        for start in (0..5).step_by(4) {
            let v = soa.gather::<Lanes<4>>(start);
            out.scatter::<Lanes<4>>(start, &v);
        }
        assert_eq!(out, soa);
        let one = soa.gather::<Scalar>(2);
        assert_eq!(one.x(), 2.0);
    }
}
