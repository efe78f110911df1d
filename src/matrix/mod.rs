pub mod io;
pub mod ops;

use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::errors::{RudderError, RudderResult};
use crate::rng;

/// A fixed-shape, row-major matrix of 64-bit floats. The shape is decided at
/// creation and never changes; every buffer a network touches during
/// training is one of these, allocated up front and reused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub(crate) data: Array2<f64>,
}

impl Matrix {
    /// Creates a zeroed matrix with the given shape.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            data: Array2::zeros((rows, columns)),
        }
    }

    /// Creates a matrix filled with independent uniform samples in `[min, max)`,
    /// drawn from the process-global generator.
    pub fn random(rows: usize, columns: usize, min: f64, max: f64) -> Self {
        let data = rng::with_rng(|rng| {
            Array2::random_using((rows, columns), Uniform::new(min, max), rng)
        });
        Self { data }
    }

    pub fn from_array(data: Array2<f64>) -> Self {
        Self { data }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn columns(&self) -> usize {
        self.data.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.data.nrows(), self.data.ncols())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The backing buffer in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        self.data
            .as_slice()
            .expect("matrix buffer is always standard layout")
    }

    pub fn as_slice_mut(&mut self) -> &mut [f64] {
        self.data
            .as_slice_mut()
            .expect("matrix buffer is always standard layout")
    }

    /// One row as a contiguous slice.
    pub fn row(&self, row: usize) -> &[f64] {
        let columns = self.columns();
        &self.as_slice()[row * columns..(row + 1) * columns]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let columns = self.columns();
        &mut self.as_slice_mut()[row * columns..(row + 1) * columns]
    }

    /// Sets every element to zero.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Overwrites this matrix with the contents of `src`.
    pub fn copy_from(&mut self, src: &Matrix) -> RudderResult<()> {
        if self.shape() != src.shape() {
            return Err(RudderError::ShapeMismatch {
                expected: self.shape(),
                found: src.shape(),
            });
        }
        self.data.assign(&src.data);
        Ok(())
    }

    /// Overwrites every element with an independent uniform sample in `[min, max)`.
    pub fn randomize(&mut self, min: f64, max: f64) {
        let dist = Uniform::new(min, max);
        rng::with_rng(|rng| self.data.mapv_inplace(|_| dist.sample(rng)));
    }

    pub fn mean(&self) -> f64 {
        self.data.mean().unwrap_or(0.0)
    }
}

impl std::ops::Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, column): (usize, usize)) -> &f64 {
        &self.data[[row, column]]
    }
}

impl std::ops::IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut f64 {
        &mut self.data[[row, column]]
    }
}
