use ndarray::linalg::general_mat_mul;
use ndarray::Zip;

use super::Matrix;

// In-place elementwise operators. Shape conformance is the caller's
// contract, checked only in debug builds.

impl std::ops::AddAssign<&Matrix> for Matrix {
    fn add_assign(&mut self, rhs: &Matrix) {
        debug_assert_eq!(self.shape(), rhs.shape());
        self.data += &rhs.data;
    }
}

impl std::ops::SubAssign<&Matrix> for Matrix {
    fn sub_assign(&mut self, rhs: &Matrix) {
        debug_assert_eq!(self.shape(), rhs.shape());
        self.data -= &rhs.data;
    }
}

/// Hadamard product, in place.
impl std::ops::MulAssign<&Matrix> for Matrix {
    fn mul_assign(&mut self, rhs: &Matrix) {
        debug_assert_eq!(self.shape(), rhs.shape());
        self.data *= &rhs.data;
    }
}

impl std::ops::MulAssign<f64> for Matrix {
    fn mul_assign(&mut self, rhs: f64) {
        self.data *= rhs;
    }
}

impl std::ops::DivAssign<f64> for Matrix {
    fn div_assign(&mut self, rhs: f64) {
        self.data /= rhs;
    }
}

// Composite kernels. Each writes into `self` so the caller controls every
// buffer; nothing here allocates.

impl Matrix {
    /// `self = a + b`, elementwise.
    pub fn assign_sum(&mut self, a: &Matrix, b: &Matrix) {
        debug_assert_eq!(self.shape(), a.shape());
        debug_assert_eq!(self.shape(), b.shape());
        Zip::from(&mut self.data)
            .and(&a.data)
            .and(&b.data)
            .for_each(|out, &x, &y| *out = x + y);
    }

    /// `self = a - b`, elementwise.
    pub fn assign_difference(&mut self, a: &Matrix, b: &Matrix) {
        debug_assert_eq!(self.shape(), a.shape());
        debug_assert_eq!(self.shape(), b.shape());
        Zip::from(&mut self.data)
            .and(&a.data)
            .and(&b.data)
            .for_each(|out, &x, &y| *out = x - y);
    }

    /// `self = a · b`.
    pub fn assign_dot(&mut self, a: &Matrix, b: &Matrix) {
        debug_assert_eq!(a.columns(), b.rows());
        debug_assert_eq!(self.shape(), (a.rows(), b.columns()));
        general_mat_mul(1.0, &a.data, &b.data, 0.0, &mut self.data);
    }

    /// `self = mᵀ`.
    pub fn assign_transpose(&mut self, m: &Matrix) {
        debug_assert_eq!(self.shape(), (m.columns(), m.rows()));
        self.data.assign(&m.data.t());
    }

    /// `self = (a · b)ᵀ`, computed as `bᵀ · aᵀ` so the product lands in the
    /// destination directly.
    pub fn assign_dot_transpose(&mut self, a: &Matrix, b: &Matrix) {
        debug_assert_eq!(a.columns(), b.rows());
        debug_assert_eq!(self.shape(), (b.columns(), a.rows()));
        general_mat_mul(1.0, &b.data.t(), &a.data.t(), 0.0, &mut self.data);
    }

    /// Column-sums of `m` replicated into every column of `self`.
    /// `self.rows = m.columns`; the column count of `self` picks the
    /// replication width.
    pub fn assign_sum_rows_transpose(&mut self, m: &Matrix) {
        debug_assert_eq!(self.rows(), m.columns());
        for (column, mut out_row) in m.data.columns().into_iter().zip(self.data.rows_mut()) {
            let sum = column.sum();
            out_row.fill(sum);
        }
    }

    /// Elementwise `self[i] = f(self[i])`.
    pub fn apply(&mut self, f: impl Fn(f64) -> f64) {
        self.data.mapv_inplace(f);
    }

    pub fn frobenius_norm(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}
