//! Dense matrices over exact rationals.
//!
//! A [`Matrix`] is a list of rows of equal width. Linear systems are stored in
//! augmented form: a row `[a_0, ..., a_{n-1} | k]` stands for the equation
//! `a_0 * x_0 + ... + a_{n-1} * x_{n-1} + k = 0`.
//!
//! The central operation is [`Matrix::rref`], Gauss-Jordan elimination into
//! reduced row echelon form. Everything else (kernels, back-substitution,
//! spans) assumes its input has been reduced first.

use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::fraction::Fraction;

/// A dense rational matrix with a fixed number of columns.
///
/// Zero rows are allowed. Reduced matrices produced by
/// [`rref_minimal`][Matrix::rref_minimal] never contain them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix {
    columns: usize,
    rows: Vec<Vec<Fraction>>,
}

impl Matrix {
    /// Creates a matrix with no rows.
    pub fn new(columns: usize) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Creates a matrix from the given rows.
    ///
    /// # Panics
    ///
    /// Panics if some row does not have exactly `columns` entries.
    pub fn from_rows(columns: usize, rows: Vec<Vec<Fraction>>) -> Self {
        for row in &rows {
            assert_eq!(row.len(), columns, "row width does not match column count");
        }
        Self { columns, rows }
    }

    /// Creates a matrix from rows of machine integers.
    pub fn from_integers(columns: usize, rows: &[&[i64]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|&x| Fraction::integer(x)).collect())
            .collect();
        Self::from_rows(columns, rows)
    }

    /// The `size x size` identity matrix.
    pub fn identity(size: usize) -> Self {
        let rows = (0..size).map(|i| unit_vector(size, i)).collect();
        Self { columns: size, rows }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows, zero rows included.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &[Fraction] {
        &self.rows[index]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Fraction]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn get(&self, row: usize, column: usize) -> &Fraction {
        &self.rows[row][column]
    }

    pub fn push_row(&mut self, row: Vec<Fraction>) {
        assert_eq!(row.len(), self.columns, "row width does not match column count");
        self.rows.push(row);
    }

    pub fn into_rows(self) -> Vec<Vec<Fraction>> {
        self.rows
    }

    // ─── Elementary row operations ───

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
    }

    /// Multiplies row `i` by `factor`.
    pub fn scale_row(&mut self, i: usize, factor: &Fraction) {
        for x in &mut self.rows[i] {
            *x *= factor;
        }
    }

    /// Adds `factor * row[from]` to `row[to]`.
    pub fn add_scaled_row(&mut self, from: usize, to: usize, factor: &Fraction) {
        if factor.is_zero() || from == to {
            return;
        }
        let source = self.rows[from].clone();
        for (x, y) in self.rows[to].iter_mut().zip(&source) {
            if !y.is_zero() {
                *x += &(y * factor);
            }
        }
    }

    // ─── Structural operations ───

    /// Concatenates the rows of `self` and `other`.
    pub fn stack(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.columns, other.columns, "stacking matrices of different widths");
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().cloned());
        Matrix { columns: self.columns, rows }
    }

    /// Removes the last column, turning an augmented system into its coefficient matrix.
    pub fn drop_last_column(&self) -> Matrix {
        assert!(self.columns > 0, "matrix has no columns to drop");
        let rows = self.rows.iter().map(|row| row[..self.columns - 1].to_vec()).collect();
        Matrix {
            columns: self.columns - 1,
            rows,
        }
    }

    /// Appends the constant column `-h . point` to every row, so that the
    /// homogeneous system `H x = 0` becomes the affine system `H (x - point) = 0`.
    pub fn with_offset(&self, point: &[Fraction]) -> Matrix {
        assert_eq!(point.len(), self.columns, "point dimension does not match column count");
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut augmented = row.clone();
                augmented.push(-dot(row, point));
                augmented
            })
            .collect();
        Matrix {
            columns: self.columns + 1,
            rows,
        }
    }

    /// Computes `M v`.
    pub fn mul_vector(&self, v: &[Fraction]) -> Vec<Fraction> {
        assert_eq!(v.len(), self.columns, "vector dimension does not match column count");
        self.rows.iter().map(|row| dot(row, v)).collect()
    }

    // ─── Elimination ───

    /// Index of the first non-zero entry of each row.
    pub fn pivot_columns(&self) -> Vec<Option<usize>> {
        self.rows.iter().map(|row| leading_index(row)).collect()
    }

    /// Gauss-Jordan elimination in place. Returns the pivot columns in order.
    ///
    /// After this call every pivot equals one, pivot columns are otherwise
    /// zero, and zero rows sit at the bottom.
    fn eliminate(&mut self) -> Vec<usize> {
        let mut pivots = Vec::new();
        let mut pivot_row = 0;
        for col in 0..self.columns {
            if pivot_row == self.rows.len() {
                break;
            }
            let Some(found) = (pivot_row..self.rows.len()).find(|&r| !self.rows[r][col].is_zero()) else {
                continue;
            };
            self.swap_rows(found, pivot_row);
            let inverse = self.rows[pivot_row][col].recip();
            self.scale_row(pivot_row, &inverse);
            for r in 0..self.rows.len() {
                if r != pivot_row && !self.rows[r][col].is_zero() {
                    let factor = -&self.rows[r][col];
                    self.add_scaled_row(pivot_row, r, &factor);
                }
            }
            pivots.push(col);
            pivot_row += 1;
        }
        pivots
    }

    /// Reduced row echelon form, zero rows kept at the bottom.
    pub fn rref(mut self) -> Matrix {
        self.eliminate();
        self
    }

    /// Reduced row echelon form with zero rows removed.
    ///
    /// The result is canonical: two matrices with the same row space reduce to
    /// the same value.
    pub fn rref_minimal(mut self) -> Matrix {
        let rank = self.eliminate().len();
        self.rows.truncate(rank);
        self
    }

    /// Basis of the null space `{ v | M v = 0 }`.
    ///
    /// Expects `self` in reduced row echelon form. For each free column `f` the
    /// basis vector has `-1` at `f` and, for each pivot row `r` with pivot
    /// column `p`, the entry `M[r][f]` at `p`.
    pub fn kernel(&self) -> Vec<Vec<Fraction>> {
        let pivots: Vec<(usize, usize)> = self
            .pivot_columns()
            .into_iter()
            .enumerate()
            .filter_map(|(r, p)| p.map(|p| (r, p)))
            .collect();
        let mut is_pivot = vec![false; self.columns];
        for &(_, p) in &pivots {
            is_pivot[p] = true;
        }

        let mut basis = Vec::new();
        for free in (0..self.columns).filter(|&c| !is_pivot[c]) {
            let mut v = vec![Fraction::zero(); self.columns];
            v[free] = Fraction::minus_one();
            for &(r, p) in &pivots {
                v[p] = self.rows[r][free].clone();
            }
            basis.push(v);
        }
        basis
    }

    /// Finds one solution of an augmented system in echelon form.
    ///
    /// Free variables are set to zero. Returns `None` if some row reduces to
    /// `0 = k` with `k != 0`. Zero rows are skipped.
    pub fn back_substitute(&self) -> Option<Vec<Fraction>> {
        assert!(self.columns > 0, "augmented system needs a constant column");
        let last = self.columns - 1;
        let mut solution = vec![Fraction::zero(); self.columns];
        solution[last] = Fraction::one();

        for row in self.rows.iter().rev() {
            let Some(lead) = leading_index(row) else {
                continue;
            };
            if lead == last {
                return None;
            }
            let rest = row
                .iter()
                .zip(&solution)
                .enumerate()
                .filter(|&(j, (a, _))| j != lead && !a.is_zero())
                .fold(Fraction::zero(), |acc, (_, (a, x))| acc + a * x);
            solution[lead] = -rest / &row[lead];
        }

        solution.truncate(last);
        Some(solution)
    }

    /// Returns true if some row reads `0 = k` with `k != 0`.
    ///
    /// Only meaningful for augmented systems in echelon form.
    pub fn is_inconsistent(&self) -> bool {
        let last = self.columns.wrapping_sub(1);
        self.rows.iter().any(|row| leading_index(row) == Some(last))
    }

    /// Rows scaled to coprime integers.
    ///
    /// Each row is multiplied by the lcm of its denominators and divided by
    /// the gcd of the resulting entries.
    pub fn to_integer_rows(&self) -> Vec<Vec<BigInt>> {
        self.rows.iter().map(|row| integer_row(row)).collect()
    }
}

/// Homogeneous equations `H x = 0` whose solution set is the linear span of
/// `directions` in `columns`-dimensional space.
///
/// With no non-zero directions the span is the origin, described by the identity.
/// If the directions span everything, the result has no rows.
pub fn span_equations(columns: usize, directions: &[Vec<Fraction>]) -> Matrix {
    let basis = Matrix::from_rows(columns, directions.to_vec()).rref_minimal();
    if basis.is_empty() {
        return Matrix::identity(columns);
    }
    let normals = basis.kernel();
    Matrix::from_rows(columns, normals).rref_minimal()
}

pub fn unit_vector(size: usize, index: usize) -> Vec<Fraction> {
    let mut v = vec![Fraction::zero(); size];
    v[index] = Fraction::one();
    v
}

pub fn dot(a: &[Fraction], b: &[Fraction]) -> Fraction {
    a.iter()
        .zip(b)
        .filter(|(x, y)| !x.is_zero() && !y.is_zero())
        .fold(Fraction::zero(), |acc, (x, y)| acc + x * y)
}

/// Componentwise `a - b`.
pub fn difference(a: &[Fraction], b: &[Fraction]) -> Vec<Fraction> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// Componentwise `(a + b) / 2`.
pub fn midpoint(a: &[Fraction], b: &[Fraction]) -> Vec<Fraction> {
    let half = Fraction::new(1, 2);
    a.iter().zip(b).map(|(x, y)| (x + y) * &half).collect()
}

fn leading_index(row: &[Fraction]) -> Option<usize> {
    row.iter().position(|x| !x.is_zero())
}

fn integer_row(row: &[Fraction]) -> Vec<BigInt> {
    let lcm = row.iter().fold(BigInt::one(), |acc, x| acc.lcm(x.denom()));
    let scaled: Vec<BigInt> = row.iter().map(|x| x.numer() * (&lcm / x.denom())).collect();
    let gcd = scaled.iter().fold(BigInt::zero(), |acc, x| acc.gcd(x));
    if gcd.is_zero() || gcd.is_one() {
        return scaled;
    }
    scaled.into_iter().map(|x| x / &gcd).collect()
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        let mut widths = vec![0; self.columns];
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }
        for (i, row) in cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (j, cell) in row.iter().enumerate() {
                write!(f, " {:>width$}", cell, width = widths[j])?;
            }
            write!(f, " ]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn frac(n: i64, d: i64) -> Fraction {
        Fraction::new(n, d)
    }

    fn ints(xs: &[i64]) -> Vec<Fraction> {
        xs.iter().map(|&x| Fraction::integer(x)).collect()
    }

    #[test]
    fn test_rref_simple() {
        let m = Matrix::from_integers(3, &[&[2, 4, 6], &[1, 1, 1]]).rref_minimal();
        assert_eq!(m, Matrix::from_integers(3, &[&[1, 0, -1], &[0, 1, 2]]));
    }

    #[test]
    fn test_rref_keeps_zero_rows_at_bottom() {
        let m = Matrix::from_integers(2, &[&[0, 0], &[1, 2], &[2, 4]]).rref();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.row(0), ints(&[1, 2]).as_slice());
        assert!(m.row(1).iter().all(Zero::is_zero));
        assert!(m.row(2).iter().all(Zero::is_zero));
    }

    #[test]
    fn test_rref_idempotent() {
        let m = Matrix::from_integers(4, &[&[3, 1, 0, 2], &[1, -1, 5, 0], &[4, 0, 5, 2]]).rref_minimal();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.clone().rref_minimal(), m);
    }

    #[test]
    fn test_rref_fractional_pivots() {
        let m = Matrix::from_integers(2, &[&[3, 1]]).rref_minimal();
        assert_eq!(m.row(0), &[Fraction::one(), frac(1, 3)]);
    }

    #[test]
    fn test_kernel() {
        let m = Matrix::from_integers(3, &[&[1, 0, -1], &[0, 1, 2]]);
        let kernel = m.kernel();
        assert_eq!(kernel, vec![ints(&[-1, 2, -1])]);
        for v in &kernel {
            assert!(m.mul_vector(v).iter().all(Zero::is_zero));
        }
    }

    #[test]
    fn test_kernel_of_empty_matrix_is_everything() {
        let kernel = Matrix::new(3).kernel();
        assert_eq!(kernel.len(), 3);
        assert_eq!(Matrix::from_rows(3, kernel).rref_minimal(), Matrix::identity(3));
    }

    #[test]
    fn test_back_substitute() {
        // x - z + 2 = 0, y + 3 = 0
        let m = Matrix::from_integers(4, &[&[1, 0, -1, 2], &[0, 1, 0, 3]]);
        assert_eq!(m.back_substitute(), Some(ints(&[-2, -3, 0])));
    }

    #[test]
    fn test_back_substitute_skips_zero_rows() {
        let m = Matrix::from_integers(3, &[&[0, 0, 0], &[1, 0, -5], &[0, 0, 0], &[0, 1, 1]]).rref();
        assert_eq!(m.back_substitute(), Some(ints(&[5, -1])));
    }

    #[test]
    fn test_back_substitute_inconsistent() {
        let m = Matrix::from_integers(3, &[&[1, 1, 0], &[1, 1, -1]]).rref_minimal();
        assert!(m.is_inconsistent());
        assert_eq!(m.back_substitute(), None);
    }

    #[test]
    fn test_span_equations() {
        // span{(1, 1, 0)} in 3D: x - y = 0, z = 0
        let h = span_equations(3, &[ints(&[1, 1, 0])]);
        assert_eq!(h, Matrix::from_integers(3, &[&[1, -1, 0], &[0, 0, 1]]));
    }

    #[test]
    fn test_span_of_nothing_is_origin() {
        assert_eq!(span_equations(2, &[]), Matrix::identity(2));
        assert_eq!(span_equations(2, &[ints(&[0, 0])]), Matrix::identity(2));
    }

    #[test]
    fn test_span_of_everything_has_no_equations() {
        let h = span_equations(2, &[ints(&[1, 0]), ints(&[1, 1])]);
        assert!(h.is_empty());
    }

    #[test]
    fn test_with_offset() {
        // x - y = 0 through (3, 1) becomes x - y - 2 = 0
        let h = Matrix::from_integers(2, &[&[1, -1]]).with_offset(&ints(&[3, 1]));
        assert_eq!(h, Matrix::from_integers(3, &[&[1, -1, -2]]));
    }

    #[test]
    fn test_integer_rows() {
        let m = Matrix::from_rows(3, vec![vec![frac(1, 2), frac(-1, 3), frac(0, 1)], ints(&[4, 6, 8])]);
        let rows = m.to_integer_rows();
        assert_eq!(rows[0], vec![BigInt::from(3), BigInt::from(-2), BigInt::from(0)]);
        assert_eq!(rows[1], vec![BigInt::from(2), BigInt::from(3), BigInt::from(4)]);
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_rows(2, vec![vec![frac(1, 2), Fraction::integer(-10)]]);
        assert_eq!(m.to_string(), "[ 1/2 -10 ]");
    }
}
