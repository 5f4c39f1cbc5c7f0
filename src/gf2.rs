//! Linear algebra over GF(2).
//!
//! Rows are packed into `u64` words so that row addition is a word-wise XOR.
//! [`BitMatrix`] mirrors the rational [`Matrix`][crate::matrix::Matrix] API:
//! reduction, kernel and back-substitution, with the last column of an
//! augmented system holding the constant term.

use std::fmt;

/// A fixed-length vector over GF(2).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitRow {
    /// Storage: each u64 holds 64 entries
    words: Vec<u64>,
    len: usize,
}

impl BitRow {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates the zero vector of the given length.
    pub fn zeros(len: usize) -> Self {
        let num_words = len.div_ceil(Self::BITS_PER_WORD);
        Self {
            words: vec![0; num_words],
            len,
        }
    }

    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        let bits: Vec<bool> = bits.into_iter().collect();
        let mut row = Self::zeros(bits.len());
        for (i, bit) in bits.into_iter().enumerate() {
            row.set(i, bit);
        }
        row
    }

    /// Gets the word index and bit position for a given bit index.
    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index {} out of range {}", index, self.len);
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        (self.words[word_idx] >> bit_idx) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "bit index {} out of range {}", index, self.len);
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        let mask = 1u64 << bit_idx;
        if value {
            self.words[word_idx] |= mask;
        } else {
            self.words[word_idx] &= !mask;
        }
    }

    /// Returns true if every entry is zero.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Index of the first set entry.
    pub fn first_one(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .find(|&(_, &w)| w != 0)
            .map(|(i, w)| i * Self::BITS_PER_WORD + w.trailing_zeros() as usize)
    }

    /// Adds `other` to `self` (XOR).
    pub fn xor_assign(&mut self, other: &BitRow) {
        assert_eq!(self.len, other.len, "adding rows of different lengths");
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a ^= b;
        }
    }

    /// Restricts the row to the given indices, in the given order.
    pub fn project(&self, indices: &[usize]) -> BitRow {
        BitRow::from_bits(indices.iter().map(|&i| self.get(i)))
    }

    /// Drops the last entry.
    pub fn truncated(&self) -> BitRow {
        assert!(self.len > 0, "cannot truncate an empty row");
        BitRow::from_bits(self.iter().take(self.len - 1))
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

impl fmt::Display for BitRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// A matrix over GF(2) with a fixed number of columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitMatrix {
    columns: usize,
    rows: Vec<BitRow>,
}

impl BitMatrix {
    pub fn new(columns: usize) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn from_rows(columns: usize, rows: Vec<BitRow>) -> Self {
        for row in &rows {
            assert_eq!(row.len(), columns, "row width does not match column count");
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &BitRow {
        &self.rows[index]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &BitRow> {
        self.rows.iter()
    }

    /// Gauss-Jordan elimination in place: each pivot is cleared both above and
    /// below. Returns the pivot columns.
    fn eliminate(&mut self) -> Vec<usize> {
        let mut pivots = Vec::new();
        let mut pivot_row = 0;
        for col in 0..self.columns {
            if pivot_row == self.rows.len() {
                break;
            }
            let Some(found) = (pivot_row..self.rows.len()).find(|&r| self.rows[r].get(col)) else {
                continue;
            };
            self.rows.swap(found, pivot_row);
            let pivot = self.rows[pivot_row].clone();
            for (r, row) in self.rows.iter_mut().enumerate() {
                if r != pivot_row && row.get(col) {
                    row.xor_assign(&pivot);
                }
            }
            pivots.push(col);
            pivot_row += 1;
        }
        pivots
    }

    /// Reduced row echelon form with zero rows removed.
    pub fn rref_minimal(mut self) -> BitMatrix {
        let rank = self.eliminate().len();
        self.rows.truncate(rank);
        self
    }

    /// Basis of the null space. Expects reduced row echelon form.
    pub fn kernel(&self) -> Vec<BitRow> {
        let pivots: Vec<(usize, usize)> = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(r, row)| row.first_one().map(|p| (r, p)))
            .collect();
        let mut is_pivot = vec![false; self.columns];
        for &(_, p) in &pivots {
            is_pivot[p] = true;
        }

        let mut basis = Vec::new();
        for free in (0..self.columns).filter(|&c| !is_pivot[c]) {
            let mut v = BitRow::zeros(self.columns);
            v.set(free, true);
            for &(r, p) in &pivots {
                v.set(p, self.rows[r].get(free));
            }
            basis.push(v);
        }
        basis
    }

    /// One solution of an augmented system in echelon form, free variables set
    /// to zero. Returns `None` if some row reads `0 = 1`.
    pub fn back_substitute(&self) -> Option<BitRow> {
        assert!(self.columns > 0, "augmented system needs a constant column");
        let last = self.columns - 1;
        let mut solution = BitRow::zeros(self.columns);
        solution.set(last, true);

        for row in self.rows.iter().rev() {
            let Some(lead) = row.first_one() else {
                continue;
            };
            if lead == last {
                return None;
            }
            let mut value = false;
            for j in (lead + 1)..self.columns {
                value ^= row.get(j) & solution.get(j);
            }
            solution.set(lead, value);
        }

        Some(solution.truncated())
    }

    /// Removes the last column.
    pub fn drop_last_column(&self) -> BitMatrix {
        assert!(self.columns > 0, "matrix has no columns to drop");
        let rows = self.rows.iter().map(BitRow::truncated).collect();
        BitMatrix {
            columns: self.columns - 1,
            rows,
        }
    }
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}
