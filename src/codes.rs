//! Code matrices: N rows of M centroid indices, stored at the narrowest
//! integer width that fits the codebook size.

use crate::types::CodeWidth;

/// Width-tagged backing storage for a code matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CodeStorage {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

/// An N x M matrix of centroid indices.
///
/// Entry (n, m) is the index of the centroid chosen for vector n's m-th
/// subspace slice, always in `0..Ks`. The storage width is decided by the
/// quantizer at construction time, not per encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMatrix {
    rows: usize,
    cols: usize,
    storage: CodeStorage,
}

impl CodeMatrix {
    /// Assemble a matrix from per-subspace columns, each of length `rows`.
    ///
    /// `columns[m][n]` becomes entry (n, m). Every code must fit `width`;
    /// the quantizer guarantees this by deriving the width from Ks.
    pub(crate) fn from_columns(width: CodeWidth, rows: usize, columns: &[Vec<u32>]) -> Self {
        let cols = columns.len();
        debug_assert!(columns.iter().all(|c| c.len() == rows));

        let storage = match width {
            CodeWidth::U8 => {
                let mut data = Vec::with_capacity(rows * cols);
                for n in 0..rows {
                    for col in columns {
                        debug_assert!(col[n] <= u8::MAX as u32);
                        data.push(col[n] as u8);
                    }
                }
                CodeStorage::U8(data)
            }
            CodeWidth::U16 => {
                let mut data = Vec::with_capacity(rows * cols);
                for n in 0..rows {
                    for col in columns {
                        debug_assert!(col[n] <= u16::MAX as u32);
                        data.push(col[n] as u16);
                    }
                }
                CodeStorage::U16(data)
            }
            CodeWidth::U32 => {
                let mut data = Vec::with_capacity(rows * cols);
                for n in 0..rows {
                    for col in columns {
                        data.push(col[n]);
                    }
                }
                CodeStorage::U32(data)
            }
        };

        Self {
            rows,
            cols,
            storage,
        }
    }

    /// Number of encoded vectors (N).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of subspaces (M).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Storage width of each code.
    pub fn width(&self) -> CodeWidth {
        match &self.storage {
            CodeStorage::U8(_) => CodeWidth::U8,
            CodeStorage::U16(_) => CodeWidth::U16,
            CodeStorage::U32(_) => CodeWidth::U32,
        }
    }

    /// The code at (row, col), widened to u32.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        let idx = row * self.cols + col;
        match &self.storage {
            CodeStorage::U8(data) => data[idx] as u32,
            CodeStorage::U16(data) => data[idx] as u32,
            CodeStorage::U32(data) => data[idx],
        }
    }

    /// One row of codes, widened to u32.
    pub fn row(&self, row: usize) -> Vec<u32> {
        (0..self.cols).map(|m| self.get(row, m)).collect()
    }

    /// The raw u8 codes, if stored at 8-bit width.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.storage {
            CodeStorage::U8(data) => Some(data),
            _ => None,
        }
    }
}
