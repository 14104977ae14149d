//! Subspace partitioning: splits D-dimensional rows into M contiguous
//! Ds-wide slices without copying.

/// The `sub`-th slice of a single row.
#[inline]
pub fn slice_of(row: &[f32], sub: usize, ds: usize) -> &[f32] {
    let offset = sub * ds;
    &row[offset..offset + ds]
}

/// The `sub`-th slice of every row in a batch.
///
/// Borrows into the original rows; callers get an N-element view of the
/// subspace, not a copy of it.
pub fn slices_of<'a>(rows: &[&'a [f32]], sub: usize, ds: usize) -> Vec<&'a [f32]> {
    rows.iter().map(|row| slice_of(row, sub, ds)).collect()
}
