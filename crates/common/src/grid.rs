//! Grid-cell geometry shared by the label downsampler and the overlay.
//!
//! A source resolution `src` is split into `S` cells per axis. Cell `i` covers
//! pixels `floor(i * src / S) .. floor((i + 1) * src / S)`. Each boundary is
//! computed on its own, so cells can differ in width by one pixel when `S`
//! does not divide `src`, and cells are empty when `S > src`.

use std::ops::Range;

/// Half-open pixel range covered by cell `index` along one axis
#[must_use]
#[inline]
pub fn cell_span(index: usize, grid_size: usize, src_size: usize) -> Range<usize> {
    debug_assert!(grid_size > 0, "grid_size must be positive");
    let start = index * src_size / grid_size;
    let end = (index + 1) * src_size / grid_size;
    start..end
}

/// One cell of an `S x S` grid with its pixel extents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl GridCell {
    /// Number of source pixels inside the cell
    #[must_use]
    pub fn area(&self) -> usize {
        self.rows.len() * self.cols.len()
    }
}

/// Iterate over all cells in row-major order
pub fn grid_cells(grid_size: usize, src_size: usize) -> impl Iterator<Item = GridCell> {
    (0..grid_size).flat_map(move |row| {
        (0..grid_size).map(move |col| GridCell {
            row,
            col,
            rows: cell_span(row, grid_size, src_size),
            cols: cell_span(col, grid_size, src_size),
        })
    })
}
