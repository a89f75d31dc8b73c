//! Downsample dense presence tensors to the detector's coarse grid
//!
//! The source resolution is split into `S x S` cells (see
//! [`cellnet_common::grid`]). A coarse cell is marked present for a class when
//! at least `threshold_area` of its source pixels are present for that class.

use cellnet_common::{ensure_shape, grid_cells, DatasetError, GridLabel, Result};
use ndarray::{s, Array3, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for [`resize_label`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Cells per axis of the output grid (S)
    pub grid_size: usize,
    /// Channels in both input and output (C)
    pub num_classes: usize,
    /// Side length of the square source tensor
    pub src_img_size: usize,
    /// Minimum number of present pixels for a cell to count as present
    pub threshold_area: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_size: 7,
            num_classes: 1,
            src_img_size: 224,
            // A quarter of a 32x32 cell
            threshold_area: 256,
        }
    }
}

impl GridConfig {
    #[must_use]
    pub fn new(grid_size: usize, num_classes: usize, src_img_size: usize, threshold_area: u32) -> Self {
        Self {
            grid_size,
            num_classes,
            src_img_size,
            threshold_area,
        }
    }

    /// Reject configurations that cannot produce a meaningful grid.
    ///
    /// A zero threshold would mark every cell present, including cells of an
    /// all-zero tensor, so it is refused. A grid finer than the source leaves
    /// some cells without pixels, so those cells could never be marked; that
    /// is refused too.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(DatasetError::InvalidConfig(
                "grid_size must be at least 1".to_string(),
            ));
        }
        if self.threshold_area == 0 {
            return Err(DatasetError::InvalidConfig(
                "threshold_area must be at least 1".to_string(),
            ));
        }
        if self.grid_size > self.src_img_size {
            return Err(DatasetError::InvalidConfig(format!(
                "grid_size {} exceeds src_img_size {}",
                self.grid_size, self.src_img_size
            )));
        }
        Ok(())
    }
}

/// Aggregate a `[src, src, C]` presence tensor into a binary `[S, S, C]` grid.
///
/// # Errors
/// `InvalidConfig` for a zero grid size or threshold or a grid larger than
/// the source, `ShapeMismatch` if the label is not
/// `[src_img_size, src_img_size, num_classes]`.
pub fn resize_label(label: ArrayView3<f32>, config: &GridConfig) -> Result<GridLabel> {
    config.validate()?;
    let GridConfig {
        grid_size,
        num_classes,
        src_img_size,
        threshold_area,
    } = *config;
    ensure_shape(&[src_img_size, src_img_size, num_classes], label.shape())?;

    let threshold = threshold_area as f32;
    let mut resized = Array3::<f32>::zeros((grid_size, grid_size, num_classes));

    for cell in grid_cells(grid_size, src_img_size) {
        let column = label.slice(s![cell.rows.clone(), cell.cols.clone(), ..]);
        for class in 0..num_classes {
            let sum: f32 = column.index_axis(Axis(2), class).sum();
            if sum >= threshold {
                resized[[cell.row, cell.col, class]] = 1.0;
            }
        }
    }

    debug!(
        "Resized label {}x{} -> {}x{} ({} present cells)",
        src_img_size,
        src_img_size,
        grid_size,
        grid_size,
        resized.iter().filter(|&&v| v > 0.0).count()
    );

    Ok(resized)
}
