//! Debug visualization of grid predictions
//!
//! Grid scores are thresholded, collapsed to one channel, broadcast from the
//! `S x S` grid to full resolution, and blended onto the image as a green
//! tint: `0.6 * image + 0.4 * overlay`.

use cellnet_common::{grid_cells, DatasetError, NormalizedImage, Result};
use ndarray::{s, Array2, Array3, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Weight of the original image in the blend
pub const IMAGE_WEIGHT: f32 = 0.6;
/// Weight of the overlay in the blend
pub const OVERLAY_WEIGHT: f32 = 0.4;
/// Channel that carries the overlay (green)
pub const OVERLAY_CHANNEL: usize = 1;

/// Which class planes feed the single-channel overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassSelection {
    /// A cell is lit if any class fired there
    #[default]
    Union,
    /// Only the given class plane is shown
    Single(usize),
}

/// Parameters for [`embed_output`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Scores at or above this value count as detections
    pub threshold: f32,
    /// Cells per axis of the score grid (S)
    pub grid_size: usize,
    /// Side length of the region the grid maps onto
    pub src_img_size: usize,
    #[serde(default)]
    pub selection: ClassSelection,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            grid_size: 7,
            src_img_size: 224,
            selection: ClassSelection::Union,
        }
    }
}

/// Scores mapped to {0, 1}: 1 where `score >= threshold`
#[must_use]
pub fn binarize(logits: ArrayView3<f32>, threshold: f32) -> Array3<f32> {
    logits.mapv(|v| if v >= threshold { 1.0 } else { 0.0 })
}

/// Collapse a binary `[S, S, C]` grid to `[S, S]`
pub fn collapse_classes(binary: ArrayView3<f32>, selection: ClassSelection) -> Result<Array2<f32>> {
    let num_classes = binary.len_of(Axis(2));
    match selection {
        ClassSelection::Union => {
            if num_classes == 0 {
                return Err(DatasetError::InvalidConfig(
                    "score grid has no class planes".to_string(),
                ));
            }
            Ok(binary.fold_axis(Axis(2), 0.0, |&acc, &v| acc.max(v)))
        }
        ClassSelection::Single(class) => {
            if class >= num_classes {
                return Err(DatasetError::InvalidConfig(format!(
                    "class {class} out of range for {num_classes} class planes"
                )));
            }
            Ok(binary.index_axis(Axis(2), class).to_owned())
        }
    }
}

/// Full-resolution `[height, width]` mask for the given score grid.
///
/// The mask starts at 1 and each grid cell's pixels are multiplied by the
/// cell's binary value. Pixels not covered by any cell (outside
/// `src_img_size`) keep the value 1.
pub fn presence_mask(
    dims: (usize, usize),
    logits: ArrayView3<f32>,
    config: &OverlayConfig,
) -> Result<Array2<f32>> {
    let grid_size = config.grid_size;
    if grid_size == 0 {
        return Err(DatasetError::InvalidConfig(
            "grid_size must be at least 1".to_string(),
        ));
    }
    let (rows, cols, classes) = logits.dim();
    if (rows, cols) != (grid_size, grid_size) {
        return Err(DatasetError::ShapeMismatch {
            expected: vec![grid_size, grid_size, classes],
            actual: vec![rows, cols, classes],
        });
    }

    let overlay = collapse_classes(binarize(logits, config.threshold).view(), config.selection)?;

    let (height, width) = dims;
    let mut mask = Array2::<f32>::ones((height, width));
    for cell in grid_cells(grid_size, config.src_img_size) {
        let y = cell.rows.start.min(height)..cell.rows.end.min(height);
        let x = cell.cols.start.min(width)..cell.cols.end.min(width);
        if y.is_empty() || x.is_empty() {
            continue;
        }
        let value = overlay[[cell.row, cell.col]];
        mask.slice_mut(s![y, x]).mapv_inplace(|v| v * value);
    }

    Ok(mask)
}

/// Blend thresholded grid predictions onto a normalized image.
///
/// Returns an array with the same shape as `image`.
///
/// # Errors
/// `ShapeMismatch` if the image is not 3-channel or the scores are not
/// `[grid_size, grid_size, C]`; `InvalidConfig` for a zero grid size or a
/// class selection outside the score planes.
pub fn embed_output(
    image: ArrayView3<f32>,
    logits: ArrayView3<f32>,
    config: &OverlayConfig,
) -> Result<NormalizedImage> {
    let (height, width, channels) = image.dim();
    if channels != 3 {
        return Err(DatasetError::ShapeMismatch {
            expected: vec![height, width, 3],
            actual: vec![height, width, channels],
        });
    }

    let mask = presence_mask((height, width), logits, config)?;
    debug!(
        "Overlay mask covers {} of {} pixels",
        mask.iter().filter(|&&v| v > 0.0).count(),
        mask.len()
    );

    let mut blended = image.to_owned() * IMAGE_WEIGHT;
    blended
        .index_axis_mut(Axis(2), OVERLAY_CHANNEL)
        .scaled_add(OVERLAY_WEIGHT, &mask);
    Ok(blended)
}
