//! CellNet data preparation
//!
//! Convenience re-exports of the workspace crates:
//!
//! - [`annotation`]: XML bounding boxes to `[N, N, C]` presence tensors
//! - [`label_grid`]: presence tensors to coarse `[S, S, C]` grid labels
//! - [`imaging`]: image loading normalized to `[-1, 1]` and back
//! - [`overlay`]: thresholded grid scores blended onto an image
//! - [`dataset`]: manifest split and on-disk train/val materialization

pub use cellnet_annotation as annotation;
pub use cellnet_common as common;
pub use cellnet_dataset as dataset;
pub use cellnet_imaging as imaging;
pub use cellnet_label_grid as label_grid;
pub use cellnet_overlay as overlay;

pub use cellnet_common::{ClassVocabulary, DatasetError, Result};
