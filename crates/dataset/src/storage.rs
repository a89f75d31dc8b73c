//! `.npy` storage for presence tensors and grid labels

use cellnet_common::{ensure_exists, DatasetError, Result};
use ndarray::Array3;
use ndarray_npy::{read_npy, write_npy};
use std::path::Path;

/// Write a `[H, W, C]` label array as `.npy`
pub fn write_label<P: AsRef<Path>>(path: P, label: &Array3<f32>) -> Result<()> {
    let path = path.as_ref();
    write_npy(path, label).map_err(|e| DatasetError::Npy(format!("{}: {e}", path.display())))
}

/// Read a `[H, W, C]` f32 label array from `.npy`
pub fn read_label<P: AsRef<Path>>(path: P) -> Result<Array3<f32>> {
    let path = path.as_ref();
    ensure_exists(path)?;
    read_npy(path).map_err(|e| DatasetError::Npy(format!("{}: {e}", path.display())))
}
