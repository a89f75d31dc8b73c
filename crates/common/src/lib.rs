//! Common types and utilities for cell-grid dataset preparation

use ndarray::Array3;
use std::path::PathBuf;
use thiserror::Error;

pub mod grid;
pub mod vocabulary;

pub use grid::{cell_span, grid_cells, GridCell};
pub use vocabulary::{normalize_name, ClassVocabulary};

/// Dataset preparation errors
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("Malformed annotation: {0}")]
    MalformedAnnotation(String),

    #[error("Label name not in name table: {0:?}")]
    UnmappedName(String),

    #[error("Class not in vocabulary: {0:?}")]
    UnknownClass(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Label array error: {0}")]
    Npy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for DatasetError {
    fn from(err: image::ImageError) -> Self {
        DatasetError::ImageDecode(err.to_string())
    }
}

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Dense per-pixel, per-class presence map, laid out `[height, width, classes]`
pub type PresenceTensor = Array3<f32>;

/// Coarse `[S, S, classes]` label derived from a presence tensor
pub type GridLabel = Array3<f32>;

/// Image as `[height, width, 3]` floats in `[-1, 1]`
pub type NormalizedImage = Array3<f32>;

/// Fail with `ShapeMismatch` unless `actual` equals `expected`
pub fn ensure_shape(expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DatasetError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        })
    }
}

/// Fail with `MissingFile` if `path` does not exist
pub fn ensure_exists(path: &std::path::Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DatasetError::MissingFile(path.to_path_buf()))
    }
}
