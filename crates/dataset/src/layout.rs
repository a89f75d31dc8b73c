//! Output directory layout of a materialized dataset

use cellnet_common::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Dataset split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
}

impl Split {
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "Training"),
            Split::Val => write!(f, "Validation"),
        }
    }
}

/// `<root>/{train,val}_{images,labels}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn images_dir(&self, split: Split) -> PathBuf {
        self.root.join(format!("{}_images", split.prefix()))
    }

    #[must_use]
    pub fn labels_dir(&self, split: Split) -> PathBuf {
        self.root.join(format!("{}_labels", split.prefix()))
    }

    /// Image file for record `index` of `split`
    #[must_use]
    pub fn image_path(&self, split: Split, index: usize) -> PathBuf {
        self.images_dir(split).join(format!("{index}.jpg"))
    }

    /// Label file for record `index` of `split`
    #[must_use]
    pub fn label_path(&self, split: Split, index: usize) -> PathBuf {
        self.labels_dir(split).join(format!("{index}.npy"))
    }

    /// Create any of the four output directories that are missing
    pub fn ensure_dirs(&self) -> Result<()> {
        ensure_dirs(&[
            self.images_dir(Split::Train),
            self.labels_dir(Split::Train),
            self.images_dir(Split::Val),
            self.labels_dir(Split::Val),
        ])
    }
}

/// Create each directory that does not exist yet
pub fn ensure_dirs<P: AsRef<Path>>(dirs: &[P]) -> Result<()> {
    for dir in dirs {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            debug!("Creating {}", dir.display());
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}
