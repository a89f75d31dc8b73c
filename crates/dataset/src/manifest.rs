//! Train/validation manifest: which image goes with which annotation

use cellnet_common::{ensure_exists, DatasetError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default share of records assigned to the training split
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.9;

/// One image and its annotation file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPaths {
    pub image: PathBuf,
    pub annotation: PathBuf,
}

impl RecordPaths {
    pub fn new(image: impl Into<PathBuf>, annotation: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            annotation: annotation.into(),
        }
    }
}

/// Pre-split record lists, stored as JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub train: Vec<RecordPaths>,
    pub val: Vec<RecordPaths>,
}

impl DatasetManifest {
    /// Total number of records in both splits
    #[must_use]
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a manifest written by [`DatasetManifest::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        ensure_exists(path)?;
        let raw = fs::read(path)?;
        serde_json::from_slice(&raw)
            .map_err(|e| DatasetError::Manifest(format!("{}: {e}", path.display())))
    }

    /// Write the manifest as pretty-printed JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DatasetError::Manifest(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Shuffle record pairs with a seeded RNG and split them.
    ///
    /// The first `floor(train_fraction * n)` shuffled records become the
    /// training split, the rest validation.
    pub fn from_pairs(mut pairs: Vec<RecordPaths>, train_fraction: f64, seed: u64) -> Result<Self> {
        if !(0.0..=1.0).contains(&train_fraction) {
            return Err(DatasetError::InvalidConfig(format!(
                "train_fraction must be within [0, 1], got {train_fraction}"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        pairs.shuffle(&mut rng);

        let train_len = (train_fraction * pairs.len() as f64) as usize;
        let val = pairs.split_off(train_len);
        Ok(Self { train: pairs, val })
    }

    /// Pair the sorted contents of an image and an annotation directory by
    /// position, then shuffle and split them.
    ///
    /// # Errors
    /// `MissingFile` if either directory is absent, `Manifest` if the two
    /// directories hold different numbers of files.
    pub fn split_from_dirs<P: AsRef<Path>, Q: AsRef<Path>>(
        images_dir: P,
        annotations_dir: Q,
        train_fraction: f64,
        seed: u64,
    ) -> Result<Self> {
        let images = list_files(images_dir.as_ref())?;
        let annotations = list_files(annotations_dir.as_ref())?;
        if images.len() != annotations.len() {
            return Err(DatasetError::Manifest(format!(
                "{} images but {} annotations",
                images.len(),
                annotations.len()
            )));
        }

        let pairs = images
            .into_iter()
            .zip(annotations)
            .map(|(image, annotation)| RecordPaths { image, annotation })
            .collect();
        let manifest = Self::from_pairs(pairs, train_fraction, seed)?;

        info!(
            "Split {} records: {} train, {} val (seed {})",
            manifest.len(),
            manifest.train.len(),
            manifest.val.len(),
            seed
        );
        Ok(manifest)
    }
}

/// Regular files directly inside `dir`, sorted by path
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_exists(dir)?;
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(n: usize) -> Vec<RecordPaths> {
        (0..n)
            .map(|i| RecordPaths::new(format!("img/{i}.jpg"), format!("xml/{i}.xml")))
            .collect()
    }

    #[test]
    fn test_split_sizes() {
        let manifest = DatasetManifest::from_pairs(pairs(25), 0.9, 7).unwrap();
        assert_eq!(manifest.train.len(), 22);
        assert_eq!(manifest.val.len(), 3);
        assert_eq!(manifest.len(), 25);
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let a = DatasetManifest::from_pairs(pairs(50), 0.8, 42).unwrap();
        let b = DatasetManifest::from_pairs(pairs(50), 0.8, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_keeps_pairs_together() {
        let manifest = DatasetManifest::from_pairs(pairs(30), 0.5, 3).unwrap();
        for record in manifest.train.iter().chain(&manifest.val) {
            let img = record.image.file_stem().unwrap();
            let xml = record.annotation.file_stem().unwrap();
            assert_eq!(img, xml);
        }
    }

    #[test]
    fn test_fraction_out_of_range() {
        let err = DatasetManifest::from_pairs(pairs(3), 1.5, 0).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = DatasetManifest::from_pairs(Vec::new(), 0.9, 0).unwrap();
        assert!(manifest.is_empty());
    }
}
