//! Configuration loading for the cellnet CLI.

use anyhow::{Context, Result};
use cellnet_common::ClassVocabulary;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_NAME: &str = "cellnet.toml";

/// Default dataset root
pub const DEFAULT_DATASET_ROOT: &str = "data/cellnet";

/// Default manifest file name inside the dataset root
pub const DEFAULT_MANIFEST_NAME: &str = "dataset_info.json";

pub const DEFAULT_IMG_SIZE: u32 = 224;
pub const DEFAULT_GRID_SIZE: usize = 7;
pub const DEFAULT_THRESHOLD_AREA: u32 = 256;
pub const DEFAULT_OVERLAY_THRESHOLD: f32 = 0.5;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    pub dataset: Option<DatasetConfig>,
    pub grid: Option<GridConfig>,
    pub overlay: Option<OverlayConfig>,
    pub classes: Option<ClassesConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DatasetConfig {
    pub root: Option<PathBuf>,
    pub img_size: Option<u32>,
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct GridConfig {
    pub size: Option<usize>,
    pub threshold_area: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OverlayConfig {
    pub threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ClassesConfig {
    /// Ordered class names; position is the channel index
    pub vocabulary: Option<Vec<String>>,
    /// Raw label name -> canonical class name
    pub names: Option<BTreeMap<String, String>>,
}

impl Config {
    pub fn dataset_root(&self) -> PathBuf {
        self.dataset
            .as_ref()
            .and_then(|d| d.root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_ROOT))
    }

    /// Manifest path; defaults to `dataset_info.json` inside the dataset root
    pub fn manifest_path(&self) -> PathBuf {
        self.dataset
            .as_ref()
            .and_then(|d| d.manifest.clone())
            .unwrap_or_else(|| self.dataset_root().join(DEFAULT_MANIFEST_NAME))
    }

    pub fn img_size(&self) -> u32 {
        self.dataset
            .as_ref()
            .and_then(|d| d.img_size)
            .unwrap_or(DEFAULT_IMG_SIZE)
    }

    pub fn grid_size(&self) -> usize {
        self.grid
            .as_ref()
            .and_then(|g| g.size)
            .unwrap_or(DEFAULT_GRID_SIZE)
    }

    pub fn threshold_area(&self) -> u32 {
        self.grid
            .as_ref()
            .and_then(|g| g.threshold_area)
            .unwrap_or(DEFAULT_THRESHOLD_AREA)
    }

    pub fn overlay_threshold(&self) -> f32 {
        self.overlay
            .as_ref()
            .and_then(|o| o.threshold)
            .unwrap_or(DEFAULT_OVERLAY_THRESHOLD)
    }

    /// Build the class vocabulary from `[classes]`.
    ///
    /// Without a `names` table every class maps onto itself.
    pub fn vocabulary(&self) -> Result<ClassVocabulary> {
        let classes = self
            .classes
            .as_ref()
            .context("Config has no [classes] section")?;
        let vocabulary = classes
            .vocabulary
            .clone()
            .context("Config [classes] has no vocabulary list")?;
        let vocab = match &classes.names {
            Some(names) => ClassVocabulary::new(vocabulary, names.clone()),
            None => ClassVocabulary::identity(vocabulary),
        };
        vocab.validate()?;
        Ok(vocab)
    }
}

/// Resolve `--config` or fall back to `cellnet.toml` in the working directory
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME))
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config =
        toml::from_str(&contents).context("Failed to parse config file as TOML")?;
    Ok(config)
}
