//! One-time train/validation split of a source dataset

use crate::config::Config;
use anyhow::{Context as _, Result};
use cellnet_dataset::{DatasetManifest, DEFAULT_TRAIN_FRACTION};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct SplitCommand {
    /// Directory of source images
    #[arg(long, value_name = "DIR")]
    images: PathBuf,

    /// Directory of XML annotations, one per image, sorted the same way
    #[arg(long, value_name = "DIR")]
    annotations: PathBuf,

    /// Manifest to write (defaults to the configured manifest path)
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Share of records assigned to training
    #[arg(long, default_value_t = DEFAULT_TRAIN_FRACTION)]
    train_fraction: f64,

    /// Shuffle seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl SplitCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let out = self.out.unwrap_or_else(|| config.manifest_path());
        info!("Images: {}", self.images.display());
        info!("Annotations: {}", self.annotations.display());

        let manifest = DatasetManifest::split_from_dirs(
            &self.images,
            &self.annotations,
            self.train_fraction,
            self.seed,
        )
        .context("Failed to build dataset split")?;

        manifest
            .save(&out)
            .with_context(|| format!("Failed to write manifest: {}", out.display()))?;
        info!("Manifest written to {}", out.display());
        Ok(())
    }
}
