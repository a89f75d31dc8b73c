//! Materialize train/val images and presence-tensor labels

use crate::config::Config;
use anyhow::{Context as _, Result};
use cellnet_dataset::{generate_cell_net_data, DatasetManifest, ErrorPolicy, MaterializeConfig};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args)]
pub struct GenerateCommand {
    /// Output root (defaults to the configured dataset root)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Manifest to read (defaults to the configured manifest path)
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Side length of written images and labels
    #[arg(long)]
    img_size: Option<u32>,

    /// Log and skip records that fail instead of stopping
    #[arg(long, default_value_t = false)]
    skip_invalid: bool,
}

impl GenerateCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let root = self.root.unwrap_or_else(|| config.dataset_root());
        let manifest_path = self.manifest.unwrap_or_else(|| config.manifest_path());
        let vocab = config.vocabulary().context("Invalid class configuration")?;

        let manifest = DatasetManifest::load(&manifest_path)
            .with_context(|| format!("Failed to load manifest: {}", manifest_path.display()))?;
        info!(
            "Manifest: {} train, {} val records; {} classes",
            manifest.train.len(),
            manifest.val.len(),
            vocab.len()
        );

        let materialize = MaterializeConfig {
            img_size: self.img_size.unwrap_or_else(|| config.img_size()),
            on_error: if self.skip_invalid {
                ErrorPolicy::Skip
            } else {
                ErrorPolicy::Abort
            },
        };
        let report = generate_cell_net_data(&root, &manifest, &materialize, &vocab)
            .context("Dataset generation failed")?;

        for skipped in &report.skipped {
            warn!(
                "Not processed: {} record {} ({} / {}): {}",
                skipped.split,
                skipped.position,
                skipped.record.image.display(),
                skipped.record.annotation.display(),
                skipped.error
            );
        }
        info!(
            "Done: {} of {} records written to {}",
            report.written(),
            manifest.len(),
            root.display()
        );
        Ok(())
    }
}
