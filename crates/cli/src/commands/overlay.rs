//! Render grid predictions onto an image for inspection

use crate::config::Config;
use anyhow::{bail, Context as _, Result};
use cellnet_dataset::read_label;
use cellnet_imaging::{denormalize, load_normalized, save_image};
use cellnet_overlay::{embed_output, ClassSelection, OverlayConfig};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct OverlayCommand {
    /// Image to draw on
    #[arg(long, value_name = "FILE")]
    image: PathBuf,

    /// Score grid `.npy` of shape [S, S, C]
    #[arg(long, value_name = "FILE")]
    logits: PathBuf,

    /// Output image; format follows the extension
    #[arg(long, value_name = "FILE")]
    out: PathBuf,

    /// Detection threshold (defaults to the configured value)
    #[arg(long)]
    threshold: Option<f32>,

    /// Show one class plane instead of the union of all classes
    #[arg(long, value_name = "INDEX")]
    class: Option<usize>,

    /// Side length the grid maps onto (defaults to the configured image size)
    #[arg(long)]
    src_size: Option<usize>,
}

impl OverlayCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let image = load_normalized(&self.image)
            .with_context(|| format!("Failed to load image: {}", self.image.display()))?;
        let logits = read_label(&self.logits)
            .with_context(|| format!("Failed to read scores: {}", self.logits.display()))?;
        let (rows, cols, _) = logits.dim();
        if rows != cols {
            bail!("Score grid must be square, got {rows}x{cols}");
        }

        let overlay = OverlayConfig {
            threshold: self.threshold.unwrap_or_else(|| config.overlay_threshold()),
            grid_size: rows,
            src_img_size: self
                .src_size
                .unwrap_or_else(|| config.img_size() as usize),
            selection: self
                .class
                .map_or(ClassSelection::Union, ClassSelection::Single),
        };
        let blended = embed_output(image.view(), logits.view(), &overlay)?;
        save_image(&denormalize(blended.view())?, &self.out)?;

        info!("Overlay written to {}", self.out.display());
        Ok(())
    }
}
