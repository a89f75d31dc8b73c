//! Downsample a stored presence tensor to the coarse grid

use crate::config::Config;
use anyhow::{bail, Context as _, Result};
use cellnet_dataset::{read_label, write_label};
use cellnet_label_grid::{resize_label, GridConfig};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct DownsampleCommand {
    /// Presence tensor `.npy` of shape [N, N, C]
    #[arg(long, value_name = "FILE")]
    label: PathBuf,

    /// Output `.npy` of shape [S, S, C]
    #[arg(long, value_name = "FILE")]
    out: PathBuf,

    /// Cells per axis (defaults to the configured grid size)
    #[arg(long)]
    grid_size: Option<usize>,

    /// Present pixels needed to mark a cell (defaults to the configured value)
    #[arg(long)]
    threshold_area: Option<u32>,
}

impl DownsampleCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let label = read_label(&self.label)
            .with_context(|| format!("Failed to read label: {}", self.label.display()))?;
        let (height, width, classes) = label.dim();
        if height != width {
            bail!("Label must be square, got {height}x{width}");
        }

        let grid = GridConfig::new(
            self.grid_size.unwrap_or_else(|| config.grid_size()),
            classes,
            height,
            self.threshold_area.unwrap_or_else(|| config.threshold_area()),
        );
        let resized = resize_label(label.view(), &grid)?;
        write_label(&self.out, &resized)?;

        info!(
            "Wrote {}x{}x{} grid label to {}",
            grid.grid_size,
            grid.grid_size,
            classes,
            self.out.display()
        );
        Ok(())
    }
}
