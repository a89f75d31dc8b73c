//! Command-line front end for CellNet dataset preparation
//!
//! The binary in `main.rs` only sets up logging; parsing and dispatch live
//! here so they can be driven from tests.

pub mod commands;
pub mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::downsample::DownsampleCommand;
use commands::generate::GenerateCommand;
use commands::overlay::OverlayCommand;
use commands::split::SplitCommand;

#[derive(Parser)]
#[command(
    name = "cellnet",
    version,
    about = "Prepare grid-detector training data from XML bounding-box annotations",
    after_help = "EXAMPLES:\n  \
                  # Split a source dataset 90/10 and write the manifest\n  \
                  cellnet split --images raw/JPEGImages --annotations raw/Annotations\n\n  \
                  # Materialize resized images and presence tensors\n  \
                  cellnet generate --img-size 224\n\n  \
                  # Downsample a stored label to a 7x7 grid\n  \
                  cellnet downsample --label data/cellnet/train_labels/0.npy --out grid.npy\n\n  \
                  # Draw predicted cells onto an image\n  \
                  cellnet overlay --image 0.jpg --logits scores.npy --out overlay.png"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./cellnet.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Shuffle image/annotation pairs into a train/val manifest
    Split(SplitCommand),

    /// Write resized images and presence-tensor labels for a manifest
    Generate(GenerateCommand),

    /// Reduce a presence tensor to a coarse grid label
    Downsample(DownsampleCommand),

    /// Blend thresholded grid scores onto an image
    Overlay(OverlayCommand),
}

impl Cli {
    /// Load the config file and run the selected subcommand
    pub fn run(self) -> Result<()> {
        let config_path = config::resolve_config_path(self.config.as_deref());
        let config = config::load_config(&config_path)?;

        match self.command {
            Commands::Split(cmd) => cmd.execute(&config),
            Commands::Generate(cmd) => cmd.execute(&config),
            Commands::Downsample(cmd) => cmd.execute(&config),
            Commands::Overlay(cmd) => cmd.execute(&config),
        }
    }
}
