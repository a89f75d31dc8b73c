//! Write resized images and presence-tensor labels for every manifest record

use crate::layout::{DatasetLayout, Split};
use crate::manifest::{DatasetManifest, RecordPaths};
use crate::storage::write_label;
use cellnet_annotation::xml_as_tensor;
use cellnet_common::{ClassVocabulary, DatasetError, Result};
use cellnet_imaging::{load_resized, save_jpeg};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// JPEG quality for written training images
pub const JPEG_QUALITY: u8 = 95;

/// What to do when a record cannot be converted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop at the first failing record and return its error
    #[default]
    Abort,
    /// Log the failure, record it in the report, and continue
    Skip,
}

/// Parameters for [`generate_cell_net_data`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeConfig {
    /// Side length of written images and presence tensors
    pub img_size: u32,
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            img_size: 224,
            on_error: ErrorPolicy::Abort,
        }
    }
}

/// A record that produced no output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub split: Split,
    /// Position of the record in its manifest list
    pub position: usize,
    pub record: RecordPaths,
    pub error: String,
}

/// Per-split counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    pub split: Split,
    /// Records listed in the manifest
    pub total: usize,
    /// Records written to disk, numbered `0..written`
    pub written: usize,
}

/// Outcome of a full materialization run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub train: SplitReport,
    pub val: SplitReport,
    pub skipped: Vec<SkippedRecord>,
}

impl MaterializeReport {
    #[must_use]
    pub fn written(&self) -> usize {
        self.train.written + self.val.written
    }

    /// True when every manifest record was written
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Materialize both manifest splits under `root`.
///
/// For each record: load and stretch the image to `img_size`, rasterize the
/// annotation to `[img_size, img_size, classes]`, then write `<i>.jpg` and
/// `<i>.npy` into the split's directories. Output indices count only records
/// that were written.
pub fn generate_cell_net_data<P: AsRef<Path>>(
    root: P,
    manifest: &DatasetManifest,
    config: &MaterializeConfig,
    vocab: &ClassVocabulary,
) -> Result<MaterializeReport> {
    if config.img_size == 0 {
        return Err(DatasetError::InvalidConfig(
            "img_size must be at least 1".to_string(),
        ));
    }

    let layout = DatasetLayout::new(root.as_ref());
    layout.ensure_dirs()?;
    info!(
        "Materializing {} records into {} at {}x{}",
        manifest.len(),
        layout.root().display(),
        config.img_size,
        config.img_size
    );

    let mut skipped = Vec::new();
    let train = materialize_split(
        &layout,
        Split::Train,
        &manifest.train,
        config,
        vocab,
        &mut skipped,
    )?;
    let val = materialize_split(
        &layout,
        Split::Val,
        &manifest.val,
        config,
        vocab,
        &mut skipped,
    )?;

    let report = MaterializeReport {
        train,
        val,
        skipped,
    };
    info!(
        "Wrote {} records ({} train, {} val), skipped {}",
        report.written(),
        report.train.written,
        report.val.written,
        report.skipped.len()
    );
    Ok(report)
}

fn materialize_split(
    layout: &DatasetLayout,
    split: Split,
    records: &[RecordPaths],
    config: &MaterializeConfig,
    vocab: &ClassVocabulary,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<SplitReport> {
    let total = records.len();
    let mut written = 0;

    for (position, record) in records.iter().enumerate() {
        debug!("{split} data: {position} of {total}");
        match process_record(layout, split, written, record, config, vocab) {
            Ok(()) => written += 1,
            Err(err) => match config.on_error {
                ErrorPolicy::Abort => return Err(err),
                ErrorPolicy::Skip => {
                    warn!(
                        "Skipping {split} record {position} ({}): {err}",
                        record.image.display()
                    );
                    skipped.push(SkippedRecord {
                        split,
                        position,
                        record: record.clone(),
                        error: err.to_string(),
                    });
                }
            },
        }
    }

    info!("{split} data: {written} of {total} written");
    Ok(SplitReport {
        split,
        total,
        written,
    })
}

/// Convert one record and write it as output `index` of `split`.
///
/// Both the image and the label are produced before anything is written. If
/// a write fails, whatever part of the record reached disk is removed, so a
/// failing record leaves no files behind.
pub fn process_record(
    layout: &DatasetLayout,
    split: Split,
    index: usize,
    record: &RecordPaths,
    config: &MaterializeConfig,
    vocab: &ClassVocabulary,
) -> Result<()> {
    let image = load_resized(&record.image, config.img_size)?;
    let label = xml_as_tensor(&record.annotation, config.img_size as usize, vocab)?;

    let image_path = layout.image_path(split, index);
    let label_path = layout.label_path(split, index);
    save_jpeg(&image, &image_path, JPEG_QUALITY)
        .and_then(|()| write_label(&label_path, &label))
        .inspect_err(|_| {
            remove_partial(&image_path);
            remove_partial(&label_path);
        })
}

fn remove_partial(path: &Path) {
    if path.is_file() {
        if let Err(err) = fs::remove_file(path) {
            warn!("Failed to remove partial output {}: {err}", path.display());
        }
    }
}
