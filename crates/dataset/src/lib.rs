//! Dataset materialization for cell-grid detector training
//!
//! Turns a manifest of (image, annotation) pairs into on-disk train/val
//! splits: `<root>/{train,val}_images/<i>.jpg` resized to a square resolution
//! and `<root>/{train,val}_labels/<i>.npy` presence tensors of matching size.
//!
//! # Example
//! ```no_run
//! use cellnet_common::ClassVocabulary;
//! use cellnet_dataset::{generate_cell_net_data, DatasetManifest, MaterializeConfig};
//!
//! # fn main() -> cellnet_common::Result<()> {
//! let manifest = DatasetManifest::load("data/cellnet/dataset_info.json")?;
//! let vocab = ClassVocabulary::identity(vec!["cat".to_string(), "dog".to_string()]);
//! let report = generate_cell_net_data("data/cellnet", &manifest, &MaterializeConfig::default(), &vocab)?;
//! println!("{} records written", report.written());
//! # Ok(())
//! # }
//! ```

pub mod layout;
pub mod manifest;
pub mod materialize;
pub mod storage;

pub use layout::{ensure_dirs, DatasetLayout, Split};
pub use manifest::{DatasetManifest, RecordPaths, DEFAULT_TRAIN_FRACTION};
pub use materialize::{
    generate_cell_net_data, process_record, ErrorPolicy, MaterializeConfig, MaterializeReport,
    SkippedRecord, SplitReport,
};
pub use storage::{read_label, write_label};
