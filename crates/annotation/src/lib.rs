//! Bounding-box annotation parsing and rasterization
//!
//! Converts VOC-style XML annotations into dense presence tensors of shape
//! `[size, size, classes]`, where a cell is 1 iff some box of that class
//! covers the pixel after rescaling to the target resolution.
//!
//! # Example
//! ```no_run
//! use cellnet_annotation::xml_as_tensor;
//! use cellnet_common::ClassVocabulary;
//!
//! # fn main() -> cellnet_common::Result<()> {
//! let vocab = ClassVocabulary::identity(vec!["cat".to_string(), "dog".to_string()]);
//! let label = xml_as_tensor("annotations/0001.xml", 224, &vocab)?;
//! assert_eq!(label.dim(), (224, 224, 2));
//! # Ok(())
//! # }
//! ```

pub mod xml;

use cellnet_common::{ClassVocabulary, DatasetError, PresenceTensor, Result};
use ndarray::{s, Array3};
use std::path::Path;
use tracing::debug;

/// Box corners in source-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }
}

/// Integer pixel region `[y0, y1) x [x0, x1)` at the target resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PixelRegion {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// One labeled object
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedObject {
    /// Raw label as written in the annotation file
    pub name: String,
    pub bbox: BoundingBox,
}

/// Parsed annotation file
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub filename: Option<String>,
    /// Declared source image width in pixels
    pub width: u32,
    /// Declared source image height in pixels
    pub height: u32,
    pub objects: Vec<AnnotatedObject>,
}

impl Annotation {
    /// Parse annotation XML text
    pub fn parse(xml_text: &str) -> Result<Self> {
        xml::parse_annotation(xml_text)
    }

    /// Read and parse an annotation file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        cellnet_common::ensure_exists(path)?;
        let text = std::fs::read_to_string(path)?;
        xml::parse_annotation(&text).map_err(|e| match e {
            DatasetError::MalformedAnnotation(msg) => {
                DatasetError::MalformedAnnotation(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Map a box onto a `target x target` grid.
    ///
    /// Each corner is scaled by `target / source` on its own axis, truncated
    /// toward zero, and clamped into `0..=target`.
    #[must_use]
    pub fn scaled_region(&self, bbox: &BoundingBox, target: usize) -> PixelRegion {
        let scale = |v: f64, source: u32| -> usize {
            // Multiply before dividing so that exact edges stay exact.
            let scaled = (v * target as f64 / f64::from(source)).trunc();
            scaled.clamp(0.0, target as f64) as usize
        };
        PixelRegion {
            x0: scale(bbox.xmin, self.width),
            y0: scale(bbox.ymin, self.height),
            x1: scale(bbox.xmax, self.width),
            y1: scale(bbox.ymax, self.height),
        }
    }
}

/// Rasterize an annotation into a `[target, target, classes]` presence tensor.
///
/// # Errors
/// `InvalidAnnotation` if the declared width or height is zero, and the
/// vocabulary's lookup errors for labels it cannot place.
pub fn rasterize(
    annotation: &Annotation,
    target: usize,
    vocab: &ClassVocabulary,
) -> Result<PresenceTensor> {
    if annotation.width == 0 || annotation.height == 0 {
        return Err(DatasetError::InvalidAnnotation(format!(
            "declared image size is {}x{}",
            annotation.width, annotation.height
        )));
    }

    let mut label = Array3::<f32>::zeros((target, target, vocab.len()));

    for object in &annotation.objects {
        let region = annotation.scaled_region(&object.bbox, target);
        let class_index = vocab.class_index(&object.name)?;
        debug!(
            "{} -> class {} region x[{}..{}) y[{}..{})",
            object.name, class_index, region.x0, region.x1, region.y0, region.y1
        );
        if region.is_empty() {
            continue;
        }
        label
            .slice_mut(s![region.y0..region.y1, region.x0..region.x1, class_index])
            .fill(1.0);
    }

    Ok(label)
}

/// Parse an annotation file and rasterize it in one step
pub fn xml_as_tensor<P: AsRef<Path>>(
    xml_path: P,
    target: usize,
    vocab: &ClassVocabulary,
) -> Result<PresenceTensor> {
    let annotation = Annotation::from_path(xml_path)?;
    rasterize(&annotation, target, vocab)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> ClassVocabulary {
        ClassVocabulary::new(
            vec!["cat".to_string(), "dog".to_string()],
            [("cat", "cat"), ("kitten", "cat"), ("dog", "dog")],
        )
    }

    fn annotation(width: u32, height: u32, objects: &[(&str, [f64; 4])]) -> Annotation {
        Annotation {
            filename: None,
            width,
            height,
            objects: objects
                .iter()
                .map(|(name, b)| AnnotatedObject {
                    name: (*name).to_string(),
                    bbox: BoundingBox::new(b[0], b[1], b[2], b[3]),
                })
                .collect(),
        }
    }

    #[test]
    fn test_full_box_fills_plane() {
        let ann = annotation(640, 480, &[("dog", [0.0, 0.0, 640.0, 480.0])]);
        let label = rasterize(&ann, 224, &vocab()).unwrap();

        assert_eq!(label.dim(), (224, 224, 2));
        assert!(label.slice(s![.., .., 1]).iter().all(|&v| v == 1.0));
        assert!(label.slice(s![.., .., 0]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_size_rejected() {
        let vocab = vocab();
        for (w, h) in [(0, 100), (100, 0), (0, 0)] {
            let ann = annotation(w, h, &[("cat", [0.0, 0.0, 1.0, 1.0])]);
            let err = rasterize(&ann, 10, &vocab).unwrap_err();
            assert!(matches!(err, DatasetError::InvalidAnnotation(_)));
        }
    }

    #[test]
    fn test_quarter_box_scenario() {
        let ann = annotation(100, 100, &[("cat", [0.0, 0.0, 50.0, 50.0])]);
        let label = rasterize(&ann, 10, &vocab()).unwrap();

        for y in 0..10 {
            for x in 0..10 {
                let expected = if y < 5 && x < 5 { 1.0 } else { 0.0 };
                assert_eq!(label[[y, x, 0]], expected, "cat plane at ({y}, {x})");
                assert_eq!(label[[y, x, 1]], 0.0, "dog plane at ({y}, {x})");
            }
        }
    }

    #[test]
    fn test_independent_axis_ratios() {
        // 200 wide, 50 tall onto 10x10: x scales by 0.05, y by 0.2
        let ann = annotation(200, 50, &[("cat", [100.0, 10.0, 200.0, 25.0])]);
        let region = ann.scaled_region(&ann.objects[0].bbox, 10);
        assert_eq!(
            region,
            PixelRegion {
                x0: 5,
                y0: 2,
                x1: 10,
                y1: 5
            }
        );
    }

    #[test]
    fn test_corners_truncate_and_clamp() {
        let ann = annotation(100, 100, &[("cat", [-20.0, 19.9, 250.0, 38.0])]);
        let region = ann.scaled_region(&ann.objects[0].bbox, 10);
        assert_eq!(region.x0, 0);
        assert_eq!(region.y0, 1);
        assert_eq!(region.x1, 10);
        assert_eq!(region.y1, 3);
    }

    #[test]
    fn test_overlapping_boxes_are_order_independent() {
        let a = ("cat", [0.0, 0.0, 60.0, 60.0]);
        let b = ("kitten", [40.0, 40.0, 100.0, 100.0]);
        let forward = rasterize(&annotation(100, 100, &[a, b]), 10, &vocab()).unwrap();
        let backward = rasterize(&annotation(100, 100, &[b, a]), 10, &vocab()).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.iter().filter(|&&v| v == 1.0).count(), 36 + 36 - 4);
    }

    #[test]
    fn test_degenerate_box_covers_nothing() {
        let ann = annotation(100, 100, &[("dog", [50.0, 50.0, 50.0, 90.0])]);
        let label = rasterize(&ann, 10, &vocab()).unwrap();
        assert!(label.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_unknown_label_fails() {
        let ann = annotation(100, 100, &[("horse", [0.0, 0.0, 10.0, 10.0])]);
        let err = rasterize(&ann, 10, &vocab()).unwrap_err();
        assert!(matches!(err, DatasetError::UnmappedName(_)));
    }

    #[test]
    fn test_no_objects_gives_empty_tensor() {
        let ann = annotation(100, 100, &[]);
        let label = rasterize(&ann, 8, &vocab()).unwrap();
        assert_eq!(label.dim(), (8, 8, 2));
        assert!(label.iter().all(|&v| v == 0.0));
    }
}
