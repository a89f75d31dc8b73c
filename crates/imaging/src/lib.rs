//! Image loading and intensity normalization
//!
//! Images are decoded to 8-bit RGB and mapped to `[height, width, 3]` float
//! arrays in `[-1, 1]` via `(pixel / 255) * 2 - 1`. [`denormalize`] applies the
//! inverse mapping for saving visualizations.

use cellnet_common::{ensure_exists, DatasetError, NormalizedImage, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use ndarray::{Array3, ArrayView3};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Map one byte intensity into `[-1, 1]`
#[must_use]
#[inline]
pub fn normalize_pixel(value: u8) -> f32 {
    (f32::from(value) / 255.0) * 2.0 - 1.0
}

/// Map a `[-1, 1]` intensity back to a byte, rounding and clamping
#[must_use]
#[inline]
pub fn denormalize_pixel(value: f32) -> u8 {
    ((value + 1.0) / 2.0 * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Convert an RGB image into a `[height, width, 3]` array in `[-1, 1]`
#[must_use]
pub fn normalize_rgb(image: &RgbImage) -> NormalizedImage {
    let (width, height) = image.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
        normalize_pixel(image.get_pixel(x as u32, y as u32)[c])
    })
}

/// Convert a `[height, width, 3]` array in `[-1, 1]` back to an RGB image
///
/// # Errors
/// `ShapeMismatch` if the array does not have exactly 3 channels.
pub fn denormalize(array: ArrayView3<f32>) -> Result<RgbImage> {
    let (height, width, channels) = array.dim();
    if channels != 3 {
        return Err(DatasetError::ShapeMismatch {
            expected: vec![height, width, 3],
            actual: vec![height, width, channels],
        });
    }
    let width = u32::try_from(width)
        .map_err(|_| DatasetError::InvalidConfig(format!("image width {width} too large")))?;
    let height = u32::try_from(height)
        .map_err(|_| DatasetError::InvalidConfig(format!("image height {height} too large")))?;

    Ok(RgbImage::from_fn(width, height, |x, y| {
        let (y, x) = (y as usize, x as usize);
        Rgb([
            denormalize_pixel(array[[y, x, 0]]),
            denormalize_pixel(array[[y, x, 1]]),
            denormalize_pixel(array[[y, x, 2]]),
        ])
    }))
}

/// Decode an image file as 8-bit RGB
///
/// # Errors
/// `MissingFile` if the path does not exist, `ImageDecode` if it cannot be
/// read or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
    let path = path.as_ref();
    ensure_exists(path)?;
    let image = image::open(path)
        .map_err(|e| DatasetError::ImageDecode(format!("{}: {e}", path.display())))?
        .to_rgb8();
    debug!(
        "Loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Decode an image file and normalize it to `[-1, 1]`
pub fn load_normalized<P: AsRef<Path>>(path: P) -> Result<NormalizedImage> {
    Ok(normalize_rgb(&load_image(path)?))
}

/// Stretch an image to `size x size` with bilinear filtering
#[must_use]
pub fn resize_square(image: &RgbImage, size: u32) -> RgbImage {
    image::imageops::resize(image, size, size, FilterType::Triangle)
}

/// Decode an image file and stretch it to `size x size`
pub fn load_resized<P: AsRef<Path>>(path: P, size: u32) -> Result<RgbImage> {
    Ok(resize_square(&load_image(path)?, size))
}

/// Encode an RGB image as JPEG at `path`
pub fn save_jpeg<P: AsRef<Path>>(image: &RgbImage, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(image)
        .map_err(|e| DatasetError::Io(std::io::Error::other(format!("{}: {e}", path.display()))))?;
    writer.flush()?;
    Ok(())
}

/// Encode an RGB image in the format implied by the path's extension
pub fn save_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    let path = path.as_ref();
    image
        .save(path)
        .map_err(|e| DatasetError::Io(std::io::Error::other(format!("{}: {e}", path.display()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pixel_range() {
        assert_eq!(normalize_pixel(0), -1.0);
        assert_eq!(normalize_pixel(255), 1.0);
        assert!(normalize_pixel(128).abs() < 0.01);
    }

    #[test]
    fn test_pixel_round_trip() {
        for value in 0..=255u8 {
            let back = denormalize_pixel(normalize_pixel(value));
            assert!(
                (i16::from(back) - i16::from(value)).abs() <= 1,
                "{value} -> {back}"
            );
        }
    }

    #[test]
    fn test_denormalize_clamps() {
        assert_eq!(denormalize_pixel(-3.0), 0);
        assert_eq!(denormalize_pixel(1.5), 255);
    }

    #[test]
    fn test_normalize_rgb_layout() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([255, 0, 51]));

        let array = normalize_rgb(&img);
        assert_eq!(array.dim(), (2, 3, 3));
        assert_eq!(array[[1, 2, 0]], 1.0);
        assert_eq!(array[[1, 2, 1]], -1.0);
        assert!((array[[1, 2, 2]] - (-0.6)).abs() < 1e-6);
        assert_eq!(array[[0, 0, 0]], -1.0);
    }

    #[test]
    fn test_denormalize_requires_three_channels() {
        let array = Array3::<f32>::zeros((4, 4, 1));
        let err = denormalize(array.view()).unwrap_err();
        assert!(matches!(err, DatasetError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_resize_square_ignores_aspect() {
        let img = RgbImage::from_fn(40, 10, |_, _| Rgb([10, 20, 30]));
        let resized = resize_square(&img, 16);
        assert_eq!(resized.dimensions(), (16, 16));
        assert_eq!(resized.get_pixel(8, 8), &Rgb([10, 20, 30]));
    }
}
