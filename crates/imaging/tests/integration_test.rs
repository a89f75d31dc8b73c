use cellnet_common::DatasetError;
use cellnet_imaging::{denormalize, load_image, load_normalized, load_resized, save_jpeg};
use image::{Rgb, RgbImage};
use std::fs;
use tempfile::TempDir;

/// Gradient so every channel takes many distinct values
fn create_test_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) * 3 % 256) as u8])
    })
}

#[test]
fn test_load_round_trip_png() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gradient.png");
    let original = create_test_image(37, 23);
    original.save(&path).unwrap();

    let normalized = load_normalized(&path).unwrap();
    assert_eq!(normalized.dim(), (23, 37, 3));
    assert!(normalized.iter().all(|&v| (-1.0..=1.0).contains(&v)));

    let restored = denormalize(normalized.view()).unwrap();
    for (a, b) in original.pixels().zip(restored.pixels()) {
        for c in 0..3 {
            assert!((i16::from(a[c]) - i16::from(b[c])).abs() <= 1);
        }
    }
}

#[test]
fn test_load_resized() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wide.png");
    create_test_image(64, 16).save(&path).unwrap();

    let resized = load_resized(&path, 32).unwrap();
    assert_eq!(resized.dimensions(), (32, 32));
}

#[test]
fn test_missing_image() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.jpg");

    let err = load_normalized(&path).unwrap_err();
    assert!(matches!(err, DatasetError::MissingFile(_)));
}

#[test]
fn test_undecodable_image() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.png");
    fs::write(&path, b"definitely not a png").unwrap();

    let err = load_normalized(&path).unwrap_err();
    assert!(matches!(err, DatasetError::ImageDecode(_)));
}

#[test]
fn test_save_jpeg_reloads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("0.jpg");
    let img = RgbImage::from_fn(24, 24, |_, _| Rgb([40, 160, 220]));

    save_jpeg(&img, &path, 95).unwrap();
    let reloaded = load_image(&path).unwrap();
    assert_eq!(reloaded.dimensions(), (24, 24));
    let px = reloaded.get_pixel(12, 12);
    assert!((i16::from(px[1]) - 160).abs() <= 4);
}
