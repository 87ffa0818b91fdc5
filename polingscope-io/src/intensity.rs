//! Loading microscope images as intensity arrays.

use crate::{Error, Result};
use image::DynamicImage;
use ndarray::Array2;
use std::path::Path;

/// Load a grayscale image as `(rows, cols)` intensities.
///
/// 8- and 16-bit grayscale keep their raw values so prominence thresholds
/// stay in the units the operator sees. Colour images are reduced to 8-bit
/// luma.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded, or has no pixels.
pub fn load_intensity<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let decoded = image::open(path)?;
    let intensity = to_intensity(&decoded);
    if intensity.is_empty() {
        return Err(Error::InvalidFormat(format!(
            "{} contains no pixels",
            path.display()
        )));
    }
    log::info!(
        "loaded {} ({}x{}, {:?})",
        path.display(),
        intensity.ncols(),
        intensity.nrows(),
        decoded.color()
    );
    Ok(intensity)
}

/// Convert a decoded image into intensities.
#[must_use]
pub fn to_intensity(image: &DynamicImage) -> Array2<f64> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    match image {
        DynamicImage::ImageLuma8(buf) => raw_to_array(buf.as_raw(), width, height),
        DynamicImage::ImageLuma16(buf) => raw_to_array(buf.as_raw(), width, height),
        other => raw_to_array(other.to_luma8().as_raw(), width, height),
    }
}

/// Row-major single-channel samples to a `(height, width)` array.
fn raw_to_array<T: Copy + Into<f64>>(raw: &[T], width: usize, height: usize) -> Array2<f64> {
    Array2::from_shape_fn((height, width), |(row, col)| raw[row * width + col].into())
}

/// Image name used as the results key: the file name without directories.
#[must_use]
pub fn image_id<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_luma8_keeps_raw_values() {
        let mut img = GrayImage::new(3, 2);
        img.put_pixel(2, 1, Luma([200]));
        let arr = to_intensity(&DynamicImage::ImageLuma8(img));
        assert_eq!(arr.dim(), (2, 3));
        assert_eq!(arr[[1, 2]], 200.0);
        assert_eq!(arr[[0, 0]], 0.0);
    }

    #[test]
    fn test_luma16_keeps_raw_values() {
        let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(2, 2);
        img.put_pixel(0, 1, Luma([40_000]));
        let arr = to_intensity(&DynamicImage::ImageLuma16(img));
        assert_eq!(arr[[1, 0]], 40_000.0);
    }

    #[test]
    fn test_rgb_is_reduced_to_luma() {
        let img = RgbImage::from_pixel(2, 2, Rgb([90, 90, 90]));
        let arr = to_intensity(&DynamicImage::ImageRgb8(img));
        assert_eq!(arr[[0, 0]], 90.0);
    }

    #[test]
    fn test_load_png_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stripes.png");
        let img = GrayImage::from_fn(8, 4, |x, _| Luma([if x % 2 == 0 { 10 } else { 250 }]));
        img.save(&path).unwrap();

        let arr = load_intensity(&path).unwrap();
        assert_eq!(arr.dim(), (4, 8));
        assert_eq!(arr[[3, 1]], 250.0);
        assert_eq!(arr[[3, 2]], 10.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_intensity("/nonexistent/chip.tif").is_err());
    }

    #[test]
    fn test_image_id_strips_directories() {
        assert_eq!(image_id("/data/run3/chip7_wg2.tif"), "chip7_wg2.tif");
        assert_eq!(image_id("plain.tif"), "plain.tif");
    }
}
