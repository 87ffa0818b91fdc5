//! In-plane rotation of intensity arrays.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]

use ndarray::{Array2, ArrayView2};

/// Rotate counter-clockwise by `degrees` about the array center.
///
/// The output keeps the input shape; samples that fall outside the source
/// are zero. Interpolation is bilinear.
#[must_use]
pub fn rotate(image: ArrayView2<'_, f64>, degrees: f64) -> Array2<f64> {
    if degrees.rem_euclid(360.0) == 0.0 {
        return image.to_owned();
    }
    let (height, width) = image.dim();
    let cy = (height as f64 - 1.0) / 2.0;
    let cx = (width as f64 - 1.0) / 2.0;
    let (sin, cos) = degrees.to_radians().sin_cos();

    Array2::from_shape_fn((height, width), |(row, col)| {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        // inverse mapping: output pixel -> source position
        let src_x = cx + dx * cos - dy * sin;
        let src_y = cy + dx * sin + dy * cos;
        bilinear_sample(image, src_x, src_y)
    })
}

/// Bilinear interpolation with zero outside the image.
fn bilinear_sample(image: ArrayView2<'_, f64>, x: f64, y: f64) -> f64 {
    let x0 = x.floor() as isize;
    let y0 = y.floor() as isize;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let (height, width) = image.dim();
    let get_pixel = |px: isize, py: isize| -> f64 {
        if px >= 0 && py >= 0 && (px as usize) < width && (py as usize) < height {
            image[[py as usize, px as usize]]
        } else {
            0.0
        }
    };

    let p00 = get_pixel(x0, y0);
    let p10 = get_pixel(x0 + 1, y0);
    let p01 = get_pixel(x0, y0 + 1);
    let p11 = get_pixel(x0 + 1, y0 + 1);

    let top = p00 + fx * (p10 - p00);
    let bottom = p01 + fx * (p11 - p01);
    top + fy * (bottom - top)
}
