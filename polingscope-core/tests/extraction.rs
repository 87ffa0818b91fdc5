#![allow(clippy::cast_precision_loss, clippy::float_cmp)]
use ndarray::Array2;
use polingscope_core::{
    DisplayScale, EdgeExclusion, Error, ProfileExtractor, RegionError, RowSelection,
};

// Vertical stripes with period 10 px, dark band 3 px wide.
fn striped_image(rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(_, c)| if c % 10 < 3 { 20.0 } else { 200.0 })
}

#[test]
fn test_band_profile_from_display_picks() {
    let image = striped_image(600, 120);
    // 300-row canvas showing the 600-row image
    let scale = DisplayScale::new(300, image.nrows()).unwrap();
    let range = scale.to_image_range(180, 30);
    assert_eq!((range.start, range.end), (60, 360));

    let extractor = ProfileExtractor::new(EdgeExclusion::symmetric(20));
    let profile = extractor
        .extract(image.view(), RowSelection::Range(range))
        .unwrap();

    assert_eq!(profile.len(), 80);
    assert_eq!(profile.rows_averaged(), 300);
    // column 20 is the first kept column and lies in a dark band
    assert_eq!(profile.samples()[0], 20.0);
    assert_eq!(profile.samples()[5], 200.0);
}

#[test]
fn test_display_pick_past_image_bottom_is_rejected() {
    let image = striped_image(100, 60);
    let scale = DisplayScale::new(50, image.nrows()).unwrap();
    let row = scale.to_image_row(50);

    let err = ProfileExtractor::default()
        .extract(image.view(), RowSelection::Single(row))
        .unwrap_err();
    assert_eq!(
        err,
        Error::InvalidRegionSelection(RegionError::RowOutOfBounds {
            row: 100,
            height: 100
        })
    );
}
