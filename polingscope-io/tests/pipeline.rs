#![allow(clippy::float_cmp)]
use approx::assert_relative_eq;
use image::{GrayImage, Luma};
use polingscope_algorithms::{AnalysisSession, LengthUnit, RowRange, RowSelection, SessionConfig};
use polingscope_io::{export_series, image_id, load_intensity, rotate, ResultsDatabase, ResultsRow};
use tempfile::tempdir;

const LINES: [u32; 6] = [30, 40, 52, 62, 74, 84];

/// Vertical dark lines on a bright field, 120 px wide with 20 px margins.
fn write_chip(path: &std::path::Path) {
    let img = GrayImage::from_fn(120, 40, |x, _| {
        Luma([if LINES.contains(&x) { 30 } else { 200 }])
    });
    img.save(path).unwrap();
}

#[test]
fn test_image_to_database_pipeline() {
    let dir = tempdir().unwrap();
    let image_path = dir.path().join("chip7_wg2.png");
    write_chip(&image_path);

    let image = load_intensity(&image_path).unwrap();
    let mut session = AnalysisSession::new(SessionConfig::default());
    session.load_image(image_id(&image_path));
    session.set_rotation(0.0);
    let rotated = rotate(image.view(), session.rotation_angle());

    let cal = session
        .calibrate(rotated.view(), RowRange::new(0, 40))
        .unwrap();
    let found: Vec<usize> = cal.minima.iter().map(|m| m.index).collect();
    assert_eq!(found, vec![10, 20, 32, 42, 54, 64]);
    assert_relative_eq!(
        cal.factor.microns_per_pixel(),
        2.8 * 5.0 / 54.0,
        epsilon = 1e-12
    );

    session
        .capture_profile(rotated.view(), RowSelection::Range(RowRange::new(5, 25)))
        .unwrap();
    let record = session
        .analyze([("Chip#", "7"), ("Device", "WG2")])
        .unwrap()
        .clone();

    assert_eq!(record.unit(), LengthUnit::Microns);
    assert_eq!(record.rows_averaged, 20);
    assert_eq!(record.widths.pairs(), 2);
    assert_relative_eq!(
        cal.factor.to_pixels(record.widths.odd[0]),
        10.0,
        epsilon = 1e-9
    );
    assert_relative_eq!(
        cal.factor.to_pixels(record.widths.even[1]),
        12.0,
        epsilon = 1e-9
    );
    assert_relative_eq!(record.duty_cycle[0], 10.0 / 22.0, epsilon = 1e-12);

    let db = ResultsDatabase::new(dir.path().join("results.csv"));
    db.save(&record).unwrap();
    let row = db.find("chip7_wg2.png").unwrap().unwrap();
    assert_eq!(row.chip, "7");
    assert_eq!(row.unit, "um");
    assert_eq!(row.minima_count, 6);
    assert_eq!(ResultsRow::parse_list(&row.duty_cycle).unwrap().len(), 2);

    let profile = session.profile().unwrap();
    let files = export_series(dir.path(), "chip7_wg2", profile, &record).unwrap();
    let text = std::fs::read_to_string(files.profile).unwrap();
    assert_eq!(text.lines().count(), 81);
    assert_eq!(text.matches(",true").count(), 6);
}

#[test]
fn test_reanalysis_replaces_row() {
    let dir = tempdir().unwrap();
    let image_path = dir.path().join("chip.png");
    write_chip(&image_path);
    let image = load_intensity(&image_path).unwrap();
    let db = ResultsDatabase::new(dir.path().join("results.csv"));

    let mut session = AnalysisSession::new(SessionConfig::default());
    session.load_image(image_id(&image_path));
    session
        .capture_profile(image.view(), RowSelection::Single(3))
        .unwrap();
    let first = session.analyze([("Device", "first")]).unwrap().clone();
    db.save(&first).unwrap();

    let second = session.analyze([("Device", "second")]).unwrap().clone();
    db.save(&second).unwrap();

    let rows = db.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].device, "second");
    assert_eq!(rows[0].unit, "px");
    assert_eq!(rows[0].calibration_factor, None);
}
