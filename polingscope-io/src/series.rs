//! CSV export of the numeric series behind the analysis plots.

use crate::Result;
use polingscope_core::{IntensityProfile, ResultsRecord};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Files written by [`export_series`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesFiles {
    /// Position, intensity and minimum flag per sample.
    pub profile: PathBuf,
    /// Odd and even width per region pair.
    pub widths: PathBuf,
    /// Duty cycle per region pair.
    pub duty_cycle: PathBuf,
}

impl SeriesFiles {
    /// File names `<stem>_profile.csv`, `<stem>_widths.csv` and
    /// `<stem>_duty_cycle.csv` inside `dir`.
    #[must_use]
    pub fn new<P: AsRef<Path>>(dir: P, stem: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            profile: dir.join(format!("{stem}_profile.csv")),
            widths: dir.join(format!("{stem}_widths.csv")),
            duty_cycle: dir.join(format!("{stem}_duty_cycle.csv")),
        }
    }
}

/// Write the profile with minima flagged. Positions are in the record's unit.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_profile<W: Write>(
    writer: W,
    profile: &IntensityProfile,
    record: &ResultsRecord,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["position", "intensity", "is_minimum"])?;
    let positions = profile.positions(record.calibration_factor);
    for (i, (position, intensity)) in positions.iter().zip(profile.samples()).enumerate() {
        let is_minimum = record.minima.binary_search(&i).is_ok();
        csv.write_record([
            position.to_string(),
            intensity.to_string(),
            is_minimum.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write odd and even widths, one row per region pair numbered from 1.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_widths<W: Write>(writer: W, record: &ResultsRecord) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["region", "odd", "even"])?;
    let widths = &record.widths;
    for (k, (odd, even)) in widths.odd.iter().zip(&widths.even).enumerate() {
        csv.write_record([(k + 1).to_string(), odd.to_string(), even.to_string()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the duty cycle per region pair numbered from 1.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_duty_cycle<W: Write>(writer: W, record: &ResultsRecord) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["pair", "duty_cycle"])?;
    for (k, duty) in record.duty_cycle.iter().enumerate() {
        csv.write_record([(k + 1).to_string(), duty.to_string()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write all three series files into `dir`.
///
/// # Errors
/// Returns an error if a file cannot be created or written.
pub fn export_series<P: AsRef<Path>>(
    dir: P,
    stem: &str,
    profile: &IntensityProfile,
    record: &ResultsRecord,
) -> Result<SeriesFiles> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let files = SeriesFiles::new(dir, stem);

    write_profile(std::fs::File::create(&files.profile)?, profile, record)?;
    write_widths(std::fs::File::create(&files.widths)?, record)?;
    write_duty_cycle(std::fs::File::create(&files.duty_cycle)?, record)?;

    log::info!("exported plot series for {stem} to {}", dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polingscope_core::{LengthUnit, RecordMetadata, RegionWidths, SummaryStats};

    fn sample() -> (IntensityProfile, ResultsRecord) {
        let profile = IntensityProfile::new(vec![9.0, 1.0, 9.0, 1.0, 9.0, 1.0, 9.0], 3).unwrap();
        let widths = RegionWidths::from_gaps(&[2.0, 2.0, 2.0], LengthUnit::Pixels);
        let duty_cycle = widths.duty_cycle();
        let record = ResultsRecord {
            metadata: RecordMetadata::new("s.tif"),
            calibration_factor: None,
            prominence: 1.0,
            rows_averaged: 3,
            minima: vec![1, 3, 5],
            odd_stats: SummaryStats::from_values(&widths.odd),
            even_stats: SummaryStats::from_values(&widths.even),
            duty_cycle_stats: SummaryStats::from_values(&duty_cycle),
            duty_cycle,
            widths,
        };
        (profile, record)
    }

    #[test]
    fn test_profile_series_flags_minima() {
        let (profile, record) = sample();
        let mut out = Vec::new();
        write_profile(&mut out, &profile, &record).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "position,intensity,is_minimum");
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[2], "1,1,true");
        assert_eq!(lines[3], "2,9,false");
    }

    #[test]
    fn test_widths_and_duty_cycle_series() {
        let (_, record) = sample();
        let mut widths = Vec::new();
        write_widths(&mut widths, &record).unwrap();
        assert_eq!(String::from_utf8(widths).unwrap(), "region,odd,even\n1,2,2\n");

        let mut duty = Vec::new();
        write_duty_cycle(&mut duty, &record).unwrap();
        assert_eq!(String::from_utf8(duty).unwrap(), "pair,duty_cycle\n1,0.5\n");
    }

    #[test]
    fn test_export_names_files_by_stem() {
        let (profile, record) = sample();
        let dir = tempfile::tempdir().unwrap();
        let files = export_series(dir.path().join("plots"), "chip7", &profile, &record).unwrap();

        assert!(files.profile.ends_with("chip7_profile.csv"));
        assert!(files.widths.exists());
        assert!(files.duty_cycle.exists());
    }
}
