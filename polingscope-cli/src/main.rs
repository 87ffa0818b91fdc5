//! polingscope CLI
//!
//! Measures poled-domain widths and duty cycle from waveguide images.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Args, Parser, Subcommand};
use ndarray::{Array2, ArrayView2};
use polingscope_algorithms::{
    find_minima, AnalysisSession, ResultsRecord, RowRange, RowSelection, SessionConfig,
    DEFAULT_NOMINAL_PERIOD, DEFAULT_PROMINENCE,
};
use polingscope_core::{
    select_region, CalibrationFactor, DisplayScale, EdgeExclusion, ProfileExtractor, SummaryStats,
};
use polingscope_io::{
    export_series, image_id, load_intensity, rotate, ResultsDatabase, Settings, SETTINGS_FILE,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    PolingscopeIo(#[from] polingscope_io::Error),

    #[error("Analysis error: {0}")]
    Core(#[from] polingscope_core::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Domain width and duty cycle measurement for periodically-poled waveguides.
#[derive(Parser)]
#[command(name = "polingscope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file holding the results database location
    #[arg(long, global = true, default_value = SETTINGS_FILE)]
    settings: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Image input and the geometry applied before extraction.
#[derive(Args, Debug)]
struct ImageArgs {
    /// Input image (TIFF or PNG)
    input: PathBuf,

    /// Rotation in degrees, counter-clockwise
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotate: f64,

    /// Pixels excluded at the start of each row
    #[arg(long, default_value_t = 20)]
    exclude_start: usize,

    /// Pixels excluded at the end of each row
    #[arg(long, default_value_t = 20)]
    exclude_end: usize,

    /// Treat row coordinates as picks on a display this many rows tall
    #[arg(long)]
    display_height: Option<u32>,
}

impl ImageArgs {
    fn exclusion(&self) -> EdgeExclusion {
        EdgeExclusion::new(self.exclude_start, self.exclude_end)
    }
}

/// Row or row band sampled for the profile.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct RowArgs {
    /// Single row to sample
    #[arg(long)]
    row: Option<u32>,

    /// Row band to average (end exclusive, either order)
    #[arg(long, num_args = 2, value_names = ["Y1", "Y2"])]
    rows: Option<Vec<u32>>,
}

impl RowArgs {
    fn selection(&self, scale: Option<DisplayScale>) -> Result<RowSelection> {
        match (self.row, self.rows.as_deref()) {
            (Some(y), _) => Ok(RowSelection::Single(map_row(y, scale))),
            (None, Some(&[y1, y2])) => Ok(RowSelection::Range(map_range(y1, y2, scale))),
            _ => Err(CliError::InvalidArgument(
                "expected --row Y or --rows Y1 Y2".to_string(),
            )),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about an image
    Info {
        /// Input image
        input: PathBuf,
    },

    /// Extract an intensity profile and list its minima
    Profile {
        #[command(flatten)]
        image: ImageArgs,

        #[command(flatten)]
        rows: RowArgs,

        /// Minimum prominence of a minimum
        #[arg(short, long, default_value_t = DEFAULT_PROMINENCE)]
        prominence: f64,
    },

    /// Derive the microns-per-pixel factor from a band with known period
    Calibrate {
        #[command(flatten)]
        image: ImageArgs,

        /// Row band to average (end exclusive, either order)
        #[arg(long, num_args = 2, value_names = ["Y1", "Y2"], required = true)]
        rows: Vec<u32>,

        /// Nominal poling period in microns
        #[arg(long, default_value_t = DEFAULT_NOMINAL_PERIOD)]
        period: f64,

        /// Minimum prominence of a minimum
        #[arg(short, long, default_value_t = DEFAULT_PROMINENCE)]
        prominence: f64,
    },

    /// Measure domain widths and duty cycle, then save the results
    Analyze {
        #[command(flatten)]
        image: ImageArgs,

        #[command(flatten)]
        rows: RowArgs,

        /// Calibrate from this row band first; widths are in pixels without it
        #[arg(long, num_args = 2, value_names = ["Y1", "Y2"])]
        calibration_rows: Option<Vec<u32>>,

        /// Nominal poling period in microns
        #[arg(long, default_value_t = DEFAULT_NOMINAL_PERIOD)]
        period: f64,

        /// Minimum prominence of a minimum
        #[arg(short, long, default_value_t = DEFAULT_PROMINENCE)]
        prominence: f64,

        /// Annotation stored with the results
        #[arg(short, long = "annotate", value_name = "KEY=VALUE", value_parser = parse_annotation)]
        annotations: Vec<(String, String)>,

        /// Results file, overriding the settings
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Write the plot series as CSV files into this directory
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Print results without saving them
        #[arg(long)]
        no_save: bool,
    },

    /// Show or change the results database location
    Settings {
        /// New results file location
        #[arg(long)]
        database_location: Option<PathBuf>,
    },

    /// List saved results
    Results {
        /// Results file, overriding the settings
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

fn parse_annotation(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' in '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{s}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn map_row(y: u32, scale: Option<DisplayScale>) -> usize {
    scale.map_or(y as usize, |s| s.to_image_row(y))
}

fn map_range(y1: u32, y2: u32, scale: Option<DisplayScale>) -> RowRange {
    scale.map_or_else(
        || select_region(y1 as usize, y2 as usize),
        |s| s.to_image_range(y1, y2),
    )
}

fn band(rows: &[u32], scale: Option<DisplayScale>) -> Result<RowRange> {
    match rows {
        &[y1, y2] => Ok(map_range(y1, y2, scale)),
        _ => Err(CliError::InvalidArgument(
            "expected exactly two rows Y1 Y2".to_string(),
        )),
    }
}

/// Load, rotate and set up display rescaling for one image.
fn open_image(args: &ImageArgs) -> Result<(Array2<f64>, Option<DisplayScale>)> {
    let image = load_intensity(&args.input)?;
    let rotated = rotate(image.view(), args.rotate);
    let scale = args
        .display_height
        .map(|h| DisplayScale::new(h, rotated.nrows()))
        .transpose()?;
    Ok((rotated, scale))
}

/// Calibrate before analysis. Too few minima leaves the session in pixel
/// units and is reported, not returned.
fn calibrate_or_pixels(
    session: &mut AnalysisSession,
    image: ArrayView2<'_, f64>,
    rows: RowRange,
) -> Result<Option<CalibrationFactor>> {
    match session.calibrate(image, rows) {
        Ok(calibration) => {
            log::info!(
                "calibrated at {} um/px",
                calibration.factor.microns_per_pixel()
            );
            Ok(Some(calibration.factor))
        }
        Err(err @ polingscope_core::Error::InsufficientMinimaForCalibration { .. }) => {
            log::warn!("{err}; widths will be reported in pixels");
            eprintln!("Calibration skipped: {err}");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn database_path(settings: &Path, explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(Settings::load(settings)?.database_location),
    }
}

fn format_stats(stats: Option<SummaryStats>, unit: &str) -> String {
    stats.map_or_else(
        || "n/a".to_string(),
        |s| format!("{:.4} ± {:.4} {} (n={})", s.mean, s.std, unit, s.count),
    )
}

fn print_record(record: &ResultsRecord) {
    let unit = record.unit().symbol();
    println!("Image: {}", record.metadata.image_id);
    println!("Rotation: {}°", record.metadata.rotation_angle);
    match record.calibration_factor {
        Some(factor) => println!("Calibration: {} um/px", factor.microns_per_pixel()),
        None => println!("Calibration: none (pixels)"),
    }
    println!("Rows averaged: {}", record.rows_averaged);
    println!("Minima: {}", record.minima.len());
    println!("Odd widths:  {}", format_stats(record.odd_stats, unit));
    println!("Even widths: {}", format_stats(record.even_stats, unit));
    if let Some(width) = record.widths.unpaired {
        println!("Unpaired odd width: {:.4} {}", width, unit);
    }
    println!("Duty cycle:  {}", format_stats(record.duty_cycle_stats, ""));
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { input } => {
            let image = load_intensity(&input)?;
            let min = image.iter().copied().fold(f64::INFINITY, f64::min);
            let max = image.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = image.iter().sum::<f64>() / image.len() as f64;

            println!("File: {}", input.display());
            println!("Image ID: {}", image_id(&input));
            println!("Size: {} x {} (width x height)", image.ncols(), image.nrows());
            println!("Intensity range: {} - {}", min, max);
            println!("Mean intensity: {:.2}", mean);
        }

        Commands::Profile {
            image,
            rows,
            prominence,
        } => {
            let (pixels, scale) = open_image(&image)?;
            let selection = rows.selection(scale)?;
            let profile = ProfileExtractor::new(image.exclusion()).extract(pixels.view(), selection)?;
            let minima = find_minima(profile.samples(), prominence);

            println!("Samples: {}", profile.len());
            println!("Rows averaged: {}", profile.rows_averaged());
            println!("Minima: {}", minima.len());
            for m in &minima {
                println!(
                    "  {:>6}  intensity {:>10.2}  prominence {:>8.2}",
                    m.index,
                    profile.samples()[m.index],
                    m.prominence
                );
            }
        }

        Commands::Calibrate {
            image,
            rows,
            period,
            prominence,
        } => {
            let (pixels, scale) = open_image(&image)?;
            let config = SessionConfig::new()
                .with_prominence(prominence)
                .with_exclusion(image.exclusion())
                .with_nominal_period(period);
            let mut session = AnalysisSession::new(config);
            session.load_image(image_id(&image.input));
            session.set_rotation(image.rotate);

            let calibration = session.calibrate(pixels.view(), band(&rows, scale)?)?;
            println!("Minima: {}", calibration.minima.len());
            println!(
                "Span: {} px over {} periods of {} um",
                calibration.pixel_span, calibration.num_periods, calibration.nominal_period
            );
            println!(
                "Calibration factor: {} um/px",
                calibration.factor.microns_per_pixel()
            );
        }

        Commands::Analyze {
            image,
            rows,
            calibration_rows,
            period,
            prominence,
            annotations,
            database,
            export,
            no_save,
        } => {
            let (pixels, scale) = open_image(&image)?;
            let config = SessionConfig::new()
                .with_prominence(prominence)
                .with_exclusion(image.exclusion())
                .with_nominal_period(period);
            let mut session = AnalysisSession::new(config);
            let id = image_id(&image.input);
            session.load_image(id.clone());
            session.set_rotation(image.rotate);

            if let Some(cal_rows) = calibration_rows {
                calibrate_or_pixels(&mut session, pixels.view(), band(&cal_rows, scale)?)?;
            }

            session.capture_profile(pixels.view(), rows.selection(scale)?)?;
            let record = session.analyze(annotations)?.clone();
            print_record(&record);

            if let Some(dir) = export {
                let stem = image
                    .input
                    .file_stem()
                    .map_or_else(|| id.clone(), |s| s.to_string_lossy().into_owned());
                if let Some(profile) = session.profile() {
                    let files = export_series(&dir, &stem, profile, &record)?;
                    println!("Series written: {}", files.profile.display());
                    println!("                {}", files.widths.display());
                    println!("                {}", files.duty_cycle.display());
                }
            }

            if !no_save {
                let db = ResultsDatabase::new(database_path(&cli.settings, database)?);
                let outcome = db.save(&record)?;
                println!("{:?} results in {}", outcome, db.path().display());
            }
        }

        Commands::Settings { database_location } => {
            let mut settings = Settings::load(&cli.settings)?;
            if let Some(location) = database_location {
                settings = settings.with_database_location(location);
                settings.save(&cli.settings)?;
                println!("Saved settings to {}", cli.settings.display());
            }
            println!(
                "Database location: {}",
                settings.database_location.display()
            );
        }

        Commands::Results { database } => {
            let db = ResultsDatabase::new(database_path(&cli.settings, database)?);
            let rows = db.rows()?;
            println!("{} result(s) in {}", rows.len(), db.path().display());
            println!(
                "{:<30} | {:<4} | {:>7} | {:>12} | {:>12} | {:>10}",
                "Image", "Unit", "Minima", "Odd mean", "Even mean", "Duty mean"
            );
            println!("{:-<90}", "");
            let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |x| format!("{:.4}", x));
            for row in rows {
                println!(
                    "{:<30} | {:<4} | {:>7} | {:>12} | {:>12} | {:>10}",
                    row.image_id,
                    row.unit,
                    row.minima_count,
                    cell(row.odd_mean),
                    cell(row.even_mean),
                    cell(row.duty_cycle_mean)
                );
            }
        }
    }

    Ok(())
}
