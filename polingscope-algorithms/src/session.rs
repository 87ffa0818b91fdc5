//! Per-image analysis session.
//!
//! Holds the state an operator builds up while working on one image: the
//! current calibration, the last captured profile and the last results
//! record. Loading another image resets all of it, since pixel geometry does
//! not carry over between images.

use crate::analysis::{PolingAnalyzer, DEFAULT_PROMINENCE};
use crate::calibration::{Calibration, CalibrationEngine, DEFAULT_NOMINAL_PERIOD};
use ndarray::ArrayView2;
use polingscope_core::{
    CalibrationFactor, EdgeExclusion, Error, IntensityProfile, ProfileExtractor, RecordMetadata,
    ResultsRecord, Result, RowRange, RowSelection,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Operator-tunable parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Minimum valley depth counted as a domain boundary.
    pub prominence: f64,
    /// Pixels dropped at each horizontal end of every profile.
    pub exclusion: EdgeExclusion,
    /// Known period of the calibration region, in microns.
    pub nominal_period: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prominence: DEFAULT_PROMINENCE,
            exclusion: EdgeExclusion::default(),
            nominal_period: DEFAULT_NOMINAL_PERIOD,
        }
    }
}

impl SessionConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prominence threshold.
    #[must_use]
    pub fn with_prominence(mut self, prominence: f64) -> Self {
        self.prominence = prominence;
        self
    }

    /// Sets the edge exclusion.
    #[must_use]
    pub fn with_exclusion(mut self, exclusion: EdgeExclusion) -> Self {
        self.exclusion = exclusion;
        self
    }

    /// Sets the nominal calibration period.
    #[must_use]
    pub fn with_nominal_period(mut self, microns: f64) -> Self {
        self.nominal_period = microns;
        self
    }
}

/// Whether widths can currently be reported in microns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CalibrationState {
    /// Widths are reported in pixels.
    #[default]
    Uncalibrated,
    /// Widths are converted with this factor.
    Calibrated(CalibrationFactor),
}

impl CalibrationState {
    /// Factor, if calibrated.
    #[must_use]
    pub fn factor(self) -> Option<CalibrationFactor> {
        match self {
            Self::Uncalibrated => None,
            Self::Calibrated(factor) => Some(factor),
        }
    }
}

/// Progress of the profile/analysis workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileState {
    /// Nothing selected yet.
    NoProfile,
    /// A profile is waiting to be analyzed.
    ProfileReady,
    /// The captured profile has been analyzed.
    ResultsReady,
}

/// Analysis state for the image currently loaded.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    config: SessionConfig,
    image_id: Option<String>,
    rotation_angle: f64,
    calibration: CalibrationState,
    profile: Option<IntensityProfile>,
    results: Option<ResultsRecord>,
}

impl AnalysisSession {
    /// Create an empty session.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Start working on a new image, discarding all image-specific state.
    pub fn load_image(&mut self, image_id: impl Into<String>) {
        let image_id = image_id.into();
        log::info!("loaded image {image_id}; calibration and profile reset");
        self.image_id = Some(image_id);
        self.rotation_angle = 0.0;
        self.calibration = CalibrationState::Uncalibrated;
        self.profile = None;
        self.results = None;
    }

    /// Record the rotation applied to the image before extraction.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation_angle = degrees;
    }

    /// Rotation angle in degrees.
    #[must_use]
    pub fn rotation_angle(&self) -> f64 {
        self.rotation_angle
    }

    /// Identifier of the loaded image.
    #[must_use]
    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    /// Current parameters.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mutable access to parameters; takes effect on the next operation.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    /// Calibration state.
    #[must_use]
    pub fn calibration(&self) -> CalibrationState {
        self.calibration
    }

    /// Drop the current calibration; widths revert to pixels.
    pub fn clear_calibration(&mut self) {
        self.calibration = CalibrationState::Uncalibrated;
    }

    /// Last captured profile.
    #[must_use]
    pub fn profile(&self) -> Option<&IntensityProfile> {
        self.profile.as_ref()
    }

    /// Last analysis results.
    #[must_use]
    pub fn results(&self) -> Option<&ResultsRecord> {
        self.results.as_ref()
    }

    /// Where the workflow currently stands.
    #[must_use]
    pub fn profile_state(&self) -> ProfileState {
        match (&self.profile, &self.results) {
            (None, _) => ProfileState::NoProfile,
            (Some(_), None) => ProfileState::ProfileReady,
            (Some(_), Some(_)) => ProfileState::ResultsReady,
        }
    }

    fn extractor(&self) -> ProfileExtractor {
        ProfileExtractor::new(self.config.exclusion)
    }

    /// Extract and keep the profile for a later [`AnalysisSession::analyze`].
    ///
    /// Results from the previous profile are discarded.
    ///
    /// # Errors
    /// Propagates extraction errors; the previous profile is kept on error.
    pub fn capture_profile(
        &mut self,
        image: ArrayView2<'_, f64>,
        selection: RowSelection,
    ) -> Result<&IntensityProfile> {
        let profile = self.extractor().extract(image, selection)?;
        self.results = None;
        Ok(self.profile.insert(profile))
    }

    /// Calibrate from a band of rows with the configured nominal period.
    ///
    /// # Errors
    /// Extraction errors leave the calibration untouched; too few minima
    /// clear it.
    pub fn calibrate(&mut self, image: ArrayView2<'_, f64>, rows: RowRange) -> Result<Calibration> {
        let profile = self.extractor().extract(image, RowSelection::Range(rows))?;
        self.calibrate_profile(&profile)
    }

    /// Calibrate from an already extracted profile.
    ///
    /// # Errors
    /// Too few minima clear the calibration; invalid parameters leave it
    /// untouched.
    pub fn calibrate_profile(&mut self, profile: &IntensityProfile) -> Result<Calibration> {
        let engine = CalibrationEngine::new(self.config.prominence)?;
        match engine.calibrate(profile, self.config.nominal_period) {
            Ok(calibration) => {
                self.calibration = CalibrationState::Calibrated(calibration.factor);
                Ok(calibration)
            }
            Err(err @ Error::InsufficientMinimaForCalibration { .. }) => {
                self.calibration = CalibrationState::Uncalibrated;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Analyze the captured profile and keep the record.
    ///
    /// `annotations` are merged over the default annotation set.
    ///
    /// # Errors
    /// Returns [`Error::NoProfileCaptured`] when no profile exists yet.
    pub fn analyze<K, V>(
        &mut self,
        annotations: impl IntoIterator<Item = (K, V)>,
    ) -> Result<&ResultsRecord>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let profile = self.profile.as_ref().ok_or(Error::NoProfileCaptured)?;
        let analyzer = PolingAnalyzer::new(self.config.prominence)?;

        let mut metadata = RecordMetadata::new(self.image_id.clone().unwrap_or_default())
            .with_rotation(self.rotation_angle);
        for (key, value) in annotations {
            metadata.set_annotation(key, value);
        }

        let record = analyzer.analyze(profile, self.calibration.factor(), metadata);
        Ok(self.results.insert(record))
    }
}
