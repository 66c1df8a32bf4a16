// THEORY:
// Every number in the chart-reading convention that is not pure geometry lives
// here. The thresholds come from the legal scoring scheme and the printed chart
// layout, not from measurement. `PipelineConfig::default()` reproduces them and
// a JSON file may override any subset.

use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gray level at or below which a pixel counts as printed ink.
pub const DARK_THRESHOLD: u8 = 120;
/// Outline area window (exclusive on both ends) for a marker, in px².
pub const MIN_SYMBOL_AREA: f64 = 15.0;
pub const MAX_SYMBOL_AREA: f64 = 200.0;
/// Solidity above which a marker is the filled square of a missed stimulus.
pub const MISSED_SOLIDITY_THRESHOLD: f64 = 0.7;
/// Eccentricity of the reference mark used for calibration.
pub const CALIBRATION_MARK_DEGREES: f64 = 60.0;
/// Where that mark sits, as a fraction of the center-to-right-edge distance.
pub const CALIBRATION_MARK_FRACTION: f64 = 0.8;
/// Missed-marker density (percent) at which a zone counts as fully lost.
pub const HIGH_LOSS_DENSITY_PCT: f64 = 70.0;
/// Opacity of the zone overlay when composited onto the chart.
pub const OVERLAY_WEIGHT: f32 = 0.4;

/// Tunable behaviour of the whole analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub calibration: CalibrationConfig,
    pub detection: DetectionConfig,
    pub scoring: ScoringConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub mark_degrees: f64,
    pub mark_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub dark_threshold: u8,
    pub min_symbol_area: f64,
    pub max_symbol_area: f64,
    pub missed_solidity_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub high_loss_density_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Headless runs skip the heatmap entirely; scores are unaffected.
    pub enabled: bool,
    pub overlay_weight: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            mark_degrees: CALIBRATION_MARK_DEGREES,
            mark_fraction: CALIBRATION_MARK_FRACTION,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            dark_threshold: DARK_THRESHOLD,
            min_symbol_area: MIN_SYMBOL_AREA,
            max_symbol_area: MAX_SYMBOL_AREA,
            missed_solidity_threshold: MISSED_SOLIDITY_THRESHOLD,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            high_loss_density_pct: HIGH_LOSS_DENSITY_PCT,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            overlay_weight: OVERLAY_WEIGHT,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            calibration: CalibrationConfig::default(),
            detection: DetectionConfig::default(),
            scoring: ScoringConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Same constants, no heatmap.
    pub fn headless() -> Self {
        let mut config = Self::default();
        config.render.enabled = false;
        config
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| VisionError::config("could not parse configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            VisionError::config(format!("could not read {}", path.display()), e)
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| VisionError::config("could not serialize configuration", e))
    }

    /// Rejects values that would make the geometry or the scoring rule meaningless.
    pub fn validate(&self) -> Result<()> {
        let c = &self.calibration;
        if !(c.mark_degrees > 0.0) {
            return Err(VisionError::config_value("calibration.mark_degrees", c.mark_degrees));
        }
        if !(c.mark_fraction > 0.0 && c.mark_fraction <= 1.0) {
            return Err(VisionError::config_value("calibration.mark_fraction", c.mark_fraction));
        }

        let d = &self.detection;
        if !(d.min_symbol_area >= 0.0 && d.min_symbol_area < d.max_symbol_area) {
            return Err(VisionError::config_value(
                "detection.symbol_area",
                format!("({}, {})", d.min_symbol_area, d.max_symbol_area),
            ));
        }
        if !(d.missed_solidity_threshold > 0.0 && d.missed_solidity_threshold <= 1.0) {
            return Err(VisionError::config_value(
                "detection.missed_solidity_threshold",
                d.missed_solidity_threshold,
            ));
        }

        let s = &self.scoring;
        if !(s.high_loss_density_pct > 0.0 && s.high_loss_density_pct <= 100.0) {
            return Err(VisionError::config_value(
                "scoring.high_loss_density_pct",
                s.high_loss_density_pct,
            ));
        }

        let r = &self.render;
        if !(0.0..=1.0).contains(&r.overlay_weight) {
            return Err(VisionError::config_value("render.overlay_weight", r.overlay_weight));
        }
        Ok(())
    }
}
