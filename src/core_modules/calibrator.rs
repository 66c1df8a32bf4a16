// THEORY:
// The calibrator answers one question for the rest of the engine: where is the
// fixation point, and how many pixels make up ten degrees of eccentricity?
//
// Charts are assumed to be framed by a fixed convention: fixation at the image
// midpoint, and the 60° reference mark at 80% of the way from the center to the
// right edge. Nothing is detected here. The `Calibrator` trait is the seam where
// a calibrator that actually finds the axes and the mark can replace
// `FixedChartCalibrator` without the detector, zoning or scoring noticing.

use crate::config::CalibrationConfig;
use crate::error::{Result, VisionError};

/// Image-space frame of one chart. Computed once per image, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationParams {
    /// Fixation point in whole pixels.
    pub center: (u32, u32),
    /// Always strictly positive.
    pub pixels_per_ten_degrees: f64,
}

impl CalibrationParams {
    /// Pixel radius of a circle at `degrees` of eccentricity.
    pub fn radius_px(&self, degrees: f64) -> f64 {
        degrees / 10.0 * self.pixels_per_ten_degrees
    }

    /// Eccentricity in degrees of a pixel distance from the center.
    pub fn degrees_for(&self, radius_px: f64) -> f64 {
        radius_px / self.pixels_per_ten_degrees * 10.0
    }

    pub fn center_f64(&self) -> (f64, f64) {
        (self.center.0 as f64, self.center.1 as f64)
    }
}

pub trait Calibrator {
    fn calibrate(&self, width: u32, height: u32) -> Result<CalibrationParams>;
}

/// Calibration by the printed-chart framing convention.
#[derive(Debug, Clone)]
pub struct FixedChartCalibrator {
    config: CalibrationConfig,
}

impl FixedChartCalibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }
}

impl Default for FixedChartCalibrator {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

impl Calibrator for FixedChartCalibrator {
    fn calibrate(&self, width: u32, height: u32) -> Result<CalibrationParams> {
        if width == 0 || height == 0 {
            return Err(VisionError::invalid_image(format!(
                "raster is {width}x{height}"
            )));
        }

        let center = (width / 2, height / 2);
        // The mark lands on a whole pixel.
        let mark_distance = ((width - center.0) as f64 * self.config.mark_fraction).floor();
        let pixels_per_ten_degrees = mark_distance / (self.config.mark_degrees / 10.0);

        if !(pixels_per_ten_degrees > 0.0) {
            return Err(VisionError::invalid_image(format!(
                "a {width}px wide raster has no usable angular scale"
            )));
        }

        Ok(CalibrationParams {
            center,
            pixels_per_ten_degrees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_and_scale_follow_the_chart_convention() {
        let params = FixedChartCalibrator::default().calibrate(400, 300).unwrap();
        assert_eq!(params.center, (200, 150));
        // 60° mark at 0.8 * 200 = 160px, six tens of degrees.
        assert!((params.pixels_per_ten_degrees - 160.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn odd_dimensions_truncate() {
        let params = FixedChartCalibrator::default().calibrate(601, 401).unwrap();
        assert_eq!(params.center, (300, 200));
        // (601 - 300) * 0.8 = 240.8 -> 240
        assert!((params.pixels_per_ten_degrees - 40.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_rasters_are_invalid() {
        let calibrator = FixedChartCalibrator::default();
        for (w, h) in [(0, 100), (100, 0), (0, 0), (1, 50), (2, 50)] {
            let err = calibrator.calibrate(w, h).unwrap_err();
            assert!(err.is_invalid_image(), "{w}x{h} should be invalid");
        }
    }

    #[test]
    fn radius_and_degrees_are_inverse() {
        let params = CalibrationParams {
            center: (50, 50),
            pixels_per_ten_degrees: 25.0,
        };
        assert_eq!(params.radius_px(40.0), 100.0);
        assert_eq!(params.degrees_for(100.0), 40.0);
    }
}
