// THEORY:
// The `SymbolDetector` reads the test points off a chart. It is a single,
// deterministic pass over the raster:
//
// 1.  **Ink Mask**: grayscale + inverse binarization with a fixed dark threshold.
// 2.  **Blobs**: outer outlines of the ink, measured by the `blob_detector`.
// 3.  **Noise Filter**: only outlines whose area sits strictly inside the marker
//     window survive. Specks fall below it; text blocks, rings and borders above.
// 4.  **Classification**: a filled square nearly fills its bounding box, a
//     hollow circle does not. Solidity above the threshold means the stimulus
//     was missed.
// 5.  **Polar Placement**: the centroid is expressed as eccentricity (degrees)
//     and angle around the fixation point. Anything beyond the scored field is
//     discarded before a `DetectedPoint` is ever built.
//
// A chart with no markers is a valid chart; it yields an empty point list.

use crate::config::DetectionConfig;
use crate::core_modules::blob_detector::blob_detector;
use crate::core_modules::calibrator::CalibrationParams;
use crate::core_modules::pixel::pixel::ink_mask;
use crate::core_modules::smart_blob::SymbolBlob;
use image::RgbImage;
use tracing::debug;

/// Outer edge of the scored field, in degrees of eccentricity.
pub const FIELD_RADIUS_DEG: f64 = 40.0;

/// What the marker says about the stimulus at that location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Hollow circle.
    Seen,
    /// Filled square.
    Missed,
}

/// A classified test location in polar chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedPoint {
    /// In [0, 40].
    pub radius_deg: f64,
    /// In [0, 360), clockwise from the positive x axis (image y grows down).
    pub angle_deg: f64,
    pub kind: SymbolKind,
}

impl DetectedPoint {
    /// Polar placement of a pixel position; `None` outside the scored field.
    pub fn from_pixel(
        x: f64,
        y: f64,
        calibration: &CalibrationParams,
        kind: SymbolKind,
    ) -> Option<Self> {
        let (cx, cy) = calibration.center_f64();
        let dx = x - cx;
        let dy = y - cy;

        let radius_deg = calibration.degrees_for(dx.hypot(dy));
        if radius_deg > FIELD_RADIUS_DEG {
            return None;
        }

        Some(Self {
            radius_deg,
            angle_deg: normalize_angle(dy.atan2(dx).to_degrees()),
            kind,
        })
    }

    pub fn is_missed(&self) -> bool {
        self.kind == SymbolKind::Missed
    }
}

/// Maps an `atan2` result in degrees into [0, 360).
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = if degrees < 0.0 { degrees + 360.0 } else { degrees };
    // -1e-15 + 360.0 rounds to 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[derive(Debug, Clone)]
pub struct SymbolDetector {
    config: DetectionConfig,
}

impl SymbolDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, blob: &SymbolBlob) -> SymbolKind {
        if blob.solidity() > self.config.missed_solidity_threshold {
            SymbolKind::Missed
        } else {
            SymbolKind::Seen
        }
    }

    fn is_marker_sized(&self, blob: &SymbolBlob) -> bool {
        self.config.min_symbol_area < blob.area && blob.area < self.config.max_symbol_area
    }

    pub fn detect(&self, raster: &RgbImage, calibration: &CalibrationParams) -> Vec<DetectedPoint> {
        let mask = ink_mask(raster, self.config.dark_threshold);
        let blobs = blob_detector::find_blobs(&mask);
        let total_blobs = blobs.len();

        let mut markers = 0;
        let points: Vec<DetectedPoint> = blobs
            .iter()
            .filter(|blob| self.is_marker_sized(blob))
            .filter_map(|blob| {
                markers += 1;
                // Markers are placed on whole pixels.
                let x = blob.center_of_mass.0.trunc();
                let y = blob.center_of_mass.1.trunc();
                DetectedPoint::from_pixel(x, y, calibration, self.classify(blob))
            })
            .collect();

        debug!(
            blobs = total_blobs,
            markers,
            in_field = points.len(),
            "symbol detection finished"
        );
        points
    }
}

impl Default for SymbolDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_circle_mut};
    use imageproc::rect::Rect;

    const PAPER: Rgb<u8> = Rgb([245, 245, 245]);
    const INK: Rgb<u8> = Rgb([20, 20, 20]);

    fn calibration() -> CalibrationParams {
        CalibrationParams {
            center: (100, 100),
            pixels_per_ten_degrees: 20.0,
        }
    }

    #[test]
    fn angles_are_normalized() {
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(180.0), 180.0);
        assert_eq!(normalize_angle(-1e-15), 0.0);
    }

    #[test]
    fn polar_placement_uses_image_axes() {
        let c = calibration();
        let right = DetectedPoint::from_pixel(140.0, 100.0, &c, SymbolKind::Seen).unwrap();
        assert_eq!(right.radius_deg, 20.0);
        assert_eq!(right.angle_deg, 0.0);

        // Below the center in the image is 90°.
        let below = DetectedPoint::from_pixel(100.0, 130.0, &c, SymbolKind::Missed).unwrap();
        assert_eq!(below.radius_deg, 15.0);
        assert!((below.angle_deg - 90.0).abs() < 1e-9);

        let above = DetectedPoint::from_pixel(100.0, 80.0, &c, SymbolKind::Seen).unwrap();
        assert!((above.angle_deg - 270.0).abs() < 1e-9);
    }

    #[test]
    fn field_edge_is_inclusive() {
        let c = calibration();
        assert!(DetectedPoint::from_pixel(180.0, 100.0, &c, SymbolKind::Seen).is_some());
        assert!(DetectedPoint::from_pixel(181.0, 100.0, &c, SymbolKind::Seen).is_none());
    }

    #[test]
    fn squares_are_missed_and_circles_seen() {
        let mut raster = RgbImage::from_pixel(200, 200, PAPER);
        // Right of center, 30px -> 15°.
        draw_filled_rect_mut(&mut raster, Rect::at(126, 96).of_size(9, 9), INK);
        // Left of center, 40px -> 20°.
        draw_hollow_circle_mut(&mut raster, (60, 100), 5, INK);

        let points = SymbolDetector::default().detect(&raster, &calibration());
        assert_eq!(points.len(), 2);

        let missed = points.iter().find(|p| p.is_missed()).unwrap();
        assert!((missed.radius_deg - 15.0).abs() < 1.0);
        assert!(missed.angle_deg < 5.0 || missed.angle_deg > 355.0);

        let seen = points.iter().find(|p| !p.is_missed()).unwrap();
        assert!((seen.radius_deg - 20.0).abs() < 1.0);
        assert!((seen.angle_deg - 180.0).abs() < 5.0);
    }

    #[test]
    fn noise_and_large_artifacts_are_ignored() {
        let mut raster = RgbImage::from_pixel(200, 200, PAPER);
        // 3x3 speck: outline area 4.
        draw_filled_rect_mut(&mut raster, Rect::at(110, 110).of_size(3, 3), INK);
        // 30x30 block: outline area 841.
        draw_filled_rect_mut(&mut raster, Rect::at(60, 60).of_size(30, 30), INK);

        assert!(SymbolDetector::default().detect(&raster, &calibration()).is_empty());
    }

    #[test]
    fn markers_beyond_forty_degrees_are_dropped() {
        let mut raster = RgbImage::from_pixel(200, 200, PAPER);
        // 90px from center -> 45°.
        draw_filled_rect_mut(&mut raster, Rect::at(186, 96).of_size(9, 9), INK);
        assert!(SymbolDetector::default().detect(&raster, &calibration()).is_empty());
    }

    #[test]
    fn blank_chart_yields_no_points() {
        let raster = RgbImage::from_pixel(120, 80, PAPER);
        assert!(SymbolDetector::default().detect(&raster, &calibration()).is_empty());
    }
}
