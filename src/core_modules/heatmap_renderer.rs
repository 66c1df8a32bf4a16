// THEORY:
// The `HeatmapRenderer` produces the annotated chart for the report. It is a
// pure function of (raster, calibration, zones): it never feeds back into the
// score, and headless runs skip it entirely.
//
// Drawing order:
// 1.  **Rings** at 10°, 20°, 30° and 40°, one pixel wide.
// 2.  **Zones**: every zone with a display color is painted as an annulus
//     sector (ring-shaped wedge) on an overlay copy, which is then composited
//     onto the chart at a fixed weight so the printed markers stay readable.
// 3.  **Radial lines** every 45° out to 40°, opaque, on top of everything.

use crate::config::RenderConfig;
use crate::core_modules::calibrator::CalibrationParams;
use crate::core_modules::symbol_detector::FIELD_RADIUS_DEG;
use crate::core_modules::zone_analyzer::{
    OCTANT_COUNT, OCTANT_WIDTH_DEG, RING_COUNT, RING_WIDTH_DEG, Zone, ZoneColor, ZoneReport,
};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

pub const GRID_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const HIGH_LOSS_COLOR: Rgb<u8> = Rgb([0, 200, 255]);
pub const PARTIAL_LOSS_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Arc resolution of the wedges, in degrees per polygon edge.
const ARC_STEP_DEG: f64 = 1.0;

impl ZoneColor {
    pub fn rgb(&self) -> Rgb<u8> {
        match self {
            ZoneColor::HighLoss => HIGH_LOSS_COLOR,
            ZoneColor::PartialLoss => PARTIAL_LOSS_COLOR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeatmapRenderer {
    config: RenderConfig,
}

impl HeatmapRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn render(
        &self,
        raster: &RgbImage,
        calibration: &CalibrationParams,
        zones: &ZoneReport,
    ) -> RgbImage {
        let mut annotated = raster.clone();
        let center = (calibration.center.0 as i32, calibration.center.1 as i32);

        for ring in 1..=RING_COUNT {
            let radius = calibration.radius_px(ring as f64 * RING_WIDTH_DEG) as i32;
            draw_hollow_circle_mut(&mut annotated, center, radius, GRID_COLOR);
        }

        let mut overlay = annotated.clone();
        let mut painted = 0;
        for zone in zones.colored_zones() {
            if let Some(color) = zone.display_color {
                let wedge = wedge_polygon(zone, calibration);
                if wedge.len() >= 3 {
                    draw_polygon_mut(&mut overlay, &wedge, color.rgb());
                    painted += 1;
                }
            }
        }
        if painted > 0 {
            add_weighted(&mut annotated, &overlay, self.config.overlay_weight);
        }

        let (cx, cy) = calibration.center_f64();
        let length = calibration.radius_px(FIELD_RADIUS_DEG);
        for line in 0..OCTANT_COUNT {
            let theta = (line as f64 * OCTANT_WIDTH_DEG).to_radians();
            let end = (cx + length * theta.cos(), cy + length * theta.sin());
            draw_line_segment_mut(
                &mut annotated,
                (cx as f32, cy as f32),
                (end.0 as f32, end.1 as f32),
                GRID_COLOR,
            );
        }

        annotated
    }
}

impl Default for HeatmapRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

/// Outline of a zone's annulus sector: outer arc forward, inner arc back.
/// Innermost-ring zones close at the center instead.
// Drawn as a true ring segment rather than a full sector hollowed out with a
// paper-coloured disc, so painting one zone never erases another.
pub fn wedge_polygon(zone: &Zone, calibration: &CalibrationParams) -> Vec<Point<i32>> {
    let (cx, cy) = calibration.center_f64();
    // Whole-pixel radii, as the rings are drawn.
    let r_in = calibration.radius_px(zone.id.radius_low_deg()).trunc();
    let r_out = calibration.radius_px(zone.id.radius_high_deg()).trunc();
    let a0 = zone.id.angle_low_deg();
    let a1 = zone.id.angle_high_deg();
    let steps = ((a1 - a0) / ARC_STEP_DEG).ceil().max(1.0) as usize;

    let arc_point = |radius: f64, k: usize| {
        let theta = (a0 + (a1 - a0) * k as f64 / steps as f64).to_radians();
        Point::new(
            (cx + radius * theta.cos()).round() as i32,
            (cy + radius * theta.sin()).round() as i32,
        )
    };

    let mut polygon: Vec<Point<i32>> = (0..=steps).map(|k| arc_point(r_out, k)).collect();
    if r_in > 0.0 {
        polygon.extend((0..=steps).rev().map(|k| arc_point(r_in, k)));
    } else {
        polygon.push(Point::new(cx as i32, cy as i32));
    }

    polygon.dedup();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    polygon
}

/// `base = weight * overlay + (1 - weight) * base`, per channel, rounded.
pub fn add_weighted(base: &mut RgbImage, overlay: &RgbImage, weight: f32) {
    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        for c in 0..3 {
            let blended = weight * src[c] as f32 + (1.0 - weight) * dst[c] as f32;
            dst[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::zone_analyzer::{ZoneAnalyzer, ZoneId};
    use crate::core_modules::symbol_detector::{DetectedPoint, SymbolKind};

    const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

    fn calibration() -> CalibrationParams {
        CalibrationParams {
            center: (100, 100),
            pixels_per_ten_degrees: 20.0,
        }
    }

    fn report(points: &[DetectedPoint]) -> ZoneReport {
        ZoneAnalyzer::default().analyze(points)
    }

    fn missed(radius_deg: f64, angle_deg: f64) -> DetectedPoint {
        DetectedPoint {
            radius_deg,
            angle_deg,
            kind: SymbolKind::Missed,
        }
    }

    #[test]
    fn blend_weights_overlay_and_base() {
        let mut base = RgbImage::from_pixel(1, 1, Rgb([100, 0, 255]));
        let overlay = RgbImage::from_pixel(1, 1, Rgb([200, 255, 255]));
        add_weighted(&mut base, &overlay, 0.4);
        assert_eq!(base.get_pixel(0, 0), &Rgb([140, 102, 255]));
    }

    #[test]
    fn wedge_of_outer_ring_is_an_annulus_sector() {
        let c = calibration();
        let report = report(&[missed(35.0, 20.0)]);
        let zone = report.zone(ZoneId { ring: 3, octant: 0 });
        let polygon = wedge_polygon(zone, &c);

        assert!(polygon.len() > 40);
        assert_ne!(polygon.first(), polygon.last());
        for p in &polygon {
            let d = ((p.x - 100) as f64).hypot((p.y - 100) as f64);
            assert!(d >= 59.0 && d <= 81.0, "vertex at {d}px");
        }
    }

    #[test]
    fn innermost_wedge_closes_at_the_center() {
        let report = report(&[missed(5.0, 100.0)]);
        let zone = report.zone(ZoneId { ring: 0, octant: 2 });
        let polygon = wedge_polygon(zone, &calibration());
        assert_eq!(polygon.last(), Some(&Point::new(100, 100)));
    }

    #[test]
    fn no_loss_leaves_only_the_grid() {
        let raster = RgbImage::from_pixel(200, 200, PAPER);
        let annotated = HeatmapRenderer::default().render(&raster, &calibration(), &report(&[]));

        assert_eq!(annotated.dimensions(), raster.dimensions());
        // Ring at 40° crosses the vertical axis above center.
        assert_eq!(annotated.get_pixel(100, 20), &GRID_COLOR);
        // Inside a zone, between grid lines.
        assert_eq!(annotated.get_pixel(125, 110), &PAPER);
        // Outside the field.
        assert_eq!(annotated.get_pixel(5, 5), &PAPER);
    }

    #[test]
    fn lost_zones_are_tinted_inside_their_ring_only() {
        let raster = RgbImage::from_pixel(200, 200, PAPER);
        // Ring 1, octant 0 fully lost; ring 2, octant 2 partially.
        let points = [
            missed(15.0, 20.0),
            missed(25.0, 100.0),
            DetectedPoint {
                radius_deg: 25.0,
                angle_deg: 100.0,
                kind: SymbolKind::Seen,
            },
            DetectedPoint {
                radius_deg: 25.0,
                angle_deg: 100.0,
                kind: SymbolKind::Seen,
            },
        ];
        let annotated = HeatmapRenderer::default().render(&raster, &calibration(), &report(&points));

        // 30px from center at ~22° lies in ring 1, octant 0: 0.4 cyan + 0.6 white.
        let tinted = annotated.get_pixel(128, 111);
        assert_eq!(tinted, &Rgb([153, 233, 255]));

        // Same angle but in ring 0: untouched paper.
        assert_eq!(annotated.get_pixel(111, 104), &PAPER);

        // Ring 2, octant 2 (~100°, 50px): 0.4 yellow + 0.6 white.
        assert_eq!(annotated.get_pixel(91, 149), &Rgb([255, 255, 153]));
    }

    #[test]
    fn rendering_is_repeatable() {
        let raster = RgbImage::from_pixel(200, 200, PAPER);
        let report = report(&[missed(15.0, 20.0), missed(35.0, 300.0)]);
        let renderer = HeatmapRenderer::default();
        assert_eq!(
            renderer.render(&raster, &calibration(), &report),
            renderer.render(&raster, &calibration(), &report)
        );
    }
}
