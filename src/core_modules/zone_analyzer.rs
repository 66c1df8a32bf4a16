// THEORY:
// The `ZoneAnalyzer` is the scoring grid of the engine. The tested field (0–40°)
// is cut into 4 rings of 10° crossed with 8 octants of 45°: 32 zones that cover
// the disc with no gaps and no overlaps.
//
// Key principles:
// 1.  **Lookup, not scanning**: a point's zone is computed directly by integer
//     division of its radius and angle. Intervals are half-open (`low <= v < high`)
//     on both axes, so each point lands in exactly one zone by construction. A
//     point sitting exactly on the 40° edge is inside the detected field but
//     belongs to no zone.
// 2.  **Density rule**: a zone's severity comes from the share of missed markers
//     among the markers inside it: none tested -> untouched, at or above the
//     high-loss density -> 10°, any missed -> 5°, none missed -> 0°.
// 3.  **Rebuilt every run**: zones are never updated incrementally. Each call
//     starts from 32 empty zones and the full point list.

use crate::config::ScoringConfig;
use crate::core_modules::symbol_detector::DetectedPoint;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const RING_COUNT: usize = 4;
pub const OCTANT_COUNT: usize = 8;
pub const ZONE_COUNT: usize = RING_COUNT * OCTANT_COUNT;
pub const RING_WIDTH_DEG: f64 = 10.0;
pub const OCTANT_WIDTH_DEG: f64 = 45.0;

pub const HIGH_LOSS_DEGREES: u32 = 10;
pub const PARTIAL_LOSS_DEGREES: u32 = 5;
/// Every zone fully lost.
pub const MAX_DEGREES_LOST: u32 = ZONE_COUNT as u32 * HIGH_LOSS_DEGREES;

/// Severity tier of a zone, as painted on the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneColor {
    /// Rendered cyan.
    HighLoss,
    /// Rendered yellow.
    PartialLoss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId {
    /// 0..4, innermost first.
    pub ring: usize,
    /// 0..8, clockwise on the image from the positive x axis.
    pub octant: usize,
}

impl ZoneId {
    pub fn radius_low_deg(&self) -> f64 {
        self.ring as f64 * RING_WIDTH_DEG
    }

    pub fn radius_high_deg(&self) -> f64 {
        (self.ring + 1) as f64 * RING_WIDTH_DEG
    }

    pub fn angle_low_deg(&self) -> f64 {
        self.octant as f64 * OCTANT_WIDTH_DEG
    }

    pub fn angle_high_deg(&self) -> f64 {
        (self.octant + 1) as f64 * OCTANT_WIDTH_DEG
    }

    /// Position in ring-major order.
    pub fn index(&self) -> usize {
        self.ring * OCTANT_COUNT + self.octant
    }
}

/// The zone containing `(radius_deg, angle_deg)`, if any.
pub fn zone_of(radius_deg: f64, angle_deg: f64) -> Option<ZoneId> {
    if !(radius_deg >= 0.0) || !(angle_deg >= 0.0) {
        return None;
    }
    let ring = (radius_deg / RING_WIDTH_DEG).floor() as usize;
    let octant = (angle_deg / OCTANT_WIDTH_DEG).floor() as usize;
    if ring >= RING_COUNT || octant >= OCTANT_COUNT {
        return None;
    }
    Some(ZoneId { ring, octant })
}

/// Result for one ring/octant cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub point_count: u32,
    pub missed_count: u32,
    /// Percentage of missed markers; `None` for an untested zone.
    pub density_pct: Option<f64>,
    /// 0, 5 or 10.
    pub degrees_lost: u32,
    pub display_color: Option<ZoneColor>,
}

impl Zone {
    fn empty(id: ZoneId) -> Self {
        Self {
            id,
            point_count: 0,
            missed_count: 0,
            density_pct: None,
            degrees_lost: 0,
            display_color: None,
        }
    }

    pub fn is_tested(&self) -> bool {
        self.point_count > 0
    }
}

/// All 32 zones of one eye plus their total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneReport {
    /// Ring-major: `zones[ZoneId::index()]`.
    pub zones: Vec<Zone>,
    pub total_degrees_lost: u32,
}

impl ZoneReport {
    pub fn zone(&self, id: ZoneId) -> &Zone {
        &self.zones[id.index()]
    }

    pub fn colored_zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(|z| z.display_color.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct ZoneAnalyzer {
    config: ScoringConfig,
}

impl ZoneAnalyzer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Severity of a zone from its counts.
    pub fn grade(&self, point_count: u32, missed_count: u32) -> (Option<f64>, u32, Option<ZoneColor>) {
        if point_count == 0 {
            return (None, 0, None);
        }
        let density_pct = missed_count as f64 / point_count as f64 * 100.0;

        // Compared on counts so 7 of 10 is exactly 70%.
        let high_loss =
            missed_count as f64 * 100.0 >= self.config.high_loss_density_pct * point_count as f64;

        if high_loss {
            (Some(density_pct), HIGH_LOSS_DEGREES, Some(ZoneColor::HighLoss))
        } else if missed_count > 0 {
            (Some(density_pct), PARTIAL_LOSS_DEGREES, Some(ZoneColor::PartialLoss))
        } else {
            (Some(density_pct), 0, None)
        }
    }

    pub fn analyze(&self, points: &[DetectedPoint]) -> ZoneReport {
        let mut zones: Vec<Zone> = (0..RING_COUNT)
            .flat_map(|ring| (0..OCTANT_COUNT).map(move |octant| Zone::empty(ZoneId { ring, octant })))
            .collect();

        for point in points {
            if let Some(id) = zone_of(point.radius_deg, point.angle_deg) {
                let zone = &mut zones[id.index()];
                zone.point_count += 1;
                if point.is_missed() {
                    zone.missed_count += 1;
                }
            }
        }

        let mut total_degrees_lost = 0;
        for zone in &mut zones {
            let (density_pct, degrees_lost, display_color) = self.grade(zone.point_count, zone.missed_count);
            zone.density_pct = density_pct;
            zone.degrees_lost = degrees_lost;
            zone.display_color = display_color;
            total_degrees_lost += degrees_lost;
        }

        debug!(
            points = points.len(),
            tested_zones = zones.iter().filter(|z| z.is_tested()).count(),
            total_degrees_lost,
            "zone analysis finished"
        );

        ZoneReport {
            zones,
            total_degrees_lost,
        }
    }
}

impl Default for ZoneAnalyzer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
