// THEORY:
// The legal incapacity formula. Pure arithmetic over bounded inputs:
//
//   percentage_loss = total_degrees_lost / 320 * 100
//   incapacity      = percentage_loss * 0.25
//
// When both eyes are evaluated, the single-eye incapacities are summed and the
// bilaterality index (1.5) is applied to the sum.

use crate::core_modules::zone_analyzer::MAX_DEGREES_LOST;
use serde::{Deserialize, Serialize};

/// Share of the percentage field loss that counts as incapacity for one eye.
pub const INCAPACITY_FACTOR: f64 = 0.25;
/// Multiplier applied to the summed incapacities of both eyes.
pub const BILATERALITY_INDEX: f64 = 1.5;

/// Percentage of the tested field that was lost.
pub fn percentage_loss(total_degrees_lost: u32) -> f64 {
    total_degrees_lost as f64 / MAX_DEGREES_LOST as f64 * 100.0
}

/// Single-eye incapacity, in [0, 25] for totals in [0, 320].
pub fn incapacity_pct(total_degrees_lost: u32) -> f64 {
    percentage_loss(total_degrees_lost) * INCAPACITY_FACTOR
}

/// Combined score for a bilateral evaluation.
pub fn combine_bilateral(incapacity_od: f64, incapacity_oi: f64) -> f64 {
    (incapacity_od + incapacity_oi) * BILATERALITY_INDEX
}

/// Which eye a chart belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Eye {
    /// Oculus dexter.
    Right,
    /// Oculus sinister.
    Left,
}

impl Eye {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Eye::Right => "OD",
            Eye::Left => "OI",
        }
    }
}

/// Everything the report layer prints for a two-eye evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BilateralScore {
    pub incapacity_od: f64,
    pub incapacity_oi: f64,
    /// Plain sum before the bilaterality index.
    pub arithmetic_sum: f64,
    pub bilaterality_index: f64,
    pub combined: f64,
}

impl BilateralScore {
    pub fn new(incapacity_od: f64, incapacity_oi: f64) -> Self {
        Self {
            incapacity_od,
            incapacity_oi,
            arithmetic_sum: incapacity_od + incapacity_oi,
            bilaterality_index: BILATERALITY_INDEX,
            combined: combine_bilateral(incapacity_od, incapacity_oi),
        }
    }
}
