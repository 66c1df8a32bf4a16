// THEORY:
// The `pipeline` module is the top-level API of the engine. It runs the full
// stack for one chart: calibration -> symbol detection -> zone analysis ->
// (heatmap rendering, scoring).
//
// Each call is a pure, synchronous computation on one in-memory raster. Nothing
// is cached between calls, so two charts (two eyes) can be analyzed on
// different threads with no coordination. The same raster always yields the
// same totals and the same heatmap.
//
// Rendering runs after scoring and reads only the zone results, so headless
// callers (`score` / `PipelineConfig::headless`) get identical numbers without
// paying for the heatmap.

use crate::config::PipelineConfig;
use crate::core_modules::calibrator::{Calibrator, FixedChartCalibrator};
use crate::core_modules::heatmap_renderer::HeatmapRenderer;
use crate::core_modules::score;
use crate::core_modules::symbol_detector::SymbolDetector;
use crate::core_modules::utils::image_helper::image_helper;
use crate::core_modules::zone_analyzer::ZoneAnalyzer;
use crate::error::Result;
use image::RgbImage;
use tracing::{info, warn};

// Re-export key data structures for the public API.
pub use crate::core_modules::calibrator::CalibrationParams;
pub use crate::core_modules::score::{BilateralScore, Eye};
pub use crate::core_modules::symbol_detector::{DetectedPoint, SymbolKind};
pub use crate::core_modules::zone_analyzer::{Zone, ZoneColor, ZoneId, ZoneReport};

/// Scores of one eye without the heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldScore {
    pub calibration: CalibrationParams,
    pub points: Vec<DetectedPoint>,
    pub zones: ZoneReport,
    /// In [0, 320].
    pub total_degrees_lost: u32,
    /// In [0, 25].
    pub incapacity_pct: f64,
}

impl FieldScore {
    pub fn percentage_loss(&self) -> f64 {
        score::percentage_loss(self.total_degrees_lost)
    }
}

/// The full result for one eye. `annotated_image` is `None` only when rendering
/// is disabled in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub annotated_image: Option<RgbImage>,
    pub score: FieldScore,
}

impl AnalysisResult {
    pub fn total_degrees_lost(&self) -> u32 {
        self.score.total_degrees_lost
    }

    pub fn incapacity_pct(&self) -> f64 {
        self.score.incapacity_pct
    }
}

/// The main, top-level struct for the visual-field engine.
pub struct VisualFieldPipeline {
    calibrator: Box<dyn Calibrator + Send + Sync>,
    detector: SymbolDetector,
    analyzer: ZoneAnalyzer,
    renderer: Option<HeatmapRenderer>,
}

impl VisualFieldPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let calibrator = FixedChartCalibrator::new(config.calibration.clone());
        Self::with_calibrator(config, Box::new(calibrator))
    }

    /// Swaps in a different way of locating the fixation point and scale.
    pub fn with_calibrator(
        config: PipelineConfig,
        calibrator: Box<dyn Calibrator + Send + Sync>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, calibrator))
    }

    /// Caller guarantees `config` is valid.
    fn assemble(config: PipelineConfig, calibrator: Box<dyn Calibrator + Send + Sync>) -> Self {
        let renderer = config
            .render
            .enabled
            .then(|| HeatmapRenderer::new(config.render.clone()));
        Self {
            calibrator,
            detector: SymbolDetector::new(config.detection),
            analyzer: ZoneAnalyzer::new(config.scoring),
            renderer,
        }
    }

    /// Calibration, detection, zoning and scoring. Never renders.
    pub fn score(&self, raster: &RgbImage) -> Result<FieldScore> {
        let (width, height) = raster.dimensions();
        let calibration = self.calibrator.calibrate(width, height).inspect_err(|e| {
            warn!(width, height, error = %e, "chart rejected");
        })?;

        let points = self.detector.detect(raster, &calibration);
        let zones = self.analyzer.analyze(&points);
        let total_degrees_lost = zones.total_degrees_lost;
        let incapacity_pct = score::incapacity_pct(total_degrees_lost);

        Ok(FieldScore {
            calibration,
            points,
            zones,
            total_degrees_lost,
            incapacity_pct,
        })
    }

    pub fn analyze(&self, raster: &RgbImage) -> Result<AnalysisResult> {
        let score = self.score(raster)?;
        let annotated_image = self
            .renderer
            .as_ref()
            .map(|renderer| renderer.render(raster, &score.calibration, &score.zones));

        info!(
            points = score.points.len(),
            total_degrees_lost = score.total_degrees_lost,
            incapacity_pct = score.incapacity_pct,
            "visual field analyzed"
        );

        Ok(AnalysisResult {
            annotated_image,
            score,
        })
    }

    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<AnalysisResult> {
        let raster = image_helper::decode_raster(bytes)?;
        self.analyze(&raster)
    }
}

impl Default for VisualFieldPipeline {
    fn default() -> Self {
        let config = PipelineConfig::default();
        let calibrator = FixedChartCalibrator::new(config.calibration.clone());
        Self::assemble(config, Box::new(calibrator))
    }
}

/// Analyze one chart with the default chart convention.
pub fn analyze_visual_field(raster: &RgbImage) -> Result<AnalysisResult> {
    VisualFieldPipeline::default().analyze(raster)
}

/// Same as [`analyze_visual_field`], decoding the upload first.
pub fn analyze_visual_field_bytes(bytes: &[u8]) -> Result<AnalysisResult> {
    VisualFieldPipeline::default().analyze_bytes(bytes)
}

/// Headless scoring with the default chart convention.
pub fn score_visual_field(raster: &RgbImage) -> Result<FieldScore> {
    VisualFieldPipeline::default().score(raster)
}

/// Combined incapacity of both eyes.
pub fn combine_bilateral(incapacity_od: f64, incapacity_oi: f64) -> f64 {
    score::combine_bilateral(incapacity_od, incapacity_oi)
}

/// Single-eye result with the eye it belongs to, for reports.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeReport {
    pub eye: Eye,
    pub result: AnalysisResult,
}

/// A complete two-eye evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct BilateralReport {
    pub right: EyeReport,
    pub left: EyeReport,
    pub score: BilateralScore,
}

impl BilateralReport {
    pub fn new(right: AnalysisResult, left: AnalysisResult) -> Self {
        let score = BilateralScore::new(right.incapacity_pct(), left.incapacity_pct());
        Self {
            right: EyeReport {
                eye: Eye::Right,
                result: right,
            },
            left: EyeReport {
                eye: Eye::Left,
                result: left,
            },
            score,
        }
    }
}
