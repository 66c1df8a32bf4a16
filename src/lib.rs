// THEORY:
// This file is the main entry point for the `perimetry_vision` library crate.
// It exposes the `VisualFieldPipeline` and its result types as the high-level
// interface: hand it a decoded chart raster, get back the annotated chart, the
// degrees of visual field lost and the incapacity percentage. The internal
// stages (`core_modules`) stay public for callers that want to run or test a
// single stage, but the pipeline is the intended surface.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{Result, VisionError};
pub use pipeline::{
    AnalysisResult, BilateralReport, FieldScore, VisualFieldPipeline, analyze_visual_field,
    analyze_visual_field_bytes, combine_bilateral, score_visual_field,
};
