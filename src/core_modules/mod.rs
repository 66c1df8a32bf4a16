pub mod blob_detector;
pub mod calibrator;
pub mod heatmap_renderer;
pub mod pixel;
pub mod score;
pub mod smart_blob;
pub mod symbol_detector;
pub mod utils;
pub mod zone_analyzer;
