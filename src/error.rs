//! Error types for the perimetry_vision library.

use thiserror::Error;

/// Result type alias for perimetry_vision operations.
pub type Result<T> = std::result::Result<T, VisionError>;

/// Everything that can stop an analysis from producing a result.
#[derive(Error, Debug)]
pub enum VisionError {
    /// The raster is empty or too small to calibrate a positive scale.
    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    /// Uploaded bytes could not be decoded into a raster.
    #[error("Failed to decode image: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },

    /// Configuration file unreadable, unparsable or out of range.
    #[error("Invalid configuration: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The annotated chart could not be written.
    #[error("Failed to write {path}")]
    Output {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// The annotated chart could not be encoded in memory.
    #[error("Failed to encode annotated chart as {format}")]
    Encode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },

    /// A batch or bilateral worker went away before answering.
    #[error("Worker pool error: {reason}")]
    WorkerPool { reason: String },
}

impl VisionError {
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            reason: reason.into(),
        }
    }

    pub fn decode(message: impl Into<String>, source: image::ImageError) -> Self {
        Self::Decode {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Out-of-range configuration value, no underlying cause.
    pub fn config_value(parameter: &str, value: impl std::fmt::Display) -> Self {
        Self::Config {
            message: format!("{parameter} = {value}"),
            source: None,
        }
    }

    pub fn worker_pool(reason: impl Into<String>) -> Self {
        Self::WorkerPool {
            reason: reason.into(),
        }
    }

    /// Decode failures belong to the same category as invalid rasters: the
    /// caller has nothing to analyze either way.
    pub fn is_invalid_image(&self) -> bool {
        matches!(self, Self::InvalidImage { .. } | Self::Decode { .. })
    }

    /// Short message for the report layer.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidImage { .. } | Self::Decode { .. } => {
                "Could not read the visual-field chart. Please upload a clear JPG or PNG scan."
                    .to_string()
            }
            Self::Config { .. } => "The analysis configuration is invalid.".to_string(),
            Self::Output { path, .. } => format!("Could not save the heatmap to {path}."),
            _ => "The visual-field analysis failed. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_count_as_invalid_images() {
        let source = image::ImageError::IoError(std::io::Error::other("truncated"));
        assert!(VisionError::decode("bad bytes", source).is_invalid_image());
        assert!(VisionError::invalid_image("zero width").is_invalid_image());
        assert!(!VisionError::config_value("solidity", 2.0).is_invalid_image());
    }

    #[test]
    fn user_messages_hide_internal_details() {
        let source = image::ImageError::IoError(std::io::Error::other("truncated"));
        let unreadable = VisionError::decode("bad bytes", source).user_message();
        assert!(unreadable.contains("JPG or PNG"));
        assert!(!unreadable.contains("truncated"));

        assert_eq!(
            VisionError::worker_pool("channel closed").user_message(),
            "The visual-field analysis failed. Please try again."
        );
        assert_eq!(
            VisionError::config_value("render.overlay_weight", 2.0).user_message(),
            "The analysis configuration is invalid."
        );
    }

    #[test]
    fn in_memory_encode_failures_name_no_file() {
        let err = VisionError::Encode {
            format: "PNG",
            source: image::ImageError::IoError(std::io::Error::other("buffer full")),
        };
        assert_eq!(err.to_string(), "Failed to encode annotated chart as PNG");
        assert!(!err.is_invalid_image());
    }

    #[test]
    fn config_value_names_the_parameter() {
        let err = VisionError::config_value("high_loss_density_pct", 120.0);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: high_loss_density_pct = 120"
        );
    }
}
