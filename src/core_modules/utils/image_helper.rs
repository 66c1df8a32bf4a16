// Thin adapters between the engine's in-memory rasters and image files.
// Format decoding and encoding belong to the `image` crate; the engine only
// ever sees a decoded RGB raster.

pub mod image_helper {
    use crate::error::{Result, VisionError};
    use image::{ImageFormat, RgbImage};
    use std::path::Path;

    /// Decodes uploaded bytes (JPEG, PNG, ...) into an RGB raster.
    pub fn decode_raster(bytes: &[u8]) -> Result<RgbImage> {
        if bytes.is_empty() {
            return Err(VisionError::invalid_image("no image data"));
        }
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| VisionError::decode("unsupported or corrupt image", e))?;
        Ok(decoded.to_rgb8())
    }

    pub fn load_raster(path: &Path) -> Result<RgbImage> {
        let decoded = image::open(path)
            .map_err(|e| VisionError::decode(format!("could not open {}", path.display()), e))?;
        Ok(decoded.to_rgb8())
    }

    pub fn save_png(path: &Path, raster: &RgbImage) -> Result<()> {
        raster
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| VisionError::Output {
                path: path.display().to_string(),
                source,
            })
    }

    /// PNG bytes of a raster, for callers that embed the heatmap in a report.
    pub fn encode_png(raster: &RgbImage) -> Result<Vec<u8>> {
        let mut bytes = std::io::Cursor::new(Vec::new());
        raster
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|source| VisionError::Encode {
                format: "PNG",
                source,
            })?;
        Ok(bytes.into_inner())
    }
}

#[cfg(test)]
mod tests {

    use super::image_helper::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn png_bytes_decode_back_to_the_same_raster() {
        let mut raster = RgbImage::from_pixel(12, 8, Rgb([255, 255, 255]));
        raster.put_pixel(3, 4, Rgb([0, 200, 255]));

        let bytes = encode_png(&raster).expect("Error Encoding PNG.");
        assert_eq!(decode_raster(&bytes).expect("Error Decoding PNG."), raster);
    }

    #[test]
    fn empty_and_garbage_bytes_are_invalid_images() {
        assert!(decode_raster(&[]).unwrap_err().is_invalid_image());
        assert!(decode_raster(b"definitely not a jpeg").unwrap_err().is_invalid_image());
    }

    #[test]
    fn save_annotated_file() {
        let path = std::env::temp_dir().join("perimetry_vision_save_test.png");
        let raster = RgbImage::from_pixel(20, 20, Rgb([255, 0, 0]));

        save_png(&path, &raster).expect("Error Saving File.");
        assert_eq!(load_raster(&path).expect("Error Loading File."), raster);
        let _ = std::fs::remove_file(path);
    }
}
