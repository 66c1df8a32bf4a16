// THEORY:
// The `BlobDetector` turns an ink mask into a list of `SymbolBlob`s. It is the
// spatial grouping step of the engine: pixels become objects here.
//
// Algorithm steps:
// 1.  **Outline Tracing**: Border following over the mask (`imageproc::contours`)
//     yields every border. Only outer borders that are not nested inside another
//     patch's hole are kept, so a hollow circle is one blob and text inside a
//     printed frame is ignored.
// 2.  **Area Moments**: Each outline is treated as a closed polygon through the
//     centers of its border pixels. Green's theorem gives the zeroth and first
//     area moments in one pass, from which area and centroid follow.
// 3.  **Data Aggregation**: Bounding box, area and centroid are packaged into a
//     `SymbolBlob`. Outlines with zero enclosed mass (single pixels, one-pixel
//     wide strokes) have no centroid and are dropped.
// 4.  **Stateless Utility**: `find_blobs` looks at one mask and remembers nothing.

use crate::core_modules::smart_blob::{Point, SymbolBlob};
use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};

pub mod blob_detector {
    use super::*;

    /// Zeroth and first area moments of a closed polygon.
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct AreaMoments {
        pub m00: f64,
        pub m10: f64,
        pub m01: f64,
    }

    impl AreaMoments {
        /// Orientation independent.
        pub fn area(&self) -> f64 {
            self.m00.abs()
        }

        pub fn centroid(&self) -> Option<(f64, f64)> {
            if self.m00 == 0.0 {
                return None;
            }
            Some((self.m10 / self.m00, self.m01 / self.m00))
        }
    }

    /// Green's theorem over the polygon `points[0] -> ... -> points[n-1] -> points[0]`.
    pub fn polygon_moments(points: &[(f64, f64)]) -> AreaMoments {
        let n = points.len();
        if n < 3 {
            return AreaMoments::default();
        }

        let mut moments = AreaMoments::default();
        for i in 0..n {
            let (xi, yi) = points[i];
            let (xj, yj) = points[(i + 1) % n];
            let cross = xi * yj - xj * yi;
            moments.m00 += cross;
            moments.m10 += (xi + xj) * cross;
            moments.m01 += (yi + yj) * cross;
        }
        moments.m00 /= 2.0;
        moments.m10 /= 6.0;
        moments.m01 /= 6.0;
        moments
    }

    /// Every outer ink outline in the mask, measured. Nonzero pixels are ink.
    pub fn find_blobs(mask: &GrayImage) -> Vec<SymbolBlob> {
        let contours: Vec<Contour<i32>> = find_contours(mask);
        let mut blobs = Vec::new();
        let mut blob_id_counter = 0;

        for contour in contours
            .iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        {
            if let Some(blob) = measure_outline(contour, blob_id_counter) {
                blobs.push(blob);
                blob_id_counter += 1;
            }
        }

        blobs
    }

    fn measure_outline(contour: &Contour<i32>, blob_id: u64) -> Option<SymbolBlob> {
        let first = contour.points.first()?;
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;

        let mut polygon = Vec::with_capacity(contour.points.len());
        for point in &contour.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
            polygon.push((point.x as f64, point.y as f64));
        }

        let moments = polygon_moments(&polygon);
        let center_of_mass = moments.centroid()?;

        Some(SymbolBlob {
            id: blob_id,
            bounding_box: (
                Point {
                    x: min_x as u32,
                    y: min_y as u32,
                },
                Point {
                    x: max_x as u32,
                    y: max_y as u32,
                },
            ),
            area: moments.area(),
            center_of_mass,
        })
    }
}
