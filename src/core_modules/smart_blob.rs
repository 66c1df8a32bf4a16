// THEORY:
// A `SymbolBlob` is one printed marker as the blob detector sees it: the outer
// outline of a connected patch of ink, summarised by the handful of shape
// measurements the symbol detector needs to tell a filled square from a hollow
// circle and to place it on the chart.
//
// Like the other data containers in `core_modules`, it is "dumb": it knows how
// to derive ratios from its own measurements, not what those ratios mean.

/// A pixel coordinate on the chart raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// One connected patch of ink, measured from its outer outline.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBlob {
    /// Index of the outline in this raster only.
    pub id: u64,
    /// Inclusive top-left and bottom-right corners of the outline.
    pub bounding_box: (Point, Point),
    /// Area enclosed by the outline polygon, in px². Holes are not subtracted.
    pub area: f64,
    /// Centroid from the outline's area moments.
    pub center_of_mass: (f64, f64),
}

impl SymbolBlob {
    pub fn bounding_width(&self) -> u32 {
        self.bounding_box.1.x - self.bounding_box.0.x + 1
    }

    pub fn bounding_height(&self) -> u32 {
        self.bounding_box.1.y - self.bounding_box.0.y + 1
    }

    /// Fraction of the bounding box covered by the outline's area.
    pub fn solidity(&self) -> f64 {
        let box_area = self.bounding_width() as f64 * self.bounding_height() as f64;
        self.area / box_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solidity_of_a_square_outline() {
        let blob = SymbolBlob {
            id: 0,
            bounding_box: (Point { x: 10, y: 10 }, Point { x: 17, y: 17 }),
            area: 49.0,
            center_of_mass: (13.5, 13.5),
        };
        assert_eq!(blob.bounding_width(), 8);
        assert_eq!(blob.bounding_height(), 8);
        assert!((blob.solidity() - 49.0 / 64.0).abs() < 1e-12);
    }
}
