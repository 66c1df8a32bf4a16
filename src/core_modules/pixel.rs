// THEORY (Pixel):
// The smallest unit the engine looks at. A chart scan arrives as an RGB raster;
// the only single-pixel question the symbol detector asks is "is this ink?".
// Ink is decided on Rec. 601 luma, the same weighting chart scanners and most
// grayscale conversions use, rounded back to a byte.

pub mod pixel {
    use image::{GrayImage, Luma, Rgb, RgbImage};

    pub type Channel = u8;
    pub type Luminance = f64;

    /// A "dumb" data container for one RGB pixel of the chart.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        /// Rec. 601 luma on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            0.299_f64 * self.red as f64 + 0.587_f64 * self.green as f64 + 0.114_f64 * self.blue as f64
        }

        pub fn gray(&self) -> Channel {
            self.luminance().round().clamp(0.0, 255.0) as Channel
        }

        /// Printed symbols are darker than the paper.
        pub fn is_ink(&self, dark_threshold: Channel) -> bool {
            self.gray() <= dark_threshold
        }
    }

    impl From<&Rgb<u8>> for Pixel {
        fn from(rgb: &Rgb<u8>) -> Self {
            Pixel::new(rgb[0], rgb[1], rgb[2])
        }
    }

    /// Inverse binarization: ink becomes 255, paper 0.
    pub fn ink_mask(raster: &RgbImage, dark_threshold: Channel) -> GrayImage {
        let mut mask = GrayImage::new(raster.width(), raster.height());
        for (x, y, rgb) in raster.enumerate_pixels() {
            if Pixel::from(rgb).is_ink(dark_threshold) {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        mask
    }
}
