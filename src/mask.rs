use image::{Pixel, Rgb, RgbImage};

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// A trait used to implement foreground masks for the background suppression step.
///
/// Before clustering, every pixel outside the foreground mask is set to pure black and every pure black pixel is then
/// left out of clustering. This trait allows the library consumer to substitute a different segmentation strategy
/// without touching clustering or rule evaluation.
///
/// See [`crate::DominanceBuilder::foreground_mask`] on how to replace the default mask.
pub trait ForegroundMask {
    /// Return one flag per pixel in row-major order, `true` for foreground. Pixels with no corresponding flag are
    /// treated as background.
    fn mask_foreground(&self, image: &RgbImage) -> Vec<bool>;
}

/// The default mask: a pixel is foreground when its luminance is strictly above `threshold`.
///
/// With the default threshold of 0 every pixel whose luminance is exactly 0 is background, including pure black pixels
/// that were meant as foreground. Luminance comes from [`image::Pixel::to_luma`], so very dark colors such as (1, 0, 0)
/// whose luminance truncates to 0 count as background too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LuminanceMask {
    threshold: u8,
}

impl LuminanceMask {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn threshold(self) -> u8 {
        self.threshold
    }
}

impl ForegroundMask for LuminanceMask {
    fn mask_foreground(&self, image: &RgbImage) -> Vec<bool> {
        image.pixels().map(|pixel| pixel.to_luma().0[0] > self.threshold).collect()
    }
}

/// Zero out every pixel outside the mask. The result has the same dimensions as the input.
pub fn suppress_background(mut image: RgbImage, mask: &dyn ForegroundMask) -> RgbImage {
    let foreground = mask.mask_foreground(&image);

    for (i, pixel) in image.pixels_mut().enumerate() {
        if !foreground.get(i).copied().unwrap_or(false) {
            *pixel = BACKGROUND;
        }
    }

    image
}

/// Collect the pixels that take part in clustering, skipping every pure black pixel.
pub fn foreground_pixels(image: &RgbImage) -> Vec<Rgb<u8>> {
    image.pixels().copied().filter(|pixel| *pixel != BACKGROUND).collect()
}
