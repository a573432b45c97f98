// Copyright 2022 Spanfile
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A library to extract dominant colors from an image and check them against the 60-30-10 rule.
//!
//! The 60-30-10 rule is a design heuristic: a palette should be about 60% primary color, 30% secondary color and 10%
//! accent color by area. Extraction runs in four stages, each available on its own:
//!
//! 1. [`load_image`] decodes the raw bytes into an RGB grid.
//! 2. [`suppress_background`] zeroes every pixel outside a [`ForegroundMask`], and [`foreground_pixels`] drops pure
//!    black pixels.
//! 3. [`KMeans`] groups the remaining pixels into [`ColorCluster`]s.
//! 4. [`evaluate`] ranks the clusters into primary, secondary and accent roles and checks each against a
//!    [`BandPolicy`].
//!
//! [`DominanceBuilder`] wires the stages together:
//!
//! ```no_run
//! # fn main() -> dominance::Result<()> {
//! let bytes = std::fs::read("screenshot.png").unwrap();
//! let result = dominance::DominanceBuilder::from_bytes(&bytes)?
//!     .seed(7)
//!     .band_policy(dominance::BandPolicy::SymmetricTolerance(5.0))
//!     .generate()?;
//!
//! println!("{:?} follows the rule: {}", result.primary().hex(), result.rule_followed());
//! # Ok(())
//! # }
//! ```

mod color_cluster;
mod error;
mod kmeans;
mod loader;
mod mask;
mod rule;

pub const DEFAULT_CLUSTER_COUNT: usize = 3;
pub const DEFAULT_SEED: u64 = 0;
pub const DEFAULT_RESIZE_IMAGE_AREA: u32 = 0;

pub use crate::{
    color_cluster::ColorCluster,
    error::{Error, Result},
    kmeans::{KMeans, DEFAULT_MAX_ITERATIONS},
    loader::load_image,
    mask::{foreground_pixels, suppress_background, ForegroundMask, LuminanceMask},
    rule::{evaluate, rank, BandPolicy, RankedColor, Role, RoleChecks, RuleResult},
};
pub use image;
pub use palette;

use image::RgbImage;

pub struct DominanceBuilder {
    image: RgbImage,
    cluster_count: usize,
    seed: u64,
    max_iterations: usize,
    band_policy: BandPolicy,
    resize_area: u32,
    mask: Box<dyn ForegroundMask>,
}

impl DominanceBuilder {
    pub fn from_image(image: RgbImage) -> Self {
        Self {
            image,
            cluster_count: DEFAULT_CLUSTER_COUNT,
            seed: DEFAULT_SEED,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            band_policy: BandPolicy::default(),
            resize_area: DEFAULT_RESIZE_IMAGE_AREA,
            mask: Box::new(LuminanceMask::default()),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        load_image(bytes).map(Self::from_image)
    }

    pub fn cluster_count(self, cluster_count: usize) -> Self {
        Self { cluster_count, ..self }
    }

    pub fn seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self { max_iterations, ..self }
    }

    pub fn band_policy(self, band_policy: BandPolicy) -> Self {
        Self { band_policy, ..self }
    }

    /// Scale the image down before clustering so that its area is at most `resize_area` pixels. 0 disables scaling.
    pub fn resize_image_area(self, resize_area: u32) -> Self {
        Self { resize_area, ..self }
    }

    pub fn foreground_mask<M>(self, mask: M) -> Self
    where
        M: ForegroundMask + 'static,
    {
        Self {
            mask: Box::new(mask),
            ..self
        }
    }

    /// Run background suppression and clustering, returning the clusters in clusterer order.
    pub fn clusters(mut self) -> Result<Vec<ColorCluster>> {
        self.scale_image_down();

        let suppressed = suppress_background(self.image, self.mask.as_ref());
        let pixels = foreground_pixels(&suppressed);

        KMeans::new(self.cluster_count, self.seed)
            .max_iterations(self.max_iterations)
            .cluster(&pixels)
    }

    /// Every cluster with its share of the considered pixels, largest first.
    pub fn dominant_colors(self) -> Result<Vec<RankedColor>> {
        self.clusters().map(|clusters| rank(&clusters))
    }

    pub fn generate(self) -> Result<RuleResult> {
        let band_policy = self.band_policy.validate()?;
        let clusters = self.clusters()?;

        Ok(evaluate(&clusters, band_policy))
    }

    fn scale_image_down(&mut self) -> bool {
        let (width, height) = self.image.dimensions();
        let area = width as u64 * height as u64;

        if self.resize_area == 0 || area <= self.resize_area as u64 {
            return false;
        }

        let scale_ratio = (self.resize_area as f64 / area as f64).sqrt();
        let scaled_width = ((width as f64 * scale_ratio).floor() as u32).max(1);
        let scaled_height = ((height as f64 * scale_ratio).floor() as u32).max(1);

        // a side clamped up to 1 pixel has to be paid for by the other side
        let scaled_width = scaled_width.min(self.resize_area / scaled_height).max(1);
        let scaled_height = scaled_height.min(self.resize_area / scaled_width).max(1);

        self.image = image::imageops::resize(
            &self.image,
            scaled_width,
            scaled_height,
            image::imageops::FilterType::Nearest,
        );

        true
    }
}

/// Check encoded image bytes against the 60-30-10 rule with the default settings.
pub fn check_60_30_10_rule(bytes: &[u8]) -> Result<RuleResult> {
    DominanceBuilder::from_bytes(bytes)?.generate()
}

/// Extract the default number of dominant colors from encoded image bytes, largest first.
pub fn dominant_colors(bytes: &[u8]) -> Result<Vec<RankedColor>> {
    DominanceBuilder::from_bytes(bytes)?.dominant_colors()
}
