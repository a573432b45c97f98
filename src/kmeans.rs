use crate::{
    color_cluster::ColorCluster,
    error::{Error, Result},
};
use image::Rgb;
use rand::{distributions::WeightedIndex, prelude::Distribution, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::collections::HashMap;

pub const DEFAULT_MAX_ITERATIONS: usize = 300;

// squared distance in RGB units below which a centroid is considered stable
const CONVERGENCE_TOLERANCE: f64 = 1e-4;

type Point = [f64; 3];

/// Lloyd's k-means over the RGB cube with seeded k-means++ initialisation.
///
/// Identical pixels are grouped into a weighted histogram first, so the cost of an iteration scales with the number of
/// distinct colors instead of the number of pixels. The result is only a local optimum; a fixed seed makes it
/// reproducible.
pub struct KMeans {
    k: usize,
    max_iterations: usize,
    seed: u64,
}

impl KMeans {
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed,
        }
    }

    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self { max_iterations, ..self }
    }

    /// Partition the pixels into exactly `k` clusters. The member counts of the returned clusters sum to
    /// `pixels.len()`. Hitting the iteration cap before convergence is not an error; the current centroids are
    /// returned as they are.
    pub fn cluster(&self, pixels: &[Rgb<u8>]) -> Result<Vec<ColorCluster>> {
        if self.k == 0 {
            return Err(Error::InvalidClusterCount(self.k));
        }

        let colors = histogram(pixels);
        if colors.len() < self.k {
            return Err(Error::InsufficientColors {
                requested: self.k,
                available: colors.len(),
            });
        }

        let mut centroids = self.initial_centroids(&colors)?;
        let mut assignments = assign(&colors, &centroids);

        for _ in 0..self.max_iterations {
            let shift = update_centroids(&colors, &assignments, &mut centroids);
            assignments = assign(&colors, &centroids);

            if shift <= CONVERGENCE_TOLERANCE {
                break;
            }
        }

        let mut counts = vec![0u64; self.k];
        for ((_, count), &cluster) in colors.iter().zip(&assignments) {
            counts[cluster] += *count;
        }

        Ok(centroids
            .iter()
            .zip(counts)
            .map(|(centroid, count)| ColorCluster::new(round_centroid(centroid), count))
            .collect())
    }

    fn initial_centroids(&self, colors: &[(Point, u64)]) -> Result<Vec<Point>> {
        // k-means++: the first centroid is drawn by population, every further one by population times the squared
        // distance to the nearest centroid chosen so far. colors already chosen have zero weight, so all picks are
        // distinct.
        let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(self.seed);
        let insufficient = |_| Error::InsufficientColors {
            requested: self.k,
            available: colors.len(),
        };

        let first = WeightedIndex::new(colors.iter().map(|(_, count)| *count)).map_err(insufficient)?;
        let mut centroids = Vec::with_capacity(self.k);
        centroids.push(colors[first.sample(rng)].0);

        let mut nearest = colors
            .iter()
            .map(|(color, _)| squared_distance(color, &centroids[0]))
            .collect::<Vec<_>>();

        while centroids.len() < self.k {
            let weights = colors
                .iter()
                .zip(&nearest)
                .map(|((_, count), distance)| *count as f64 * distance);
            let next = colors[WeightedIndex::new(weights).map_err(insufficient)?.sample(rng)].0;

            for ((color, _), distance) in colors.iter().zip(nearest.iter_mut()) {
                *distance = distance.min(squared_distance(color, &next));
            }

            centroids.push(next);
        }

        Ok(centroids)
    }
}

fn histogram(pixels: &[Rgb<u8>]) -> Vec<(Point, u64)> {
    let mut hist = HashMap::new();
    for pixel in pixels {
        *hist.entry(*pixel).or_insert(0u64) += 1;
    }

    // hash map order is random, so fix the order by combining the channels into a single integer where red is the most
    // significant and blue the least
    let mut colors = hist.into_iter().collect::<Vec<_>>();
    colors.sort_by_key(|(Rgb([r, g, b]), _)| (*r as u32) << 16 | (*g as u32) << 8 | *b as u32);

    colors
        .into_iter()
        .map(|(Rgb([r, g, b]), count)| ([r as f64, g as f64, b as f64], count))
        .collect()
}

fn assign(colors: &[(Point, u64)], centroids: &[Point]) -> Vec<usize> {
    colors.iter().map(|(color, _)| nearest_centroid(color, centroids)).collect()
}

fn nearest_centroid(color: &Point, centroids: &[Point]) -> usize {
    // ties go to the lower index
    let mut nearest = 0;
    let mut min_distance = f64::INFINITY;

    for (i, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(color, centroid);
        if distance < min_distance {
            min_distance = distance;
            nearest = i;
        }
    }

    nearest
}

/// Move every centroid to the weighted mean of its members and return the largest squared movement. A centroid with no
/// members stays where it is.
fn update_centroids(colors: &[(Point, u64)], assignments: &[usize], centroids: &mut [Point]) -> f64 {
    let mut sums = vec![([0.0; 3], 0u64); centroids.len()];

    for ((color, count), &cluster) in colors.iter().zip(assignments) {
        let (sum, population) = &mut sums[cluster];
        for c in 0..3 {
            sum[c] += color[c] * *count as f64;
        }
        *population += *count;
    }

    let mut max_shift: f64 = 0.0;
    for (centroid, (sum, population)) in centroids.iter_mut().zip(sums) {
        if population == 0 {
            continue;
        }

        let mean = sum.map(|channel| channel / population as f64);
        max_shift = max_shift.max(squared_distance(centroid, &mean));
        *centroid = mean;
    }

    max_shift
}

fn squared_distance(a: &Point, b: &Point) -> f64 {
    (0..3).map(|c| (a[c] - b[c]) * (a[c] - b[c])).sum()
}

fn round_centroid(centroid: &Point) -> (u8, u8, u8) {
    let [r, g, b] = centroid.map(|channel| channel.round().clamp(0.0, 255.0) as u8);
    (r, g, b)
}
