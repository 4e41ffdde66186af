//! RANSAC plane estimation.
//!
//! Finds the plane with the largest consensus set within a fixed distance
//! tolerance, so clutter standing on the surface does not tilt the fit.
//! The iteration count adapts to the best inlier ratio seen so far.

use nalgebra::Vector3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

use crate::core::math::Plane;
use crate::core::types::PointXYZRGB;

/// Configuration for RANSAC plane fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacPlaneConfig {
    /// Inlier distance threshold (metres).
    /// Default: 0.01
    pub distance_threshold: f64,

    /// Upper bound on hypotheses drawn.
    /// Default: 1000
    pub max_iterations: usize,

    /// Desired probability of drawing at least one outlier-free sample.
    /// Default: 0.99
    pub probability: f64,

    /// Refit the winning model to its inliers by least squares and
    /// re-select inliers.
    /// Default: true
    pub optimize_coefficients: bool,

    /// Random seed, 0 = entropy-based seed (non-deterministic).
    /// Default: 0
    pub seed: u64,
}

impl Default for RansacPlaneConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 0.01,
            max_iterations: 1000,
            probability: 0.99,
            optimize_coefficients: true,
            seed: 0,
        }
    }
}

impl RansacPlaneConfig {
    /// Builder-style setter for distance threshold.
    pub fn with_distance_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = threshold;
        self
    }

    /// Builder-style setter for maximum iterations.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Builder-style setter for random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Winning plane and the indices of its inliers (ascending).
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneFit {
    /// Plane as estimated, before any orientation convention
    pub plane: Plane,
    pub inliers: Vec<usize>,
}

/// RANSAC plane estimator.
#[derive(Debug, Clone, Default)]
pub struct RansacPlaneFitter {
    config: RansacPlaneConfig,
}

impl RansacPlaneFitter {
    /// Create a fitter with the given configuration.
    pub fn new(config: RansacPlaneConfig) -> Self {
        Self { config }
    }

    /// Fit a plane to `points`.
    ///
    /// Returns `None` when fewer than three points are given, every sample
    /// is degenerate, or no point lies within the threshold.
    pub fn fit(&self, points: &[PointXYZRGB]) -> Option<PlaneFit> {
        let n = points.len();
        if n < 3 {
            return None;
        }

        let mut rng = if self.config.seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(self.config.seed)
        };

        let threshold = self.config.distance_threshold;
        let positions: Vec<Vector3<f64>> = points
            .iter()
            .map(|p| Vector3::from(p.position_f64()))
            .collect();

        let mut best: Option<(Plane, usize)> = None;
        let mut required = self.config.max_iterations;
        let mut iteration = 0;

        while iteration < required.min(self.config.max_iterations) {
            iteration += 1;

            let idx = sample(&mut rng, n, 3);
            let Some(candidate) = Plane::from_points(
                &positions[idx.index(0)],
                &positions[idx.index(1)],
                &positions[idx.index(2)],
            ) else {
                continue;
            };

            let count = count_inliers(&candidate, points, threshold);
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((candidate, count));
                required = adaptive_iterations(count, n, self.config.probability);
            }
        }

        let (mut plane, count) = best?;
        if count == 0 {
            return None;
        }
        let mut inliers = select_inliers(&plane, points, threshold);

        if self.config.optimize_coefficients
            && let Some(refined) = Plane::fit_least_squares(inliers.iter().map(|&i| &points[i]))
        {
            let refined_inliers = select_inliers(&refined, points, threshold);
            if refined_inliers.len() >= inliers.len() {
                plane = refined;
                inliers = refined_inliers;
            }
        }

        log::trace!(
            "RANSAC plane: {} iterations, {}/{} inliers",
            iteration,
            inliers.len(),
            n
        );

        Some(PlaneFit { plane, inliers })
    }
}

fn count_inliers(plane: &Plane, points: &[PointXYZRGB], threshold: f64) -> usize {
    points
        .iter()
        .filter(|p| plane.distance(p) <= threshold)
        .count()
}

fn select_inliers(plane: &Plane, points: &[PointXYZRGB], threshold: f64) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| (plane.distance(p) <= threshold).then_some(i))
        .collect()
}

/// Number of samples needed so that, with the given inlier ratio, an
/// all-inlier sample is drawn with `probability`.
fn adaptive_iterations(inliers: usize, total: usize, probability: f64) -> usize {
    let ratio = inliers as f64 / total as f64;
    let p_good_sample = ratio.powi(3);
    if p_good_sample >= 1.0 - f64::EPSILON {
        return 1;
    }
    if p_good_sample <= f64::EPSILON {
        return usize::MAX;
    }
    let p = probability.clamp(f64::EPSILON, 1.0 - f64::EPSILON);
    let k = (1.0 - p).ln() / (1.0 - p_good_sample).ln();
    if k.is_finite() { k.ceil().max(1.0) as usize } else { usize::MAX }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(z: f32, n: usize, step: f32) -> Vec<PointXYZRGB> {
        let mut pts = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                pts.push(PointXYZRGB::new(i as f32 * step, j as f32 * step, z));
            }
        }
        pts
    }

    fn fitter() -> RansacPlaneFitter {
        RansacPlaneFitter::new(RansacPlaneConfig::default().with_seed(7))
    }

    #[test]
    fn test_fit_horizontal_plane() {
        let points = grid(0.5, 10, 0.05);
        let fit = fitter().fit(&points).unwrap();

        assert_eq!(fit.inliers.len(), 100);
        assert_relative_eq!(fit.plane.c.abs(), 1.0, epsilon = 1e-9);
        assert_relative_eq!((fit.plane.d / fit.plane.c), -0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_fit_ignores_clutter() {
        let mut points = grid(0.0, 10, 0.05);
        for i in 0..20 {
            points.push(PointXYZRGB::new(0.2, 0.2, 0.05 + i as f32 * 0.01));
        }

        let fit = fitter().fit(&points).unwrap();

        assert_eq!(fit.inliers, (0..100).collect::<Vec<_>>());
        assert_relative_eq!(fit.plane.c.abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        let points = vec![PointXYZRGB::new(0.0, 0.0, 0.0), PointXYZRGB::new(1.0, 0.0, 0.0)];
        assert!(fitter().fit(&points).is_none());
    }

    #[test]
    fn test_collinear_points_have_no_plane() {
        let points: Vec<_> = (0..20)
            .map(|i| PointXYZRGB::new(i as f32 * 0.1, 0.0, 0.0))
            .collect();
        assert!(fitter().fit(&points).is_none());
    }

    #[test]
    fn test_seeded_fit_is_repeatable() {
        let mut points = grid(0.0, 8, 0.1);
        points.push(PointXYZRGB::new(0.3, 0.3, 0.4));
        let a = fitter().fit(&points).unwrap();
        let b = fitter().fit(&points).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_adaptive_iterations() {
        assert_eq!(adaptive_iterations(10, 10, 0.99), 1);
        assert_eq!(adaptive_iterations(0, 10, 0.99), usize::MAX);
        let k = adaptive_iterations(5, 10, 0.99);
        // (1 - 0.99) = (1 - 0.125)^k  ->  k ≈ 34.5
        assert_eq!(k, 35);
    }
}
