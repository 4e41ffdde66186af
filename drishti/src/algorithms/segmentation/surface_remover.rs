//! Support-surface removal.
//!
//! Fits the dominant plane, orients it away from the sensor, drops the
//! plane inliers and then keeps only residue points that lie more than half
//! the surface thickness above the plane. The inlier set is noisy near its
//! boundary, so the second, deterministic distance cut gives a stable
//! foreground edge.
//!
//! "Above" means the sensor side. The plane is oriented with `c <= 0`, so a
//! table at `z = 0` becomes `(0, 0, -1, 0)` and an object standing on it,
//! between table and a sensor looking down `+z`, has negative `z` and a
//! positive signed distance. A point at `z = +0.1` lies behind the table
//! and is never foreground.

use serde::{Deserialize, Serialize};

use super::plane_ransac::{RansacPlaneConfig, RansacPlaneFitter};
use crate::core::math::Plane;
use crate::core::types::PointCloud;
use crate::core::units::mm_to_m;
use crate::error::{Error, Result};

/// Surface parameters, reconfigurable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneParams {
    /// Physical slab thickness of the surface (millimetres).
    pub thickness: f64,
    /// Apply the `thickness / 2` cut to the residue. When false the whole
    /// non-plane residue is foreground.
    pub use_only_points_above_plane: bool,
    /// Minimum fraction of the cloud that must be plane inliers, in [0, 1].
    /// 0 accepts any non-empty inlier set.
    pub rel_num_of_plane_points: f64,
}

impl Default for PlaneParams {
    fn default() -> Self {
        Self {
            thickness: 15.0,
            use_only_points_above_plane: true,
            rel_num_of_plane_points: 0.0,
        }
    }
}

impl PlaneParams {
    /// Foreground cut-off distance in metres.
    #[inline]
    pub fn half_thickness_m(&self) -> f64 {
        mm_to_m(self.thickness) / 2.0
    }
}

/// Result of one surface removal.
#[derive(Debug, Clone)]
pub struct SurfaceRemoval {
    /// Points strictly above the surface slab
    pub foreground: PointCloud,
    /// Oriented plane, `c <= 0`
    pub plane: Plane,
    /// Number of plane inliers removed
    pub inlier_count: usize,
    /// Number of non-plane points before the thickness cut
    pub residue_count: usize,
}

/// Dominant-plane remover.
#[derive(Debug, Clone, Default)]
pub struct SurfaceRemover {
    fitter: RansacPlaneFitter,
}

impl SurfaceRemover {
    /// Create a remover with the given RANSAC configuration.
    pub fn new(config: RansacPlaneConfig) -> Self {
        Self {
            fitter: RansacPlaneFitter::new(config),
        }
    }

    /// Split `cloud` into foreground and the supporting plane.
    ///
    /// Fails with [`Error::NoPlaneFound`] when no plane with any inliers
    /// exists, or when the inlier share is below
    /// `params.rel_num_of_plane_points`.
    pub fn remove_surface(&self, cloud: &PointCloud, params: &PlaneParams) -> Result<SurfaceRemoval> {
        let fit = self.fitter.fit(&cloud.points).ok_or(Error::NoPlaneFound)?;

        let inlier_count = fit.inliers.len();
        let min_inliers = params.rel_num_of_plane_points * cloud.len() as f64;
        if inlier_count == 0 || (inlier_count as f64) < min_inliers {
            log::debug!(
                "Plane rejected: {} inliers of {} points (minimum {:.0})",
                inlier_count,
                cloud.len(),
                min_inliers
            );
            return Err(Error::NoPlaneFound);
        }

        let plane = fit.plane.oriented();

        let mut is_inlier = vec![false; cloud.len()];
        for &i in &fit.inliers {
            is_inlier[i] = true;
        }
        let residue = cloud
            .points
            .iter()
            .zip(&is_inlier)
            .filter(|&(_, &inlier)| !inlier)
            .map(|(p, _)| p);
        let residue_count = cloud.len() - inlier_count;

        let foreground_points = if params.use_only_points_above_plane {
            let cut = params.half_thickness_m();
            residue
                .filter(|p| plane.signed_distance(p) > cut)
                .copied()
                .collect()
        } else {
            residue.copied().collect()
        };

        Ok(SurfaceRemoval {
            foreground: PointCloud::from_points(cloud.header.clone(), foreground_points),
            plane,
            inlier_count,
            residue_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FrameHeader, PointXYZRGB};

    fn remover() -> SurfaceRemover {
        SurfaceRemover::new(RansacPlaneConfig {
            optimize_coefficients: false,
            seed: 11,
            ..Default::default()
        })
    }

    fn table(z: f32) -> Vec<PointXYZRGB> {
        let mut pts = Vec::new();
        for i in 0..12 {
            for j in 0..12 {
                pts.push(PointXYZRGB::new(i as f32 * 0.0625, j as f32 * 0.0625, z));
            }
        }
        pts
    }

    fn params(thickness: f64) -> PlaneParams {
        PlaneParams {
            thickness,
            use_only_points_above_plane: true,
            rel_num_of_plane_points: 0.0,
        }
    }

    fn cloud(points: Vec<PointXYZRGB>) -> PointCloud {
        PointCloud::from_points(FrameHeader::new(1, "/camera"), points)
    }

    #[test]
    fn test_plane_is_oriented_towards_sensor() {
        let result = remover().remove_surface(&cloud(table(0.75)), &params(20.0)).unwrap();
        assert!(result.plane.c <= 0.0);
        assert_eq!(result.inlier_count, 144);
        assert!(result.foreground.is_empty());
    }

    #[test]
    fn test_point_on_sensor_side_is_foreground() {
        let mut pts = table(0.0);
        pts.push(PointXYZRGB::new(0.25, 0.25, -0.1));
        let result = remover().remove_surface(&cloud(pts), &params(20.0)).unwrap();

        assert_eq!(result.residue_count, 1);
        assert_eq!(result.foreground.points, vec![PointXYZRGB::new(0.25, 0.25, -0.1)]);
    }

    #[test]
    fn test_thickness_cut_is_strict() {
        let mut pts = table(0.0);
        let at_boundary = PointXYZRGB::new(0.25, 0.25, -0.125);
        let above = PointXYZRGB::new(0.25, 0.25, -0.126);
        pts.push(at_boundary);
        pts.push(above);

        let result = remover().remove_surface(&cloud(pts), &params(250.0)).unwrap();

        assert_eq!(result.residue_count, 2);
        assert_eq!(result.foreground.points, vec![above]);
    }

    #[test]
    fn test_points_below_plane_discarded() {
        let mut pts = table(0.0);
        pts.push(PointXYZRGB::new(0.25, 0.25, 0.2));
        let result = remover().remove_surface(&cloud(pts), &params(20.0)).unwrap();
        assert!(result.foreground.is_empty());
    }

    #[test]
    fn test_keep_all_residue_when_cut_disabled() {
        let mut pts = table(0.0);
        pts.push(PointXYZRGB::new(0.25, 0.25, 0.2));
        pts.push(PointXYZRGB::new(0.25, 0.25, -0.2));
        let p = PlaneParams {
            use_only_points_above_plane: false,
            ..params(20.0)
        };
        let result = remover().remove_surface(&cloud(pts), &p).unwrap();
        assert_eq!(result.foreground.len(), 2);
    }

    #[test]
    fn test_empty_cloud_has_no_plane() {
        let result = remover().remove_surface(&cloud(Vec::new()), &params(20.0));
        assert!(matches!(result, Err(Error::NoPlaneFound)));
    }

    #[test]
    fn test_min_plane_fraction_rejects_weak_plane() {
        let mut pts = table(0.0);
        for i in 0..200 {
            pts.push(PointXYZRGB::new(0.3, 0.3 + i as f32 * 0.001, -0.05 - i as f32 * 0.003));
        }
        let p = PlaneParams {
            rel_num_of_plane_points: 0.9,
            ..params(20.0)
        };
        let result = remover().remove_surface(&cloud(pts), &p);
        assert!(matches!(result, Err(Error::NoPlaneFound)));
    }
}
