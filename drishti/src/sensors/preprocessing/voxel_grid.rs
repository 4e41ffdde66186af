//! Voxel-grid downsampling.
//!
//! Space is cut into cubic cells of edge `leaf_size`; every occupied cell
//! yields exactly one point, the centroid of its members. Centroids are
//! order-independent, so the output positions only depend on the input
//! positions and the leaf size. Output order follows first occupancy.

use std::collections::HashMap;

use crate::core::types::{PointCloud, PointXYZRGB, Rgb};

/// Configuration for voxel-grid downsampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelGridConfig {
    /// Cell edge length in metres.
    ///
    /// Zero or negative disables downsampling (points are copied through).
    pub leaf_size: f32,
}

impl Default for VoxelGridConfig {
    fn default() -> Self {
        Self { leaf_size: 0.0035 }
    }
}

/// Running sums for one occupied cell.
#[derive(Debug, Clone, Default)]
struct CellAccumulator {
    sum: [f64; 3],
    count: u32,
    color_sum: [u32; 3],
    color_count: u32,
}

impl CellAccumulator {
    #[inline]
    fn add(&mut self, p: &PointXYZRGB) {
        self.sum[0] += p.x as f64;
        self.sum[1] += p.y as f64;
        self.sum[2] += p.z as f64;
        self.count += 1;
        if let Some(c) = p.color {
            self.color_sum[0] += c.r as u32;
            self.color_sum[1] += c.g as u32;
            self.color_sum[2] += c.b as u32;
            self.color_count += 1;
        }
    }

    fn centroid(&self) -> PointXYZRGB {
        let n = self.count as f64;
        let color = (self.color_count > 0).then(|| {
            let m = self.color_count;
            Rgb::new(
                ((self.color_sum[0] + m / 2) / m) as u8,
                ((self.color_sum[1] + m / 2) / m) as u8,
                ((self.color_sum[2] + m / 2) / m) as u8,
            )
        });
        PointXYZRGB {
            x: (self.sum[0] / n) as f32,
            y: (self.sum[1] / n) as f32,
            z: (self.sum[2] / n) as f32,
            color,
        }
    }
}

/// Centroid voxel-grid downsampler.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    config: VoxelGridConfig,
}

impl VoxelGrid {
    /// Create a downsampler with the given configuration.
    pub fn new(config: VoxelGridConfig) -> Self {
        Self { config }
    }

    /// Create a downsampler with the given leaf size in metres.
    pub fn with_leaf_size(leaf_size: f32) -> Self {
        Self::new(VoxelGridConfig { leaf_size })
    }

    /// Cell index of a point.
    #[inline]
    fn cell_of(&self, p: &PointXYZRGB, inv_leaf: f64) -> (i64, i64, i64) {
        (
            (p.x as f64 * inv_leaf).floor() as i64,
            (p.y as f64 * inv_leaf).floor() as i64,
            (p.z as f64 * inv_leaf).floor() as i64,
        )
    }

    /// Downsample a cloud. Non-finite points are dropped.
    pub fn apply(&self, cloud: &PointCloud) -> PointCloud {
        if self.config.leaf_size <= 0.0 || !self.config.leaf_size.is_finite() {
            return cloud.clone();
        }

        let inv_leaf = 1.0 / self.config.leaf_size as f64;
        let mut index: HashMap<(i64, i64, i64), usize> = HashMap::with_capacity(cloud.len() / 4);
        let mut cells: Vec<CellAccumulator> = Vec::new();

        for p in cloud.iter().filter(|p| p.is_finite()) {
            let key = self.cell_of(p, inv_leaf);
            let slot = *index.entry(key).or_insert_with(|| {
                cells.push(CellAccumulator::default());
                cells.len() - 1
            });
            cells[slot].add(p);
        }

        let points = cells.iter().map(CellAccumulator::centroid).collect();
        PointCloud::from_points(cloud.header.clone(), points)
    }
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new(VoxelGridConfig::default())
    }
}
