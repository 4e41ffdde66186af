//! Point types.

use serde::{Deserialize, Serialize};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a colour from components.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack from the `0x00RRGGBB` layout used by packed point-cloud fields.
    #[inline]
    pub fn from_packed(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xff) as u8,
            g: ((packed >> 8) & 0xff) as u8,
            b: (packed & 0xff) as u8,
        }
    }

    /// Pack into `0x00RRGGBB`.
    #[inline]
    pub fn packed(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// A 3D point in metres with an optional colour.
///
/// Filters and the voxel grid only look at the position; colour rides along.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointXYZRGB {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color: Option<Rgb>,
}

impl PointXYZRGB {
    /// Create an uncoloured point.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            color: None,
        }
    }

    /// Create a coloured point.
    #[inline]
    pub const fn with_color(x: f32, y: f32, z: f32, color: Rgb) -> Self {
        Self {
            x,
            y,
            z,
            color: Some(color),
        }
    }

    /// Position as `f64` components.
    #[inline]
    pub fn position_f64(&self) -> [f64; 3] {
        [self.x as f64, self.y as f64, self.z as f64]
    }

    /// True when all coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_pack_unpack() {
        let c = Rgb::new(0x12, 0x34, 0x56);
        assert_eq!(c.packed(), 0x0012_3456);
        assert_eq!(Rgb::from_packed(0xff12_3456), c);
    }

    #[test]
    fn test_point_finite() {
        assert!(PointXYZRGB::new(1.0, 2.0, 3.0).is_finite());
        assert!(!PointXYZRGB::new(f32::NAN, 0.0, 0.0).is_finite());
    }
}
