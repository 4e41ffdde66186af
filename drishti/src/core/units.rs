//! Unit conventions.
//!
//! Sensor frames, the aggregated cloud, published poses and markers are in
//! metres. Everything the recognition engine sees (model geometry, scene
//! points, raw match translations) is in millimetres. Configuration values
//! that describe physical sizes of engine-scale things (voxel size, plane
//! thickness) are given in millimetres as well.
//!
//! Every crossing of that boundary goes through this module.

/// Millimetres per metre.
pub const MM_PER_M: f64 = 1000.0;

/// Convert millimetres to metres.
#[inline]
pub fn mm_to_m(value_mm: f64) -> f64 {
    value_mm / MM_PER_M
}

/// Convert metres to millimetres.
#[inline]
pub fn m_to_mm(value_m: f64) -> f64 {
    value_m * MM_PER_M
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_trip() {
        assert_relative_eq!(mm_to_m(3.5), 0.0035);
        assert_relative_eq!(m_to_mm(mm_to_m(1234.5)), 1234.5);
        assert_eq!(mm_to_m(1000.0), 1.0);
    }
}
