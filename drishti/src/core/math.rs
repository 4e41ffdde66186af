//! Plane model and point-set statistics.
//!
//! All computations run in `f64`; `f32` point coordinates convert exactly.

use nalgebra::{Matrix3, SymmetricEigen, Vector3};

use super::types::PointXYZRGB;

/// Degenerate-sample threshold for the normal of a 3-point plane.
const MIN_NORMAL_NORM: f64 = 1e-12;

/// Oriented plane `a*x + b*y + c*z + d = 0` with unit normal `(a, b, c)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Plane {
    /// Create a plane from coefficients, normalising the normal.
    ///
    /// Returns `None` for a zero normal.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Option<Self> {
        let norm = (a * a + b * b + c * c).sqrt();
        if !norm.is_finite() || norm < MIN_NORMAL_NORM {
            return None;
        }
        Some(Self {
            a: a / norm,
            b: b / norm,
            c: c / norm,
            d: d / norm,
        })
    }

    /// Plane through three points; `None` when they are (nearly) collinear.
    pub fn from_points(p1: &Vector3<f64>, p2: &Vector3<f64>, p3: &Vector3<f64>) -> Option<Self> {
        let normal = (p2 - p1).cross(&(p3 - p1));
        let norm = normal.norm();
        if !norm.is_finite() || norm < MIN_NORMAL_NORM {
            return None;
        }
        let n = normal / norm;
        Some(Self {
            a: n.x,
            b: n.y,
            c: n.z,
            d: -n.dot(p1),
        })
    }

    /// Least-squares plane through a point set.
    ///
    /// The normal is the eigenvector of the smallest eigenvalue of the
    /// covariance matrix. Needs at least three points.
    pub fn fit_least_squares<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a PointXYZRGB>,
        I::IntoIter: Clone,
    {
        let iter = points.into_iter();
        let centroid = compute_centroid(iter.clone())?;
        let (cov, count) = compute_covariance(iter, &centroid);
        if count < 3 {
            return None;
        }

        let eigen = SymmetricEigen::new(cov);
        let (min_idx, _) = eigen
            .eigenvalues
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
        let normal: Vector3<f64> = eigen.eigenvectors.column(min_idx).into_owned();

        Self::new(normal.x, normal.y, normal.z, -normal.dot(&centroid))
    }

    /// Unit normal.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        Vector3::new(self.a, self.b, self.c)
    }

    /// Coefficients as `[a, b, c, d]`.
    #[inline]
    pub fn coefficients(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Signed distance of a point (same units as `d`).
    #[inline]
    pub fn signed_distance(&self, p: &PointXYZRGB) -> f64 {
        self.a * p.x as f64 + self.b * p.y as f64 + self.c * p.z as f64 + self.d
    }

    /// Absolute distance of a point.
    #[inline]
    pub fn distance(&self, p: &PointXYZRGB) -> f64 {
        self.signed_distance(p).abs()
    }

    /// Plane with all four coefficients negated.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            a: -self.a,
            b: -self.b,
            c: -self.c,
            d: -self.d,
        }
    }

    /// Apply the sensor-facing sign convention: third normal component <= 0.
    #[inline]
    pub fn oriented(&self) -> Self {
        if self.c > 0.0 { self.flipped() } else { *self }
    }
}

/// Centroid of a point set, `None` when empty.
pub fn compute_centroid<'a, I>(points: I) -> Option<Vector3<f64>>
where
    I: IntoIterator<Item = &'a PointXYZRGB>,
{
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += Vector3::from(p.position_f64());
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Covariance matrix about `centroid` and the number of points used.
pub fn compute_covariance<'a, I>(points: I, centroid: &Vector3<f64>) -> (Matrix3<f64>, usize)
where
    I: IntoIterator<Item = &'a PointXYZRGB>,
{
    let mut cov = Matrix3::zeros();
    let mut count = 0usize;
    for p in points {
        let v = Vector3::from(p.position_f64()) - centroid;
        cov += v * v.transpose();
        count += 1;
    }
    if count > 0 {
        cov /= count as f64;
    }
    (cov, count)
}
