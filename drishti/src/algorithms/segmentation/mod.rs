//! Plane segmentation and surface removal.

mod plane_ransac;
mod surface_remover;

pub use plane_ransac::{PlaneFit, RansacPlaneConfig, RansacPlaneFitter};
pub use surface_remover::{PlaneParams, SurfaceRemoval, SurfaceRemover};
