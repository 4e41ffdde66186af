//! Core foundation layer.
//!
//! This is the bottom layer of the recognition stack with no internal
//! dependencies. All other layers depend on core.
//!
//! # Contents
//!
//! - [`types`]: Core data types (points, clouds, frame headers, poses)
//! - [`math`]: Plane model and point-set statistics
//! - [`units`]: Metre / millimetre conversions at the engine boundary

pub mod math;
pub mod types;
pub mod units;
