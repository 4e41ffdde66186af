//! Sensor processing layer.
//!
//! This layer handles per-point filtering of incoming depth frames.
//!
//! # Contents
//!
//! - [`preprocessing`]: Region-of-interest clipping and voxel-grid downsampling

pub mod preprocessing;
