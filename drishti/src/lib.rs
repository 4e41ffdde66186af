//! Drishti - continuous tabletop object recognition from streaming point clouds
//!
//! # Architecture
//!
//! The crate is organized into logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 node / threads/                     │  ← Recognition loop
//! │        (RecognitionNode, RecognitionThread)         │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  io/ + state/                       │  ← Infrastructure
//! │  (frame buffer, ingest, publisher, parameters)      │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Recognition
//! │    (engine contract, driver, models, transforms)    │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  algorithms/                        │  ← Core algorithms
//! │        (aggregation, plane segmentation)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   sensors/                          │  ← Frame filtering
//! │          (region of interest, voxel grid)           │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │             (types, math, units)                    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Data flow
//!
//! Sensor callbacks push frames through [`FrameIngest`] into the bounded
//! [`FrameBuffer`]. The recognition thread drains the buffer on every tick,
//! merges and downsamples the frames, strips the support plane, runs the
//! recognition engine on what is left and publishes the detections.
//!
//! # Units
//!
//! Everything sensor- and world-facing is in metres. Everything
//! engine-facing (model geometry, scene points, match translations) is in
//! millimetres; the conversion happens only in [`crate::core::units`].

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Sensor processing (depends on core)
// ============================================================================
pub mod sensors;

// ============================================================================
// Layer 3: Algorithms (depends on core, sensors)
// ============================================================================
pub mod algorithms;

// ============================================================================
// Layer 4: Recognition engine (depends on core)
// ============================================================================
pub mod engine;

// ============================================================================
// Layer 5: Shared state and I/O (depends on all layers above)
// ============================================================================
pub mod state;
pub mod io;

// ============================================================================
// Layer 6: Recognition loop
// ============================================================================
pub mod threads;
pub mod node;

// ============================================================================
// Configuration, errors, utilities
// ============================================================================
pub mod config;
pub mod error;
pub mod utils;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math::Plane;
pub use crate::core::types::{FrameHeader, PointCloud, PointXYZRGB, Pose3D, Rgb, RigidTransform};

// Sensors - Preprocessing
pub use sensors::preprocessing::{
    CloudFilter, RegionOfInterest, RegionOfInterestConfig, VoxelGrid, VoxelGridConfig,
};

// Algorithms
pub use algorithms::FrameAggregator;
pub use algorithms::segmentation::{
    PlaneFit, PlaneParams, RansacPlaneConfig, RansacPlaneFitter, SurfaceRemoval, SurfaceRemover,
};

// Engine
pub use engine::{
    DetectionRecord, EngineConstruction, EngineParams, EngineStats, ModelConfig, ModelRegistry,
    NullEngine, RawMatch, RecognitionDriver, RecognitionEngine, ResourceRetriever,
    StaticTransforms, TransformLookup,
};

// State and I/O
pub use io::{
    ChannelSink, FrameBuffer, FrameIngest, JsonLinesSink, MarkerArray, PointCloudMsg,
    PublishedMessage, RecognizedObjects, ResultPublisher, ResultSink,
};
pub use state::{ReconfigureRequest, RuntimeParams, SharedParams};

// Recognition loop
pub use node::RecognitionNode;
pub use threads::{
    LoopState, LoopStats, RecognitionPipeline, RecognitionThread, SchedulerConfig, TickOutcome,
    TickSummary,
};

// Configuration and errors
pub use config::AppConfig;
pub use error::{Error, Result};
