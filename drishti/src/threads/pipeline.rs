//! One recognition tick.
//!
//! drain → aggregate → downsample → remove surface → recognise → publish.
//! Each tick reads a single parameter snapshot at its start; nothing but
//! configuration carries over between ticks.

use std::sync::Arc;

use crate::algorithms::FrameAggregator;
use crate::algorithms::segmentation::SurfaceRemover;
use crate::engine::RecognitionDriver;
use crate::io::{FrameBuffer, ResultPublisher};
use crate::state::SharedParams;
use crate::utils::now_us;

/// Counts from one completed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummary {
    /// Frames drained from the buffer
    pub frames: usize,
    /// Points after concatenation
    pub aggregated_points: usize,
    /// Points after voxel downsampling
    pub downsampled_points: usize,
    /// Plane inliers removed
    pub plane_inliers: usize,
    /// Oriented plane coefficients `[a, b, c, d]`
    pub plane: [f64; 4],
    /// Foreground points handed to the engine
    pub foreground_points: usize,
    /// Detections published
    pub detections: usize,
}

/// How a tick ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing to process; no aggregation, recognition or publishing ran.
    BufferEmpty,
    /// No acceptable plane; nothing published.
    NoPlane,
    /// The engine failed; only the foreground cloud was published.
    RecognitionFailed,
    /// Results published.
    Completed(TickSummary),
}

/// Stages of the recognition loop.
#[derive(Debug)]
pub struct RecognitionPipeline {
    buffer: Arc<FrameBuffer>,
    params: SharedParams,
    aggregator: FrameAggregator,
    remover: SurfaceRemover,
    driver: RecognitionDriver,
    publisher: ResultPublisher,
}

impl RecognitionPipeline {
    /// Assemble a pipeline.
    pub fn new(
        buffer: Arc<FrameBuffer>,
        params: SharedParams,
        remover: SurfaceRemover,
        driver: RecognitionDriver,
        publisher: ResultPublisher,
    ) -> Self {
        Self {
            buffer,
            params,
            aggregator: FrameAggregator::new(),
            remover,
            driver,
            publisher,
        }
    }

    /// Buffer drained by this pipeline.
    pub fn buffer(&self) -> &Arc<FrameBuffer> {
        &self.buffer
    }

    /// Run one tick.
    pub fn tick(&mut self) -> TickOutcome {
        let params = self.params.snapshot();

        let frames = self.buffer.drain_all();
        let (Some(oldest), Some(newest)) = (frames.first(), frames.last()) else {
            return TickOutcome::BufferEmpty;
        };
        let now = now_us();
        log::debug!(
            "Computing objects from {} point clouds between {:.3}s and {:.3}s after acquisition",
            frames.len(),
            now.saturating_sub(newest.header.stamp_us) as f64 * 1e-6,
            now.saturating_sub(oldest.header.stamp_us) as f64 * 1e-6
        );
        let frame_count = frames.len();

        let merged = self.aggregator.aggregate(frames);
        let cloud = self
            .aggregator
            .downsample(&merged, params.interface.downsample_voxel_size);
        log::debug!(
            "Downsampled cloud from {} to {} points",
            merged.len(),
            cloud.len()
        );

        let removal = match self.remover.remove_surface(&cloud, &params.plane) {
            Ok(removal) => removal,
            Err(e) => {
                log::error!("{}", e);
                return TickOutcome::NoPlane;
            }
        };
        log::debug!(
            "Plane {:?}: {} inliers, {} foreground of {} residue points",
            removal.plane.coefficients(),
            removal.inlier_count,
            removal.foreground.len(),
            removal.residue_count
        );

        self.publisher.publish_foreground(&removal.foreground);

        self.driver.sync_params(&params.engine);
        let stamp_us = removal.foreground.header.stamp_us;
        let foreground_points = removal.foreground.len();
        let detections = match self
            .driver
            .recognize(removal.foreground, params.success_probability)
        {
            Ok(detections) => detections,
            Err(e) => {
                log::error!("Recognition failed: {}", e);
                return TickOutcome::RecognitionFailed;
            }
        };

        self.publisher.publish(&detections, stamp_us, &params.interface);

        TickOutcome::Completed(TickSummary {
            frames: frame_count,
            aggregated_points: merged.len(),
            downsampled_points: cloud.len(),
            plane_inliers: removal.inlier_count,
            plane: removal.plane.coefficients(),
            foreground_points,
            detections: detections.len(),
        })
    }
}
