//! Frame ingestion.
//!
//! Both inbound paths (packed messages and typed clouds) end in
//! [`FrameIngest::on_frame`], which clips the frame to the region of
//! interest and enqueues it. Clipping runs before the buffer lock is taken.

use std::sync::Arc;

use super::frame_buffer::FrameBuffer;
use super::point_cloud_msg::PointCloudMsg;
use crate::core::types::PointCloud;
use crate::error::Result;
use crate::sensors::preprocessing::RegionOfInterest;
use crate::state::SharedParams;

/// Producer-side handle. Cheap to clone; one per sensor callback.
#[derive(Debug, Clone)]
pub struct FrameIngest {
    buffer: Arc<FrameBuffer>,
    params: SharedParams,
}

impl FrameIngest {
    /// Create a handle feeding `buffer`.
    pub fn new(buffer: Arc<FrameBuffer>, params: SharedParams) -> Self {
        Self { buffer, params }
    }

    /// Typed ingestion path.
    ///
    /// Returns the number of points that survived clipping.
    pub fn on_frame(&self, frame: &PointCloud) -> usize {
        let params = self.params.snapshot();
        let clipped = RegionOfInterest::new(params.roi).apply(frame);
        let kept = clipped.len();

        self.buffer
            .set_capacity(params.interface.n_clouds_per_recognition);
        let evicted = self.buffer.enqueue(clipped);
        if evicted > 0 {
            log::trace!("Frame buffer full, evicted {} oldest frame(s)", evicted);
        }
        kept
    }

    /// Packed-message ingestion path.
    pub fn on_point_cloud_msg(&self, msg: &PointCloudMsg) -> Result<usize> {
        let cloud = msg.to_cloud()?;
        Ok(self.on_frame(&cloud))
    }

    /// The buffer this handle feeds.
    pub fn buffer(&self) -> &Arc<FrameBuffer> {
        &self.buffer
    }
}
