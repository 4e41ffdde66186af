//! Result publishing.
//!
//! [`ResultPublisher`] turns detection records into an object list and a
//! marker array and hands them to a [`ResultSink`]. Sink failures are logged
//! and never stop the recognition loop.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::Serialize;

use super::messages::{
    MARKER_COLOR, MARKER_NAMESPACE, MARKER_SCALE, Marker, MarkerAction, MarkerArray, MarkerType,
    MsgHeader, PoseMsg, RecognizedObject, RecognizedObjects,
};
use crate::core::types::PointCloud;
use crate::engine::{DetectionRecord, ModelRegistry};
use crate::error::{Error, Result};
use crate::state::InterfaceParams;

// ============================================================================
// Sinks
// ============================================================================

/// Destination for published results.
pub trait ResultSink: Send {
    /// Deliver the object list of one tick.
    fn publish_objects(&mut self, objects: &RecognizedObjects) -> Result<()>;

    /// Deliver the markers of one tick.
    fn publish_markers(&mut self, markers: &MarkerArray) -> Result<()>;

    /// Deliver the foreground cloud of one tick.
    fn publish_foreground(&mut self, cloud: &PointCloud) -> Result<()>;
}

/// Message delivered by [`ChannelSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum PublishedMessage {
    Objects(RecognizedObjects),
    Markers(MarkerArray),
    Foreground(PointCloud),
}

/// Sink forwarding every message over a crossbeam channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<PublishedMessage>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its channel.
    pub fn new() -> (Self, Receiver<PublishedMessage>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    fn send(&self, msg: PublishedMessage) -> Result<()> {
        self.tx
            .send(msg)
            .map_err(|_| Error::Publish("channel receiver dropped".to_string()))
    }
}

impl ResultSink for ChannelSink {
    fn publish_objects(&mut self, objects: &RecognizedObjects) -> Result<()> {
        self.send(PublishedMessage::Objects(objects.clone()))
    }

    fn publish_markers(&mut self, markers: &MarkerArray) -> Result<()> {
        self.send(PublishedMessage::Markers(markers.clone()))
    }

    fn publish_foreground(&mut self, cloud: &PointCloud) -> Result<()> {
        self.send(PublishedMessage::Foreground(cloud.clone()))
    }
}

/// One JSON line: `{"topic": ..., "data": ...}`.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    topic: &'a str,
    data: &'a T,
}

/// Foreground summary written instead of the full cloud.
#[derive(Serialize)]
struct ForegroundSummary<'a> {
    header: &'a crate::core::types::FrameHeader,
    num_points: usize,
}

/// Sink writing one JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    include_foreground_points: bool,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Create a sink; the foreground cloud is summarised by its size.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            include_foreground_points: false,
        }
    }

    /// Write full foreground clouds instead of summaries.
    pub fn with_foreground_points(mut self, include: bool) -> Self {
        self.include_foreground_points = include;
        self
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line<T: Serialize>(&mut self, topic: &str, data: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &Envelope { topic, data })?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> ResultSink for JsonLinesSink<W> {
    fn publish_objects(&mut self, objects: &RecognizedObjects) -> Result<()> {
        self.write_line("recognized_objects", objects)
    }

    fn publish_markers(&mut self, markers: &MarkerArray) -> Result<()> {
        self.write_line("recognized_objects_markers", markers)
    }

    fn publish_foreground(&mut self, cloud: &PointCloud) -> Result<()> {
        if self.include_foreground_points {
            self.write_line("foreground_points", cloud)
        } else {
            let summary = ForegroundSummary {
                header: &cloud.header,
                num_points: cloud.len(),
            };
            self.write_line("foreground_points", &summary)
        }
    }
}

// ============================================================================
// Publisher
// ============================================================================

/// Marker lifetime for a detection: `confidence * multiplier` seconds,
/// clamped to `[0, Duration::MAX]`.
pub fn marker_lifetime(confidence: f64, multiplier: f64) -> Duration {
    let secs = confidence * multiplier;
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Converts detections into outbound messages.
pub struct ResultPublisher {
    sink: Box<dyn ResultSink>,
    registry: Arc<ModelRegistry>,
    world_frame: String,
}

impl ResultPublisher {
    /// Create a publisher writing to `sink`.
    pub fn new(
        sink: Box<dyn ResultSink>,
        registry: Arc<ModelRegistry>,
        world_frame: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            registry,
            world_frame: world_frame.into(),
        }
    }

    /// Build the object list for one tick.
    ///
    /// The list header carries the world frame; each object keeps the frame
    /// its pose is actually expressed in.
    pub fn build_objects(&self, detections: &[DetectionRecord], stamp_us: u64) -> RecognizedObjects {
        RecognizedObjects {
            header: MsgHeader {
                stamp_us,
                frame_id: self.world_frame.clone(),
            },
            objects: detections
                .iter()
                .map(|d| RecognizedObject {
                    header: MsgHeader {
                        stamp_us: d.stamp_us,
                        frame_id: d.frame_id.clone(),
                    },
                    label: d.label.clone(),
                    confidence: d.confidence,
                    pose: PoseMsg::from(&d.pose),
                })
                .collect(),
        }
    }

    /// Build one mesh marker per detection, ids from 0.
    pub fn build_markers(&self, detections: &[DetectionRecord], multiplier: f64) -> MarkerArray {
        let markers = detections
            .iter()
            .enumerate()
            .map(|(id, d)| {
                let mesh_resource = match self.registry.mesh_uri(&d.label) {
                    Some(uri) => uri.to_string(),
                    None => {
                        log::debug!("No mesh registered for \"{}\"", d.label);
                        String::new()
                    }
                };
                Marker {
                    header: MsgHeader {
                        stamp_us: d.stamp_us,
                        frame_id: d.frame_id.clone(),
                    },
                    ns: MARKER_NAMESPACE.to_string(),
                    id: id as u32,
                    marker_type: MarkerType::MeshResource,
                    action: MarkerAction::Add,
                    pose: PoseMsg::from(&d.pose),
                    scale: [MARKER_SCALE; 3],
                    color: MARKER_COLOR,
                    lifetime: marker_lifetime(d.confidence, multiplier),
                    mesh_resource,
                    mesh_use_embedded_materials: false,
                }
            })
            .collect();
        MarkerArray { markers }
    }

    /// Publish the object list and, if enabled, the markers.
    pub fn publish(&mut self, detections: &[DetectionRecord], stamp_us: u64, params: &InterfaceParams) {
        let objects = self.build_objects(detections, stamp_us);
        if let Err(e) = self.sink.publish_objects(&objects) {
            log::warn!("Failed to publish recognized objects: {}", e);
        }

        if params.publish_markers {
            let markers = self.build_markers(detections, params.confidence_time_multiplier);
            if let Err(e) = self.sink.publish_markers(&markers) {
                log::warn!("Failed to publish markers: {}", e);
            }
        }
    }

    /// Publish the foreground cloud for inspection.
    pub fn publish_foreground(&mut self, cloud: &PointCloud) {
        if let Err(e) = self.sink.publish_foreground(cloud) {
            log::warn!("Failed to publish foreground points: {}", e);
        }
    }
}

impl std::fmt::Debug for ResultPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultPublisher")
            .field("models", &self.registry.len())
            .field("world_frame", &self.world_frame)
            .finish()
    }
}
