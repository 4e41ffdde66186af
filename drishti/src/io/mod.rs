//! I/O layer.
//!
//! # Contents
//!
//! - [`frame_buffer`]: bounded frame queue between producers and the loop
//! - [`ingest`]: inbound frame paths (typed clouds and packed messages)
//! - [`point_cloud_msg`]: packed point-cloud message decoding
//! - [`messages`]: outbound object list and marker types
//! - [`publisher`]: result publishing and sinks
//! - [`replay`]: frame playback from disk

pub mod frame_buffer;
pub mod ingest;
pub mod messages;
pub mod point_cloud_msg;
pub mod publisher;
pub mod replay;

pub use frame_buffer::FrameBuffer;
pub use ingest::FrameIngest;
pub use messages::{Marker, MarkerArray, MsgHeader, PoseMsg, RecognizedObject, RecognizedObjects};
pub use point_cloud_msg::{PointCloudMsg, PointField, PointFieldType};
pub use publisher::{ChannelSink, JsonLinesSink, PublishedMessage, ResultPublisher, ResultSink};
pub use replay::{FrameReplay, ReplayConfig};
