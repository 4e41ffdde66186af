//! Replay of recorded frames from disk.
//!
//! Each `.xyz` file in a directory is one frame: ASCII `x y z` per line in
//! metres, optionally followed by `r g b` (0-255). Files play in name order
//! through the normal ingestion path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::ingest::FrameIngest;
use crate::core::types::{FrameHeader, PointCloud, PointXYZRGB, Rgb};
use crate::error::{Error, Result};
use crate::utils::{Rate, now_us};

/// Configuration for frame replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Directory holding `.xyz` frame files
    pub directory: PathBuf,
    /// Frames per second
    pub rate_hz: f64,
    /// Frame id stamped on replayed frames
    pub frame_id: String,
    /// Start over after the last file
    pub loop_playback: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("frames"),
            rate_hz: 10.0,
            frame_id: "/camera_depth_optical_frame".to_string(),
            loop_playback: false,
        }
    }
}

/// Parse one ASCII frame.
pub fn parse_xyz(text: &str) -> std::result::Result<Vec<PointXYZRGB>, String> {
    let mut points = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let coord = |i: usize| -> std::result::Result<f32, String> {
            fields[i]
                .parse::<f32>()
                .map_err(|e| format!("line {}: {}", n + 1, e))
        };
        let point = match fields.len() {
            3 => PointXYZRGB::new(coord(0)?, coord(1)?, coord(2)?),
            6 => {
                let channel = |i: usize| -> std::result::Result<u8, String> {
                    fields[i]
                        .parse::<u8>()
                        .map_err(|e| format!("line {}: {}", n + 1, e))
                };
                PointXYZRGB::with_color(
                    coord(0)?,
                    coord(1)?,
                    coord(2)?,
                    Rgb::new(channel(3)?, channel(4)?, channel(5)?),
                )
            }
            k => return Err(format!("line {}: expected 3 or 6 fields, got {}", n + 1, k)),
        };
        points.push(point);
    }
    Ok(points)
}

/// Frames loaded from a directory.
#[derive(Debug, Clone)]
pub struct FrameReplay {
    config: ReplayConfig,
    frames: Vec<Vec<PointXYZRGB>>,
}

impl FrameReplay {
    /// Load every `.xyz` file of `config.directory`.
    pub fn load(config: ReplayConfig) -> Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&config.directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "xyz"))
            .collect();
        paths.sort();

        let frames = paths
            .iter()
            .map(|p| load_frame(p))
            .collect::<Result<Vec<_>>>()?;
        if frames.is_empty() {
            return Err(Error::Config(format!(
                "no .xyz frames in {}",
                config.directory.display()
            )));
        }

        log::info!(
            "Loaded {} replay frame(s) from {}",
            frames.len(),
            config.directory.display()
        );
        Ok(Self { config, frames })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if no frames were loaded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Feed frames into `ingest` at the configured rate until done or
    /// `running` clears. Returns the number of frames played.
    pub fn run(&self, ingest: &FrameIngest, running: &AtomicBool) -> usize {
        let mut rate = Rate::new(self.config.rate_hz);
        let mut played = 0;

        'outer: loop {
            for points in &self.frames {
                if !running.load(Ordering::Acquire) {
                    break 'outer;
                }
                let header = FrameHeader::new(now_us(), self.config.frame_id.clone());
                ingest.on_frame(&PointCloud::from_points(header, points.clone()));
                played += 1;
                rate.sleep();
            }
            if !self.config.loop_playback {
                break;
            }
        }
        played
    }
}

fn load_frame(path: &Path) -> Result<Vec<PointXYZRGB>> {
    let text = fs::read_to_string(path)?;
    parse_xyz(&text).map_err(|e| Error::InvalidMessage(format!("{}: {}", path.display(), e)))
}
