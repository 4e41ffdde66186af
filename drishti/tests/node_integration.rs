//! Node-level tests: configuration file, model loading, live
//! reconfiguration, replay and shutdown.

mod common;

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use approx::assert_relative_eq;
use crossbeam_channel::{Receiver, RecvTimeoutError};

use common::*;
use drishti::io::{ChannelSink, FrameReplay, PublishedMessage, ReplayConfig};
use drishti::state::ReconfigureRequest;
use drishti::{AppConfig, Error, LoopState, RecognitionNode, RecognizedObjects};

fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    fs::create_dir_all(dir.join("objects")).unwrap();
    fs::write(
        dir.join("objects/mug.xyz"),
        "0 0 0\n40 0 0\n0 40 0\n0 0 90\n",
    )
    .unwrap();

    let text = format!(
        r#"
[recognition]
pair_width = 30.0
voxel_size = 4.0
object_visibility = 0.1
relative_object_size = 0.1
relative_number_of_illegal_points = 0.02
z_distance_threshold_as_voxel_size_fraction = 1.5
normal_estimation_radius = 5
intersection_fraction = 0.03
num_threads = 1
success_probability = 0.99

[plane]
thickness = 20.0
use_only_points_above_plane = true
rel_num_of_plane_points = 0.2

[scheduler]
max_rate_hz = 200.0
empty_wait_ms = 10

[ransac]
optimize_coefficients = false
seed = 3

[resources.packages]
objects = '{objects}'

[[models]]
label = "mug"
model_uri = "package://objects/mug.xyz"
mesh_uri = "package://objects/mug.stl"

[[models]]
label = "ghost"
model_uri = "package://objects/ghost.xyz"
mesh_uri = "package://objects/ghost.stl"

[[transforms]]
parent = "/world"
child = "{sensor}"
translation = [0.0, 0.0, 1.0]
{extra}
"#,
        objects = dir.join("objects").display(),
        sensor = SENSOR_FRAME,
    );

    let path = dir.join("drishti.toml");
    fs::write(&path, text).unwrap();
    path
}

fn next_objects(rx: &Receiver<PublishedMessage>) -> RecognizedObjects {
    loop {
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            PublishedMessage::Objects(objects) => return objects,
            _ => continue,
        }
    }
}

#[test]
fn test_node_loads_models_and_publishes_world_poses() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::from_file(write_config(dir.path(), "")).unwrap();

    let (engine, engine_log) = ScriptedEngine::new(vec![raw_match("mug", 0.5, [0.0, 0.0, 500.0])]);
    let (sink, output) = ChannelSink::new();
    let node = RecognitionNode::new(&config, Box::new(engine), Box::new(sink)).unwrap();

    // The unreadable model is skipped, the node still runs
    assert_eq!(node.registry().labels(), vec!["mug"]);
    assert_eq!(engine_log.lock().models, vec!["mug".to_string()]);
    assert_eq!(node.state(), LoopState::Running);

    node.ingest().on_frame(&cloud(11, table(0.0)));

    let objects = next_objects(&output);
    assert_eq!(objects.header.frame_id, "/world");
    assert_eq!(objects.objects.len(), 1);
    let object = &objects.objects[0];
    assert_eq!(object.header.frame_id, "/world");
    assert_relative_eq!(object.pose.position[2], 1.5, epsilon = 1e-12);

    node.shutdown();
    // Whatever is still queued, nothing more can arrive
    output.try_iter().for_each(drop);
    assert_eq!(
        output.recv_timeout(Duration::from_millis(100)).map(|_| ()),
        Err(RecvTimeoutError::Disconnected)
    );
}

#[test]
fn test_reconfigure_validates_whole_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::from_file(write_config(dir.path(), "")).unwrap();

    let (engine, _) = ScriptedEngine::new(Vec::new());
    let (sink, _output) = ChannelSink::new();
    let node = RecognitionNode::new(&config, Box::new(engine), Box::new(sink)).unwrap();
    let before = node.params();

    let invalid = ReconfigureRequest {
        plane_thickness: Some(30.0),
        success_probability: Some(1.5),
        ..Default::default()
    };
    assert!(matches!(node.reconfigure(&invalid), Err(Error::Config(_))));
    assert_eq!(*node.params(), *before);

    let valid = ReconfigureRequest {
        plane_thickness: Some(30.0),
        n_clouds_per_recognition: Some(4),
        ..Default::default()
    };
    node.reconfigure(&valid).unwrap();
    let after = node.params();
    assert_eq!(after.plane.thickness, 30.0);
    assert_eq!(after.interface.n_clouds_per_recognition, 4);
    assert_eq!(after.engine, before.engine);

    node.shutdown();
}

#[test]
fn test_replayed_frames_reach_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::from_file(write_config(dir.path(), "")).unwrap();

    let frames = dir.path().join("frames");
    fs::create_dir_all(&frames).unwrap();
    let mut text = String::new();
    for p in table(0.0) {
        text.push_str(&format!("{} {} {}\n", p.x, p.y, p.z));
    }
    text.push_str("0.25 0.25 -0.125 255 0 0\n");
    fs::write(frames.join("000.xyz"), &text).unwrap();

    let (engine, engine_log) = ScriptedEngine::new(Vec::new());
    let (sink, output) = ChannelSink::new();
    let node = RecognitionNode::new(&config, Box::new(engine), Box::new(sink)).unwrap();

    let replay = FrameReplay::load(ReplayConfig {
        directory: frames,
        rate_hz: 0.0,
        frame_id: SENSOR_FRAME.to_string(),
        loop_playback: false,
    })
    .unwrap();
    assert_eq!(replay.run(&node.ingest(), &AtomicBool::new(true)), 1);

    let foreground = loop {
        match output.recv_timeout(Duration::from_secs(5)).unwrap() {
            PublishedMessage::Foreground(cloud) => break cloud,
            _ => continue,
        }
    };
    assert_eq!(foreground.len(), 1);
    assert!(foreground.points[0].color.is_some());

    next_objects(&output);
    node.shutdown();
    let log = engine_log.lock();
    assert_eq!(log.scenes.len(), 1);
    assert_relative_eq!(log.scenes[0][0].z, -125.0, epsilon = 1e-9);
}

#[test]
fn test_missing_plane_section_is_fatal() {
    let text = r#"
[recognition]
pair_width = 30.0
voxel_size = 4.0
object_visibility = 0.1
relative_object_size = 0.1
relative_number_of_illegal_points = 0.02
z_distance_threshold_as_voxel_size_fraction = 1.5
normal_estimation_radius = 5
intersection_fraction = 0.03
num_threads = 1
success_probability = 0.99
"#;
    assert!(matches!(
        AppConfig::from_toml_str(text),
        Err(Error::ConfigParse(_))
    ));
}

#[test]
fn test_out_of_range_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "\n[interface]\nn_clouds_per_recognition = 0\n");
    assert!(matches!(AppConfig::from_file(path), Err(Error::Config(_))));
}

#[test]
fn test_unreadable_config_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        AppConfig::from_file(dir.path().join("absent.toml")),
        Err(Error::Io(_))
    ));
}
