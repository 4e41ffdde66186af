//! Recognition Pipeline Benchmarks
//!
//! Benchmarks for the CPU-heavy stages of one recognition tick:
//! - Region-of-interest clipping
//! - Frame aggregation and voxel downsampling
//! - RANSAC plane fitting and surface removal
//!
//! Run with: `cargo bench`
//! View HTML reports in: `target/criterion/`

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use drishti::{
    CloudFilter, FrameAggregator, FrameHeader, PlaneParams, PointCloud, PointXYZRGB,
    RansacPlaneConfig, RansacPlaneFitter, RegionOfInterest, RegionOfInterestConfig,
    SurfaceRemover,
};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Tabletop scene: a noisy 1 m x 1 m table at 0.8 m depth with a box-shaped
/// object standing on it, as seen from the sensor.
fn create_tabletop_cloud(n_points: usize, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cloud = PointCloud::with_capacity(
        FrameHeader::new(0, "/camera_depth_optical_frame"),
        n_points,
    );

    let n_object = n_points / 10;
    for _ in 0..n_points - n_object {
        cloud.push(PointXYZRGB::new(
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
            0.8 + rng.gen_range(-0.002..0.002),
        ));
    }
    for _ in 0..n_object {
        cloud.push(PointXYZRGB::new(
            rng.gen_range(-0.05..0.05),
            rng.gen_range(-0.05..0.05),
            rng.gen_range(0.7..0.79),
        ));
    }
    cloud
}

fn plane_params() -> PlaneParams {
    PlaneParams {
        thickness: 15.0,
        use_only_points_above_plane: true,
        rel_num_of_plane_points: 0.2,
    }
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(3));
    group.warm_up_time(Duration::from_secs(1));

    let frames: Vec<PointCloud> = (0..3).map(|i| create_tabletop_cloud(30_000, i)).collect();
    let roi = RegionOfInterest::new(RegionOfInterestConfig {
        x_min: -0.4,
        x_max: 0.4,
        y_min: -0.4,
        y_max: 0.4,
        z_min: 0.3,
        z_max: 1.5,
    });

    group.bench_function("roi/30k", |b| b.iter(|| roi.filter(black_box(&frames[0]))));

    let aggregator = FrameAggregator::new();
    group.bench_function("aggregate_downsample/3x30k", |b| {
        b.iter(|| {
            let merged = aggregator.aggregate(black_box(frames.clone()));
            aggregator.downsample(&merged, black_box(3.5))
        })
    });

    group.finish();
}

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(3));
    group.warm_up_time(Duration::from_secs(1));

    let cloud = create_tabletop_cloud(20_000, 42);
    let config = RansacPlaneConfig::default().with_seed(7);

    let fitter = RansacPlaneFitter::new(config);
    group.bench_function("ransac_plane/20k", |b| {
        b.iter(|| fitter.fit(black_box(&cloud.points)))
    });

    let remover = SurfaceRemover::new(config);
    let params = plane_params();
    group.bench_function("surface_removal/20k", |b| {
        b.iter(|| remover.remove_surface(black_box(&cloud), &params))
    });

    group.finish();
}

criterion_group!(benches, bench_preprocessing, bench_segmentation);
criterion_main!(benches);
