use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::time::Duration;
use timeline_compositor_core::color::Rgba;
use timeline_compositor_core::engine::animation::compute_keyframe_state;
use timeline_compositor_core::engine::easing::Easing;
use timeline_compositor_core::timeline::{Keyframe, Scene, Track, TrackType};

fn rect_scene(duration: f64) -> Scene {
    Scene {
        duration,
        bg_color: Some(Rgba::BLACK),
        bg_gradient: None,
        transition: None,
        vignette: None,
        color_overlay: None,
        elements: Vec::new(),
    }
}

fn track_with_scenes(n: usize, scene_len: f64) -> Track {
    Track { kind: TrackType::Video, start: 0.0, z_index: 0, scenes: (0..n).map(|_| rect_scene(scene_len)).collect() }
}

fn bench_scene_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_lookup");
    group.throughput(Throughput::Elements(600));

    for &n in &[50usize, 500, 5000] {
        let track = track_with_scenes(n, 2.0);
        let starts = track.cumulative_scene_starts();
        group.bench_function(format!("binary_search_{n}_scenes"), |b| {
            b.iter(|| {
                for i in 0..600u64 {
                    let t = (i as f64) * (2.0 * n as f64) / 600.0;
                    let idx = match starts.binary_search_by(|s| s.total_cmp(&t)) {
                        Ok(i) => i,
                        Err(0) => 0,
                        Err(i) => i - 1,
                    };
                    black_box(idx);
                }
            })
        });
    }
    group.finish();
}

fn bench_keyframe_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyframe_evaluation");
    group.measurement_time(Duration::from_secs(5));

    let keyframes: Vec<Keyframe> = (0..32)
        .map(|i| Keyframe {
            time: i as f64 * 0.1,
            easing: Some(Easing::EaseInOutCubic),
            opacity: Some((i % 2) as f64),
            scale: Some(1.0 + i as f64 * 0.01),
            offset_x: None,
            offset_y: None,
            rotation: Some(i as f64),
        })
        .collect();

    group.bench_function("32_keyframes_1800_frames", |b| {
        b.iter(|| {
            for f in 0..1800u64 {
                let t = f as f64 / 30.0;
                black_box(compute_keyframe_state(&keyframes, t, 0.0));
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_scene_lookup, bench_keyframe_evaluation);
criterion_main!(benches);
