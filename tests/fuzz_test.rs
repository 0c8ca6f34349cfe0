//! Deterministic "fuzzing" (no external fuzzer dependency): a seeded LCG
//! feeds randomized-but-reproducible keyframe sets and timelines through
//! the animation engine and compositor, checking invariants rather than
//! specific output values.
use std::collections::HashMap;
use std::sync::Arc;

use timeline_compositor_core::assets::FakeAssetLoader;
use timeline_compositor_core::color::Rgba;
use timeline_compositor_core::engine::animation::compute_keyframe_state;
use timeline_compositor_core::engine::preload::preload;
use timeline_compositor_core::timeline::{Element, ElementKind, Keyframe, PositionType, Scene, ShapeKind, TimelineConfig, Track, TrackType};
use timeline_compositor_core::Compositor;

struct MockRng {
    seed: u64,
}

impl MockRng {
    fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.seed = self.seed.wrapping_mul(1103515245).wrapping_add(12345);
        (self.seed >> 16) as u32
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u32() as f64) / (u32::MAX as f64)
    }
}

#[test]
fn fuzz_keyframe_state_stays_in_bounds() {
    let mut rng = MockRng::new(0x5EED_1234);
    for _ in 0..1000 {
        let n = (rng.next_u32() % 8) + 1;
        let keyframes: Vec<Keyframe> = (0..n)
            .map(|_| Keyframe {
                time: rng.next_f64() * 5.0,
                easing: None,
                opacity: if rng.next_u32() % 3 == 0 { None } else { Some(rng.next_f64()) },
                scale: if rng.next_u32() % 3 == 0 { None } else { Some(rng.next_f64() * 2.0) },
                offset_x: if rng.next_u32() % 2 == 0 { None } else { Some(rng.next_f64() * 500.0 - 250.0) },
                offset_y: if rng.next_u32() % 2 == 0 { None } else { Some(rng.next_f64() * 500.0 - 250.0) },
                rotation: if rng.next_u32() % 2 == 0 { None } else { Some(rng.next_f64() * 360.0) },
            })
            .collect();
        let tau = rng.next_f64() * 6.0;

        let state = compute_keyframe_state(&keyframes, tau, 0.0);
        assert!((0.0..=1.0).contains(&state.opacity), "opacity escaped [0,1]: {}", state.opacity);
        assert!(state.scale.is_finite());
        if let Some(ox) = state.offset_x {
            assert!(ox.is_finite());
        }
    }
}

#[test]
fn fuzz_keyframe_state_is_order_independent() {
    let mut rng = MockRng::new(0xC0FFEE);
    for _ in 0..300 {
        let n = (rng.next_u32() % 6) + 2;
        let mut keyframes: Vec<Keyframe> = (0..n)
            .map(|_| Keyframe {
                time: rng.next_f64() * 3.0,
                easing: None,
                opacity: Some(rng.next_f64()),
                scale: None,
                offset_x: None,
                offset_y: None,
                rotation: None,
            })
            .collect();
        let tau = rng.next_f64() * 3.0;
        let ordered = compute_keyframe_state(&keyframes, tau, 0.0);

        // Fisher-Yates-free shuffle: just reverse, still a valid permutation.
        keyframes.reverse();
        let reversed = compute_keyframe_state(&keyframes, tau, 0.0);
        assert!((ordered.opacity - reversed.opacity).abs() < 1e-9);
    }
}

fn rect(z: i32, w: f64, h: f64) -> Element {
    Element {
        kind: ElementKind::Shape { shape: ShapeKind::Rect, width: w, height: h, fill: Some(Rgba { r: 128, g: 128, b: 128, a: 255 }), stroke: None, stroke_width: 1.0 },
        start: 0.0,
        duration: None,
        opacity: 1.0,
        z_index: z,
        position: PositionType::Center,
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
        rotation: 0.0,
        animation: None,
        keyframes: vec![],
        shadow: None,
        filters: None,
        blend_mode: None,
    }
}

#[tokio::test]
async fn fuzz_random_small_timelines_render_without_panicking() {
    let mut rng = MockRng::new(0xABCD_EF01);
    for _ in 0..40 {
        let track_count = (rng.next_u32() % 3) + 1;
        let tracks: Vec<Track> = (0..track_count)
            .map(|t| {
                let scene_count = (rng.next_u32() % 4) + 1;
                let scenes: Vec<Scene> = (0..scene_count)
                    .map(|_| {
                        let elements = (0..(rng.next_u32() % 4)).map(|i| rect(i as i32, 10.0 + rng.next_f64() * 50.0, 10.0 + rng.next_f64() * 50.0)).collect();
                        Scene {
                            duration: 0.1 + rng.next_f64() * 2.0,
                            bg_color: Some(Rgba::BLACK),
                            bg_gradient: None,
                            transition: None,
                            vignette: None,
                            color_overlay: None,
                            elements,
                        }
                    })
                    .collect();
                Track { kind: TrackType::Video, start: 0.0, z_index: t as i32, scenes }
            })
            .collect();

        let timeline = TimelineConfig::new(32, 32, tracks).unwrap();
        let loader = Arc::new(FakeAssetLoader { seeded: HashMap::new(), latency: None });
        let index = preload(&timeline, loader, 12.0).await.unwrap();
        let frame_count = timeline.frame_count(12.0).min(20);
        let mut compositor = Compositor::new(timeline, 12.0, index);
        for f in 0..frame_count {
            let bytes = compositor.render_frame(f).unwrap();
            assert_eq!(bytes.len(), 32 * 32 * 4);
        }
    }
}
