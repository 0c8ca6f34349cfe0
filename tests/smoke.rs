//! End-to-end smoke test: build a tiny timeline in code, preload it, and
//! render a handful of frames through the real compositor.
use std::collections::HashMap;
use std::sync::Arc;

use timeline_compositor_core::assets::FakeAssetLoader;
use timeline_compositor_core::color::Rgba;
use timeline_compositor_core::engine::preload::preload;
use timeline_compositor_core::timeline::{
    Animation, AnimationPreset, Element, ElementKind, Fit, PositionType, Scene, ShapeKind, TimelineConfig, Track, TrackType, Transition, TransitionType,
};
use timeline_compositor_core::Compositor;

fn rect_element(color: Rgba) -> Element {
    Element {
        kind: ElementKind::Shape { shape: ShapeKind::Rect, width: 100.0, height: 100.0, fill: Some(color), stroke: None, stroke_width: 1.0 },
        start: 0.0,
        duration: None,
        opacity: 1.0,
        z_index: 0,
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

async fn build(timeline: TimelineConfig, fps: f64) -> Compositor {
    let loader = Arc::new(FakeAssetLoader { seeded: HashMap::new(), latency: None });
    let index = preload(&timeline, loader, fps).await.unwrap();
    Compositor::new(timeline, fps, index)
}

#[tokio::test]
async fn empty_tracks_config_rejected_at_construction() {
    let err = TimelineConfig::new(100, 100, vec![]).unwrap_err();
    assert_eq!(err.to_string(), "tracks list is empty");
}

#[tokio::test]
async fn two_second_scene_at_30fps_yields_60_frames() {
    let scene = Scene { duration: 2.0, bg_color: Some(Rgba::BLACK), bg_gradient: None, transition: None, vignette: None, color_overlay: None, elements: vec![] };
    let track = Track { kind: TrackType::Video, start: 0.0, z_index: 0, scenes: vec![scene] };
    let timeline = TimelineConfig::new(640, 360, vec![track]).unwrap();
    let compositor = build(timeline, 30.0).await;
    assert_eq!(compositor.frame_count(), 60);
}

#[tokio::test]
async fn rendering_the_same_frame_twice_is_byte_identical() {
    let scene = Scene {
        duration: 1.0,
        bg_color: Some(Rgba::BLACK),
        bg_gradient: None,
        transition: None,
        vignette: None,
        color_overlay: None,
        elements: vec![rect_element(Rgba { r: 200, g: 40, b: 40, a: 255 })],
    };
    let track = Track { kind: TrackType::Video, start: 0.0, z_index: 0, scenes: vec![scene] };
    let timeline = TimelineConfig::new(64, 64, vec![track]).unwrap();
    let mut compositor = build(timeline, 10.0).await;
    let a = compositor.render_frame(3).unwrap();
    let b = compositor.render_frame(3).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 64 * 64 * 4);
}

#[tokio::test]
async fn fade_in_scenario_matches_literal_breakpoints() {
    // fadeIn{duration=1s}, fps=10, 2s scene: frame0 black, frame5 ~half
    // alpha over the black background, frame10+ fully opaque white.
    let mut el = rect_element(Rgba { r: 255, g: 255, b: 255, a: 255 });
    el.animation = Some(Animation { preset: AnimationPreset::FadeIn, fade_in_duration: Some(1.0), fade_out_duration: None });
    el.position = PositionType::TopLeft;
    el.kind = ElementKind::Shape { shape: ShapeKind::Rect, width: 64.0, height: 64.0, fill: Some(Rgba { r: 255, g: 255, b: 255, a: 255 }), stroke: None, stroke_width: 1.0 };
    let scene = Scene { duration: 2.0, bg_color: Some(Rgba::BLACK), bg_gradient: None, transition: None, vignette: None, color_overlay: None, elements: vec![el] };
    let track = Track { kind: TrackType::Video, start: 0.0, z_index: 0, scenes: vec![scene] };
    let timeline = TimelineConfig::new(64, 64, vec![track]).unwrap();
    let mut compositor = build(timeline, 10.0).await;

    let frame0 = compositor.render_frame(0).unwrap();
    assert_eq!(&frame0[0..3], &[0, 0, 0]);

    let frame5 = compositor.render_frame(5).unwrap();
    assert!(frame5[0] > 100 && frame5[0] < 160, "frame5 red channel = {}", frame5[0]);

    let frame15 = compositor.render_frame(15).unwrap();
    assert_eq!(&frame15[0..3], &[255, 255, 255]);
}

#[tokio::test]
async fn z_index_swap_changes_which_rect_is_on_top() {
    let build_with_order = |top_z: i32, bottom_z: i32| async move {
        let red = {
            let mut e = rect_element(Rgba { r: 255, g: 0, b: 0, a: 255 });
            e.z_index = bottom_z;
            e.position = PositionType::TopLeft;
            e.kind = ElementKind::Shape { shape: ShapeKind::Rect, width: 64.0, height: 64.0, fill: Some(Rgba { r: 255, g: 0, b: 0, a: 255 }), stroke: None, stroke_width: 1.0 };
            e
        };
        let blue = {
            let mut e = rect_element(Rgba { r: 0, g: 0, b: 255, a: 255 });
            e.z_index = top_z;
            e.position = PositionType::TopLeft;
            e.kind = ElementKind::Shape { shape: ShapeKind::Rect, width: 64.0, height: 64.0, fill: Some(Rgba { r: 0, g: 0, b: 255, a: 255 }), stroke: None, stroke_width: 1.0 };
            e
        };
        let scene = Scene { duration: 1.0, bg_color: Some(Rgba::BLACK), bg_gradient: None, transition: None, vignette: None, color_overlay: None, elements: vec![red, blue] };
        let track = Track { kind: TrackType::Video, start: 0.0, z_index: 0, scenes: vec![scene] };
        let timeline = TimelineConfig::new(64, 64, vec![track]).unwrap();
        build(timeline, 10.0).await
    };

    let mut blue_on_top = build_with_order(10, 0).await;
    assert_eq!(&blue_on_top.render_frame(0).unwrap()[0..3], &[0, 0, 255]);

    let mut red_on_top = build_with_order(0, 10).await;
    assert_eq!(&red_on_top.render_frame(0).unwrap()[0..3], &[255, 0, 0]);
}

#[tokio::test]
async fn scene_transition_opacity_applies_to_a_static_element() {
    // A static (no keyframes/preset) element needs no transform/shadow save
    // of its own; its opacity must still multiply with the scene
    // transition's, not clobber it (the transition's save level and the
    // element's own must stack, not collide).
    let el = rect_element(Rgba { r: 0, g: 0, b: 0, a: 255 });
    let scene = Scene {
        duration: 2.0,
        bg_color: Some(Rgba { r: 255, g: 255, b: 255, a: 255 }),
        bg_gradient: None,
        transition: Some(Transition { kind: TransitionType::Fade, duration: 1.0 }),
        vignette: None,
        color_overlay: None,
        elements: vec![el],
    };
    let track = Track { kind: TrackType::Video, start: 0.0, z_index: 0, scenes: vec![scene] };
    let timeline = TimelineConfig::new(64, 64, vec![track]).unwrap();
    let mut compositor = build(timeline, 10.0).await;

    // frame 0: transition progress p=0, so the black element is fully
    // transparent and the white background shows through unobstructed.
    let frame0 = compositor.render_frame(0).unwrap();
    assert_eq!(&frame0[0..3], &[255, 255, 255], "transition opacity was ignored for a static element");

    // frame 15 (s_scene=1.5): transition has finished, element fully opaque.
    let frame15 = compositor.render_frame(15).unwrap();
    assert_eq!(&frame15[0..3], &[0, 0, 0]);
}

#[tokio::test]
async fn fit_does_not_panic_for_all_position_variants() {
    use timeline_compositor_core::timeline::PositionType::*;
    for position in [TopLeft, TopCenter, TopRight, CenterLeft, Center, CenterRight, BottomLeft, BottomCenter, BottomRight, Left, Right] {
        let mut el = rect_element(Rgba::BLACK);
        el.position = position;
        el.kind = ElementKind::Image { url: "missing".to_string(), width: 20.0, height: 20.0, fit: Fit::Contain, border_radius: 0.0 };
        let scene = Scene { duration: 1.0, bg_color: Some(Rgba::BLACK), bg_gradient: None, transition: None, vignette: None, color_overlay: None, elements: vec![el] };
        let track = Track { kind: TrackType::Video, start: 0.0, z_index: 0, scenes: vec![scene] };
        let timeline = TimelineConfig::new(64, 64, vec![track]).unwrap();
        let mut compositor = build(timeline, 10.0).await;
        // the image is unresolvable (no fake asset seeded); the painter
        // should fail, log, and be skipped rather than panicking.
        let _ = compositor.render_frame(0).unwrap();
    }
}
