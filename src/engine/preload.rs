//! Preload planner (spec §4.6): walks the timeline once, resolves assets
//! concurrently, extracts video frames sequentially, and precomputes the
//! indices `render_frame` relies on every frame.
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::assets::{AssetKind, AssetLoader};
use crate::engine::media_pipeline::VideoFrameExtractor;
use crate::error::CompositorError;
use crate::timeline::{ElementKind, TimelineConfig};

const SYSTEM_FONTS: &[&str] = &[
    "arial",
    "helvetica",
    "times new roman",
    "times",
    "courier",
    "courier new",
    "verdana",
    "georgia",
    "palatino",
    "garamond",
    "comic sans ms",
    "impact",
    "lucida console",
    "tahoma",
    "trebuchet ms",
    "sans-serif",
    "serif",
    "monospace",
    "cursive",
    "fantasy",
];

fn is_system_font(family: &str) -> bool {
    SYSTEM_FONTS.contains(&family.to_ascii_lowercase().as_str())
}

/// Everything the compositor needs resolved before the first `render_frame`
/// call: downloaded asset paths, per-video frame extractors, and
/// precomputed z-order/cumulative-start indices.
pub struct PreloadedIndex {
    pub asset_paths: HashMap<String, std::path::PathBuf>,
    pub extractors: HashMap<String, VideoFrameExtractor>,
    /// Track indices sorted by `zIndex` ascending.
    pub track_order: Vec<usize>,
    /// Per-track (by original index) cumulative scene start times.
    pub scene_starts: Vec<Vec<f64>>,
}

fn collect_urls(timeline: &TimelineConfig) -> (HashSet<String>, HashSet<String>, HashSet<String>, HashSet<String>, HashSet<String>) {
    let mut images = HashSet::new();
    let mut videos = HashSet::new();
    let mut svgs = HashSet::new();
    let mut waveforms = HashSet::new();
    let mut fonts = HashSet::new();

    for track in &timeline.tracks {
        for scene in &track.scenes {
            for el in &scene.elements {
                match &el.kind {
                    ElementKind::Image { url, .. } => {
                        images.insert(url.clone());
                    }
                    ElementKind::Video { url, .. } => {
                        videos.insert(url.clone());
                    }
                    ElementKind::Svg { url: Some(url), .. } => {
                        svgs.insert(url.clone());
                    }
                    ElementKind::Svg { .. } => {}
                    ElementKind::Waveform { audio_url, .. } => {
                        waveforms.insert(audio_url.clone());
                    }
                    ElementKind::Text(attrs) | ElementKind::Caption(attrs) => {
                        if !is_system_font(&attrs.font_family) {
                            fonts.insert(attrs.font_family.clone());
                        }
                    }
                    ElementKind::Shape { .. } => {}
                }
            }
        }
    }
    (images, videos, svgs, waveforms, fonts)
}

/// Runs the full preload pipeline. Failures across independent URLs are
/// aggregated (not short-circuited) into a single `PreloadError`.
#[instrument(name = "preload", skip(timeline, loader))]
pub async fn preload(timeline: &TimelineConfig, loader: Arc<dyn AssetLoader>, target_fps: f64) -> Result<PreloadedIndex, CompositorError> {
    let (images, videos, svgs, waveforms, fonts) = collect_urls(timeline);

    let mut failed = Vec::new();
    let mut asset_paths = HashMap::new();

    let non_video: Vec<(String, AssetKind)> = images
        .iter()
        .map(|u| (u.clone(), AssetKind::Image))
        .chain(svgs.iter().map(|u| (u.clone(), AssetKind::Svg)))
        .chain(waveforms.iter().map(|u| (u.clone(), AssetKind::Waveform)))
        .chain(fonts.iter().map(|u| (u.clone(), AssetKind::Font)))
        .collect();

    let fetches = non_video.iter().map(|(url, kind)| {
        let loader = loader.clone();
        let url = url.clone();
        let kind = *kind;
        async move { (url.clone(), kind, loader.fetch(&url, kind).await) }
    });
    for (url, _kind, result) in join_all(fetches).await {
        match result {
            Ok(path) => {
                asset_paths.insert(url, path);
            }
            Err(cause) => failed.push((url, cause)),
        }
    }

    // Video source files are also fetched in parallel with everything else,
    // but frame extraction (CPU-bound) happens sequentially per URL below.
    let video_fetches = videos.iter().map(|url| {
        let loader = loader.clone();
        let url = url.clone();
        async move { (url.clone(), loader.fetch(&url, AssetKind::Video).await) }
    });
    let mut video_paths = HashMap::new();
    for (url, result) in join_all(video_fetches).await {
        match result {
            Ok(path) => {
                video_paths.insert(url, path);
            }
            Err(cause) => failed.push((url, cause)),
        }
    }

    if !failed.is_empty() {
        warn!(count = failed.len(), "preload had failing assets");
        return Err(CompositorError::Preload(failed));
    }

    let mut extractors = HashMap::new();
    for (url, path) in &video_paths {
        let mut extractor = VideoFrameExtractor::new(path.clone(), target_fps);
        extractor.extract_frames().await?;
        extractors.insert(url.clone(), extractor);
        asset_paths.insert(url.clone(), path.clone());
    }

    let track_order = {
        let mut idx: Vec<usize> = (0..timeline.tracks.len()).collect();
        idx.sort_by_key(|&i| timeline.tracks[i].z_index);
        idx
    };
    let scene_starts = timeline.tracks.iter().map(|t| t.cumulative_scene_starts()).collect();

    info!(
        images = images.len(),
        videos = videos.len(),
        svgs = svgs.len(),
        waveforms = waveforms.len(),
        fonts = fonts.len(),
        "preload complete"
    );

    Ok(PreloadedIndex { asset_paths, extractors, track_order, scene_starts })
}
