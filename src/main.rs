use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use timeline_compositor_core::{preload, Compositor, TimelineConfig};
use timeline_compositor_core::assets::{AssetLoader, FakeAssetLoader};

/// Reads a timeline JSON file, renders every frame at the requested fps,
/// and writes each frame as `out_dir/frame_000001.rgba` (raw, non-
/// premultiplied RGBA8, row-major top-to-bottom).
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("COMPOSITOR_LOG")
                .ok()
                .or_else(|| std::env::var("RUST_LOG").ok())
                .unwrap_or_else(|| "info".to_string()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(timeline_path) = args.next() else {
        bail!("usage: timeline_compositor <timeline.json> <out_dir> [fps]");
    };
    let Some(out_dir) = args.next() else {
        bail!("usage: timeline_compositor <timeline.json> <out_dir> [fps]");
    };
    let fps: f64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(30.0);

    let raw = std::fs::read_to_string(&timeline_path).with_context(|| format!("reading {timeline_path}"))?;
    let timeline: TimelineConfig = serde_json::from_str(&raw).with_context(|| format!("parsing {timeline_path}"))?;
    timeline.validate().with_context(|| format!("validating {timeline_path}"))?;

    let loader: Arc<dyn AssetLoader> = build_loader();
    let index = preload(&timeline, loader, fps).await?;

    let mut compositor = Compositor::new(timeline, fps, index);
    let out_dir = PathBuf::from(out_dir);
    std::fs::create_dir_all(&out_dir)?;

    let frame_count = compositor.frame_count();
    tracing::info!(frame_count, fps, "rendering");
    for i in 0..frame_count {
        let bytes = compositor.render_frame(i)?;
        let path = out_dir.join(format!("frame_{:06}.rgba", i + 1));
        std::fs::write(&path, &bytes)?;
    }
    tracing::info!("done");
    Ok(())
}

#[cfg(feature = "http")]
fn build_loader() -> Arc<dyn AssetLoader> {
    Arc::new(timeline_compositor_core::assets::ReqwestAssetLoader::new(std::env::temp_dir().join("timeline_compositor_assets")))
}

#[cfg(not(feature = "http"))]
fn build_loader() -> Arc<dyn AssetLoader> {
    Arc::new(FakeAssetLoader::default())
}
