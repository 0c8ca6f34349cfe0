use thiserror::Error;

/// Fatal error taxonomy for the compositor job. Recoverable per-element
/// failures (`AssetDecodeError`, `PainterError`) never reach here; they are
/// logged and swallowed at paint time.
#[derive(Debug, Error)]
pub enum CompositorError {
    #[error("preload failed for {} url(s): {}", .0.len(), summarize(.0))]
    Preload(Vec<(String, String)>),

    #[error("frame extraction timed out after {0}s")]
    ExtractionTimeout(u64),

    #[error("frame extraction exited with code {0:?}")]
    ExtractionExit(Option<i32>),

    #[error("invalid timeline config: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn summarize(failed: &[(String, String)]) -> String {
    failed
        .iter()
        .map(|(url, cause)| format!("{url} ({cause})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Invalid-timeline errors, detected at construction rather than at render.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be > 0, got {value}")]
    NonPositive { field: &'static str, value: String },
    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: String },
    #[error("unknown {field} tag: {value}")]
    UnknownTag { field: &'static str, value: String },
    #[error("tracks list is empty")]
    EmptyTracks,
    #[error("a scene's elements list is empty where at least one element is required")]
    EmptyElements,
    #[error("invalid color string: {0}")]
    InvalidColor(String),
}

/// Recoverable, logged-and-swallowed error raised while decoding a single
/// asset (image bytes, SVG markup, video frame). Never fatal.
#[derive(Debug, Error)]
pub enum AssetDecodeError {
    #[error("failed to decode image: {0}")]
    Image(String),
    #[error("failed to parse svg: {0}")]
    Svg(String),
    #[error("asset not found in loader cache: {0}")]
    NotFound(String),
}

/// Recoverable, per-element paint failure. Caught inside `render_frame`'s
/// element loop; the element is skipped for that frame only.
#[derive(Debug, Error)]
pub enum PainterError {
    #[error(transparent)]
    Decode(#[from] AssetDecodeError),
    #[error("missing video frame for index {0}")]
    MissingFrame(u64),
    #[error("measurement context unavailable")]
    MeasurementUnavailable,
}
