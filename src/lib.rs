//! Timeline Compositor core
//!
//! Deterministic, offline `(frame_index, TimelineConfig) -> RGBA` mapping:
//! tracks carry scenes, scenes carry elements, elements carry animations,
//! keyframes, filters and blend modes. No realtime/streaming concerns —
//! every frame is produced on demand, byte-identical across repeat calls.
pub mod assets;
pub mod color;
pub mod engine;
pub mod error;
pub mod painters;
pub mod timeline;

pub use engine::compositor::Compositor;
pub use engine::preload::{preload, PreloadedIndex};
pub use error::{AssetDecodeError, CompositorError, ConfigError, PainterError};
pub use timeline::TimelineConfig;
