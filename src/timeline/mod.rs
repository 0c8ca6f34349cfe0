//! Declarative timeline data model (spec §3). Entities are immutable once
//! `TimelineConfig::new` has validated them; no mutation happens past
//! construction.
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub width: u32,
    pub height: u32,
    pub tracks: Vec<Track>,
}

impl TimelineConfig {
    pub fn new(width: u32, height: u32, tracks: Vec<Track>) -> Result<Self, ConfigError> {
        let config = Self { width, height, tracks };
        config.validate()?;
        Ok(config)
    }

    /// Re-runs the same checks `new` applies at construction. Needed
    /// because the public fields make this struct directly
    /// `Deserialize`-able, which bypasses `new` entirely — callers that
    /// deserialize a timeline from JSON must call this before building a
    /// compositor (spec §7: "detected at the earliest possible point").
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::NonPositive { field: "width", value: self.width.to_string() });
        }
        if self.height == 0 {
            return Err(ConfigError::NonPositive { field: "height", value: self.height.to_string() });
        }
        if self.tracks.is_empty() {
            return Err(ConfigError::EmptyTracks);
        }
        for track in &self.tracks {
            track.validate()?;
        }
        Ok(())
    }

    /// `N = ceil(max over tracks of (track.start + sum(scene.duration)) * fps)`
    pub fn frame_count(&self, fps: f64) -> u64 {
        let end = self
            .tracks
            .iter()
            .map(|t| t.start + t.scenes.iter().map(|s| s.duration).sum::<f64>())
            .fold(0.0_f64, f64::max);
        (end * fps).ceil() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Video,
    Audio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "type")]
    pub kind: TrackType,
    #[serde(default)]
    pub start: f64,
    #[serde(rename = "zIndex", default)]
    pub z_index: i32,
    pub scenes: Vec<Scene>,
}

impl Track {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.start < 0.0 {
            return Err(ConfigError::Negative { field: "track.start", value: self.start.to_string() });
        }
        for scene in &self.scenes {
            scene.validate()?;
        }
        Ok(())
    }

    /// Cumulative scene start times within this track's own clock, one entry
    /// per scene, precomputed by the preload planner (spec §4.6).
    pub fn cumulative_scene_starts(&self) -> Vec<f64> {
        let mut acc = 0.0;
        let mut out = Vec::with_capacity(self.scenes.len());
        for scene in &self.scenes {
            out.push(acc);
            acc += scene.duration;
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    Vertical,
    Horizontal,
    Diagonal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gradient {
    pub colors: Vec<Rgba>,
    #[serde(default = "default_gradient_direction")]
    pub direction: GradientDirection,
}

fn default_gradient_direction() -> GradientDirection {
    GradientDirection::Vertical
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    Fade,
    SlideL,
    SlideR,
    SlideU,
    SlideD,
    WipeL,
    WipeR,
    WipeU,
    WipeD,
    ZoomIn,
    ZoomOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "type")]
    pub kind: TransitionType,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vignette {
    #[serde(default = "default_vignette_size")]
    pub size: f64,
    #[serde(default = "default_vignette_intensity")]
    pub intensity: f64,
    #[serde(default = "default_vignette_color")]
    pub color: Rgba,
}

fn default_vignette_size() -> f64 {
    0.75
}
fn default_vignette_intensity() -> f64 {
    0.5
}
fn default_vignette_color() -> Rgba {
    Rgba::BLACK
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorOverlay {
    pub color: Rgba,
    #[serde(default = "default_blend_mode")]
    pub blend_mode: BlendMode,
}

fn default_blend_mode() -> BlendMode {
    BlendMode::Normal
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub duration: f64,
    #[serde(rename = "bgColor")]
    pub bg_color: Option<Rgba>,
    #[serde(rename = "bgGradient")]
    pub bg_gradient: Option<Gradient>,
    pub transition: Option<Transition>,
    pub vignette: Option<Vignette>,
    #[serde(rename = "colorOverlay")]
    pub color_overlay: Option<ColorOverlay>,
    pub elements: Vec<Element>,
}

impl Scene {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.duration <= 0.0 {
            return Err(ConfigError::NonPositive { field: "scene.duration", value: self.duration.to_string() });
        }
        Ok(())
    }

    /// Stable sort of this scene's elements by `zIndex` ascending, precomputed
    /// once by the preload planner and reused across every frame.
    pub fn z_ordered_element_indices(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.elements.len()).collect();
        idx.sort_by_key(|&i| self.elements[i].z_index);
        idx
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionType {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Left,
    Right,
}

impl Default for PositionType {
    fn default() -> Self {
        PositionType::Center
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Rgba,
    pub blur: f64,
    #[serde(rename = "offsetX", default)]
    pub offset_x: f64,
    #[serde(rename = "offsetY", default)]
    pub offset_y: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub blur: f64,
    #[serde(default)]
    pub brightness: Option<f64>,
    #[serde(default)]
    pub contrast: Option<f64>,
    #[serde(default)]
    pub grayscale: Option<f64>,
    #[serde(rename = "hueRotate", default)]
    pub hue_rotate: Option<f64>,
    #[serde(default)]
    pub invert: Option<f64>,
    #[serde(default)]
    pub saturate: Option<f64>,
    #[serde(default)]
    pub sepia: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f64,
    pub easing: Option<crate::engine::easing::Easing>,
    pub opacity: Option<f64>,
    pub scale: Option<f64>,
    #[serde(rename = "offsetX")]
    pub offset_x: Option<f64>,
    #[serde(rename = "offsetY")]
    pub offset_y: Option<f64>,
    pub rotation: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationPreset {
    FadeIn,
    FadeOut,
    FadeInOut,
    SlideInL,
    SlideInR,
    SlideInT,
    SlideInB,
    SlideOutL,
    SlideOutR,
    SlideOutT,
    SlideOutB,
    ZoomIn,
    ZoomOut,
    Bounce,
    Pop,
    Shake,
    Typewriter,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Animation {
    pub preset: AnimationPreset,
    #[serde(rename = "fadeInDuration")]
    pub fade_in_duration: Option<f64>,
    #[serde(rename = "fadeOutDuration")]
    pub fade_out_duration: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    Cover,
    Contain,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    RoundedRect,
    Circle,
    Line,
    Polygon,
    Star,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextAttrs),
    Caption(TextAttrs),
    Image {
        url: String,
        width: f64,
        height: f64,
        fit: Fit,
        #[serde(rename = "borderRadius", default)]
        border_radius: f64,
    },
    Video {
        url: String,
        width: f64,
        height: f64,
        fit: Fit,
        #[serde(rename = "borderRadius", default)]
        border_radius: f64,
        #[serde(default)]
        r#loop: bool,
        #[serde(rename = "trimStart", default)]
        trim_start: f64,
        #[serde(default = "default_speed")]
        speed: f64,
    },
    Shape {
        shape: ShapeKind,
        width: f64,
        height: f64,
        fill: Option<Rgba>,
        stroke: Option<Rgba>,
        #[serde(rename = "strokeWidth", default = "default_stroke_width")]
        stroke_width: f64,
    },
    Svg {
        url: Option<String>,
        markup: Option<String>,
        width: f64,
        height: f64,
    },
    Waveform {
        #[serde(rename = "audioUrl")]
        audio_url: String,
        width: f64,
        height: f64,
        style: WaveformStyle,
    },
}

fn default_speed() -> f64 {
    1.0
}
fn default_stroke_width() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformStyle {
    Bars,
    Line,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextAttrs {
    pub text: String,
    #[serde(rename = "fontFamily", default = "default_font_family")]
    pub font_family: String,
    #[serde(rename = "fontSize", default = "default_font_size")]
    pub font_size: f64,
    #[serde(rename = "fontWeight", default = "default_font_weight")]
    pub font_weight: u16,
    #[serde(rename = "lineHeight", default = "default_line_height")]
    pub line_height: f64,
    pub color: Rgba,
    pub width: f64,
    #[serde(rename = "textAlign", default)]
    pub text_align: TextAlign,
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}
fn default_font_size() -> f64 {
    32.0
}
fn default_font_weight() -> u16 {
    400
}
fn default_line_height() -> f64 {
    1.2
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default)]
    pub start: f64,
    pub duration: Option<f64>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(rename = "zIndex", default)]
    pub z_index: i32,
    #[serde(default)]
    pub position: PositionType,
    #[serde(rename = "offsetX", default)]
    pub offset_x: f64,
    #[serde(rename = "offsetY", default)]
    pub offset_y: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub rotation: f64,
    pub animation: Option<Animation>,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    pub shadow: Option<Shadow>,
    pub filters: Option<Filters>,
    #[serde(rename = "blendMode")]
    pub blend_mode: Option<BlendMode>,
}

fn default_opacity() -> f64 {
    1.0
}
fn default_scale() -> f64 {
    1.0
}

impl Element {
    /// Visibility per spec §3: `s >= start && s <= start + (duration ??
    /// scene.duration - start)`, inclusive at both ends.
    pub fn visible_at(&self, s_scene: f64, scene_duration: f64) -> bool {
        let dur = self.duration.unwrap_or(scene_duration - self.start);
        s_scene >= self.start && s_scene <= self.start + dur
    }
}
