use crate::error::ConfigError;

/// Non-premultiplied 8-bit RGBA, parsed once at construction time.
///
/// (De)serializes as a single string — `#rrggbb`, `#rrggbbaa`, or a CSS
/// color name — matching the timeline JSON schema (spec §6), not as a
/// structured `{r,g,b,a}` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl serde::Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a))
    }
}

impl<'de> serde::Deserialize<'de> for Rgba {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl Rgba {
    pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 255 };
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    pub fn to_tiny_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    /// Parses `#rrggbb`, `#rrggbbaa`, or one of a small CSS-named-color
    /// table. Fails fast with `ConfigError::InvalidColor` so bad timelines
    /// never reach render.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(|| ConfigError::InvalidColor(s.to_string()));
        }
        named_color(&s.to_ascii_lowercase())
            .ok_or_else(|| ConfigError::InvalidColor(s.to_string()))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let parse2 = |i: usize| -> Option<u8> { u8::from_str_radix(hex.get(i..i + 2)?, 16).ok() };
        match hex.len() {
            6 => Some(Rgba { r: parse2(0)?, g: parse2(2)?, b: parse2(4)?, a: 255 }),
            8 => Some(Rgba { r: parse2(0)?, g: parse2(2)?, b: parse2(4)?, a: parse2(6)? }),
            _ => None,
        }
    }
}

fn named_color(name: &str) -> Option<Rgba> {
    let (r, g, b) = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" => (0, 255, 255),
        "magenta" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "transparent" => return Some(Rgba::TRANSPARENT),
        _ => return None,
    };
    Some(Rgba { r, g, b, a: 255 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex6_and_hex8() {
        assert_eq!(Rgba::parse("#ff0000").unwrap(), Rgba { r: 255, g: 0, b: 0, a: 255 });
        assert_eq!(Rgba::parse("#00ff0080").unwrap(), Rgba { r: 0, g: 255, b: 0, a: 0x80 });
    }

    #[test]
    fn parses_named_colors_case_insensitively() {
        assert_eq!(Rgba::parse("White").unwrap(), Rgba { r: 255, g: 255, b: 255, a: 255 });
    }

    #[test]
    fn rejects_garbage() {
        assert!(Rgba::parse("#zzz").is_err());
        assert!(Rgba::parse("not-a-color").is_err());
    }
}
