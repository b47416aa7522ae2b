use serde::{Deserialize, Serialize};

/// An 8-bit RGBA colour, written as `#RRGGBB` or `#AARRGGBB` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const YELLOW: Color = Color::rgb(0xFF, 0xFF, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0xFF, 0x00);
    pub const CYAN: Color = Color::rgb(0x00, 0xFF, 0xFF);
    pub const GRAY: Color = Color::rgb(0x88, 0x88, 0x88);
    pub const DARK_GRAY: Color = Color::rgb(0x44, 0x44, 0x44);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with its alpha replaced by `fraction` of full opacity.
    pub fn with_alpha_fraction(self, fraction: f32) -> Self {
        let a = (255.0 * fraction.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Parse `#RRGGBB` or `#AARRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid colour '{}'", value))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(c: Color) -> Self {
        image::Rgba([c.r, c.g, c.b, c.a])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex() {
        assert_eq!(Color::from_hex("#FE3386"), Some(Color::rgb(0xFE, 0x33, 0x86)));
        assert_eq!(Color::from_hex("#80000000"), Some(Color::rgba(0, 0, 0, 0x80)));
        assert_eq!(Color::from_hex("FE3386"), None);
        assert_eq!(Color::from_hex("#FE33"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
    }

    #[test]
    fn hex_formatting_matches_parsing() {
        assert_eq!(Color::rgb(0xFE, 0x33, 0x86).to_hex(), "#FE3386");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_hex(), "#04010203");
    }

    #[test]
    fn alpha_fraction() {
        assert_eq!(Color::rgb(10, 20, 30).with_alpha_fraction(0.8).a, 204);
        assert_eq!(Color::rgb(10, 20, 30).with_alpha_fraction(2.0).a, 255);
    }
}
