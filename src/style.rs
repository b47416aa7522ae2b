//! Overlay appearance and effect thresholds.
//!
//! Defaults reproduce the stock selfie guide. A JSON file may override any
//! subset of fields; anything missing falls back to the default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canvas::DashPattern;
use crate::color::Color;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Scrim colour before `scrim_alpha` is applied.
    pub scrim_color: Color,
    /// Scrim opacity, 0.0 to 1.0.
    pub scrim_alpha: f32,
    /// Left/right guide margin as a fraction of surface width.
    pub horizontal_margin: f32,
    /// Top/bottom guide margin as a fraction of surface height.
    pub vertical_margin: f32,
    pub corner_radius: f32,
    pub guide_color: Color,
    pub guide_stroke_width: f32,
    /// Dash used for the guide border while the face is outside it.
    pub guide_dash: DashPattern,
    pub contour_stroke_width: f32,
    /// Lip contours are highlighted above this smiling probability.
    pub smile_threshold: f32,
    /// Eye contours are highlighted below this eye-open probability.
    pub blink_threshold: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            scrim_color: Color::rgb(0x00, 0x00, 0x00),
            scrim_alpha: 0.8,
            horizontal_margin: 0.1,
            vertical_margin: 0.2,
            corner_radius: 500.0,
            guide_color: Color::rgb(0xFE, 0x33, 0x86),
            guide_stroke_width: 10.0,
            guide_dash: DashPattern::new(45.0, 45.0),
            contour_stroke_width: 5.0,
            smile_threshold: 0.9,
            blink_threshold: 0.1,
        }
    }
}

impl OverlayStyle {
    /// Scrim colour with its opacity applied.
    pub fn scrim(&self) -> Color {
        self.scrim_color.with_alpha_fraction(self.scrim_alpha)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let style = Self::from_json(&content)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded overlay style");
        Ok(style)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scrim_alpha_is_204() {
        assert_eq!(OverlayStyle::default().scrim().a, 204);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let style = OverlayStyle::from_json(r##"{ "guide_color": "#00FF00", "smile_threshold": 0.75 }"##)
            .unwrap();
        assert_eq!(style.guide_color, Color::GREEN);
        assert!((style.smile_threshold - 0.75).abs() < 1e-6);
        assert!((style.blink_threshold - 0.1).abs() < 1e-6);
        assert_eq!(style.guide_dash, DashPattern::new(45.0, 45.0));
    }

    #[test]
    fn invalid_colour_is_rejected() {
        assert!(OverlayStyle::from_json(r#"{ "guide_color": "pink" }"#).is_err());
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("selfie-guide-style-{}.json", std::process::id()));
        let mut style = OverlayStyle::default();
        style.corner_radius = 42.0;
        style.save(&path).unwrap();
        let loaded = OverlayStyle::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, style);
    }
}
