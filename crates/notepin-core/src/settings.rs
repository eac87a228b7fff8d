#![forbid(unsafe_code)]

//! Pass-through settings and window geometry.
//!
//! The core never interprets these beyond defaulting and clamping; they ride
//! along in every snapshot so undo restores them verbatim.

use serde::{Deserialize, Serialize};

/// Font sizes offered by the settings menu.
pub const FONT_SIZES: [u32; 4] = [11, 13, 15, 17];

/// Font size used when none is stored.
pub const DEFAULT_FONT_SIZE: u32 = 13;

/// Window stacking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Floats above other windows.
    #[default]
    Topmost,
    /// Pinned beneath other windows, on the desktop layer.
    Desktop,
}

impl Mode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Topmost => Self::Desktop,
            Self::Desktop => Self::Topmost,
        }
    }
}

/// Whether item text stays visible while the pointer is away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityMode {
    #[default]
    AlwaysVisible,
    AutoHide,
}

impl VisibilityMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::AlwaysVisible => Self::AutoHide,
            Self::AutoHide => Self::AlwaysVisible,
        }
    }
}

/// User settings stored alongside the items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    pub visibility_mode: VisibilityMode,
    pub font_size: u32,
    pub opacity_focused: f64,
    pub opacity_unfocused: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Topmost,
            visibility_mode: VisibilityMode::AlwaysVisible,
            font_size: DEFAULT_FONT_SIZE,
            opacity_focused: 1.0,
            opacity_unfocused: 0.7,
        }
    }
}

impl Settings {
    /// Force both opacities into `[0, 1]`. NaN falls back to the default.
    pub fn clamp_opacities(&mut self) {
        let defaults = Self::default();
        self.opacity_focused = clamp_unit(self.opacity_focused, defaults.opacity_focused);
        self.opacity_unfocused = clamp_unit(self.opacity_unfocused, defaults.opacity_unfocused);
    }
}

fn clamp_unit(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Host window placement, owned by window chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 320,
            height: 450,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stored_schema() {
        let settings = Settings::default();
        assert_eq!(settings.mode, Mode::Topmost);
        assert_eq!(settings.visibility_mode, VisibilityMode::AlwaysVisible);
        assert_eq!(settings.font_size, 13);
        assert_eq!(settings.opacity_focused, 1.0);
        assert_eq!(settings.opacity_unfocused, 0.7);

        let window = WindowGeometry::default();
        assert_eq!((window.x, window.y, window.width, window.height), (100, 100, 320, 450));
    }

    #[test]
    fn modes_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&Mode::Desktop).unwrap(), "\"desktop\"");
        assert_eq!(
            serde_json::to_string(&VisibilityMode::AutoHide).unwrap(),
            "\"auto_hide\""
        );
        let mode: Mode = serde_json::from_str("\"topmost\"").unwrap();
        assert_eq!(mode, Mode::Topmost);
    }

    #[test]
    fn toggles_round_trip() {
        assert_eq!(Mode::Topmost.toggled().toggled(), Mode::Topmost);
        assert_eq!(VisibilityMode::AutoHide.toggled(), VisibilityMode::AlwaysVisible);
    }

    #[test]
    fn partial_settings_backfill() {
        let settings: Settings = serde_json::from_str(r#"{"font_size": 17}"#).unwrap();
        assert_eq!(settings.font_size, 17);
        assert_eq!(settings.mode, Mode::Topmost);
        assert_eq!(settings.opacity_unfocused, 0.7);
    }

    #[test]
    fn clamp_opacities_bounds_values() {
        let mut settings = Settings {
            opacity_focused: 1.8,
            opacity_unfocused: -0.2,
            ..Settings::default()
        };
        settings.clamp_opacities();
        assert_eq!(settings.opacity_focused, 1.0);
        assert_eq!(settings.opacity_unfocused, 0.0);

        settings.opacity_focused = f64::NAN;
        settings.clamp_opacities();
        assert_eq!(settings.opacity_focused, 1.0);
    }
}
