//! Fixed catalog of named style presets.

use serde::Serialize;

use crate::widget::Theme;

/// A named bundle of theme colors and corner radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StylePreset {
    pub name: &'static str,
    pub primary_color: &'static str,
    pub accent_color: &'static str,
    pub background_color: &'static str,
    pub text_color: &'static str,
    pub border_color: &'static str,
    pub border_radius: i32,
}

pub const MODERN_BLUE: StylePreset = StylePreset {
    name: "Modern Blue",
    primary_color: "#243949",
    accent_color: "#0EA5E9",
    background_color: "#304352",
    text_color: "#ffffff",
    border_color: "#435363",
    border_radius: 10,
};

pub const TECH_PURPLE: StylePreset = StylePreset {
    name: "Tech Purple",
    primary_color: "#1A1F2C",
    accent_color: "#9b87f5",
    background_color: "#221F26",
    text_color: "#ffffff",
    border_color: "#3A3544",
    border_radius: 12,
};

pub const CORPORATE_GREEN: StylePreset = StylePreset {
    name: "Corporate Green",
    primary_color: "#054232",
    accent_color: "#8FE388",
    background_color: "#0B5D44",
    text_color: "#ffffff",
    border_color: "#1C7A60",
    border_radius: 6,
};

pub const VIBRANT_ORANGE: StylePreset = StylePreset {
    name: "Vibrant Orange",
    primary_color: "#5C2101",
    accent_color: "#F97316",
    background_color: "#7A3415",
    text_color: "#ffffff",
    border_color: "#944830",
    border_radius: 8,
};

/// Every preset, in catalog order.
pub const CATALOG: [StylePreset; 4] = [MODERN_BLUE, TECH_PURPLE, CORPORATE_GREEN, VIBRANT_ORANGE];

/// Look a preset up by name, ignoring case.
pub fn find(name: &str) -> Option<&'static StylePreset> {
    CATALOG.iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

impl StylePreset {
    /// Overlay this preset on `base`. Fields the preset does not carry
    /// (button style) are kept from `base`.
    pub fn overlay(&self, base: &Theme) -> Theme {
        Theme {
            primary_color: self.primary_color.to_string(),
            accent_color: self.accent_color.to_string(),
            background_color: self.background_color.to_string(),
            text_color: self.text_color.to_string(),
            border_color: self.border_color.to_string(),
            border_radius: self.border_radius,
            button_style: base.button_style,
        }
    }
}
