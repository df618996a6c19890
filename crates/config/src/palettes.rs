//! Built-in palettes offered by the control panel.

use serde::{Deserialize, Serialize};

const WPLACE: &[&str] = &[
    "#000000", "#3c3c3c", "#787878", "#d2d2d2", "#ffffff", "#600018", "#ed1c24", "#ff7f27",
    "#f6aa09", "#f9dd3b", "#fffabc", "#0eb968", "#13e67b", "#87ff5e", "#0c816e", "#10aea6",
    "#13e1be", "#28509e", "#4093e4", "#60f7f2", "#6b50f6", "#99b1fb", "#780c99", "#aa38b9",
    "#e09ff9", "#cb007a", "#ec1f80", "#f38da9", "#684634", "#95682a", "#f8b277",
];

const RPLACE: &[&str] = &[
    "#000000", "#00756F", "#009EAA", "#00A368", "#00CC78", "#2450A4", "#3690EA", "#51E9F4",
    "#6A5CFF", "#7EED56", "#94B3FF", "#B44AC0", "#BE0039", "#D4E4BC", "#DE107F", "#FF3881",
    "#FF4500", "#FF99AA", "#FFA800", "#FFFF00", "#FFB470", "#CD6155", "#A0522D", "#898D90",
    "#9C9C9C", "#D4D7D9", "#FFFFFF", "#6D001A", "#BF4F36", "#FFC0CB", "#FF69B4", "#00CED1",
];

/// A predefined palette that can be loaded into the palette text field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PalettePreset {
    Wplace,
    Rplace,
}

impl PalettePreset {
    pub const ALL: [PalettePreset; 2] = [PalettePreset::Wplace, PalettePreset::Rplace];

    /// Hex colors of the preset, in palette order
    pub fn colors(self) -> &'static [&'static str] {
        match self {
            Self::Wplace => WPLACE,
            Self::Rplace => RPLACE,
        }
    }

    /// The preset as palette text (comma + space separated)
    pub fn text(self) -> String {
        self.colors().join(", ")
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Wplace => "wplace",
            Self::Rplace => "rplace",
        }
    }

    /// Look a preset up by its lowercase name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name.trim()))
    }
}
