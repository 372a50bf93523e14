// ============================================================================
// Theme and Page Layout Configuration
// ============================================================================

use crate::error::{ReportError, Result};
use crate::geometry::Rgb;
use serde::Deserialize;
use std::path::Path;

/// A4 dimensions in points
const A4_WIDTH_PT: f32 = 595.28;
const A4_HEIGHT_PT: f32 = 841.89;

/// Colours and font sizes shared by every renderer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub primary: Rgb,
    pub header_text: Rgb,
    pub body_text: Rgb,
    pub muted_text: Rgb,
    pub zebra: Rgb,
    pub border: Rgb,
    pub card_background: Rgb,
    pub background: Rgb,
    pub bar_color: Rgb,
    /// Pie slice colours, cycled by slice index
    pub palette: Vec<Rgb>,

    pub title_font_size: f32,
    pub heading_font_size: f32,
    pub header_font_size: f32,
    pub body_font_size: f32,
    pub small_font_size: f32,
    pub cell_padding: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Rgb::from_u8(0x2c, 0x3e, 0x50),
            header_text: Rgb::WHITE,
            body_text: Rgb::from_u8(0x33, 0x33, 0x33),
            muted_text: Rgb::from_u8(0x7f, 0x8c, 0x8d),
            zebra: Rgb::from_u8(0xf4, 0xf6, 0xf7),
            border: Rgb::from_u8(0xd5, 0xd8, 0xdc),
            card_background: Rgb::from_u8(0xec, 0xf0, 0xf1),
            background: Rgb::WHITE,
            bar_color: Rgb::from_u8(0x34, 0x98, 0xdb),
            palette: vec![
                Rgb::from_u8(0x34, 0x98, 0xdb),
                Rgb::from_u8(0xe7, 0x4c, 0x3c),
                Rgb::from_u8(0x2e, 0xcc, 0x71),
                Rgb::from_u8(0xf3, 0x9c, 0x12),
                Rgb::from_u8(0x9b, 0x59, 0xb6),
                Rgb::from_u8(0x1a, 0xbc, 0x9c),
                Rgb::from_u8(0x34, 0x49, 0x5e),
                Rgb::from_u8(0xe6, 0x7e, 0x22),
            ],
            title_font_size: 20.0,
            heading_font_size: 13.0,
            header_font_size: 10.0,
            body_font_size: 9.0,
            small_font_size: 8.0,
            cell_padding: 5.0,
        }
    }
}

/// Page size and the thresholds that drive pagination
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Unsplittable sections start a new page when less than this remains
    pub min_section_height: f32,
    /// Gap left between consecutive sections
    pub section_gap: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: A4_WIDTH_PT,
            height: A4_HEIGHT_PT,
            margin_top: 40.0,
            margin_bottom: 40.0,
            margin_left: 40.0,
            margin_right: 40.0,
            min_section_height: 200.0,
            section_gap: 18.0,
        }
    }
}

impl PageLayout {
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Vertical space left between `y` and the bottom margin
    pub fn remaining(&self, y: f32) -> f32 {
        self.height - y - self.margin_bottom
    }

    /// Lowest y content may reach on a page
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin_bottom
    }
}

/// Theme plus layout, as read from a JSON configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub theme: Theme,
    pub layout: PageLayout,
}

impl RenderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReportError::Input {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ReportError::Input {
            path: path.display().to_string(),
            reason: format!("Invalid JSON: {}", e),
        })
    }
}
