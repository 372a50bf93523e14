// ============================================================================
// Charts
// ============================================================================

pub mod bar;
pub mod pie;

pub use bar::{render_bar_chart, BarChartOptions, BarChartOutput, BarGeometry};
pub use pie::{render_pie_chart, LabelPlacer, LegendPosition, PieChartOptions, PieChartOutput, SliceGeometry};

use crate::geometry::{text, DrawOp, Rgb};
use crate::text::text_width;

/// Shown in place of a plot when there is nothing to draw
pub const NO_DATA_TEXT: &str = "No data available";

/// Height reserved above a plot when it has a title
const TITLE_BAND: f32 = 24.0;

/// One labelled value; values are expected to be non-negative
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataPoint {
    pub label: String,
    pub value: f64,
}

impl ChartDataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self { label: label.into(), value }
    }

    /// Value with NaN, infinities and negatives mapped to zero
    fn clean_value(&self) -> f64 {
        if self.value.is_finite() && self.value > 0.0 {
            self.value
        } else {
            0.0
        }
    }
}

/// Draw an optional bold title at the top of a chart box; returns the height used
fn draw_title(ops: &mut Vec<DrawOp>, title: Option<&str>, x: f32, y: f32, size: f32, color: Rgb) -> f32 {
    match title {
        Some(title) if !title.is_empty() => {
            ops.push(text(title, x, y + size + 4.0, size, true, color));
            TITLE_BAND
        }
        _ => 0.0,
    }
}

/// "No data available" centred in the given box
fn draw_placeholder(ops: &mut Vec<DrawOp>, x: f32, y: f32, width: f32, height: f32, size: f32, color: Rgb) {
    let text_x = x + (width - text_width(NO_DATA_TEXT, size, false)) / 2.0;
    let text_y = y + height / 2.0 + size * 0.35;
    ops.push(text(NO_DATA_TEXT, text_x, text_y, size, false, color));
}
