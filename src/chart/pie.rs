// ============================================================================
// Pie Chart Renderer
// ============================================================================

use super::{draw_placeholder, draw_title, ChartDataPoint};
use crate::geometry::{fill_rect, point_on_circle, text, wedge, DrawCursor, DrawOp, Rgb};
use crate::text::{format_currency, format_percent, text_width};
use crate::theme::Theme;
use std::collections::HashSet;
use std::f32::consts::TAU;

/// Gap between the pie and the edge of its region
const PIE_MARGIN: f32 = 14.0;

/// Legend rows per column in `Below` mode
const LEGEND_ROWS_PER_COLUMN: usize = 5;
const LEGEND_ROW_HEIGHT: f32 = 11.0;
const SWATCH_SIZE: f32 = 8.0;

/// Percentage labels sit this far outside the rim
const LABEL_OFFSET: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    Right,
    Below,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChartOptions {
    pub title: Option<String>,
    pub palette: Vec<Rgb>,
    pub legend_position: LegendPosition,
    pub show_percentages: bool,
    /// Inner radius as a fraction of the outer radius; `None` draws a full pie
    pub donut_ratio: Option<f32>,
    pub text_color: Rgb,
    pub background: Rgb,
    pub font_size: f32,
    pub title_font_size: f32,
}

impl PieChartOptions {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            title: None,
            palette: theme.palette.clone(),
            legend_position: LegendPosition::Right,
            show_percentages: true,
            donut_ratio: None,
            text_color: theme.body_text,
            background: theme.background,
            font_size: theme.small_font_size,
            title_font_size: theme.heading_font_size,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn color(&self, index: usize) -> Rgb {
        if self.palette.is_empty() {
            Rgb::BLACK
        } else {
            self.palette[index % self.palette.len()]
        }
    }
}

/// Angular extent of one drawn slice
#[derive(Debug, Clone, PartialEq)]
pub struct SliceGeometry {
    pub label: String,
    pub value: f64,
    pub percent: f64,
    pub start_angle: f32,
    pub sweep_angle: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChartOutput {
    pub ops: Vec<DrawOp>,
    pub slices: Vec<SliceGeometry>,
    pub legend: Vec<String>,
    pub end_y: f32,
}

/// Best-effort vertical de-overlapping for slice labels.
///
/// Each requested y is snapped to a grid, then nudged downward in fixed steps
/// while it collides with a previously placed label, giving up after a bounded
/// number of attempts. Dense charts can still overlap.
#[derive(Debug, Clone)]
pub struct LabelPlacer {
    used: HashSet<i32>,
    snap: f32,
    step: f32,
    max_attempts: usize,
}

impl Default for LabelPlacer {
    fn default() -> Self {
        Self::new(4.0, 10.0, 8)
    }
}

impl LabelPlacer {
    pub fn new(snap: f32, step: f32, max_attempts: usize) -> Self {
        Self { used: HashSet::new(), snap, step, max_attempts }
    }

    fn key(&self, y: f32) -> i32 {
        (y / self.snap).round() as i32
    }

    pub fn place(&mut self, y: f32) -> f32 {
        let mut y = y;
        let mut key = self.key(y);
        let mut attempts = 0;
        while self.used.contains(&key) && attempts < self.max_attempts {
            y += self.step;
            key = self.key(y);
            attempts += 1;
        }
        self.used.insert(key);
        key as f32 * self.snap
    }
}

/// Draw a pie (or donut) of the positive points plus a legend into the given box
pub fn render_pie_chart(
    points: &[ChartDataPoint],
    origin: DrawCursor,
    width: f32,
    height: f32,
    options: &PieChartOptions,
) -> PieChartOutput {
    let mut ops = Vec::new();
    let end_y = origin.y + height;
    let title_height = draw_title(
        &mut ops,
        options.title.as_deref(),
        origin.x,
        origin.y,
        options.title_font_size,
        options.text_color,
    );

    let kept: Vec<(&str, f64)> = points
        .iter()
        .map(|p| (p.label.as_str(), p.clean_value()))
        .filter(|(_, v)| *v > 0.0)
        .collect();
    let total: f64 = kept.iter().map(|(_, v)| v).sum();

    let area_y = origin.y + title_height;
    let area_height = (height - title_height).max(0.0);

    if kept.is_empty() || total <= 0.0 {
        draw_placeholder(&mut ops, origin.x, area_y, width, area_height, options.font_size + 2.0, options.text_color);
        return PieChartOutput { ops, slices: Vec::new(), legend: Vec::new(), end_y };
    }

    let (pie_width, pie_height, legend_x, legend_y, legend_width) = match options.legend_position {
        LegendPosition::Right => {
            let pie_width = width * 0.6;
            (pie_width, area_height, origin.x + pie_width, area_y, width - pie_width)
        }
        LegendPosition::Below => {
            let pie_height = area_height * 0.7;
            (width, pie_height, origin.x, area_y + pie_height, width)
        }
    };

    let radius = (pie_width.min(pie_height) / 2.0 - PIE_MARGIN).max(0.0);
    let cx = origin.x + pie_width / 2.0;
    let cy = area_y + pie_height / 2.0;

    let mut slices = Vec::with_capacity(kept.len());
    let mut current_angle = 0.0f32;
    for (index, (label, value)) in kept.iter().enumerate() {
        let sweep_angle = (value / total) as f32 * TAU;
        let color = options.color(index);
        ops.push(wedge(cx, cy, radius, current_angle, sweep_angle, color));
        slices.push(SliceGeometry {
            label: label.to_string(),
            value: *value,
            percent: value / total * 100.0,
            start_angle: current_angle,
            sweep_angle,
            color,
        });
        current_angle += sweep_angle;
    }

    if let Some(ratio) = options.donut_ratio {
        let inner = radius * ratio.clamp(0.0, 1.0);
        if inner > 0.0 {
            ops.push(wedge(cx, cy, inner, 0.0, TAU, options.background));
        }
    }

    if options.show_percentages {
        let area_bottom = area_y + area_height;
        let mut placer = LabelPlacer::default();
        for slice in &slices {
            let mid = slice.start_angle + slice.sweep_angle / 2.0;
            let (px, py) = point_on_circle(cx, cy, radius + LABEL_OFFSET, mid);
            let label = format!("{}%", format_percent(slice.percent));
            let label_width = text_width(&label, options.font_size, false);
            let x = if mid.sin() >= 0.0 { px + 2.0 } else { px - label_width - 2.0 };
            let y = placer.place(py + options.font_size * 0.35).min(area_bottom);
            ops.push(text(label, x, y, options.font_size, false, options.text_color));
        }
    }

    let legend: Vec<String> = slices
        .iter()
        .map(|slice| {
            let value = format_currency(slice.value, 2);
            if options.show_percentages {
                format!("{} ({}%, {})", slice.label, format_percent(slice.percent), value)
            } else {
                format!("{} ({})", slice.label, value)
            }
        })
        .collect();

    let (rows_per_column, columns) = match options.legend_position {
        LegendPosition::Right => (legend.len(), 1),
        LegendPosition::Below if legend.len() > LEGEND_ROWS_PER_COLUMN => {
            (LEGEND_ROWS_PER_COLUMN, legend.len().div_ceil(LEGEND_ROWS_PER_COLUMN))
        }
        LegendPosition::Below => (legend.len(), 1),
    };
    let column_width = legend_width / columns as f32;
    let legend_top = match options.legend_position {
        LegendPosition::Right => cy - rows_per_column as f32 * LEGEND_ROW_HEIGHT / 2.0,
        LegendPosition::Below => legend_y + 2.0,
    };

    for (index, (entry, slice)) in legend.iter().zip(&slices).enumerate() {
        let column = index / rows_per_column;
        let row = index % rows_per_column;
        let x = legend_x + 10.0 + column as f32 * column_width;
        let y = legend_top + row as f32 * LEGEND_ROW_HEIGHT;
        ops.push(fill_rect(x, y, SWATCH_SIZE, SWATCH_SIZE, slice.color));
        ops.push(text(
            entry.clone(),
            x + SWATCH_SIZE + 4.0,
            y + SWATCH_SIZE - 0.5,
            options.font_size,
            false,
            options.text_color,
        ));
    }

    PieChartOutput { ops, slices, legend, end_y }
}
