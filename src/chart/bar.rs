// ============================================================================
// Bar Chart Renderer
// ============================================================================

use super::{draw_placeholder, draw_title, ChartDataPoint};
use crate::geometry::{fill_rect, line, text, DrawCursor, DrawOp, Rgb};
use crate::text::{format_currency, text_width, truncate_label};
use crate::theme::Theme;

/// Space kept around the plot area for axis labels
const MARGIN_LEFT: f32 = 55.0;
const MARGIN_RIGHT: f32 = 10.0;
const MARGIN_TOP: f32 = 14.0;
const MARGIN_BOTTOM: f32 = 28.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartOptions {
    pub title: Option<String>,
    pub bar_color: Rgb,
    pub bar_width: f32,
    pub max_bars: usize,
    pub grid_lines: usize,
    pub show_values: bool,
    pub show_grid: bool,
    pub text_color: Rgb,
    pub grid_color: Rgb,
    pub axis_color: Rgb,
    pub font_size: f32,
    pub title_font_size: f32,
}

impl BarChartOptions {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            title: None,
            bar_color: theme.bar_color,
            bar_width: 30.0,
            max_bars: 7,
            grid_lines: 5,
            show_values: true,
            show_grid: true,
            text_color: theme.body_text,
            grid_color: theme.border,
            axis_color: theme.body_text,
            font_size: theme.small_font_size,
            title_font_size: theme.heading_font_size,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Where one bar ended up
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub label: String,
    pub value: f64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartOutput {
    pub ops: Vec<DrawOp>,
    pub bars: Vec<BarGeometry>,
    pub end_y: f32,
}

/// Draw a vertical bar chart of the largest `max_bars` points into the given box
pub fn render_bar_chart(
    points: &[ChartDataPoint],
    origin: DrawCursor,
    width: f32,
    height: f32,
    options: &BarChartOptions,
) -> BarChartOutput {
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

    if points.is_empty() || options.max_bars == 0 {
        draw_placeholder(
            &mut ops,
            origin.x,
            origin.y + title_height,
            width,
            height - title_height,
            options.font_size + 2.0,
            options.text_color,
        );
        return BarChartOutput { ops, bars: Vec::new(), end_y };
    }

    let mut kept: Vec<(&str, f64)> = points.iter().map(|p| (p.label.as_str(), p.clean_value())).collect();
    kept.sort_by(|a, b| b.1.total_cmp(&a.1));
    kept.truncate(options.max_bars);

    let max_value = kept.iter().map(|(_, v)| *v).fold(0.0, f64::max);

    let plot_x = origin.x + MARGIN_LEFT;
    let plot_y = origin.y + title_height + MARGIN_TOP;
    let plot_width = (width - MARGIN_LEFT - MARGIN_RIGHT).max(0.0);
    let plot_height = (height - title_height - MARGIN_TOP - MARGIN_BOTTOM).max(0.0);
    let plot_bottom = plot_y + plot_height;

    if options.show_grid {
        let steps = if max_value > 0.0 { options.grid_lines.max(2) - 1 } else { 0 };
        for i in 0..=steps {
            let (value, y) = if steps == 0 {
                (0.0, plot_bottom)
            } else {
                let fraction = i as f32 / steps as f32;
                (max_value * fraction as f64, plot_bottom - plot_height * fraction)
            };
            ops.push(line(plot_x, y, plot_x + plot_width, y, options.grid_color, 0.3));
            let label = format_currency(value, 0);
            let label_x = plot_x - 4.0 - text_width(&label, options.font_size, false);
            ops.push(text(label, label_x, y + options.font_size * 0.35, options.font_size, false, options.text_color));
        }
    }

    // Axes
    ops.push(line(plot_x, plot_y, plot_x, plot_bottom, options.axis_color, 0.8));
    ops.push(line(plot_x, plot_bottom, plot_x + plot_width, plot_bottom, options.axis_color, 0.8));

    let count = kept.len();
    let bar_spacing = (plot_width / count as f32).min(2.0 * options.bar_width);
    let bar_width = options.bar_width.min(bar_spacing);
    let mut bars = Vec::with_capacity(count);

    for (index, (label, value)) in kept.into_iter().enumerate() {
        let bar_height = if max_value > 0.0 {
            (value / max_value) as f32 * plot_height
        } else {
            0.0
        };
        let slot_x = plot_x + index as f32 * bar_spacing;
        let bar_x = slot_x + (bar_spacing - bar_width) / 2.0;
        let bar_y = plot_bottom - bar_height;
        let center = bar_x + bar_width / 2.0;

        ops.push(fill_rect(bar_x, bar_y, bar_width, bar_height, options.bar_color));

        if options.show_values {
            let value_label = format_currency(value, 0);
            let value_x = center - text_width(&value_label, options.font_size, false) / 2.0;
            ops.push(text(value_label, value_x, bar_y - 3.0, options.font_size, false, options.text_color));
        }

        let category = truncate_label(label);
        let category_x = center - text_width(&category, options.font_size, false) / 2.0;
        ops.push(text(
            category,
            category_x,
            plot_bottom + options.font_size + 4.0,
            options.font_size,
            false,
            options.text_color,
        ));

        bars.push(BarGeometry {
            label: label.to_string(),
            value,
            x: bar_x,
            y: bar_y,
            width: bar_width,
            height: bar_height,
        });
    }

    BarChartOutput { ops, bars, end_y }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::NO_DATA_TEXT;

    fn options() -> BarChartOptions {
        BarChartOptions::from_theme(&Theme::default()).with_title("Cost by Property")
    }

    fn texts(ops: &[DrawOp]) -> Vec<&str> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_ten_points_keep_top_seven() {
        let points: Vec<_> = (1..=10).map(|i| ChartDataPoint::new(format!("P{}", i), i as f64 * 10.0)).collect();
        let output = render_bar_chart(&points, DrawCursor::new(40.0, 100.0, 0), 500.0, 220.0, &options());

        assert_eq!(output.bars.len(), 7);
        let values: Vec<f64> = output.bars.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0]);
        for missing in ["P1", "P2", "P3"] {
            assert!(output.bars.iter().all(|b| b.label != missing));
        }
    }

    #[test]
    fn test_bars_non_increasing_and_scaled() {
        let points = vec![
            ChartDataPoint::new("Small", 5.0),
            ChartDataPoint::new("Large", 20.0),
            ChartDataPoint::new("Mid", 10.0),
        ];
        let output = render_bar_chart(&points, DrawCursor::new(0.0, 0.0, 0), 400.0, 200.0, &options());
        let heights: Vec<f32> = output.bars.iter().map(|b| b.height).collect();
        assert!(heights.windows(2).all(|w| w[0] >= w[1]));
        assert!((heights[0] / heights[1] - 2.0).abs() < 1e-3);
        assert!((heights[0] / heights[2] - 4.0).abs() < 1e-3);
        assert!(output.bars.iter().all(|b| b.height.is_finite()));
    }

    #[test]
    fn test_bars_centred_in_slots() {
        let points = vec![ChartDataPoint::new("A", 1.0), ChartDataPoint::new("B", 1.0)];
        let opts = options();
        let output = render_bar_chart(&points, DrawCursor::new(0.0, 0.0, 0), 400.0, 200.0, &opts);
        let spacing = output.bars[1].x - output.bars[0].x;
        assert!((spacing - 2.0 * opts.bar_width).abs() < 1e-3);
        assert_eq!(output.bars[0].width, opts.bar_width);
        assert!((output.bars[0].x - (MARGIN_LEFT + opts.bar_width / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_all_zero_values_render_flat_bars() {
        let points = vec![ChartDataPoint::new("A", 0.0), ChartDataPoint::new("B", 0.0)];
        let output = render_bar_chart(&points, DrawCursor::new(0.0, 0.0, 0), 400.0, 200.0, &options());
        assert_eq!(output.bars.len(), 2);
        assert!(output.bars.iter().all(|b| b.height == 0.0));
        assert!(!texts(&output.ops).iter().any(|t| t.contains("NaN")));
    }

    #[test]
    fn test_empty_input_draws_placeholder() {
        let output = render_bar_chart(&[], DrawCursor::new(0.0, 50.0, 0), 400.0, 200.0, &options());
        assert!(output.bars.is_empty());
        assert!(texts(&output.ops).contains(&NO_DATA_TEXT));
        assert!(!output.ops.iter().any(|op| matches!(op, DrawOp::FillRect { .. })));
        assert_eq!(output.end_y, 250.0);
    }

    #[test]
    fn test_gridlines_and_labels() {
        let points = vec![ChartDataPoint::new("Harbor View Loft", 1000.0)];
        let output = render_bar_chart(&points, DrawCursor::new(0.0, 0.0, 0), 400.0, 200.0, &options());
        let labels = texts(&output.ops);
        for expected in ["$0", "$250", "$500", "$750", "$1,000", "Harbor V..."] {
            assert!(labels.contains(&expected), "missing {}", expected);
        }
    }
}
