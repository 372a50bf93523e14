// ============================================================================
// Table Renderer
// ============================================================================

use crate::geometry::{fill_rect, line, text, DrawCursor, DrawOp, Rgb};
use crate::text::{is_numeric_cell, text_width, wrap_text};
use crate::theme::Theme;

/// Only this many trailing columns are candidates for right alignment
const RIGHT_ALIGN_TRAILING_COLUMNS: usize = 3;

/// Line height as a multiple of the body font size
const LINE_SPACING: f32 = 1.3;

#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub header_background: Rgb,
    pub header_text: Rgb,
    pub body_text: Rgb,
    pub zebra_color: Rgb,
    pub zebra: bool,
    pub header_font_size: f32,
    pub body_font_size: f32,
    pub cell_padding: f32,
    pub border_color: Rgb,
    pub border_thickness: f32,
}

impl TableStyle {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            header_background: theme.primary,
            header_text: theme.header_text,
            body_text: theme.body_text,
            zebra_color: theme.zebra,
            zebra: true,
            header_font_size: theme.header_font_size,
            body_font_size: theme.body_font_size,
            cell_padding: theme.cell_padding,
            border_color: theme.border,
            border_thickness: 0.5,
        }
    }
}

/// Headers, display rows and column widths for one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub column_widths: Vec<f32>,
    pub style: TableStyle,
}

impl TableSpec {
    pub fn new(headers: &[&str], column_widths: Vec<f32>, style: TableStyle) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            column_widths,
            style,
        }
    }

    /// A copy with the same headers and style holding only `rows`
    pub fn with_rows(&self, rows: Vec<Vec<String>>) -> Self {
        Self { rows, ..self.clone() }
    }

    pub fn total_width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    pub fn header_height(&self) -> f32 {
        self.style.header_font_size * 2.0
    }

    fn line_height(&self) -> f32 {
        self.style.body_font_size * LINE_SPACING
    }

    fn cell_lines(&self, cell: &str, column: usize) -> Vec<String> {
        let width = self.column_widths.get(column).copied().unwrap_or(0.0);
        let inner = (width - 2.0 * self.style.cell_padding).max(1.0);
        wrap_text(cell, inner, self.style.body_font_size, false)
    }

    /// Height of every row once its cells are wrapped to their columns
    pub fn measure_rows(&self) -> Vec<f32> {
        self.rows
            .iter()
            .map(|row| {
                let lines = row
                    .iter()
                    .take(self.column_widths.len())
                    .enumerate()
                    .map(|(col, cell)| self.cell_lines(cell, col).len())
                    .max()
                    .unwrap_or(1)
                    .max(1);
                lines as f32 * self.line_height() + 2.0 * self.style.cell_padding
            })
            .collect()
    }

    /// Total height of header plus all rows
    pub fn measure(&self) -> f32 {
        self.header_height() + self.measure_rows().iter().sum::<f32>()
    }
}

/// Primitives drawn for a table and the y directly below it
#[derive(Debug, Clone, PartialEq)]
pub struct TableOutput {
    pub ops: Vec<DrawOp>,
    pub end_y: f32,
}

fn right_aligned(cell: &str, column: usize, row_len: usize) -> bool {
    column + RIGHT_ALIGN_TRAILING_COLUMNS >= row_len && is_numeric_cell(cell)
}

/// Draw `spec` with its top-left corner at `origin`
pub fn render_table(spec: &TableSpec, origin: DrawCursor) -> TableOutput {
    let style = &spec.style;
    let x0 = origin.x;
    let top = origin.y;
    let total_width = spec.total_width();
    let header_height = spec.header_height();
    let mut ops = Vec::new();

    // Header band
    ops.push(fill_rect(x0, top, total_width, header_height, style.header_background));
    let header_baseline = top + header_height / 2.0 + style.header_font_size * 0.35;
    let mut col_x = x0;
    for (header, width) in spec.headers.iter().zip(&spec.column_widths) {
        ops.push(text(
            header.clone(),
            col_x + style.cell_padding,
            header_baseline,
            style.header_font_size,
            true,
            style.header_text,
        ));
        col_x += width;
    }

    // Body rows
    let line_height = spec.line_height();
    let mut y = top + header_height;
    for (index, (row, row_height)) in spec.rows.iter().zip(spec.measure_rows()).enumerate() {
        if style.zebra && index % 2 == 0 {
            ops.push(fill_rect(x0, y, total_width, row_height, style.zebra_color));
        }

        let mut col_x = x0;
        for (col, (cell, width)) in row.iter().zip(&spec.column_widths).enumerate() {
            let align_right = right_aligned(cell, col, row.len());
            for (line_index, content) in spec.cell_lines(cell, col).into_iter().enumerate() {
                if content.is_empty() {
                    continue;
                }
                let baseline = y + style.cell_padding + style.body_font_size + line_index as f32 * line_height;
                let x = if align_right {
                    col_x + width - style.cell_padding - text_width(&content, style.body_font_size, false)
                } else {
                    col_x + style.cell_padding
                };
                ops.push(text(content, x, baseline, style.body_font_size, false, style.body_text));
            }
            col_x += width;
        }
        y += row_height;
    }

    // Borders
    ops.push(line(x0, y, x0 + total_width, y, style.border_color, style.border_thickness));
    let mut boundary = x0;
    ops.push(line(boundary, top, boundary, y, style.border_color, style.border_thickness));
    for width in &spec.column_widths {
        boundary += width;
        ops.push(line(boundary, top, boundary, y, style.border_color, style.border_thickness));
    }

    TableOutput { ops, end_y: y }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec(rows: usize) -> TableSpec {
        let style = TableStyle::from_theme(&Theme::default());
        let spec = TableSpec::new(&["Item", "Note", "Qty", "Cost"], vec![120.0, 120.0, 60.0, 80.0], style);
        spec.with_rows(
            (0..rows)
                .map(|i| vec![format!("Item {}", i), "ok".to_string(), "2".to_string(), "$10.00".to_string()])
                .collect(),
        )
    }

    fn zebra_fills(output: &TableOutput, style: &TableStyle) -> usize {
        output
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { color, .. } if *color == style.zebra_color))
            .count()
    }

    #[test]
    fn test_zebra_rows_are_even_indices() {
        for n in [0, 1, 2, 5, 8] {
            let spec = sample_spec(n);
            let output = render_table(&spec, DrawCursor::new(40.0, 100.0, 0));
            assert_eq!(zebra_fills(&output, &spec.style), n.div_ceil(2), "rows = {}", n);
        }
    }

    #[test]
    fn test_zebra_disabled() {
        let mut spec = sample_spec(4);
        spec.style.zebra = false;
        let output = render_table(&spec, DrawCursor::new(40.0, 100.0, 0));
        assert_eq!(zebra_fills(&output, &spec.style), 0);
    }

    #[test]
    fn test_empty_table_draws_header_only() {
        let spec = sample_spec(0);
        let output = render_table(&spec, DrawCursor::new(40.0, 100.0, 0));
        assert_eq!(output.end_y, 100.0 + spec.header_height());
        assert_eq!(output.end_y, 100.0 + spec.measure());
        let texts: Vec<_> = output
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Item", "Note", "Qty", "Cost"]);
    }

    #[test]
    fn test_end_y_matches_measurement() {
        let spec = sample_spec(3);
        let output = render_table(&spec, DrawCursor::new(0.0, 50.0, 0));
        assert!((output.end_y - (50.0 + spec.measure())).abs() < 1e-3);
    }

    #[test]
    fn test_numeric_trailing_cells_right_aligned() {
        let style = TableStyle::from_theme(&Theme::default());
        let spec = TableSpec::new(&["A", "B", "C", "D"], vec![100.0; 4], style)
            .with_rows(vec![vec!["42".into(), "x".into(), "7".into(), "$5.00".into()]]);
        let output = render_table(&spec, DrawCursor::new(0.0, 0.0, 0));
        let x_of = |needle: &str| {
            output.ops.iter().find_map(|op| match op {
                DrawOp::Text { text, x, .. } if text == needle => Some(*x),
                _ => None,
            })
        };
        // "42" is numeric but in the first column, so it stays left-aligned
        assert_eq!(x_of("42"), Some(spec.style.cell_padding));
        assert_eq!(x_of("x"), Some(100.0 + spec.style.cell_padding));
        assert!(x_of("7").unwrap() > 200.0 + spec.style.cell_padding);
        assert!(x_of("$5.00").unwrap() > 300.0 + spec.style.cell_padding);
    }

    #[test]
    fn test_long_cells_wrap_and_grow_row() {
        let style = TableStyle::from_theme(&Theme::default());
        let spec = TableSpec::new(&["Description"], vec![80.0], style)
            .with_rows(vec![vec!["replaced the bathroom exhaust fan and sealed the duct".into()]]);
        let heights = spec.measure_rows();
        let single = TableSpec { rows: vec![vec!["short".into()]], ..spec.clone() }.measure_rows();
        assert!(heights[0] > single[0]);
    }

    #[test]
    fn test_column_rules() {
        let spec = sample_spec(2);
        let output = render_table(&spec, DrawCursor::new(0.0, 0.0, 0));
        let rules = output.ops.iter().filter(|op| matches!(op, DrawOp::Line { .. })).count();
        // one horizontal rule plus a vertical rule at each of the 5 boundaries
        assert_eq!(rules, 1 + spec.column_widths.len() + 1);
    }
}
