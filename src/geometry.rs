// ============================================================================
// Geometry Primitives
// ============================================================================
//
// Layout works in points with the origin at the top-left corner of the page
// and y growing downward. The PDF backend flips to PDF's bottom-left origin.

use serde::Deserialize;
use std::f32::consts::TAU;

/// Maximum angular step when flattening an arc into line segments
const ARC_STEP_RAD: f32 = 0.05;

/// RGB colour with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);

    /// Build from 8-bit channels, e.g. `Rgb::from_u8(0x2c, 0x3e, 0x50)`
    pub const fn from_u8(r: u8, g: u8, b: u8) -> Rgb {
        Rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

/// Position where the next section starts drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCursor {
    pub x: f32,
    pub y: f32,
    pub page_index: usize,
}

impl DrawCursor {
    pub fn new(x: f32, y: f32, page_index: usize) -> Self {
        Self { x, y, page_index }
    }

    /// Same page and x, moved down by `dy`
    pub fn advance(self, dy: f32) -> Self {
        Self { y: self.y + dy, ..self }
    }

    /// Same page and x, placed at an absolute `y`
    pub fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }
}

/// A single drawing command in layout coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
        thickness: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb,
        thickness: f32,
    },
    /// Filled pie slice. Angles are radians clockwise from 12 o'clock.
    Wedge {
        cx: f32,
        cy: f32,
        radius: f32,
        start_angle: f32,
        sweep_angle: f32,
        color: Rgb,
    },
    /// Text with `y` at the baseline
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: Rgb,
    },
}

// ============================================================================
// Emitters
// ============================================================================

pub fn fill_rect(x: f32, y: f32, width: f32, height: f32, color: Rgb) -> DrawOp {
    DrawOp::FillRect { x, y, width, height, color }
}

pub fn stroke_rect(x: f32, y: f32, width: f32, height: f32, color: Rgb, thickness: f32) -> DrawOp {
    DrawOp::StrokeRect { x, y, width, height, color, thickness }
}

pub fn line(x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, thickness: f32) -> DrawOp {
    DrawOp::Line { x1, y1, x2, y2, color, thickness }
}

pub fn wedge(cx: f32, cy: f32, radius: f32, start_angle: f32, sweep_angle: f32, color: Rgb) -> DrawOp {
    DrawOp::Wedge { cx, cy, radius, start_angle, sweep_angle, color }
}

pub fn text(text: impl Into<String>, x: f32, y: f32, size: f32, bold: bool, color: Rgb) -> DrawOp {
    DrawOp::Text { text: text.into(), x, y, size, bold, color }
}

/// Point on a circle at `angle` radians clockwise from 12 o'clock
pub fn point_on_circle(cx: f32, cy: f32, radius: f32, angle: f32) -> (f32, f32) {
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}

/// Outline of a pie slice: the centre followed by the flattened arc.
///
/// A sweep of a full turn or more yields a closed circle without the centre
/// point.
pub fn wedge_points(cx: f32, cy: f32, radius: f32, start_angle: f32, sweep_angle: f32) -> Vec<(f32, f32)> {
    if radius <= 0.0 || sweep_angle <= 0.0 || !sweep_angle.is_finite() {
        return Vec::new();
    }
    let full_circle = sweep_angle >= TAU - 1e-4;
    let sweep = sweep_angle.min(TAU);
    let steps = ((sweep / ARC_STEP_RAD).ceil() as usize).max(1);

    let mut points = Vec::with_capacity(steps + 2);
    if !full_circle {
        points.push((cx, cy));
    }
    for i in 0..=steps {
        let angle = start_angle + sweep * i as f32 / steps as f32;
        points.push(point_on_circle(cx, cy, radius, angle));
    }
    points
}

// ============================================================================
// Pages and Documents
// ============================================================================

/// One page of drawn primitives
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
    /// Names of the sections begun on this page, in drawing order
    pub sections: Vec<String>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Ordered list of pages under construction
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pages: Vec<Page>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document with one empty page
    pub fn new() -> Self {
        Self { pages: vec![Page::default()] }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Appends an empty page and returns its index
    pub(crate) fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len() - 1
    }

    pub(crate) fn draw(&mut self, page_index: usize, ops: impl IntoIterator<Item = DrawOp>) {
        if let Some(page) = self.pages.get_mut(page_index) {
            page.ops.extend(ops);
        }
    }

    pub(crate) fn begin_section(&mut self, page_index: usize, name: &str) {
        if let Some(page) = self.pages.get_mut(page_index) {
            page.sections.push(name.to_string());
        }
    }

    /// Run `stamp` once per page with (index, page count) and append its ops
    pub(crate) fn stamp_pages<F>(&mut self, mut stamp: F)
    where
        F: FnMut(usize, usize) -> Vec<DrawOp>,
    {
        let count = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.ops.extend(stamp(index, count));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_point_on_circle_clockwise_from_top() {
        let (x, y) = point_on_circle(100.0, 100.0, 10.0, 0.0);
        assert!((x - 100.0).abs() < 1e-4 && (y - 90.0).abs() < 1e-4);

        let (x, y) = point_on_circle(100.0, 100.0, 10.0, PI / 2.0);
        assert!((x - 110.0).abs() < 1e-4 && (y - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_wedge_points() {
        let half = wedge_points(0.0, 0.0, 10.0, 0.0, PI);
        assert_eq!(half[0], (0.0, 0.0));
        let last = half[half.len() - 1];
        assert!((last.0).abs() < 1e-3 && (last.1 - 10.0).abs() < 1e-3);

        let full = wedge_points(0.0, 0.0, 10.0, 0.0, TAU);
        assert!(full.iter().all(|(x, y)| ((x * x + y * y).sqrt() - 10.0).abs() < 1e-3));

        assert!(wedge_points(0.0, 0.0, 0.0, 0.0, PI).is_empty());
        assert!(wedge_points(0.0, 0.0, 10.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn test_document_pages() {
        let mut doc = Document::new();
        assert_eq!(doc.page_count(), 1);
        let second = doc.add_page();
        assert_eq!(second, 1);

        doc.begin_section(1, "detail");
        doc.draw(1, [text("hello", 0.0, 0.0, 10.0, false, Rgb::BLACK)]);
        doc.stamp_pages(|i, n| vec![text(format!("Page {} of {}", i + 1, n), 0.0, 0.0, 8.0, false, Rgb::BLACK)]);

        let texts: Vec<_> = doc.pages()[1].texts().collect();
        assert_eq!(texts, vec!["hello", "Page 2 of 2"]);
        assert_eq!(doc.pages()[1].sections, vec!["detail"]);
    }

    #[test]
    fn test_cursor_threading() {
        let cursor = DrawCursor::new(40.0, 40.0, 0);
        let moved = cursor.advance(12.5);
        assert_eq!(moved.y, 52.5);
        assert_eq!(cursor.y, 40.0);
        assert_eq!(moved.with_y(5.0), DrawCursor::new(40.0, 5.0, 0));
    }
}
