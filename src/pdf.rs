// ============================================================================
// PDF Backend
// ============================================================================
//
// Replays a laid-out `Document` onto printpdf pages. Layout coordinates are
// points from the top-left corner; printpdf wants millimetres from the
// bottom-left.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::io::{BufWriter, Cursor};

use crate::error::{ReportError, Result};
use crate::geometry::{wedge_points, Document, DrawOp, Page, Rgb};
use crate::theme::PageLayout;

const MM_PER_PT: f32 = 25.4 / 72.0;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Maps layout points to page millimetres
struct PageSpace {
    height_pt: f32,
}

impl PageSpace {
    fn x(&self, x: f32) -> Mm {
        Mm(x * MM_PER_PT)
    }

    fn y(&self, y: f32) -> Mm {
        Mm((self.height_pt - y) * MM_PER_PT)
    }

    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(self.x(x), self.y(y))
    }
}

fn pdf_color(color: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(color.0, color.1, color.2, None))
}

/// Serialize `document` to PDF bytes
pub fn render_pdf(document: &Document, layout: &PageLayout, title: &str) -> Result<Vec<u8>> {
    let width = Mm(layout.width * MM_PER_PT);
    let height = Mm(layout.height * MM_PER_PT);
    let (doc, page1, layer1) = PdfDocument::new(title, width, height, "Layer 1");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(e.to_string()))?,
    };
    let space = PageSpace { height_pt: layout.height };

    for (index, page) in document.pages().iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (new_page, new_layer) = doc.add_page(width, height, "Layer 1");
            doc.get_page(new_page).get_layer(new_layer)
        };
        draw_page(&layer, &fonts, &space, page);
    }

    let mut buf = Vec::new();
    {
        let mut writer = BufWriter::new(Cursor::new(&mut buf));
        doc.save(&mut writer)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
    }
    Ok(buf)
}

fn draw_page(layer: &PdfLayerReference, fonts: &Fonts, space: &PageSpace, page: &Page) {
    for op in &page.ops {
        match op {
            DrawOp::FillRect { x, y, width, height, color } => {
                if *width <= 0.0 || *height <= 0.0 {
                    continue;
                }
                layer.set_fill_color(pdf_color(*color));
                let points = rect_points(space, *x, *y, *width, *height);
                fill_polygon(layer, points);
            }
            DrawOp::StrokeRect { x, y, width, height, color, thickness } => {
                layer.set_outline_color(pdf_color(*color));
                layer.set_outline_thickness(*thickness);
                layer.add_line(Line {
                    points: rect_points(space, *x, *y, *width, *height),
                    is_closed: true,
                });
            }
            DrawOp::Line { x1, y1, x2, y2, color, thickness } => {
                layer.set_outline_color(pdf_color(*color));
                layer.set_outline_thickness(*thickness);
                draw_line(layer, space, *x1, *y1, *x2, *y2);
            }
            DrawOp::Wedge { cx, cy, radius, start_angle, sweep_angle, color } => {
                let points: Vec<(Point, bool)> = wedge_points(*cx, *cy, *radius, *start_angle, *sweep_angle)
                    .into_iter()
                    .map(|(x, y)| (space.point(x, y), false))
                    .collect();
                if points.len() < 3 {
                    continue;
                }
                layer.set_fill_color(pdf_color(*color));
                fill_polygon(layer, points);
            }
            DrawOp::Text { text, x, y, size, bold, color } => {
                let font = if *bold { &fonts.bold } else { &fonts.regular };
                layer.set_fill_color(pdf_color(*color));
                layer.use_text(text.as_str(), *size, space.x(*x), space.y(*y), font);
            }
        }
    }
}

fn rect_points(space: &PageSpace, x: f32, y: f32, width: f32, height: f32) -> Vec<(Point, bool)> {
    vec![
        (space.point(x, y), false),
        (space.point(x + width, y), false),
        (space.point(x + width, y + height), false),
        (space.point(x, y + height), false),
    ]
}

fn fill_polygon(layer: &PdfLayerReference, points: Vec<(Point, bool)>) {
    let polygon = Polygon {
        rings: vec![points],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    };
    layer.add_polygon(polygon);
}

fn draw_line(layer: &PdfLayerReference, space: &PageSpace, x1: f32, y1: f32, x2: f32, y2: f32) {
    let points = vec![(space.point(x1, y1), false), (space.point(x2, y2), false)];
    let line = Line {
        points,
        is_closed: false,
    };
    layer.add_line(line);
}
