// ============================================================================
// Document Assembler
// ============================================================================
//
// Walks the fixed section order of an owner report, threading the draw
// cursor through each renderer and breaking pages when a section would run
// past the bottom margin. Footers are stamped in a separate final pass.

use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::chart::{
    render_bar_chart, render_pie_chart, BarChartOptions, ChartDataPoint, LegendPosition, PieChartOptions,
};
use crate::geometry::{fill_rect, line, stroke_rect, text, Document, DrawCursor, DrawOp};
use crate::model::{Expense, Property, ReportContext};
use crate::table::{render_table, TableSpec, TableStyle};
use crate::text::{format_currency, format_quantity, text_width};
use crate::theme::{PageLayout, Theme};

pub const REPORT_TITLE: &str = "Owner Expense Report";
pub const UNKNOWN_PROPERTY: &str = "Unknown Property";
pub const MISSING_ITEM: &str = "N/A";
pub const UNKNOWN_ITEM: &str = "Unknown";
pub const CONTINUED_SUFFIX: &str = " (continued)";

/// Fixed heights of the unsplittable blocks, in points
const HEADER_BAND_HEIGHT: f32 = 70.0;
const OWNER_CARD_HEIGHT: f32 = 64.0;
const SUMMARY_CARD_HEIGHT: f32 = 54.0;
const SUMMARY_CARD_GAP: f32 = 12.0;
const CHART_HEIGHT: f32 = 220.0;
const SECTION_HEADING_HEIGHT: f32 = 22.0;
const GROUP_BAND_HEIGHT: f32 = 24.0;
const GROUP_HEADER_HEIGHT: f32 = 74.0;
const CONTINUATION_HEIGHT: f32 = 22.0;

/// Pie legends with more entries than this move below the pie
const RIGHT_LEGEND_MAX_ENTRIES: usize = 10;

/// Footer rule sits this far below the content area
const FOOTER_RULE_OFFSET: f32 = 10.0;

// ============================================================================
// Grouping
// ============================================================================

/// Expenses of one property, in booking order
#[derive(Debug, Clone)]
pub struct ExpenseGroup<'a> {
    pub property_id: &'a str,
    pub property: Option<&'a Property>,
    pub expenses: Vec<&'a Expense>,
    pub subtotal: f64,
}

impl ExpenseGroup<'_> {
    pub fn name(&self) -> &str {
        self.property.map(|p| p.name.as_str()).unwrap_or(UNKNOWN_PROPERTY)
    }
}

/// Group expenses by property id, one group per id in first-seen order
pub fn group_expenses(ctx: &ReportContext) -> Vec<ExpenseGroup<'_>> {
    let mut groups: Vec<ExpenseGroup<'_>> = Vec::new();
    for expense in &ctx.expenses {
        match groups.iter_mut().find(|g| g.property_id == expense.property_id) {
            Some(group) => {
                group.expenses.push(expense);
                group.subtotal += expense.cost;
            }
            None => {
                let property = ctx.property(&expense.property_id);
                if property.is_none() {
                    warn!(
                        "Expense {} references unknown property {}; rendering as \"{}\"",
                        expense.id, expense.property_id, UNKNOWN_PROPERTY
                    );
                }
                groups.push(ExpenseGroup {
                    property_id: &expense.property_id,
                    property,
                    expenses: vec![expense],
                    subtotal: expense.cost,
                });
            }
        }
    }
    groups
}

/// Document-level figures shown on the summary cards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportTotals {
    pub total_cost: f64,
    pub total_billed: f64,
    pub expense_count: usize,
}

impl ReportTotals {
    pub fn from_groups(groups: &[ExpenseGroup<'_>]) -> Self {
        Self {
            total_cost: groups.iter().map(|g| g.subtotal).sum(),
            total_billed: groups.iter().flat_map(|g| &g.expenses).map(|e| e.billed).sum(),
            expense_count: groups.iter().map(|g| g.expenses.len()).sum(),
        }
    }
}

/// Cost per inventory item in first-seen order; unresolved items pool under "Unknown"
fn item_breakdown(ctx: &ReportContext) -> Vec<ChartDataPoint> {
    let mut points: Vec<ChartDataPoint> = Vec::new();
    for expense in &ctx.expenses {
        let label = ctx.item_name(expense.item_id.as_deref()).unwrap_or(UNKNOWN_ITEM);
        match points.iter_mut().find(|p| p.label == label) {
            Some(point) => point.value += expense.cost,
            None => points.push(ChartDataPoint::new(label, expense.cost)),
        }
    }
    points
}

// ============================================================================
// Assembler
// ============================================================================

struct Assembler<'a> {
    ctx: &'a ReportContext,
    theme: &'a Theme,
    layout: &'a PageLayout,
    doc: Document,
    cursor: DrawCursor,
}

impl<'a> Assembler<'a> {
    fn new(ctx: &'a ReportContext, theme: &'a Theme, layout: &'a PageLayout) -> Self {
        Self {
            ctx,
            theme,
            layout,
            doc: Document::new(),
            cursor: DrawCursor::new(layout.margin_left, layout.margin_top, 0),
        }
    }

    fn content_width(&self) -> f32 {
        self.layout.content_width()
    }

    fn page_capacity(&self) -> f32 {
        self.layout.content_bottom() - self.layout.margin_top
    }

    fn remaining(&self) -> f32 {
        self.layout.remaining(self.cursor.y)
    }

    fn draw(&mut self, ops: Vec<DrawOp>) {
        self.doc.draw(self.cursor.page_index, ops);
    }

    fn begin_section(&mut self, name: &str) {
        self.doc.begin_section(self.cursor.page_index, name);
    }

    fn new_page(&mut self) {
        let page_index = self.doc.add_page();
        self.cursor = DrawCursor::new(self.layout.margin_left, self.layout.margin_top, page_index);
        debug!("Started page {}", page_index + 1);
    }

    /// Break the page unless `needed` points remain, capped at one full page
    fn ensure_space(&mut self, needed: f32) {
        let needed = needed.min(self.page_capacity());
        if self.remaining() < needed {
            debug!(
                "Section needs {:.1}pt but only {:.1}pt remain on page {}",
                needed,
                self.remaining(),
                self.cursor.page_index + 1
            );
            self.new_page();
        }
    }

    /// `ensure_space` for blocks that cannot be split
    fn ensure_block(&mut self, estimated: f32) {
        self.ensure_space(estimated.max(self.layout.min_section_height));
    }

    fn gap(&mut self) {
        self.cursor = self.cursor.advance(self.layout.section_gap);
    }

    fn heading(&mut self, label: &str) {
        let theme = self.theme;
        let op = text(
            label,
            self.cursor.x,
            self.cursor.y + theme.heading_font_size + 2.0,
            theme.heading_font_size,
            true,
            theme.primary,
        );
        self.draw(vec![op]);
        self.cursor = self.cursor.advance(SECTION_HEADING_HEIGHT);
    }

    // ------------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------------

    fn header_band(&mut self, generated_at: NaiveDateTime) {
        self.begin_section("header");
        let theme = self.theme;
        let (x, y, width) = (self.cursor.x, self.cursor.y, self.content_width());

        let generated = format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M"));
        let generated_x = x + width - 12.0 - text_width(&generated, theme.small_font_size, false);
        let ops = vec![
            fill_rect(x, y, width, HEADER_BAND_HEIGHT, theme.primary),
            text(REPORT_TITLE, x + 12.0, y + 30.0, theme.title_font_size, true, theme.header_text),
            text(
                format!("Period: {}", self.ctx.period.label()),
                x + 12.0,
                y + 52.0,
                theme.header_font_size,
                false,
                theme.header_text,
            ),
            text(generated, generated_x, y + 52.0, theme.small_font_size, false, theme.header_text),
        ];
        self.draw(ops);
        self.cursor = self.cursor.advance(HEADER_BAND_HEIGHT);
    }

    fn owner_card(&mut self) {
        self.ensure_block(OWNER_CARD_HEIGHT);
        self.begin_section("owner");
        let theme = self.theme;
        let owner = &self.ctx.owner;
        let (x, y, width) = (self.cursor.x, self.cursor.y, self.content_width());
        let or_missing = |value: &str| {
            if value.is_empty() {
                MISSING_ITEM.to_string()
            } else {
                value.to_string()
            }
        };

        let ops = vec![
            fill_rect(x, y, width, OWNER_CARD_HEIGHT, theme.card_background),
            stroke_rect(x, y, width, OWNER_CARD_HEIGHT, theme.border, 0.5),
            text("OWNER", x + 10.0, y + 16.0, theme.small_font_size, true, theme.muted_text),
            text(owner.name.clone(), x + 10.0, y + 32.0, theme.heading_font_size, true, theme.body_text),
            text(
                format!("Email: {}", or_missing(&owner.email)),
                x + 10.0,
                y + 50.0,
                theme.body_font_size,
                false,
                theme.body_text,
            ),
            text(
                format!("Phone: {}", or_missing(&owner.phone)),
                x + width / 2.0,
                y + 50.0,
                theme.body_font_size,
                false,
                theme.body_text,
            ),
        ];
        self.draw(ops);
        self.cursor = self.cursor.advance(OWNER_CARD_HEIGHT);
    }

    fn properties_table(&mut self, groups: &[ExpenseGroup<'_>]) {
        let width = self.content_width();
        let spec = TableSpec::new(
            &["Property", "Location", "Expenses", "Total Cost"],
            vec![width * 0.30, width * 0.35, width * 0.15, width * 0.20],
            TableStyle::from_theme(self.theme),
        );
        let rows = self
            .ctx
            .properties
            .iter()
            .map(|property| {
                let group = groups.iter().find(|g| g.property_id == property.id);
                vec![
                    property.name.clone(),
                    location(property),
                    group.map_or(0, |g| g.expenses.len()).to_string(),
                    format_currency(group.map_or(0.0, |g| g.subtotal), 2),
                ]
            })
            .collect();
        let spec = spec.with_rows(rows);

        let first_row = spec.measure_rows().first().copied().unwrap_or(0.0);
        self.ensure_space(SECTION_HEADING_HEIGHT + spec.header_height() + first_row);
        self.begin_section("properties");
        self.heading("Properties");
        self.split_table(&spec, "properties", "Properties");
    }

    fn summary_cards(&mut self, totals: &ReportTotals) {
        self.ensure_block(SUMMARY_CARD_HEIGHT);
        self.begin_section("summary");
        let theme = self.theme;
        let card_width = (self.content_width() - 2.0 * SUMMARY_CARD_GAP) / 3.0;
        let cards = [
            ("TOTAL COST", format_currency(totals.total_cost, 2)),
            ("TOTAL BILLED", format_currency(totals.total_billed, 2)),
            ("EXPENSES", totals.expense_count.to_string()),
        ];

        let mut ops = Vec::new();
        for (index, (label, value)) in cards.into_iter().enumerate() {
            let x = self.cursor.x + index as f32 * (card_width + SUMMARY_CARD_GAP);
            let y = self.cursor.y;
            ops.push(fill_rect(x, y, card_width, SUMMARY_CARD_HEIGHT, theme.card_background));
            ops.push(stroke_rect(x, y, card_width, SUMMARY_CARD_HEIGHT, theme.border, 0.5));
            ops.push(text(label, x + 10.0, y + 18.0, theme.small_font_size, true, theme.muted_text));
            ops.push(text(value, x + 10.0, y + 40.0, theme.title_font_size * 0.8, true, theme.primary));
        }
        self.draw(ops);
        self.cursor = self.cursor.advance(SUMMARY_CARD_HEIGHT);
    }

    fn chart_height(&self) -> f32 {
        CHART_HEIGHT.min(self.page_capacity())
    }

    fn bar_chart(&mut self, groups: &[ExpenseGroup<'_>]) {
        let height = self.chart_height();
        self.ensure_block(height);
        self.begin_section("chart:bar");
        let points: Vec<ChartDataPoint> = groups
            .iter()
            .map(|g| ChartDataPoint::new(g.name(), g.subtotal))
            .collect();
        let options = BarChartOptions::from_theme(self.theme).with_title("Expenses by Property");
        let output = render_bar_chart(&points, self.cursor, self.content_width(), height, &options);
        self.draw(output.ops);
        self.cursor = self.cursor.with_y(output.end_y);
    }

    fn pie_chart(&mut self) {
        let height = self.chart_height();
        self.ensure_block(height);
        self.begin_section("chart:pie");
        let points = item_breakdown(self.ctx);
        let mut options = PieChartOptions::from_theme(self.theme).with_title("Expenses by Item");
        if points.len() > RIGHT_LEGEND_MAX_ENTRIES {
            options.legend_position = LegendPosition::Below;
        }
        let output = render_pie_chart(&points, self.cursor, self.content_width(), height, &options);
        self.draw(output.ops);
        self.cursor = self.cursor.with_y(output.end_y);
    }

    fn group_detail(&mut self, group: &ExpenseGroup<'_>, first: bool) {
        let theme = self.theme;
        let width = self.content_width();
        let spec = TableSpec::new(
            &["Date", "Item", "Description", "Qty", "Unit Cost", "Total"],
            vec![
                width * 0.14,
                width * 0.18,
                width * 0.30,
                width * 0.10,
                width * 0.14,
                width * 0.14,
            ],
            TableStyle::from_theme(theme),
        );
        let rows = group.expenses.iter().map(|expense| self.expense_row(expense)).collect();
        let spec = spec.with_rows(rows);

        let heading = if first { SECTION_HEADING_HEIGHT } else { 0.0 };
        let first_row = spec.measure_rows().first().copied().unwrap_or(0.0);
        self.ensure_block(heading + GROUP_HEADER_HEIGHT + spec.header_height() + first_row);
        if first {
            self.begin_section("details");
            self.heading("Expense Details");
        }

        let name = group.name().to_string();
        let section = format!("group:{}", name);
        self.begin_section(&section);

        let (x, y) = (self.cursor.x, self.cursor.y);
        let (address_line, kind_line) = match group.property {
            Some(property) => (
                non_empty_or(location(property), "No address on file"),
                format!(
                    "Type: {} | Expenses: {}",
                    non_empty_or(property.kind.clone(), MISSING_ITEM),
                    group.expenses.len()
                ),
            ),
            None => (
                format!("Property ID: {}", group.property_id),
                format!("Type: {} | Expenses: {}", MISSING_ITEM, group.expenses.len()),
            ),
        };
        let ops = vec![
            fill_rect(x, y, width, GROUP_BAND_HEIGHT, theme.primary),
            text(
                name.clone(),
                x + 8.0,
                y + GROUP_BAND_HEIGHT / 2.0 + theme.heading_font_size * 0.35,
                theme.heading_font_size,
                true,
                theme.header_text,
            ),
            text(address_line, x, y + GROUP_BAND_HEIGHT + 14.0, theme.body_font_size, false, theme.muted_text),
            text(kind_line, x, y + GROUP_BAND_HEIGHT + 26.0, theme.body_font_size, false, theme.muted_text),
            text(
                format!("Property total: {}", format_currency(group.subtotal, 2)),
                x,
                y + GROUP_BAND_HEIGHT + 42.0,
                theme.header_font_size,
                true,
                theme.body_text,
            ),
        ];
        self.draw(ops);
        self.cursor = self.cursor.advance(GROUP_HEADER_HEIGHT);

        self.split_table(&spec, &section, &name);
    }

    fn expense_row(&self, expense: &Expense) -> Vec<String> {
        let item = match self.ctx.item_name(expense.item_id.as_deref()) {
            Some(name) => name.to_string(),
            None => {
                if let Some(id) = &expense.item_id {
                    warn!("Expense {} references unknown item {}", expense.id, id);
                }
                MISSING_ITEM.to_string()
            }
        };
        vec![
            expense.date.format("%Y-%m-%d").to_string(),
            item,
            expense.description.clone(),
            format_quantity(expense.quantity),
            format_currency(expense.unit_cost, 2),
            format_currency(expense.cost, 2),
        ]
    }

    /// Redraw a section title with the continuation suffix at the top of a fresh page
    fn continuation(&mut self, section: &str, title: &str) {
        let title = format!("{}{}", title, CONTINUED_SUFFIX);
        self.doc
            .begin_section(self.cursor.page_index, &format!("{}{}", section, CONTINUED_SUFFIX));
        let theme = self.theme;
        let op = text(
            title,
            self.cursor.x,
            self.cursor.y + theme.heading_font_size + 2.0,
            theme.heading_font_size,
            true,
            theme.primary,
        );
        self.draw(vec![op]);
        self.cursor = self.cursor.advance(CONTINUATION_HEIGHT);
    }

    /// Draw `spec` row by row across as many pages as it needs, repeating the
    /// table header and a continuation title on every new page
    fn split_table(&mut self, spec: &TableSpec, section: &str, title: &str) {
        let heights = spec.measure_rows();
        let header_height = spec.header_height();
        let mut start = 0;
        let mut fresh_page = false;

        loop {
            let first_row = heights.get(start).copied().unwrap_or(0.0);
            if !fresh_page && self.remaining() < header_height + first_row {
                self.new_page();
                self.continuation(section, title);
            }

            let budget = self.remaining() - header_height;
            let mut end = start;
            let mut used = 0.0;
            while end < heights.len() && used + heights[end] <= budget {
                used += heights[end];
                end += 1;
            }
            // a single row taller than a whole page is drawn anyway
            if end == start && start < heights.len() {
                end = start + 1;
            }

            let chunk = spec.with_rows(spec.rows[start..end].to_vec());
            let output = render_table(&chunk, self.cursor);
            self.draw(output.ops);
            self.cursor = self.cursor.with_y(output.end_y);

            start = end;
            if start >= heights.len() {
                break;
            }
            self.new_page();
            self.continuation(section, title);
            fresh_page = true;
        }
    }

    // ------------------------------------------------------------------------
    // Finalization
    // ------------------------------------------------------------------------

    fn stamp_footers(&mut self) {
        let theme = self.theme;
        let layout = self.layout;
        let left = layout.margin_left;
        let right = layout.width - layout.margin_right;
        let rule_y = layout.content_bottom() + FOOTER_RULE_OFFSET;
        let text_y = rule_y + theme.small_font_size + 4.0;
        let caption = format!("{} | {}", self.ctx.owner.name, self.ctx.period.label());

        self.doc.stamp_pages(|index, count| {
            let page_label = format!("Page {} of {}", index + 1, count);
            let page_x = right - text_width(&page_label, theme.small_font_size, false);
            vec![
                line(left, rule_y, right, rule_y, theme.border, 0.5),
                text(caption.clone(), left, text_y, theme.small_font_size, false, theme.muted_text),
                text(page_label, page_x, text_y, theme.small_font_size, false, theme.muted_text),
            ]
        });
    }

    fn finish(mut self) -> Document {
        self.stamp_footers();
        self.doc
    }
}

fn location(property: &Property) -> String {
    [property.address.as_str(), property.city.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Lay out a complete owner report.
///
/// Rendering the same context with the same `generated_at` always produces
/// an identical document.
pub fn render_document(
    ctx: &ReportContext,
    theme: &Theme,
    layout: &PageLayout,
    generated_at: NaiveDateTime,
) -> Document {
    let groups = group_expenses(ctx);
    let totals = ReportTotals::from_groups(&groups);

    let mut assembler = Assembler::new(ctx, theme, layout);
    assembler.header_band(generated_at);
    assembler.gap();
    assembler.owner_card();
    assembler.gap();
    assembler.properties_table(&groups);
    assembler.gap();
    assembler.summary_cards(&totals);
    assembler.gap();
    assembler.bar_chart(&groups);
    assembler.gap();
    assembler.pie_chart();
    for (index, group) in groups.iter().enumerate() {
        assembler.gap();
        assembler.group_detail(group, index == 0);
    }

    let doc = assembler.finish();
    debug!("Laid out {} page(s) for owner {}", doc.page_count(), ctx.owner.id);
    doc
}
