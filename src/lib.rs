// owner-report: Render paginated owner expense reports to PDF

pub mod assembler;
pub mod chart;
pub mod error;
pub mod geometry;
pub mod model;
pub mod pdf;
pub mod report;
pub mod table;
pub mod text;
pub mod theme;

pub use assembler::{group_expenses, render_document, ExpenseGroup, ReportTotals};
pub use chart::ChartDataPoint;
pub use error::{ReportError, Result};
pub use geometry::{Document, DrawCursor, DrawOp, Page, Rgb};
pub use model::{Expense, Owner, Property, ReportContext, ReportPeriod};
pub use report::{ReportWriter, CONTENT_TYPE};
pub use theme::{PageLayout, RenderConfig, Theme};

use std::path::Path;

/// Read a report context from a JSON file
pub fn load_context(path: &Path) -> Result<ReportContext> {
    let content = std::fs::read_to_string(path).map_err(|e| ReportError::Input {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ReportError::Input {
        path: path.display().to_string(),
        reason: format!("Invalid JSON: {}", e),
    })
}
