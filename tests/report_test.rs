use chrono::{NaiveDate, NaiveDateTime};
use owner_report::{
    group_expenses, load_context, render_document, Document, Expense, Owner, PageLayout, Property, ReportContext,
    ReportError, ReportPeriod, ReportTotals, ReportWriter, Theme,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;

fn generated_at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap().and_hms_opt(hour, 0, 0).unwrap()
}

fn expense(index: usize, property_id: &str, cost: f64) -> Expense {
    Expense {
        id: format!("e{}", index),
        property_id: property_id.to_string(),
        item_id: Some(if index % 2 == 0 { "filter" } else { "bulb" }.to_string()),
        description: format!("Maintenance visit {}", index),
        date: NaiveDate::from_ymd_opt(2026, 10, 1 + (index % 28) as u32).unwrap(),
        quantity: 1.0,
        unit_cost: cost,
        cost,
        billed: cost * 1.15,
    }
}

/// "Acme Owner" with two properties; the first carries 11 itemized expenses
fn acme_context() -> ReportContext {
    let mut expenses: Vec<Expense> = (0..11).map(|i| expense(i, "p1", 25.0 + i as f64)).collect();
    expenses.extend((11..14).map(|i| expense(i, "p2", 40.0)));

    ReportContext {
        owner: Owner {
            id: "acme".to_string(),
            name: "Acme Owner".to_string(),
            email: "owner@acme.test".to_string(),
            phone: "555-0100".to_string(),
        },
        properties: vec![
            Property {
                id: "p1".to_string(),
                name: "Acme Group 1".to_string(),
                address: "12 Dock Street".to_string(),
                city: "Portsmouth".to_string(),
                kind: "Apartment".to_string(),
            },
            Property {
                id: "p2".to_string(),
                name: "Acme Group 2".to_string(),
                address: "4 Mill Lane".to_string(),
                city: "Exeter".to_string(),
                kind: "Cottage".to_string(),
            },
        ],
        expenses,
        items: HashMap::from([
            ("filter".to_string(), "Air filter".to_string()),
            ("bulb".to_string(), "Light bulb".to_string()),
        ]),
        period: ReportPeriod { month: 10, year: 2026 },
    }
}

/// A short page so the first group's table cannot fit on one page.
/// On A4 the 11-row group moves whole to page 2 and never splits.
fn short_layout() -> PageLayout {
    PageLayout {
        height: 400.0,
        min_section_height: 120.0,
        ..PageLayout::default()
    }
}

fn sections(doc: &Document) -> Vec<Vec<String>> {
    doc.pages().iter().map(|p| p.sections.clone()).collect()
}

#[test]
fn test_acme_scenario() {
    let ctx = acme_context();
    let doc = render_document(&ctx, &Theme::default(), &short_layout(), generated_at(9));

    let group_sections: Vec<String> = sections(&doc)
        .into_iter()
        .flatten()
        .filter(|s| s.starts_with("group:") && !s.ends_with("(continued)"))
        .collect();
    assert_eq!(group_sections, vec!["group:Acme Group 1", "group:Acme Group 2"]);

    let first_group_page = doc
        .pages()
        .iter()
        .position(|p| p.sections.iter().any(|s| s == "group:Acme Group 1"))
        .unwrap();
    let first_continuation = doc
        .pages()
        .iter()
        .position(|p| p.texts().any(|t| t.ends_with("(continued)")))
        .unwrap();
    assert_eq!(first_continuation, first_group_page + 1);
    assert!(doc.pages()[first_continuation]
        .texts()
        .any(|t| t == "Acme Group 1 (continued)"));

    let count = doc.page_count();
    for (index, page) in doc.pages().iter().enumerate() {
        let footer = format!("Page {} of {}", index + 1, count);
        assert!(page.texts().any(|t| t == footer), "page {} has no footer", index + 1);
    }
}

#[test]
fn test_pagination_is_idempotent() {
    let ctx = acme_context();
    let layout = short_layout();

    let first = render_document(&ctx, &Theme::default(), &layout, generated_at(9));
    let second = render_document(&ctx, &Theme::default(), &layout, generated_at(9));
    assert_eq!(first, second);

    let later = render_document(&ctx, &Theme::default(), &layout, generated_at(17));
    assert_eq!(first.page_count(), later.page_count());
    assert_eq!(sections(&first), sections(&later));
}

#[test]
fn test_group_subtotals_match_document_total() {
    let ctx = load_context(Path::new("tests/fixtures/acme.json")).unwrap();
    let groups = group_expenses(&ctx);
    assert_eq!(groups.len(), 3);

    for group in &groups {
        let sum: f64 = group.expenses.iter().map(|e| e.cost).sum();
        assert!((group.subtotal - sum).abs() < 1e-9);
    }

    let totals = ReportTotals::from_groups(&groups);
    let by_group: f64 = groups.iter().map(|g| g.subtotal).sum();
    let by_record: f64 = ctx.expenses.iter().map(|e| e.cost).sum();
    assert!((totals.total_cost - by_group).abs() < 1e-9);
    assert!((totals.total_cost - by_record).abs() < 1e-9);
    assert_eq!(totals.expense_count, ctx.expenses.len());

    let doc = render_document(&ctx, &Theme::default(), &PageLayout::default(), generated_at(9));
    let texts: Vec<String> = doc.pages().iter().flat_map(|p| p.texts().map(str::to_string)).collect();
    assert!(texts.iter().any(|t| t == "$477.50"), "document total missing");
    assert!(texts.iter().any(|t| t == "Property total: $367.50"));
    assert!(texts.iter().any(|t| t == "Unknown Property"));
    assert!(texts.iter().any(|t| t == "N/A"));
}

#[tokio::test]
async fn test_generate_report_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path().join("temp_reports")).unwrap();

    let path = writer.generate_report(acme_context()).await.unwrap();
    assert!(path.starts_with(writer.output_dir()));
    assert_eq!(path.extension().unwrap(), "pdf");

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 1000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reports_never_collide() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path()).unwrap();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let writer = writer.clone();
            tokio::spawn(async move { writer.generate_report(acme_context()).await })
        })
        .collect();

    let mut paths = HashSet::new();
    for handle in handles {
        let path = handle.await.unwrap().unwrap();
        assert!(path.exists());
        paths.insert(path);
    }
    assert_eq!(paths.len(), 6);
}

#[tokio::test]
async fn test_write_failure_rejects_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("gone");
    let writer = ReportWriter::new(&output_dir).unwrap();
    std::fs::remove_dir(&output_dir).unwrap();

    let err = writer.generate_report(acme_context()).await.unwrap_err();
    assert!(matches!(err, ReportError::Write { .. }), "unexpected error {:?}", err);
    assert!(!output_dir.exists());
}
