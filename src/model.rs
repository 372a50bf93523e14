// ============================================================================
// Report Data Model
// ============================================================================

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

/// Owner of the properties covered by a report
#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// A listing belonging to the owner
#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub kind: String,
}

/// One expense booked against a property during the period
#[derive(Debug, Clone, Deserialize)]
pub struct Expense {
    pub id: String,
    pub property_id: String,
    /// Inventory item the expense was spent on, if any
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit_cost: f64,
    pub cost: f64,
    /// Amount billed to the owner, already including any markup
    #[serde(default)]
    pub billed: f64,
}

fn default_quantity() -> f64 {
    1.0
}

/// Calendar month the report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReportPeriod {
    pub month: u32,
    pub year: i32,
}

impl ReportPeriod {
    /// "October 2026", or "10/2026" when the month is out of range
    pub fn label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(date) => date.format("%B %Y").to_string(),
            None => format!("{}/{}", self.month, self.year),
        }
    }
}

/// Everything needed to render one owner report
#[derive(Debug, Clone, Deserialize)]
pub struct ReportContext {
    pub owner: Owner,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Inventory item id -> display name
    #[serde(default)]
    pub items: HashMap<String, String>,
    pub period: ReportPeriod,
}

impl ReportContext {
    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn item_name(&self, id: Option<&str>) -> Option<&str> {
        id.and_then(|id| self.items.get(id)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_label() {
        let period = ReportPeriod { month: 10, year: 2026 };
        assert_eq!(period.label(), "October 2026");

        let bad = ReportPeriod { month: 13, year: 2026 };
        assert_eq!(bad.label(), "13/2026");
    }

    #[test]
    fn test_context_from_json() {
        let json = r#"{
            "owner": { "id": "o1", "name": "Acme Owner" },
            "properties": [{ "id": "p1", "name": "Harbor Loft" }],
            "expenses": [{
                "id": "e1", "property_id": "p1", "item_id": "i1",
                "date": "2026-10-02", "cost": 120.5
            }],
            "items": { "i1": "Water heater" },
            "period": { "month": 10, "year": 2026 }
        }"#;
        let ctx: ReportContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.owner.email, "");
        assert_eq!(ctx.expenses[0].quantity, 1.0);
        assert_eq!(ctx.item_name(Some("i1")), Some("Water heater"));
        assert_eq!(ctx.item_name(Some("missing")), None);
        assert_eq!(ctx.item_name(None), None);
        assert_eq!(ctx.property("p1").map(|p| p.name.as_str()), Some("Harbor Loft"));
    }
}
