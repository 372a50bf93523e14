// ============================================================================
// Text Layout and Formatting
// ============================================================================

use once_cell::sync::Lazy;
use regex::Regex;

/// Numbers with an optional currency prefix or percent suffix: "$1,200.50", "12", "7.5%"
static NUMERIC_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?[$€£]?\s*-?[\d,]*\d(\.\d+)?\s*%?$").unwrap());

/// Labels longer than this are cut down to `LABEL_KEEP_CHARS` plus an ellipsis
const LABEL_MAX_CHARS: usize = 10;
const LABEL_KEEP_CHARS: usize = 8;

/// Approximate Helvetica advance width of `c` in 1/1000 em
fn char_width_units(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' | 'I' => 278.0,
        ' ' | 'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '/' | '-' => 333.0,
        'm' | 'M' | 'W' => 833.0,
        'w' | '%' => 722.0,
        '0'..='9' | '$' => 556.0,
        'A'..='Z' => 667.0,
        'a'..='z' => 520.0,
        _ => 556.0,
    }
}

/// Estimated rendered width of `text` in points
pub fn text_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let units: f32 = text.chars().map(char_width_units).sum();
    let weight = if bold { 1.05 } else { 1.0 };
    units * font_size / 1000.0 * weight
}

/// Greedy word wrap into lines no wider than `max_width`.
///
/// Words wider than a full line are split by character. Always returns at
/// least one line.
pub fn wrap_text(text: &str, max_width: f32, font_size: f32, bold: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, font_size, bold) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, font_size, bold) <= max_width {
            current = word.to_string();
        } else {
            for c in word.chars() {
                let mut next = current.clone();
                next.push(c);
                if !current.is_empty() && text_width(&next, font_size, bold) > max_width {
                    lines.push(std::mem::replace(&mut current, c.to_string()));
                } else {
                    current = next;
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cut a category label to 8 characters plus "..." when it exceeds 10
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > LABEL_MAX_CHARS {
        let kept: String = label.chars().take(LABEL_KEEP_CHARS).collect();
        format!("{}...", kept)
    } else {
        label.to_string()
    }
}

/// Whether a display cell looks like a money, quantity or percent figure
pub fn is_numeric_cell(cell: &str) -> bool {
    NUMERIC_CELL.is_match(cell.trim())
}

/// "$1,234.56" with thousands separators. Non-finite values format as zero.
pub fn format_currency(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(f) => format!("{}${}.{}", sign, grouped, f),
        None => format!("{}${}", sign, grouped),
    }
}

/// Percentage with one decimal place, e.g. "50.0". Non-finite values format as zero.
pub fn format_percent(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{:.1}", value)
}

/// Quantity without trailing zeros: "3", "2.5"
pub fn format_quantity(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let formatted = format!("{:.2}", value);
    formatted.trim_end_matches('0').trim_end_matches('.').to_string()
}
