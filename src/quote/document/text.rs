//! Plain-text terminal fallback.
//!
//! Formatted multi-line block: title, header line, fixed-width columnar item
//! table with greedy word-wrap of description cells, total price, and
//! optional notes/flow/shipping/startup sections. Always succeeds.

use crate::project::models::Project;
use crate::quote::models::LineItem;

use super::{format_amount, vessel_spec, QuoteContext};

/// Greedy word-wrap width for description cells.
pub const WRAP_WIDTH: usize = 100;

const POS_W: usize = 4;
const QTY_W: usize = 5;
const UNIT_W: usize = 6;

pub fn build(project: &Project, items: &[LineItem], ctx: &QuoteContext) -> String {
    let mut out = String::new();

    let title = if project.is_anti_heeling() {
        "QUOTATION - ANTI-HEELING SYSTEM"
    } else {
        "QUOTATION"
    };
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(title.len()));
    out.push_str("\n\n");

    out.push_str(&format!("Project: {}\n", project.name));
    let mut header = Vec::new();
    if let Some(opp) = project
        .opportunity_number
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        header.push(format!("Opportunity: {opp}"));
    }
    let spec = vessel_spec(project);
    if !spec.is_empty() {
        header.push(format!("Vessel: {spec}"));
    }
    header.push(format!("Date: {}", ctx.date().format("%Y-%m-%d")));
    out.push_str(&header.join(" | "));
    out.push_str("\n\n");

    out.push_str(&row("Pos", "Qty", "Unit", "Description"));
    out.push_str(&"-".repeat(POS_W + QTY_W + UNIT_W + WRAP_WIDTH));
    out.push('\n');

    for (index, item) in items.iter().enumerate() {
        let wrapped = wrap(&item.description, WRAP_WIDTH);
        for (line_no, line) in wrapped.iter().enumerate() {
            if line_no == 0 {
                out.push_str(&row(
                    &(index + 1).to_string(),
                    &item.qty.to_string(),
                    &item.unit,
                    line,
                ));
            } else {
                out.push_str(&row("", "", "", line));
            }
        }
    }
    out.push('\n');

    out.push_str(&format!(
        "Total price: {} {}\n",
        project.currency.as_deref().unwrap_or(""),
        format_amount(project.total_price())
    ));

    if let Some(notes) = project.notes.as_deref().filter(|s| !s.is_empty()) {
        out.push_str("\nNotes:\n");
        for line in wrap(notes, WRAP_WIDTH) {
            out.push_str(&format!("  {line}\n"));
        }
    }

    if let Some(flow) = flow_section(project) {
        out.push_str(&format!("\nFlow specification: {flow}\n"));
    }

    if let Some(shipping) = project.shipping_terms.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("\nShipping: {shipping}\n"));
    }

    if let Some(startup) = items
        .iter()
        .find(|i| i.kind == "Commissioning")
        .map(|i| i.description.as_str())
    {
        out.push_str(&format!("\nStart-up: {startup}\n"));
    }

    out
}

fn row(pos: &str, qty: &str, unit: &str, description: &str) -> String {
    format!(
        "{pos:<pw$}{qty:<qw$}{unit:<uw$}{description}\n",
        pw = POS_W,
        qw = QTY_W,
        uw = UNIT_W,
    )
}

fn flow_section(project: &Project) -> Option<String> {
    let capacity = project.flow_capacity?;
    let mut text = format!("{} m3/h", format_amount(capacity));
    if let Some(head) = project.flow_head {
        text.push_str(&format!(" at {} m head", format_amount(head)));
    }
    if let Some(power) = project.flow_power {
        text.push_str(&format!(", {} kW", format_amount(power)));
    }
    Some(text)
}

/// Greedy word-wrap. A word longer than `width` gets its own line.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn project() -> Project {
        Project {
            id: Uuid::new_v4(),
            opportunity_number: Some("OPP-100".to_string()),
            name: "MV Test".to_string(),
            project_type: "general".to_string(),
            status: "open".to_string(),
            company_id: None,
            contact_id: None,
            currency: Some("USD".to_string()),
            price_per_vessel: Some(50_000.0),
            number_of_vessels: Some(2),
            pumps_per_vessel: None,
            flow_capacity: Some(450.0),
            flow_head: Some(12.0),
            flow_power: None,
            vessel_size: Some("180m".to_string()),
            vessel_type: Some("RoPax".to_string()),
            notes: Some("Delivery 16 weeks after order".to_string()),
            shipping_terms: Some("FCA factory".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "word ".repeat(50);
        for line in wrap(&text, 20) {
            assert!(line.len() <= 20);
        }
    }

    #[test]
    fn test_wrap_keeps_long_word_on_own_line() {
        let lines = wrap("short averyveryverylongwordthatoverflows short", 10);
        assert_eq!(lines[0], "short");
        assert_eq!(lines[1], "averyveryverylongwordthatoverflows");
        assert_eq!(lines[2], "short");
    }

    #[test]
    fn test_long_descriptions_are_wrapped_in_table() {
        let long = "valve ".repeat(40);
        let items = vec![LineItem::new("Valves", 3, "pcs", long)];
        let text = build(&project(), &items, &QuoteContext::default());
        let table_lines: Vec<&str> = text
            .lines()
            .filter(|l| l.contains("valve"))
            .collect();
        assert!(table_lines.len() > 1);
        for line in table_lines {
            assert!(line.len() <= POS_W + QTY_W + UNIT_W + WRAP_WIDTH);
        }
    }

    #[test]
    fn test_sections_present() {
        let items = vec![
            LineItem::new("Pump", 1, "pcs", "Test pump".to_string()),
            LineItem::new(
                "Commissioning",
                1,
                "lot",
                "Start-up and commissioning assistance on board: 3-working days, 1-man".to_string(),
            ),
        ];
        let text = build(&project(), &items, &QuoteContext::default());
        assert!(text.contains("Total price: USD 100000"));
        assert!(text.contains("Opportunity: OPP-100"));
        assert!(text.contains("Vessel: RoPax 180m"));
        assert!(text.contains("Notes:"));
        assert!(text.contains("Flow specification: 450 m3/h at 12 m head"));
        assert!(text.contains("Shipping: FCA factory"));
        assert!(text.contains("Start-up:"));
    }

    #[test]
    fn test_empty_items_still_render() {
        let text = build(&project(), &[], &QuoteContext::default());
        assert!(text.contains("QUOTATION"));
        assert!(text.contains("Total price"));
    }
}
