//! Quote document rendering.
//!
//! Linear fallback chain: DOCX template fill -> programmatic DOCX -> plain
//! text. A failing stage is logged and treated as unavailable; the plain-text
//! stage cannot fail, so a buffer is always produced.

pub mod docx;
pub mod docx_template;
pub mod text;

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::project::models::Project;

use super::models::LineItem;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";

/// Requested output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuoteFormat {
    #[default]
    Docx,
    Text,
}

/// A produced artifact, ready to persist and serve.
#[derive(Debug)]
pub struct RenderedDocument {
    pub buffer: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

/// Request-scoped rendering context: quote date plus the contact and
/// signature fields bound into the document template.
#[derive(Debug, Clone, Default)]
pub struct QuoteContext {
    pub date: Option<NaiveDate>,
    pub prepared_by: Option<String>,
    pub contact_name: Option<String>,
    pub company_name: Option<String>,
}

impl QuoteContext {
    pub fn date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Render a quote document, falling back stage by stage.
pub fn render(
    project: &Project,
    items: &[LineItem],
    ctx: &QuoteContext,
    format: QuoteFormat,
) -> RenderedDocument {
    if format == QuoteFormat::Docx {
        let fields = field_map(project, items, ctx);
        match docx_template::fill_from_dir(&template_dir(), &fields) {
            Ok(buffer) => {
                return RenderedDocument {
                    buffer,
                    filename: quote_filename(project, ctx.date(), "docx"),
                    mime_type: DOCX_MIME.to_string(),
                }
            }
            Err(e) => log::warn!("DOCX template stage unavailable: {e}"),
        }

        match docx::build(project, items, ctx) {
            Ok(buffer) => {
                return RenderedDocument {
                    buffer,
                    filename: quote_filename(project, ctx.date(), "docx"),
                    mime_type: DOCX_MIME.to_string(),
                }
            }
            Err(e) => log::warn!("programmatic DOCX stage unavailable: {e}"),
        }
    }

    let body = text::build(project, items, ctx);
    RenderedDocument {
        buffer: body.into_bytes(),
        filename: quote_filename(project, ctx.date(), "txt"),
        mime_type: TEXT_MIME.to_string(),
    }
}

/// Directory holding pre-authored quote templates.
fn template_dir() -> PathBuf {
    env::var("QUOTE_TEMPLATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/templates")))
}

/// Flattened field map bound into the DOCX template placeholders.
pub fn field_map(
    project: &Project,
    items: &[LineItem],
    ctx: &QuoteContext,
) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    fields.insert("date".to_string(), ctx.date().format("%Y-%m-%d").to_string());
    fields.insert("project_name".to_string(), project.name.clone());
    fields.insert(
        "opportunity_number".to_string(),
        project.opportunity_number.clone().unwrap_or_default(),
    );
    fields.insert(
        "vessel_size".to_string(),
        project.vessel_size.clone().unwrap_or_default(),
    );
    fields.insert(
        "vessel_type".to_string(),
        project.vessel_type.clone().unwrap_or_default(),
    );
    fields.insert("vessel_spec".to_string(), vessel_spec(project));
    fields.insert(
        "currency".to_string(),
        project.currency.clone().unwrap_or_default(),
    );
    fields.insert(
        "price_per_vessel".to_string(),
        format_amount(project.price_per_vessel.unwrap_or(0.0)),
    );
    fields.insert(
        "number_of_vessels".to_string(),
        project.number_of_vessels.unwrap_or(1).to_string(),
    );
    fields.insert("total_price".to_string(), format_amount(project.total_price()));
    fields.insert("scope_of_supply".to_string(), scope_of_supply(items));
    fields.insert(
        "contact_name".to_string(),
        ctx.contact_name.clone().unwrap_or_default(),
    );
    fields.insert(
        "company_name".to_string(),
        ctx.company_name.clone().unwrap_or_default(),
    );
    fields.insert(
        "prepared_by".to_string(),
        ctx.prepared_by.clone().unwrap_or_default(),
    );
    fields.insert("notes".to_string(), project.notes.clone().unwrap_or_default());
    fields.insert(
        "shipping_terms".to_string(),
        project.shipping_terms.clone().unwrap_or_default(),
    );
    fields
}

/// Item list flattened to one line per row for template binding.
fn scope_of_supply(items: &[LineItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} {} {}", item.qty, item.unit, item.description))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn vessel_spec(project: &Project) -> String {
    match (&project.vessel_type, &project.vessel_size) {
        (Some(t), Some(s)) => format!("{t} {s}"),
        (Some(t), None) => t.clone(),
        (None, Some(s)) => s.clone(),
        (None, None) => String::new(),
    }
}

/// `<Quote|Quote_Anti-Heeling><_Opp-N>_<name>_<YYYY-MM-DD>.<ext>`
pub fn quote_filename(project: &Project, date: NaiveDate, ext: &str) -> String {
    let mut name = if project.is_anti_heeling() {
        "Quote_Anti-Heeling".to_string()
    } else {
        "Quote".to_string()
    };
    if let Some(opp) = project
        .opportunity_number
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        name.push_str("_Opp-");
        name.push_str(&sanitize_component(opp));
    }
    name.push('_');
    name.push_str(&sanitize_component(&project.name));
    name.push('_');
    name.push_str(&date.format("%Y-%m-%d").to_string());
    name.push('.');
    name.push_str(ext);
    name
}

/// Every character outside `[A-Za-z0-9-_]` becomes an underscore.
pub fn sanitize_component(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Amounts print without a trailing ".0"; fractional values keep two decimals.
pub fn format_amount(value: f64) -> String {
    if (value - value.round()).abs() < 0.005 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.2}")
    }
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
            name: "Acme/Corp: Ferry #2".to_string(),
            project_type: "anti_heeling".to_string(),
            status: "open".to_string(),
            company_id: None,
            contact_id: None,
            currency: Some("USD".to_string()),
            price_per_vessel: Some(50_000.0),
            number_of_vessels: Some(2),
            pumps_per_vessel: None,
            flow_capacity: None,
            flow_head: None,
            flow_power: None,
            vessel_size: None,
            vessel_type: None,
            notes: None,
            shipping_terms: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sanitize_component_replaces_everything_else() {
        let sanitized = sanitize_component("Acme/Corp: Ferry #2");
        assert!(sanitized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(sanitized.starts_with("Acme_Corp"));
        assert!(sanitized.ends_with("Ferry__2"));
    }

    #[test]
    fn test_quote_filename_shape() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let filename = quote_filename(&project(), date, "docx");
        assert!(filename.starts_with("Quote_Anti-Heeling_Opp-OPP-100_"));
        assert!(filename.ends_with("_2026-03-14.docx"));
        assert!(filename.contains("Ferry__2"));
    }

    #[test]
    fn test_plain_quote_prefix_for_general_projects() {
        let mut p = project();
        p.project_type = "general".to_string();
        p.opportunity_number = None;
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let filename = quote_filename(&p, date, "txt");
        assert!(filename.starts_with("Quote_"));
        assert!(!filename.contains("Anti-Heeling"));
        assert!(!filename.contains("Opp-"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(100_000.0), "100000");
        assert_eq!(format_amount(1234.5), "1234.50");
    }

    #[test]
    fn test_render_falls_back_to_text_without_templates() {
        // No template directory and no writable stage assumptions: the chain
        // must still terminate with a buffer.
        std::env::set_var("QUOTE_TEMPLATE_DIR", "/nonexistent-template-dir");
        let items = vec![LineItem::new("Pump", 1, "pcs", "Test pump".to_string())];
        let doc = render(&project(), &items, &QuoteContext::default(), QuoteFormat::Text);
        assert_eq!(doc.mime_type, TEXT_MIME);
        assert!(!doc.buffer.is_empty());
        assert!(doc.filename.ends_with(".txt"));
    }

    #[test]
    fn test_field_map_totals() {
        let fields = field_map(&project(), &[], &QuoteContext::default());
        assert_eq!(fields["total_price"], "100000");
        assert_eq!(fields["number_of_vessels"], "2");
        assert_eq!(fields["currency"], "USD");
    }
}
