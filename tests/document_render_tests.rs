//! Tests for the document renderer fallback chain and output naming.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use tidewater_crm_server::project::models::Project;
use tidewater_crm_server::quote::document::{
    quote_filename, render, sanitize_component, QuoteContext, QuoteFormat, DOCX_MIME, TEXT_MIME,
};
use tidewater_crm_server::quote::LineItem;

fn test_project() -> Project {
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
        flow_capacity: Some(450.0),
        flow_head: Some(12.0),
        flow_power: Some(45.0),
        vessel_size: Some("180m".to_string()),
        vessel_type: Some("RoPax".to_string()),
        notes: None,
        shipping_terms: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_items() -> Vec<LineItem> {
    vec![
        LineItem::new("Pump", 2, "pcs", "Anti-heeling pump RBP-250".to_string()),
        LineItem::new("Tools set", 1, "set", "Tools, manuals, certificates".to_string()),
    ]
}

/// Point the renderer at a directory that cannot hold templates, so the
/// template stage always falls through. All tests that exercise the DOCX
/// chain share the same value to stay parallel-safe.
fn without_template_dir() {
    std::env::set_var("QUOTE_TEMPLATE_DIR", "/nonexistent-quote-templates");
}

#[test]
fn test_filename_sanitization_property() {
    let sanitized = sanitize_component("Acme/Corp: Ferry #2");
    assert!(
        sanitized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
        "unexpected character in {sanitized}"
    );
    assert!(sanitized.contains("Acme_Corp"));
    assert!(sanitized.contains("Ferry__2"));
}

#[test]
fn test_quote_filename_parts() {
    let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
    let filename = quote_filename(&test_project(), date, "docx");
    assert!(filename.starts_with("Quote_Anti-Heeling_Opp-OPP-100_"));
    assert!(filename.ends_with("_2026-08-01.docx"));
}

#[test]
fn test_docx_request_falls_back_to_programmatic_stage() {
    without_template_dir();
    let doc = render(
        &test_project(),
        &test_items(),
        &QuoteContext::default(),
        QuoteFormat::Docx,
    );
    // The programmatic stage produced a zip container
    assert_eq!(doc.mime_type, DOCX_MIME);
    assert_eq!(&doc.buffer[..2], b"PK");
    assert!(doc.filename.ends_with(".docx"));
}

#[test]
fn test_text_format_renders_directly() {
    without_template_dir();
    let doc = render(
        &test_project(),
        &test_items(),
        &QuoteContext::default(),
        QuoteFormat::Text,
    );
    assert_eq!(doc.mime_type, TEXT_MIME);
    assert!(doc.filename.ends_with(".txt"));

    let text = String::from_utf8(doc.buffer).unwrap();
    assert!(text.contains("QUOTATION - ANTI-HEELING SYSTEM"));
    assert!(text.contains("Opportunity: OPP-100"));
    assert!(text.contains("Total price: USD 100000"));
    assert!(text.contains("Anti-heeling pump RBP-250"));
}

#[test]
fn test_render_always_terminates_with_a_buffer() {
    without_template_dir();
    // Even a project with nothing filled in must produce a document.
    let mut bare = test_project();
    bare.opportunity_number = None;
    bare.currency = None;
    bare.price_per_vessel = None;
    bare.number_of_vessels = None;
    bare.vessel_size = None;
    bare.vessel_type = None;
    bare.flow_capacity = None;
    bare.flow_head = None;
    bare.flow_power = None;

    for format in [QuoteFormat::Docx, QuoteFormat::Text] {
        let doc = render(&bare, &[], &QuoteContext::default(), format);
        assert!(!doc.buffer.is_empty());
        assert!(!doc.filename.is_empty());
    }
}

#[test]
fn test_explicit_quote_date_is_used() {
    without_template_dir();
    let ctx = QuoteContext {
        date: Some(NaiveDate::from_ymd_opt(2025, 12, 24).unwrap()),
        ..QuoteContext::default()
    };
    let doc = render(&test_project(), &test_items(), &ctx, QuoteFormat::Text);
    assert!(doc.filename.contains("_2025-12-24."));
    let text = String::from_utf8(doc.buffer).unwrap();
    assert!(text.contains("Date: 2025-12-24"));
}
