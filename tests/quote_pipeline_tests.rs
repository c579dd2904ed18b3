//! End-to-end tests for the quote pipeline: builder -> templates -> renderer.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use tidewater_crm_server::project::models::Project;
use tidewater_crm_server::quote::document::{self, QuoteContext, QuoteFormat};
use tidewater_crm_server::quote::{build_items, EstimateData, TemplateSet};

fn test_project() -> Project {
    Project {
        id: Uuid::new_v4(),
        opportunity_number: Some("OPP-100".to_string()),
        name: "MV Seaway".to_string(),
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

fn estimate(value: serde_json::Value) -> EstimateData {
    EstimateData::from_value(&value)
}

#[test]
fn test_empty_estimate_end_to_end() {
    let project = test_project();
    let items = build_items(&project, &estimate(json!({})), &TemplateSet::empty());

    // Exactly one pump line, defaulted to one pump
    let pumps: Vec<_> = items.iter().filter(|i| i.kind == "Pump").collect();
    assert_eq!(pumps.len(), 1);
    assert_eq!(pumps[0].qty, 1);

    // Always-present lines
    assert!(items.iter().any(|i| i.kind == "Tools set"));
    let startup = items
        .iter()
        .find(|i| i.kind == "Commissioning")
        .expect("commissioning line");
    assert!(startup.description.contains("3-working days"));
    assert!(startup.description.contains("1-man"));

    // Total price follows price-per-vessel x vessel count
    assert_eq!(project.total_price(), 100_000.0);
    let text = String::from_utf8(
        document::render(&project, &items, &QuoteContext::default(), QuoteFormat::Text).buffer,
    )
    .unwrap();
    assert!(text.contains("Total price: USD 100000"));
}

#[test]
fn test_builder_is_pure() {
    let project = test_project();
    let data = estimate(json!({
        "pump_type": "RBP-250",
        "starter_type": "VFD",
        "line_items": [
            {"category": "valve", "model": "Wafer DN200", "qty": 2, "acting": "single"},
            {"category": "valve", "model": "Lug DN150", "qty": 1, "acting": "double"},
        ],
        "class_society": "DNV",
    }));
    let templates = TemplateSet::empty();

    let first = build_items(&project, &data, &templates);
    let second = build_items(&project, &data, &templates);
    assert_eq!(first, second);
}

#[test]
fn test_double_acting_only_valve_aggregation() {
    let project = test_project();
    let data = estimate(json!({
        "line_items": [
            {"category": "valve", "model": "Wafer DN200", "qty": 2, "acting": "double"},
            {"category": "valve", "model": "Wafer DN250", "qty": 4, "acting": "double"},
        ],
    }));
    let items = build_items(&project, &data, &TemplateSet::empty());

    let valves: Vec<_> = items.iter().filter(|i| i.kind == "Valves").collect();
    assert_eq!(valves.len(), 1);
    assert_eq!(valves[0].qty, 6);
    assert!(valves[0].description.contains("double acting"));
    assert!(!valves[0].description.contains("single acting"));
}

#[test]
fn test_mixed_acting_modes_combine_into_one_line() {
    let project = test_project();
    let data = estimate(json!({
        "line_items": [
            {"category": "valve", "model": "Wafer DN200", "qty": 2, "acting": "single"},
            {"category": "valve", "model": "Semi-lug DN150", "qty": 3, "acting": "double"},
        ],
    }));
    let items = build_items(&project, &data, &TemplateSet::empty());

    let valves: Vec<_> = items.iter().filter(|i| i.kind == "Valves").collect();
    assert_eq!(valves.len(), 1);
    assert!(valves[0].description.contains("2 pcs single acting"));
    assert!(valves[0].description.contains("3 pcs double acting"));
    assert!(valves[0].description.contains("Wafer valve"));
    assert!(valves[0].description.contains("Semi-lug valve"));
}

#[test]
fn test_vfd_starter_without_template_dictionary() {
    let project = test_project();
    let data = estimate(json!({"starter_type": "VFD"}));
    let items = build_items(&project, &data, &TemplateSet::empty());

    let starter = items.iter().find(|i| i.kind == "Starter").unwrap();
    assert!(starter.description.contains("VFD"));
}

#[test]
fn test_starter_template_overrides_fallback() {
    let mut map = HashMap::new();
    map.insert(
        "starter_vfd".to_string(),
        "Customer-specific VFD cabinet".to_string(),
    );
    let templates = TemplateSet::new(map);

    let project = test_project();
    let data = estimate(json!({"starter_type": "VFD starter"}));
    let items = build_items(&project, &data, &templates);

    let starter = items.iter().find(|i| i.kind == "Starter").unwrap();
    assert_eq!(starter.description, "Customer-specific VFD cabinet");
}

#[test]
fn test_pump_quantity_priority_chain() {
    let mut project = test_project();
    project.pumps_per_vessel = Some(3);

    // Project field wins when the estimate is silent
    let items = build_items(&project, &estimate(json!({})), &TemplateSet::empty());
    assert_eq!(items.iter().find(|i| i.kind == "Pump").unwrap().qty, 3);

    // Estimate-level quantity wins over the project field
    let items = build_items(
        &project,
        &estimate(json!({"pump_qty": 2})),
        &TemplateSet::empty(),
    );
    assert_eq!(items.iter().find(|i| i.kind == "Pump").unwrap().qty, 2);

    // Explicit pump rows win over everything
    let items = build_items(
        &project,
        &estimate(json!({"pump_qty": 2, "line_items": [{"category": "pump", "qty": 4}]})),
        &TemplateSet::empty(),
    );
    assert_eq!(items.iter().find(|i| i.kind == "Pump").unwrap().qty, 4);
}

#[test]
fn test_generated_items_always_valid() {
    let project = test_project();
    let data = estimate(json!({
        "pump_type": "RBP-600",
        "starter_type": "soft",
        "level_switch_qty": 2,
        "class_society": "Lloyd's Register",
        "class_bracket": "heeling bracket",
        "line_items": [
            {"category": "valve", "model": "Double flange DN300", "qty": 2},
            {"category": "valve", "model": "DN100", "qty": 1, "actuation": "electric"},
        ],
        "commissioning": {"extra_days": 1},
    }));
    let items = build_items(&project, &data, &TemplateSet::empty());

    for item in &items {
        assert!(item.qty > 0, "{} has non-positive qty", item.kind);
        assert!(
            !item.description.trim().is_empty(),
            "{} has empty description",
            item.kind
        );
    }

    // Two actuation families stay separate lines
    assert_eq!(items.iter().filter(|i| i.kind == "Valves").count(), 2);
    assert!(items
        .iter()
        .any(|i| i.kind == "Commissioning" && i.description.contains("4-working days")));
}
