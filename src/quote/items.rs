//! Quote item builder.
//!
//! Pure transformation from a project plus its estimate data into the ordered
//! bill-of-materials. Missing or malformed estimate fields degrade to
//! defaults; the builder never fails.

use std::collections::HashMap;

use crate::project::models::Project;

use super::classify::{ActingMode, Actuation, StarterKind, ValveModel};
use super::estimate::{EstimateData, EstimateLineItem};
use super::models::LineItem;
use super::templates::TemplateSet;

/// Pump model codes with a dedicated description template.
const KNOWN_PUMP_MODELS: &[&str] = &[
    "RBP-250", "RBP-300", "RBP-400", "RBP-600", "SBP-150", "SBP-200",
];

const DAYS_INCLUDED: i32 = 3;

/// Build the ordered line-item list for a quote.
///
/// Emission order: pump, control system, starter, valves (pneumatic then
/// electric), level switches, class certification, tools set, commissioning.
/// The last two are always present.
pub fn build_items(
    project: &Project,
    estimate: &EstimateData,
    templates: &TemplateSet,
) -> Vec<LineItem> {
    let mut items = Vec::new();

    let pump_qty = resolve_pump_qty(project, estimate);
    if pump_qty > 0 {
        let mut line = LineItem::new(
            "Pump",
            pump_qty,
            "pcs",
            pump_description(project, estimate, templates),
        );
        line.capacity = project.flow_capacity;
        line.head = project.flow_head;
        items.push(line);
    }

    let control_qty = estimate.control.qty.unwrap_or(1);
    if control_qty > 0 {
        items.push(LineItem::new(
            "Control system",
            control_qty,
            "set",
            control_description(estimate),
        ));
    }

    let starter_qty = resolve_starter_qty(estimate, pump_qty);
    if starter_qty > 0 {
        items.push(LineItem::new(
            "Starter",
            starter_qty,
            "pcs",
            starter_description(estimate, templates),
        ));
    }

    items.extend(valve_lines(estimate, templates));

    let switch_qty = resolve_level_switch_qty(estimate);
    if switch_qty > 0 {
        let description = templates
            .fill("level_switch", &HashMap::new())
            .unwrap_or_else(|| {
                "Level switches for tank mounting, incl. cabling to control system".to_string()
            });
        items.push(LineItem::new("Level switch", switch_qty, "pcs", description));
    }

    if let Some(line) = class_certification_line(estimate, templates) {
        items.push(line);
    }

    items.push(LineItem::new(
        "Tools set",
        1,
        "set",
        "Tools, instruction manuals and certificates".to_string(),
    ));
    items.push(commissioning_line(estimate));

    items
}

/// Quantity priority: pump rows in the estimate line items, then the
/// estimate-level field, then the project's pumps-per-vessel, then 1.
fn resolve_pump_qty(project: &Project, estimate: &EstimateData) -> i32 {
    sum_category(&estimate.line_items, "pump")
        .or(estimate.pump_qty)
        .or(project.pumps_per_vessel)
        .unwrap_or(1)
}

fn resolve_starter_qty(estimate: &EstimateData, pump_qty: i32) -> i32 {
    sum_category(&estimate.line_items, "starter")
        .or(estimate.starter_qty)
        .unwrap_or(pump_qty)
}

fn resolve_level_switch_qty(estimate: &EstimateData) -> i32 {
    estimate
        .level_switch_qty
        .or_else(|| sum_category(&estimate.line_items, "level_switch"))
        .unwrap_or(0)
}

/// Summed quantity of matching rows, or `None` when no row matches.
fn sum_category(rows: &[EstimateLineItem], category: &str) -> Option<i32> {
    let matching: Vec<&EstimateLineItem> =
        rows.iter().filter(|r| r.category_is(category)).collect();
    if matching.is_empty() {
        None
    } else {
        Some(matching.iter().map(|r| r.quantity()).sum())
    }
}

fn pump_description(
    project: &Project,
    estimate: &EstimateData,
    templates: &TemplateSet,
) -> String {
    let model = estimate.pump_type.as_deref().unwrap_or("");

    if let Some(key) = pump_template_key(model) {
        let vars = pump_template_vars(project, estimate);
        if let Some(description) = templates.fill(&key, &vars) {
            return description;
        }
    }

    // Inline fallback assembled from the flow spec and motor data.
    let mut description = String::from("Anti-heeling pump");
    if !model.is_empty() {
        description.push_str(&format!(" {model}"));
    }
    description.push_str(", reversible");
    if let Some(capacity) = project.flow_capacity {
        description.push_str(&format!(", {} m3/h", fmt_num(capacity)));
        if let Some(head) = project.flow_head {
            description.push_str(&format!(" at {} m head", fmt_num(head)));
        }
    }
    if let Some(power) = project.flow_power {
        let variant = estimate.motor_variant.as_deref().unwrap_or("IE3");
        description.push_str(&format!(", {} kW {} motor", fmt_num(power), variant));
    }
    let enclosure = estimate.enclosure_rating.as_deref().unwrap_or("IP55");
    description.push_str(&format!(", {enclosure} enclosure"));
    let voltage = estimate.supply_voltage.as_deref().unwrap_or("440V/60Hz");
    description.push_str(&format!(", {voltage} supply"));
    if estimate.counter_flanges {
        description.push_str(", incl. counter flanges");
    }
    if estimate.manometer {
        description.push_str(", incl. manometer");
    }
    description
}

/// Substring match of the model text against the known codes, ignoring
/// separator differences ("RBP 250" matches "RBP-250").
fn pump_template_key(model: &str) -> Option<String> {
    let normalized = normalize_code(model);
    if normalized.is_empty() {
        return None;
    }
    KNOWN_PUMP_MODELS
        .iter()
        .find(|code| normalized.contains(&normalize_code(code)))
        .map(|code| format!("ah_pump_{}", code.to_ascii_lowercase().replace('-', "_")))
}

fn normalize_code(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

fn pump_template_vars(project: &Project, estimate: &EstimateData) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    if let Some(capacity) = project.flow_capacity {
        vars.insert("capacity".to_string(), fmt_num(capacity));
    }
    if let Some(head) = project.flow_head {
        vars.insert("head".to_string(), fmt_num(head));
    }
    if let Some(power) = project.flow_power {
        vars.insert("power".to_string(), fmt_num(power));
    }
    if let Some(model) = &estimate.pump_type {
        vars.insert("model".to_string(), model.clone());
    }
    if let Some(rating) = &estimate.motor_rating {
        vars.insert("motor_rating".to_string(), rating.clone());
    }
    if let Some(variant) = &estimate.motor_variant {
        vars.insert("motor_variant".to_string(), variant.clone());
    }
    if let Some(enclosure) = &estimate.enclosure_rating {
        vars.insert("enclosure_rating".to_string(), enclosure.clone());
    }
    if let Some(voltage) = &estimate.supply_voltage {
        vars.insert("supply_voltage".to_string(), voltage.clone());
    }
    vars
}

fn control_description(estimate: &EstimateData) -> String {
    let control = &estimate.control;
    let mode = control.operating_mode.as_deref().unwrap_or("automatic");
    let screen = control.screen_size.as_deref().unwrap_or("7\"");
    let mounting = control.mounting.as_deref().unwrap_or("bulkhead");
    let interface = control.interface.as_deref().unwrap_or("Modbus RTU");
    format!(
        "Pump control system for {mode} operation, {screen} touch screen, \
         {mounting} mounted cabinet, {interface} interface to ship systems"
    )
}

fn starter_description(estimate: &EstimateData, templates: &TemplateSet) -> String {
    let kind = StarterKind::classify(estimate.starter_type.as_deref().unwrap_or(""));
    templates
        .fill(kind.template_key(), &HashMap::new())
        .unwrap_or_else(|| kind.fallback_description().to_string())
}

/// Valve rows bucketed into {pneumatic, electric} x {single, double}.
///
/// A family with both acting modes present collapses into one combined line;
/// a family with one mode emits a single line for that mode.
fn valve_lines(estimate: &EstimateData, templates: &TemplateSet) -> Vec<LineItem> {
    let valves: Vec<&EstimateLineItem> = estimate
        .line_items
        .iter()
        .filter(|r| r.category_is("valve"))
        .collect();
    if valves.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for family in [Actuation::Pneumatic, Actuation::Electric] {
        let mut qty: HashMap<ActingMode, i32> = HashMap::new();
        let mut breakdowns: HashMap<ActingMode, Breakdown> = HashMap::new();

        for row in &valves {
            let actuation = Actuation::classify(row.actuation.as_deref(), row.model.as_deref());
            if actuation != family {
                continue;
            }
            let mode = ActingMode::classify(row.acting.as_deref());
            let model = ValveModel::classify(row.model.as_deref().unwrap_or(""));
            *qty.entry(mode).or_insert(0) += row.quantity();
            breakdowns.entry(mode).or_default().add(model, row.quantity());
        }

        let single = qty.get(&ActingMode::Single).copied().unwrap_or(0);
        let double = qty.get(&ActingMode::Double).copied().unwrap_or(0);

        if single > 0 && double > 0 {
            let description = format!(
                "Butterfly valves, {} actuated: {} pcs single acting, {} pcs double acting ({}; {})",
                family.label(),
                single,
                double,
                breakdowns[&ActingMode::Single].render(),
                breakdowns[&ActingMode::Double].render(),
            );
            lines.push(LineItem::new("Valves", single + double, "pcs", description));
        } else if single > 0 || double > 0 {
            let (mode, count) = if single > 0 {
                (ActingMode::Single, single)
            } else {
                (ActingMode::Double, double)
            };
            let mut vars = HashMap::new();
            vars.insert("qty".to_string(), count.to_string());
            let mut description = templates
                .fill(family.template_key(mode), &vars)
                .unwrap_or_else(|| default_valve_description(family, mode));
            let breakdown = breakdowns[&mode].render();
            if !breakdown.is_empty() {
                description.push_str(&format!(" ({breakdown})"));
            }
            lines.push(LineItem::new("Valves", count, "pcs", description));
        }
    }
    lines
}

fn default_valve_description(family: Actuation, mode: ActingMode) -> String {
    let mut description = format!("Butterfly valves, {} actuated, {}", family.label(), mode.label());
    if family == Actuation::Pneumatic && mode == ActingMode::Single {
        description.push_str(" with spring return");
    }
    description
}

/// Per-model quantity groups in first-appearance order.
#[derive(Default)]
struct Breakdown {
    groups: Vec<(ValveModel, i32)>,
}

impl Breakdown {
    fn add(&mut self, model: ValveModel, qty: i32) {
        if let Some(group) = self.groups.iter_mut().find(|(m, _)| *m == model) {
            group.1 += qty;
        } else {
            self.groups.push((model, qty));
        }
    }

    fn render(&self) -> String {
        self.groups
            .iter()
            .map(|(model, qty)| format!("{} x {}", qty, model.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn class_certification_line(estimate: &EstimateData, templates: &TemplateSet) -> Option<LineItem> {
    let society = estimate.class_society.as_deref().filter(|s| !s.trim().is_empty())?;

    let mut vars = HashMap::new();
    vars.insert("society".to_string(), society.to_string());
    if let Some(notation) = &estimate.class_notation {
        vars.insert("notation".to_string(), notation.clone());
    }
    if let Some(bracket) = &estimate.class_bracket {
        vars.insert("bracket".to_string(), bracket.clone());
    }

    let description = templates.fill("class_certification", &vars).unwrap_or_else(|| {
        let mut text = format!("Class certification of pump and control system by {society}");
        if let Some(notation) = estimate.class_notation.as_deref().filter(|s| !s.is_empty()) {
            text.push_str(&format!(", notation {notation}"));
        }
        if let Some(bracket) = estimate.class_bracket.as_deref().filter(|s| !s.is_empty()) {
            text.push_str(&format!(" ({bracket})"));
        }
        text
    });

    Some(LineItem::new("Class certification", 1, "lot", description))
}

fn commissioning_line(estimate: &EstimateData) -> LineItem {
    let days = DAYS_INCLUDED + estimate.commissioning.extra_days.unwrap_or(0).max(0);
    let men = estimate.commissioning.personnel.unwrap_or(1);
    LineItem::new(
        "Commissioning",
        1,
        "lot",
        format!(
            "Start-up and commissioning assistance on board: {days}-working days, {men}-man, \
             excl. travel and lodging"
        ),
    )
}

/// Format a rated value without a trailing ".0".
fn fmt_num(value: f64) -> String {
    if (value - value.round()).abs() < f64::EPSILON {
        format!("{}", value.round() as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn project() -> Project {
        Project {
            id: Uuid::new_v4(),
            opportunity_number: Some("OPP-100".to_string()),
            name: "Test vessel".to_string(),
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

    fn find<'a>(items: &'a [LineItem], kind: &str) -> Option<&'a LineItem> {
        items.iter().find(|i| i.kind == kind)
    }

    #[test]
    fn test_empty_estimate_defaults_pump_qty() {
        let items = build_items(&project(), &estimate(json!({})), &TemplateSet::empty());
        let pump = find(&items, "Pump").expect("pump line");
        assert_eq!(pump.qty, 1);
        assert_eq!(items.iter().filter(|i| i.kind == "Pump").count(), 1);
    }

    #[test]
    fn test_pump_qty_falls_back_to_pumps_per_vessel() {
        let mut p = project();
        p.pumps_per_vessel = Some(2);
        let items = build_items(&p, &estimate(json!({})), &TemplateSet::empty());
        assert_eq!(find(&items, "Pump").unwrap().qty, 2);
    }

    #[test]
    fn test_pump_line_item_qty_wins_over_estimate_field() {
        let data = estimate(json!({
            "pump_qty": 4,
            "line_items": [{"category": "pump", "qty": 2}],
        }));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        assert_eq!(find(&items, "Pump").unwrap().qty, 2);
    }

    #[test]
    fn test_pump_line_carries_flow_spec() {
        let items = build_items(&project(), &estimate(json!({})), &TemplateSet::empty());
        let pump = find(&items, "Pump").unwrap();
        assert_eq!(pump.capacity, Some(450.0));
        assert_eq!(pump.head, Some(12.0));
        assert!(pump.description.contains("450 m3/h"));
        assert!(pump.description.contains("12 m head"));
    }

    #[test]
    fn test_pump_template_used_on_model_match() {
        let mut templates = std::collections::HashMap::new();
        templates.insert(
            "ah_pump_rbp_250".to_string(),
            "RBP 250 pump, {{capacity}} m3/h, {{supply_voltage}}".to_string(),
        );
        let data = estimate(json!({
            "pump_type": "RBP 250",
            "supply_voltage": "690V/60Hz",
        }));
        let items = build_items(&project(), &data, &TemplateSet::new(templates));
        assert_eq!(
            find(&items, "Pump").unwrap().description,
            "RBP 250 pump, 450 m3/h, 690V/60Hz"
        );
    }

    #[test]
    fn test_pump_flange_and_manometer_notes() {
        let data = estimate(json!({"counter_flanges": true, "manometer": true}));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        let description = &find(&items, "Pump").unwrap().description;
        assert!(description.contains("incl. counter flanges"));
        assert!(description.contains("incl. manometer"));
    }

    #[test]
    fn test_control_line_defaults() {
        let items = build_items(&project(), &estimate(json!({})), &TemplateSet::empty());
        let control = find(&items, "Control system").unwrap();
        assert_eq!(control.qty, 1);
        assert!(control.description.contains("automatic operation"));
        assert!(control.description.contains("Modbus RTU"));
    }

    #[test]
    fn test_starter_qty_follows_pump_qty() {
        let mut p = project();
        p.pumps_per_vessel = Some(3);
        let items = build_items(&p, &estimate(json!({})), &TemplateSet::empty());
        assert_eq!(find(&items, "Starter").unwrap().qty, 3);
    }

    #[test]
    fn test_vfd_starter_fallback_without_templates() {
        let data = estimate(json!({"starter_type": "VFD"}));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        let starter = find(&items, "Starter").unwrap();
        assert!(starter.description.contains("VFD"));
    }

    #[test]
    fn test_only_double_acting_valves_emit_one_line() {
        let data = estimate(json!({
            "line_items": [
                {"category": "valve", "model": "Wafer DN200", "qty": 2, "acting": "double"},
                {"category": "valve", "model": "Lug DN150", "qty": 1, "acting": "double"},
            ],
        }));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        let valves: Vec<_> = items.iter().filter(|i| i.kind == "Valves").collect();
        assert_eq!(valves.len(), 1);
        assert_eq!(valves[0].qty, 3);
        assert!(valves[0].description.contains("double acting"));
        assert!(valves[0].description.contains("2 x Wafer valve"));
        assert!(valves[0].description.contains("1 x Lug valve"));
    }

    #[test]
    fn test_mixed_acting_modes_emit_combined_line() {
        let data = estimate(json!({
            "line_items": [
                {"category": "valve", "model": "Wafer DN200", "qty": 2, "acting": "single"},
                {"category": "valve", "model": "Wafer DN200", "qty": 3, "acting": "double"},
            ],
        }));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        let valves: Vec<_> = items.iter().filter(|i| i.kind == "Valves").collect();
        assert_eq!(valves.len(), 1);
        assert_eq!(valves[0].qty, 5);
        assert!(valves[0].description.contains("2 pcs single acting"));
        assert!(valves[0].description.contains("3 pcs double acting"));
    }

    #[test]
    fn test_pneumatic_and_electric_families_stay_separate() {
        let data = estimate(json!({
            "line_items": [
                {"category": "valve", "model": "Wafer DN200", "qty": 2},
                {"category": "valve", "model": "Wafer DN200", "qty": 1, "actuation": "electric"},
            ],
        }));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        let valves: Vec<_> = items.iter().filter(|i| i.kind == "Valves").collect();
        assert_eq!(valves.len(), 2);
        assert!(valves[0].description.contains("pneumatically"));
        assert!(valves[1].description.contains("electrically"));
    }

    #[test]
    fn test_acting_mode_defaults_to_single() {
        let data = estimate(json!({
            "line_items": [{"category": "valve", "model": "Wafer DN200", "qty": 2}],
        }));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        let valve = find(&items, "Valves").unwrap();
        assert!(valve.description.contains("single acting"));
    }

    #[test]
    fn test_level_switch_only_when_positive() {
        let items = build_items(&project(), &estimate(json!({})), &TemplateSet::empty());
        assert!(find(&items, "Level switch").is_none());

        let data = estimate(json!({"level_switch_qty": 4}));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        assert_eq!(find(&items, "Level switch").unwrap().qty, 4);
    }

    #[test]
    fn test_level_switch_summed_from_line_items() {
        let data = estimate(json!({
            "line_items": [
                {"category": "level_switch", "qty": 2},
                {"category": "level_switch", "qty": 3},
            ],
        }));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        assert_eq!(find(&items, "Level switch").unwrap().qty, 5);
    }

    #[test]
    fn test_class_certification_only_with_society() {
        let items = build_items(&project(), &estimate(json!({})), &TemplateSet::empty());
        assert!(find(&items, "Class certification").is_none());

        let data = estimate(json!({"class_society": "DNV", "class_notation": "1A"}));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        let cert = find(&items, "Class certification").unwrap();
        assert!(cert.description.contains("DNV"));
        assert!(cert.description.contains("1A"));
    }

    #[test]
    fn test_always_present_lines() {
        let items = build_items(&project(), &estimate(json!({})), &TemplateSet::empty());
        assert!(find(&items, "Tools set").is_some());
        let commissioning = find(&items, "Commissioning").unwrap();
        assert!(commissioning.description.contains("3-working days"));
        assert!(commissioning.description.contains("1-man"));
    }

    #[test]
    fn test_commissioning_extra_days_and_personnel() {
        let data = estimate(json!({"commissioning": {"extra_days": 2, "personnel": 2}}));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        let commissioning = find(&items, "Commissioning").unwrap();
        assert!(commissioning.description.contains("5-working days"));
        assert!(commissioning.description.contains("2-man"));
    }

    #[test]
    fn test_builder_is_idempotent() {
        let data = estimate(json!({
            "pump_type": "RBP-300",
            "starter_type": "soft",
            "line_items": [
                {"category": "valve", "model": "Wafer DN200", "qty": 2, "acting": "double"},
            ],
        }));
        let p = project();
        let first = build_items(&p, &data, &TemplateSet::empty());
        let second = build_items(&p, &data, &TemplateSet::empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_item_has_positive_qty_and_description() {
        let data = estimate(json!({
            "line_items": [
                {"category": "valve", "model": "Wafer DN200", "qty": 2},
                {"category": "level_switch", "qty": 1},
            ],
            "class_society": "ABS",
        }));
        let items = build_items(&project(), &data, &TemplateSet::empty());
        for item in &items {
            assert!(item.qty > 0, "{} qty", item.kind);
            assert!(!item.description.is_empty(), "{} description", item.kind);
        }
    }
}
