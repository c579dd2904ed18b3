//! Typed estimate data.
//!
//! Estimate rows store an engineering-input blob as JSONB. Every field is
//! optional and defaulted here, so a partial or empty blob still decodes; a
//! blob that does not decode at all degrades to `EstimateData::default()`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Engineering inputs attached to a project + project-type pair.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EstimateData {
    /// Pump model string, e.g. "RBP-250".
    pub pump_type: Option<String>,
    #[serde(deserialize_with = "lenient_qty")]
    pub pump_qty: Option<i32>,
    /// Motor rating, e.g. "45 kW".
    pub motor_rating: Option<String>,
    /// Motor efficiency variant, e.g. "IE3".
    pub motor_variant: Option<String>,
    /// Enclosure rating, e.g. "IP55".
    pub enclosure_rating: Option<String>,
    /// Supply voltage, e.g. "440V/60Hz".
    pub supply_voltage: Option<String>,
    pub counter_flanges: bool,
    pub manometer: bool,
    pub control: ControlConfig,
    pub starter_type: Option<String>,
    #[serde(deserialize_with = "lenient_qty")]
    pub starter_qty: Option<i32>,
    pub line_items: Vec<EstimateLineItem>,
    #[serde(deserialize_with = "lenient_qty")]
    pub level_switch_qty: Option<i32>,
    pub class_society: Option<String>,
    pub class_notation: Option<String>,
    pub class_bracket: Option<String>,
    pub commissioning: CommissioningConfig,
}

impl EstimateData {
    /// Decode a stored estimate blob. Malformed data decodes to the defaults
    /// rather than failing the quote.
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Estimate data did not decode, using defaults: {e}");
                Self::default()
            }
        }
    }
}

/// Control-system configuration. Each field defaults independently at use site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Operating mode, e.g. "automatic" or "manual".
    pub operating_mode: Option<String>,
    /// Touch-screen size, e.g. "7\"".
    pub screen_size: Option<String>,
    /// Cabinet or bridge-panel mounting.
    pub mounting: Option<String>,
    /// Ship-system interface, e.g. "Modbus RTU".
    pub interface: Option<String>,
    #[serde(deserialize_with = "lenient_qty")]
    pub qty: Option<i32>,
}

/// One equipment row inside the estimate blob (valves, starters, switches).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EstimateLineItem {
    /// Row category, e.g. "valve", "starter", "level_switch", "pump".
    pub category: Option<String>,
    /// Model text, e.g. "Wafer type butterfly valve DN200".
    pub model: Option<String>,
    #[serde(deserialize_with = "lenient_qty")]
    pub qty: Option<i32>,
    /// Acting mode for valves: "single" or "double".
    pub acting: Option<String>,
    /// Actuation family for valves: "pneumatic" or "electric".
    pub actuation: Option<String>,
}

impl EstimateLineItem {
    pub fn quantity(&self) -> i32 {
        self.qty.unwrap_or(1)
    }

    pub fn category_is(&self, name: &str) -> bool {
        self.category
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case(name))
            .unwrap_or(false)
    }
}

/// Commissioning parameters for the always-present support line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommissioningConfig {
    /// Days on top of the included three.
    #[serde(deserialize_with = "lenient_qty")]
    pub extra_days: Option<i32>,
    #[serde(deserialize_with = "lenient_qty")]
    pub personnel: Option<i32>,
}

/// Quantities arrive from the estimate UI as numbers or numeric strings.
fn lenient_qty<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .map(|v| v as i32)
            .or_else(|| n.as_f64().map(|v| v.round() as i32)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|v| v.round() as i32),
        _ => None,
    })
}
