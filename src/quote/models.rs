//! Computed quote line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Provenance tag for line items synced by the quote generator.
pub const AUTO_TAG: &str = "AUTO:";
/// Provenance tag for line items entered by hand.
pub const MANUAL_TAG: &str = "MANUAL:";

/// One row of the generated bill-of-materials.
///
/// Ephemeral builder output; persisted verbatim into `project_line_items`
/// only when the caller asks for a resync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    /// Item kind, e.g. "Pump" or "Valves".
    #[schema(example = "Pump")]
    pub kind: String,
    #[schema(example = 2)]
    pub qty: i32,
    #[schema(example = "pcs")]
    pub unit: String,
    #[schema(example = "Anti-heeling pump RBP-250, reversible, 450 m3/h at 12 m head")]
    pub description: String,
    /// Rated capacity in m3/h, carried for pump lines only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    /// Rated head in metres, carried for pump lines only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<f64>,
}

impl LineItem {
    pub fn new(kind: &str, qty: i32, unit: &str, description: String) -> Self {
        Self {
            kind: kind.to_string(),
            qty,
            unit: unit.to_string(),
            description,
            capacity: None,
            head: None,
        }
    }
}

/// A persisted `project_line_items` row.
///
/// `provenance` is `AUTO:` for rows synced by the generator (replaced
/// wholesale on regeneration) or `MANUAL:` for rows entered by hand.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct StoredLineItem {
    pub id: Uuid,
    pub project_id: Uuid,
    pub kind: String,
    pub qty: i32,
    pub unit: String,
    pub description: String,
    pub capacity: Option<f64>,
    pub head: Option<f64>,
    #[schema(example = "AUTO:")]
    pub provenance: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLineItemRequest {
    pub kind: String,
    pub qty: i32,
    pub unit: String,
    pub description: String,
    pub capacity: Option<f64>,
    pub head: Option<f64>,
}
