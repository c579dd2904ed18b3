use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A sales opportunity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    #[schema(example = "OPP-1042")]
    pub opportunity_number: Option<String>,
    #[schema(example = "MV Northern Star retrofit")]
    pub name: String,
    /// "anti_heeling" or "general".
    #[schema(example = "anti_heeling")]
    pub project_type: String,
    #[schema(example = "open")]
    pub status: String,
    pub company_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
    #[schema(example = "USD")]
    pub currency: Option<String>,
    pub price_per_vessel: Option<f64>,
    pub number_of_vessels: Option<i32>,
    pub pumps_per_vessel: Option<i32>,
    /// Flow specification: capacity in m3/h.
    pub flow_capacity: Option<f64>,
    /// Flow specification: head in metres.
    pub flow_head: Option<f64>,
    /// Flow specification: motor power in kW.
    pub flow_power: Option<f64>,
    #[schema(example = "180m")]
    pub vessel_size: Option<String>,
    #[schema(example = "RoPax ferry")]
    pub vessel_type: Option<String>,
    pub notes: Option<String>,
    pub shipping_terms: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Quoted total: price per vessel times vessel count.
    pub fn total_price(&self) -> f64 {
        self.price_per_vessel.unwrap_or(0.0) * self.number_of_vessels.unwrap_or(1) as f64
    }

    pub fn is_anti_heeling(&self) -> bool {
        self.project_type.eq_ignore_ascii_case("anti_heeling")
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: String,
    pub opportunity_number: Option<String>,
    #[schema(example = "anti_heeling")]
    pub project_type: Option<String>,
    pub company_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
    pub currency: Option<String>,
    pub price_per_vessel: Option<f64>,
    pub number_of_vessels: Option<i32>,
    pub pumps_per_vessel: Option<i32>,
    pub flow_capacity: Option<f64>,
    pub flow_head: Option<f64>,
    pub flow_power: Option<f64>,
    pub vessel_size: Option<String>,
    pub vessel_type: Option<String>,
    pub notes: Option<String>,
    pub shipping_terms: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub opportunity_number: Option<String>,
    pub project_type: Option<String>,
    pub status: Option<String>,
    pub company_id: Option<Uuid>,
    pub contact_id: Option<Uuid>,
    pub currency: Option<String>,
    pub price_per_vessel: Option<f64>,
    pub number_of_vessels: Option<i32>,
    pub pumps_per_vessel: Option<i32>,
    pub flow_capacity: Option<f64>,
    pub flow_head: Option<f64>,
    pub flow_power: Option<f64>,
    pub vessel_size: Option<String>,
    pub vessel_type: Option<String>,
    pub notes: Option<String>,
    pub shipping_terms: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ProjectListQuery {
    /// Filter by status, e.g. "open".
    pub status: Option<String>,
    /// Filter by project type.
    pub project_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_project() -> Project {
        Project {
            id: Uuid::new_v4(),
            opportunity_number: None,
            name: "Test".to_string(),
            project_type: "general".to_string(),
            status: "open".to_string(),
            company_id: None,
            contact_id: None,
            currency: None,
            price_per_vessel: None,
            number_of_vessels: None,
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
    fn test_total_price() {
        let mut project = bare_project();
        project.price_per_vessel = Some(50_000.0);
        project.number_of_vessels = Some(2);
        assert_eq!(project.total_price(), 100_000.0);
    }

    #[test]
    fn test_total_price_defaults_to_one_vessel() {
        let mut project = bare_project();
        project.price_per_vessel = Some(75_000.0);
        assert_eq!(project.total_price(), 75_000.0);
    }

    #[test]
    fn test_anti_heeling_flag() {
        let mut project = bare_project();
        assert!(!project.is_anti_heeling());
        project.project_type = "anti_heeling".to_string();
        assert!(project.is_anti_heeling());
    }
}
