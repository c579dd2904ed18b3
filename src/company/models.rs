use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Company {
    pub id: Uuid,
    #[schema(example = "Baltic Ferries AB")]
    pub name: String,
    #[schema(example = "Sweden")]
    pub country: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    #[schema(example = "Erik Lindqvist")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(example = "Technical superintendent")]
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub country: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContactRequest {
    pub name: String,
    pub company_id: Option<Uuid>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub company_id: Option<Uuid>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ContactListQuery {
    /// Restrict to contacts of one company.
    pub company_id: Option<Uuid>,
}
