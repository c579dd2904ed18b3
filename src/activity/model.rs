use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One audit-trail row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Activity {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    #[schema(example = "erik")]
    pub actor: String,
    #[schema(example = "quote_generated")]
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An entry queued for the background activity writer.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub project_id: Option<Uuid>,
    pub actor: String,
    pub action: String,
    pub detail: Option<String>,
}

impl ActivityEntry {
    pub fn new(project_id: Uuid, actor: &str, action: &str, detail: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id),
            actor: actor.to_string(),
            action: action.to_string(),
            detail: Some(detail.into()),
        }
    }
}
