use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Record for a stored artifact: a generated quote or an uploaded attachment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ProjectFile {
    pub id: Uuid,
    pub project_id: Uuid,
    #[schema(example = "Quote_Anti-Heeling_Opp-OPP-100_MV_Test_2026-03-14.docx")]
    pub filename: String,
    #[schema(
        example = "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    )]
    pub mime_type: String,
    pub size_bytes: i64,
    /// "quote" for generated documents, "attachment" for uploads.
    #[schema(example = "quote")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}
