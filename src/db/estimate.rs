//! Estimate-data database operations
//!
//! Estimate blobs are stored as JSONB keyed by project id + project type and
//! decoded into `EstimateData` at the quote boundary.

use super::AppState;
use serde_json::Value;
use uuid::Uuid;

impl AppState {
    pub async fn get_estimate(
        &self,
        project_id: &Uuid,
        project_type: &str,
    ) -> Result<Option<Value>, sqlx::Error> {
        let row: Option<(Value,)> = sqlx::query_as(
            "SELECT data FROM estimates WHERE project_id = $1 AND project_type = $2",
        )
        .bind(project_id)
        .bind(project_type)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(data,)| data))
    }

    pub async fn upsert_estimate(
        &self,
        project_id: &Uuid,
        project_type: &str,
        data: &Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO estimates (project_id, project_type, data, updated_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (project_id, project_type) DO UPDATE \
             SET data = $3, updated_at = NOW()",
        )
        .bind(project_id)
        .bind(project_type)
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
