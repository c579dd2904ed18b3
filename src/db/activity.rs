//! Activity read operations. Writes go through the background worker.

use super::AppState;
use crate::activity::Activity;
use uuid::Uuid;

impl AppState {
    pub async fn get_activities_by_project(
        &self,
        project_id: &Uuid,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            "SELECT id, project_id, actor, action, detail, created_at FROM activities \
             WHERE project_id = $1 ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
    }
}
