//! File-record database operations

use super::AppState;
use crate::files::models::ProjectFile;
use uuid::Uuid;

const FILE_COLUMNS: &str = "id, project_id, filename, mime_type, size_bytes, kind, created_at";

impl AppState {
    pub async fn insert_file_record(
        &self,
        project_id: &Uuid,
        filename: &str,
        mime_type: &str,
        size_bytes: i64,
        kind: &str,
    ) -> Result<ProjectFile, sqlx::Error> {
        sqlx::query_as::<_, ProjectFile>(&format!(
            "INSERT INTO project_files (id, project_id, filename, mime_type, size_bytes, kind, \
             created_at) VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
             RETURNING {FILE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(filename)
        .bind(mime_type)
        .bind(size_bytes)
        .bind(kind)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_files_by_project(
        &self,
        project_id: &Uuid,
    ) -> Result<Vec<ProjectFile>, sqlx::Error> {
        sqlx::query_as::<_, ProjectFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM project_files WHERE project_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_file_by_id(&self, id: &Uuid) -> Result<Option<ProjectFile>, sqlx::Error> {
        sqlx::query_as::<_, ProjectFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM project_files WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_file_record(&self, id: &Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
