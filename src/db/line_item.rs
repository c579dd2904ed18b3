//! Persisted line-item operations
//!
//! Generated items are resynced under the `AUTO:` provenance tag inside a
//! single transaction, so a concurrent regeneration can never interleave its
//! delete with our insert and leave a mixed set behind.

use super::AppState;
use crate::quote::models::{CreateLineItemRequest, LineItem, StoredLineItem, AUTO_TAG, MANUAL_TAG};
use uuid::Uuid;

const LINE_ITEM_COLUMNS: &str =
    "id, project_id, kind, qty, unit, description, capacity, head, provenance, created_at";

impl AppState {
    pub async fn get_line_items(
        &self,
        project_id: &Uuid,
    ) -> Result<Vec<StoredLineItem>, sqlx::Error> {
        sqlx::query_as::<_, StoredLineItem>(&format!(
            "SELECT {LINE_ITEM_COLUMNS} FROM project_line_items WHERE project_id = $1 \
             ORDER BY created_at, id"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert_manual_line_item(
        &self,
        project_id: &Uuid,
        req: &CreateLineItemRequest,
    ) -> Result<StoredLineItem, sqlx::Error> {
        sqlx::query_as::<_, StoredLineItem>(&format!(
            "INSERT INTO project_line_items \
             (id, project_id, kind, qty, unit, description, capacity, head, provenance, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW()) \
             RETURNING {LINE_ITEM_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(&req.kind)
        .bind(req.qty)
        .bind(&req.unit)
        .bind(&req.description)
        .bind(req.capacity)
        .bind(req.head)
        .bind(MANUAL_TAG)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_line_item(
        &self,
        project_id: &Uuid,
        item_id: &Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_line_items WHERE id = $1 AND project_id = $2")
                .bind(item_id)
                .bind(project_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace all `AUTO:` rows for a project with the freshly built items.
    /// Manual rows are untouched.
    pub async fn replace_auto_line_items(
        &self,
        project_id: &Uuid,
        items: &[LineItem],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM project_line_items WHERE project_id = $1 AND provenance = $2")
            .bind(project_id)
            .bind(AUTO_TAG)
            .execute(&mut *tx)
            .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO project_line_items \
                 (id, project_id, kind, qty, unit, description, capacity, head, provenance, \
                 created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())",
            )
            .bind(Uuid::new_v4())
            .bind(project_id)
            .bind(&item.kind)
            .bind(item.qty)
            .bind(&item.unit)
            .bind(&item.description)
            .bind(item.capacity)
            .bind(item.head)
            .bind(AUTO_TAG)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }
}
