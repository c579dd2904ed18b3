//! Background writer for activity-log entries.
//!
//! Handlers queue entries over a channel and move on; a failed insert is
//! logged and dropped so the audit trail can never fail a primary response.

use sqlx::PgPool;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::model::ActivityEntry;

/// Starts the background activity writer.
pub async fn start_activity_worker(mut receiver: mpsc::Receiver<ActivityEntry>, pool: PgPool) {
    log::info!("Activity writer started");

    while let Some(entry) = receiver.recv().await {
        let result = sqlx::query(
            "INSERT INTO activities (id, project_id, actor, action, detail, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(entry.project_id)
        .bind(&entry.actor)
        .bind(&entry.action)
        .bind(&entry.detail)
        .execute(&pool)
        .await;

        if let Err(e) = result {
            log::error!("Failed to persist activity '{}': {}", entry.action, e);
        } else {
            log::debug!("Activity '{}' persisted", entry.action);
        }
    }

    log::info!("Activity writer stopped");
}
