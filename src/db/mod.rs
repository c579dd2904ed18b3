//! Database module - AppState and database operations
//!
//! Split into submodules for separation of concerns:
//! - `user` - account rows for authentication
//! - `project` - sales opportunities
//! - `company` - companies and their contacts
//! - `estimate` - estimate-data blobs per project + type
//! - `line_item` - persisted quote line items (incl. the AUTO: resync)
//! - `file` - file records for stored artifacts
//! - `template` - the product_descriptions dictionary
//! - `activity` - audit-trail reads

mod activity;
mod company;
mod estimate;
mod file;
mod line_item;
mod project;
mod template;
mod user;

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::activity::{start_activity_worker, ActivityEntry};
use crate::project::models::Project;
use crate::storage::{LocalStorage, ObjectStorage};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub project_cache: Cache<String, Vec<Project>>,
    pub template_cache: Cache<String, HashMap<String, String>>,
    pub storage: Arc<dyn ObjectStorage + Send + Sync>,
    pub activity_sender: mpsc::Sender<ActivityEntry>,
}

impl AppState {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(50)
            .min_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(900))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&database_url)
            .await?;

        let storage: Arc<dyn ObjectStorage + Send + Sync> = Arc::new(LocalStorage::from_env());
        Self::new_with_pool_and_storage(pool, storage).await
    }

    pub async fn new_with_pool_and_storage(
        pool: PgPool,
        storage: Arc<dyn ObjectStorage + Send + Sync>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let project_cache = Cache::builder()
            .time_to_live(Duration::from_secs(5 * 60))
            .max_capacity(10)
            .build();

        let template_cache = Cache::builder()
            .time_to_live(Duration::from_secs(10 * 60))
            .max_capacity(5)
            .build();

        // Channel for the background activity writer
        let (activity_sender, receiver) = mpsc::channel(100);
        let worker_pool = pool.clone();
        tokio::spawn(async move {
            start_activity_worker(receiver, worker_pool).await;
        });

        Ok(AppState {
            pool,
            project_cache,
            template_cache,
            storage,
            activity_sender,
        })
    }

    /// Queue an audit-trail entry. Best effort: a full queue or stopped
    /// worker is logged and the caller proceeds.
    pub async fn log_activity(&self, entry: ActivityEntry) {
        if let Err(e) = self.activity_sender.send(entry).await {
            log::error!("Failed to queue activity entry: {}", e);
        }
    }
}
