//! Product-description template operations
//!
//! The dictionary changes rarely and is read on every quote, so it sits
//! behind the moka cache with a short TTL.

use std::collections::HashMap;

use super::AppState;
use crate::quote::templates::TemplateSet;

const TEMPLATE_CACHE_KEY: &str = "product_descriptions";

impl AppState {
    pub async fn get_template_set(&self) -> Result<TemplateSet, sqlx::Error> {
        if let Some(map) = self.template_cache.get(TEMPLATE_CACHE_KEY).await {
            return Ok(TemplateSet::new(map));
        }

        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, template FROM product_descriptions")
                .fetch_all(&self.pool)
                .await?;
        let map: HashMap<String, String> = rows.into_iter().collect();

        self.template_cache
            .insert(TEMPLATE_CACHE_KEY.to_string(), map.clone())
            .await;
        Ok(TemplateSet::new(map))
    }
}
