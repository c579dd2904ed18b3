//! Project database operations

use super::AppState;
use crate::project::models::{CreateProjectRequest, Project, UpdateProjectRequest};
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "id, opportunity_number, name, project_type, status, company_id, \
     contact_id, currency, price_per_vessel, number_of_vessels, pumps_per_vessel, flow_capacity, \
     flow_head, flow_power, vessel_size, vessel_type, notes, shipping_terms, created_at, updated_at";

const PROJECT_CACHE_KEY: &str = "all_projects";

impl AppState {
    pub async fn get_all_projects(&self) -> Result<Vec<Project>, sqlx::Error> {
        if let Some(projects) = self.project_cache.get(PROJECT_CACHE_KEY).await {
            return Ok(projects);
        }

        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.project_cache
            .insert(PROJECT_CACHE_KEY.to_string(), projects.clone())
            .await;
        Ok(projects)
    }

    pub async fn get_project_by_id(&self, id: &Uuid) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn insert_project(
        &self,
        req: &CreateProjectRequest,
    ) -> Result<Project, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (id, opportunity_number, name, project_type, status, \
             company_id, contact_id, currency, price_per_vessel, number_of_vessels, \
             pumps_per_vessel, flow_capacity, flow_head, flow_power, vessel_size, vessel_type, \
             notes, shipping_terms, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, 'open', $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
             $16, $17, NOW(), NOW()) \
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&req.opportunity_number)
        .bind(&req.name)
        .bind(req.project_type.as_deref().unwrap_or("general"))
        .bind(req.company_id)
        .bind(req.contact_id)
        .bind(&req.currency)
        .bind(req.price_per_vessel)
        .bind(req.number_of_vessels)
        .bind(req.pumps_per_vessel)
        .bind(req.flow_capacity)
        .bind(req.flow_head)
        .bind(req.flow_power)
        .bind(&req.vessel_size)
        .bind(&req.vessel_type)
        .bind(&req.notes)
        .bind(&req.shipping_terms)
        .fetch_one(&self.pool)
        .await?;

        self.project_cache.invalidate(PROJECT_CACHE_KEY).await;
        Ok(project)
    }

    pub async fn update_project(
        &self,
        id: &Uuid,
        req: &UpdateProjectRequest,
    ) -> Result<Option<Project>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects SET \
             opportunity_number = COALESCE($2, opportunity_number), \
             name = COALESCE($3, name), \
             project_type = COALESCE($4, project_type), \
             status = COALESCE($5, status), \
             company_id = COALESCE($6, company_id), \
             contact_id = COALESCE($7, contact_id), \
             currency = COALESCE($8, currency), \
             price_per_vessel = COALESCE($9, price_per_vessel), \
             number_of_vessels = COALESCE($10, number_of_vessels), \
             pumps_per_vessel = COALESCE($11, pumps_per_vessel), \
             flow_capacity = COALESCE($12, flow_capacity), \
             flow_head = COALESCE($13, flow_head), \
             flow_power = COALESCE($14, flow_power), \
             vessel_size = COALESCE($15, vessel_size), \
             vessel_type = COALESCE($16, vessel_type), \
             notes = COALESCE($17, notes), \
             shipping_terms = COALESCE($18, shipping_terms), \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .bind(&req.opportunity_number)
        .bind(&req.name)
        .bind(&req.project_type)
        .bind(&req.status)
        .bind(req.company_id)
        .bind(req.contact_id)
        .bind(&req.currency)
        .bind(req.price_per_vessel)
        .bind(req.number_of_vessels)
        .bind(req.pumps_per_vessel)
        .bind(req.flow_capacity)
        .bind(req.flow_head)
        .bind(req.flow_power)
        .bind(&req.vessel_size)
        .bind(&req.vessel_type)
        .bind(&req.notes)
        .bind(&req.shipping_terms)
        .fetch_optional(&self.pool)
        .await?;

        self.project_cache.invalidate(PROJECT_CACHE_KEY).await;
        Ok(project)
    }

    pub async fn delete_project(&self, id: &Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.project_cache.invalidate(PROJECT_CACHE_KEY).await;
        Ok(result.rows_affected() > 0)
    }
}
