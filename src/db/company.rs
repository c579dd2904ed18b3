//! Company and contact database operations

use super::AppState;
use crate::company::models::{
    Company, Contact, CreateCompanyRequest, CreateContactRequest, UpdateCompanyRequest,
    UpdateContactRequest,
};
use uuid::Uuid;

impl AppState {
    pub async fn get_all_companies(&self) -> Result<Vec<Company>, sqlx::Error> {
        sqlx::query_as::<_, Company>(
            "SELECT id, name, country, website, created_at, updated_at FROM companies \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_company_by_id(&self, id: &Uuid) -> Result<Option<Company>, sqlx::Error> {
        sqlx::query_as::<_, Company>(
            "SELECT id, name, country, website, created_at, updated_at FROM companies \
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn insert_company(
        &self,
        req: &CreateCompanyRequest,
    ) -> Result<Company, sqlx::Error> {
        sqlx::query_as::<_, Company>(
            "INSERT INTO companies (id, name, country, website, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) \
             RETURNING id, name, country, website, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.country)
        .bind(&req.website)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_company(
        &self,
        id: &Uuid,
        req: &UpdateCompanyRequest,
    ) -> Result<Option<Company>, sqlx::Error> {
        sqlx::query_as::<_, Company>(
            "UPDATE companies SET \
             name = COALESCE($2, name), \
             country = COALESCE($3, country), \
             website = COALESCE($4, website), \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, name, country, website, created_at, updated_at",
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.country)
        .bind(&req.website)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_company(&self, id: &Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_contacts(
        &self,
        company_id: Option<&Uuid>,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        match company_id {
            Some(company_id) => {
                sqlx::query_as::<_, Contact>(
                    "SELECT id, company_id, name, email, phone, role, created_at, updated_at \
                     FROM contacts WHERE company_id = $1 ORDER BY name",
                )
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Contact>(
                    "SELECT id, company_id, name, email, phone, role, created_at, updated_at \
                     FROM contacts ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    pub async fn get_contact_by_id(&self, id: &Uuid) -> Result<Option<Contact>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            "SELECT id, company_id, name, email, phone, role, created_at, updated_at \
             FROM contacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn insert_contact(
        &self,
        req: &CreateContactRequest,
    ) -> Result<Contact, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            "INSERT INTO contacts (id, company_id, name, email, phone, role, created_at, \
             updated_at) VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) \
             RETURNING id, company_id, name, email, phone, role, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(req.company_id)
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.role)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_contact(
        &self,
        id: &Uuid,
        req: &UpdateContactRequest,
    ) -> Result<Option<Contact>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(
            "UPDATE contacts SET \
             company_id = COALESCE($2, company_id), \
             name = COALESCE($3, name), \
             email = COALESCE($4, email), \
             phone = COALESCE($5, phone), \
             role = COALESCE($6, role), \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, company_id, name, email, phone, role, created_at, updated_at",
        )
        .bind(id)
        .bind(req.company_id)
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.role)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_contact(&self, id: &Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
