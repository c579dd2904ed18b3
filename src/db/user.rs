//! User database operations for authentication

use super::AppState;
use crate::auth::model::User;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, username, password_hash, full_name, refresh_token, created_at, updated_at, created_by";

impl AppState {
    /// Get count of users in database
    pub async fn get_user_count(&self) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_user_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE refresh_token = $1"
        ))
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        full_name: Option<&str>,
        created_by: Option<Uuid>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, password_hash, full_name, created_by, created_at, \
             updated_at) VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
    }

    /// Update user's refresh token (invalidates previous sessions)
    pub async fn update_user_refresh_token(
        &self,
        user_id: &Uuid,
        refresh_token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET refresh_token = $1, updated_at = NOW() WHERE id = $2")
            .bind(refresh_token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn delete_user(&self, user_id: &Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
