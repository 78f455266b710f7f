use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Public user record. `password_hash` is deliberately not part of this
/// struct so it can never end up in a response.
#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "student".to_string()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl User {
    /// Duplicate registration is detected up front rather than by catching
    /// the unique-constraint violation, so the caller gets a clean 400.
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(id.is_some())
    }

    pub async fn create(
        pool: &PgPool,
        req: &RegisterRequest,
        password_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, full_name, role
            "#,
        )
        .bind(&req.email)
        .bind(password_hash)
        .bind(&req.full_name)
        .bind(&req.role)
        .fetch_one(pool)
        .await
    }

    /// Credential match is equality on email plus password digest.
    pub async fn find_by_credentials(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, role
            FROM users
            WHERE email = $1 AND password_hash = $2
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_optional(pool)
        .await
    }
}
