use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Serialize, FromRow)]
pub struct Group {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub admin_id: i32,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Listing row: the group plus its admin's display name and member count.
#[derive(Debug, Serialize, FromRow)]
pub struct GroupSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub admin_id: i32,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub admin_name: Option<String>,
    pub member_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub admin_id: i32,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct JoinGroupRequest {
    pub group_id: i32,
    pub user_id: i32,
}

impl Group {
    pub async fn create(pool: &PgPool, req: &CreateGroupRequest) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name, description, admin_id, deadline)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, admin_id, deadline, created_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.admin_id)
        .bind(req.deadline)
        .fetch_one(pool)
        .await
    }

    pub async fn list_with_stats(pool: &PgPool) -> Result<Vec<GroupSummary>, sqlx::Error> {
        sqlx::query_as::<_, GroupSummary>(
            r#"
            SELECT g.id, g.name, g.description, g.admin_id, g.deadline, g.created_at,
                   u.full_name AS admin_name,
                   (SELECT COUNT(*) FROM group_members gm WHERE gm.group_id = g.id) AS member_count
            FROM groups g
            LEFT JOIN users u ON g.admin_id = u.id
            ORDER BY g.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Membership is idempotent: the unique (group_id, user_id) pair absorbs
    /// repeat joins via ON CONFLICT DO NOTHING.
    pub async fn add_member(pool: &PgPool, group_id: i32, user_id: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
