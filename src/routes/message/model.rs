use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Serialize, FromRow)]
pub struct Message {
    pub id: i32,
    pub group_id: i32,
    pub user_id: i32,
    pub content: String,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Listing row: the message plus the sender's display name and role.
#[derive(Debug, Serialize, FromRow)]
pub struct MessageWithSender {
    pub id: i32,
    pub group_id: i32,
    pub user_id: i32,
    pub content: String,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub group_id: i32,
    pub user_id: i32,
    pub content: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

impl Message {
    pub async fn create(pool: &PgPool, req: &CreateMessageRequest) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (group_id, user_id, content, file_name, file_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, group_id, user_id, content, file_name, file_url, created_at
            "#,
        )
        .bind(req.group_id)
        .bind(req.user_id)
        .bind(&req.content)
        .bind(&req.file_name)
        .bind(&req.file_url)
        .fetch_one(pool)
        .await
    }
}

impl MessageWithSender {
    /// Chronological read order for a chat view; id breaks timestamp ties.
    pub async fn list_for_group(pool: &PgPool, group_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MessageWithSender>(
            r#"
            SELECT m.id, m.group_id, m.user_id, m.content, m.file_name, m.file_url, m.created_at,
                   u.full_name AS user_name, u.role AS user_role
            FROM messages m
            LEFT JOIN users u ON m.user_id = u.id
            WHERE m.group_id = $1
            ORDER BY m.created_at ASC, m.id ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_accepts_bare_text_message() {
        let req: CreateMessageRequest = serde_json::from_str(
            r#"{"group_id": 1, "user_id": 2, "content": "hi"}"#,
        )
        .unwrap();
        assert!(req.file_name.is_none());
        assert!(req.file_url.is_none());
    }

    #[test]
    fn create_requires_content() {
        let result =
            serde_json::from_str::<CreateMessageRequest>(r#"{"group_id": 1, "user_id": 2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn attachment_fields_pass_through_as_opaque_strings() {
        let req: CreateMessageRequest = serde_json::from_str(
            r#"{"group_id": 1, "user_id": 2, "content": "", "file_name": "notes.pdf", "file_url": "https://cdn/x"}"#,
        )
        .unwrap();
        assert_eq!(req.file_name.as_deref(), Some("notes.pdf"));
        assert_eq!(req.file_url.as_deref(), Some("https://cdn/x"));
    }
}
