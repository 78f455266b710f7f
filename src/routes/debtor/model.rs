use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Serialize, FromRow)]
pub struct Debtor {
    pub id: i32,
    pub group_id: i32,
    pub user_id: i32,
    pub description: String,
    pub amount: f64,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

/// Group-scoped listing row: debt plus the debtor's name and email.
#[derive(Debug, Serialize, FromRow)]
pub struct GroupDebtor {
    pub id: i32,
    pub group_id: i32,
    pub user_id: i32,
    pub description: String,
    pub amount: f64,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

/// Cross-group listing row: debt plus the debtor's name and the group name.
#[derive(Debug, Serialize, FromRow)]
pub struct GlobalDebtor {
    pub id: i32,
    pub group_id: i32,
    pub user_id: i32,
    pub description: String,
    pub amount: f64,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub user_name: Option<String>,
    pub group_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertDebtorRequest {
    pub group_id: i32,
    pub user_id: i32,
    pub description: String,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct ResolveDebtorRequest {
    pub debtor_id: i32,
    #[serde(default = "default_resolved")]
    pub resolved: bool,
}

fn default_resolved() -> bool {
    true
}

impl Debtor {
    /// One outstanding record per (group, user): a second POST for the same
    /// pair overwrites description and amount in place.
    pub async fn upsert(pool: &PgPool, req: &UpsertDebtorRequest) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Debtor>(
            r#"
            INSERT INTO debtors (group_id, user_id, description, amount)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (group_id, user_id)
            DO UPDATE SET description = EXCLUDED.description, amount = EXCLUDED.amount
            RETURNING id, group_id, user_id, description, amount, resolved, created_at
            "#,
        )
        .bind(req.group_id)
        .bind(req.user_id)
        .bind(&req.description)
        .bind(req.amount)
        .fetch_one(pool)
        .await
    }

    pub async fn set_resolved(
        pool: &PgPool,
        debtor_id: i32,
        resolved: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Debtor>(
            r#"
            UPDATE debtors
            SET resolved = $2
            WHERE id = $1
            RETURNING id, group_id, user_id, description, amount, resolved, created_at
            "#,
        )
        .bind(debtor_id)
        .bind(resolved)
        .fetch_optional(pool)
        .await
    }
}

impl GroupDebtor {
    pub async fn list_for_group(pool: &PgPool, group_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GroupDebtor>(
            r#"
            SELECT d.id, d.group_id, d.user_id, d.description, d.amount, d.resolved, d.created_at,
                   u.full_name AS user_name, u.email AS user_email
            FROM debtors d
            LEFT JOIN users u ON d.user_id = u.id
            WHERE d.group_id = $1 AND d.resolved = false
            ORDER BY d.created_at DESC
            "#,
        )
        .bind(group_id)
        .fetch_all(pool)
        .await
    }
}

impl GlobalDebtor {
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GlobalDebtor>(
            r#"
            SELECT d.id, d.group_id, d.user_id, d.description, d.amount, d.resolved, d.created_at,
                   u.full_name AS user_name, g.name AS group_name
            FROM debtors d
            LEFT JOIN users u ON d.user_id = u.id
            LEFT JOIN groups g ON d.group_id = g.id
            WHERE d.resolved = false
            ORDER BY d.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_defaults_amount_to_zero() {
        let req: UpsertDebtorRequest = serde_json::from_str(
            r#"{"group_id": 1, "user_id": 2, "description": "books"}"#,
        )
        .unwrap();
        assert_eq!(req.amount, 0.0);
    }

    #[test]
    fn resolve_defaults_to_true() {
        let req: ResolveDebtorRequest = serde_json::from_str(r#"{"debtor_id": 5}"#).unwrap();
        assert!(req.resolved);

        let req: ResolveDebtorRequest =
            serde_json::from_str(r#"{"debtor_id": 5, "resolved": false}"#).unwrap();
        assert!(!req.resolved);
    }

    #[test]
    fn resolve_requires_debtor_id() {
        let result = serde_json::from_str::<ResolveDebtorRequest>(r#"{"resolved": true}"#);
        assert!(result.is_err());
    }
}
