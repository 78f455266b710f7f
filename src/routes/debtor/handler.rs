use axum::{
    extract::State,
    http::{Method, StatusCode},
};

use crate::{
    AppState,
    error::AppError,
    event::{ApiResponse, Event},
};

use super::model::{Debtor, GlobalDebtor, GroupDebtor, ResolveDebtorRequest, UpsertDebtorRequest};

const ALLOWED_METHODS: &str = "GET, POST, PUT, OPTIONS";

/// Debt records: unresolved listings, keyed upsert and resolution.
#[axum::debug_handler]
pub async fn handle(
    State(state): State<AppState>,
    event: Event,
) -> Result<ApiResponse, AppError> {
    if event.is_preflight() {
        return Ok(ApiResponse::preflight(ALLOWED_METHODS));
    }

    match event.method {
        Method::GET => list(&state, &event).await,
        Method::POST => upsert(&state, &event).await,
        Method::PUT => resolve(&state, &event).await,
        _ => Ok(ApiResponse::method_not_allowed()),
    }
}

async fn list(state: &AppState, event: &Event) -> Result<ApiResponse, AppError> {
    let body = match event.query_i32("group_id")? {
        Some(group_id) => {
            let debtors = GroupDebtor::list_for_group(&state.pool, group_id).await?;
            serde_json::json!({"debtors": debtors})
        }
        None => {
            let debtors = GlobalDebtor::list_all(&state.pool).await?;
            serde_json::json!({"debtors": debtors})
        }
    };

    Ok(ApiResponse::json(StatusCode::OK, &body))
}

async fn upsert(state: &AppState, event: &Event) -> Result<ApiResponse, AppError> {
    let req: UpsertDebtorRequest = event.json_body()?;

    let debtor = Debtor::upsert(&state.pool, &req).await?;

    Ok(ApiResponse::json(
        StatusCode::CREATED,
        &serde_json::json!({"success": true, "debtor": debtor}),
    ))
}

async fn resolve(state: &AppState, event: &Event) -> Result<ApiResponse, AppError> {
    let req: ResolveDebtorRequest = event.json_body()?;

    match Debtor::set_resolved(&state.pool, req.debtor_id, req.resolved).await? {
        Some(debtor) => Ok(ApiResponse::json(
            StatusCode::OK,
            &serde_json::json!({"success": true, "debtor": debtor}),
        )),
        None => Ok(ApiResponse::json(
            StatusCode::NOT_FOUND,
            &serde_json::json!({
                "success": false,
                "error": "Debtor not found"
            }),
        )),
    }
}
