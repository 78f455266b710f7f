use axum::{
    extract::State,
    http::{Method, StatusCode},
};

use crate::{
    AppState,
    error::AppError,
    event::{ApiResponse, Event},
};

use super::model::{CreateMessageRequest, Message, MessageWithSender};

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Per-group chat messages: chronological listing and append.
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
        Method::POST => create(&state, &event).await,
        _ => Ok(ApiResponse::method_not_allowed()),
    }
}

async fn list(state: &AppState, event: &Event) -> Result<ApiResponse, AppError> {
    let Some(group_id) = event.query_i32("group_id")? else {
        return Ok(ApiResponse::json(
            StatusCode::BAD_REQUEST,
            &serde_json::json!({"error": "group_id required"}),
        ));
    };

    let messages = MessageWithSender::list_for_group(&state.pool, group_id).await?;

    Ok(ApiResponse::json(
        StatusCode::OK,
        &serde_json::json!({"messages": messages}),
    ))
}

async fn create(state: &AppState, event: &Event) -> Result<ApiResponse, AppError> {
    let req: CreateMessageRequest = event.json_body()?;

    let message = Message::create(&state.pool, &req).await?;

    Ok(ApiResponse::json(
        StatusCode::CREATED,
        &serde_json::json!({"success": true, "message": message}),
    ))
}
