use axum::{
    extract::State,
    http::{Method, StatusCode},
};
use serde::Deserialize;

use crate::{
    AppState,
    error::AppError,
    event::{ApiResponse, Event},
};

use super::model::{CreateGroupRequest, Group, JoinGroupRequest};

const ALLOWED_METHODS: &str = "GET, POST, PUT, OPTIONS";

#[derive(Debug, Deserialize)]
struct ActionEnvelope {
    #[serde(default)]
    action: Option<String>,
}

/// Group listing, creation and membership joins.
#[axum::debug_handler]
pub async fn handle(
    State(state): State<AppState>,
    event: Event,
) -> Result<ApiResponse, AppError> {
    if event.is_preflight() {
        return Ok(ApiResponse::preflight(ALLOWED_METHODS));
    }

    match event.method {
        Method::GET => list(&state).await,
        Method::POST => create(&state, &event).await,
        Method::PUT => {
            let envelope: ActionEnvelope = event.json_body()?;
            match envelope.action.as_deref() {
                Some("join") => join(&state, &event).await,
                _ => Err(AppError::BadRequest("Unknown action".into())),
            }
        }
        _ => Ok(ApiResponse::method_not_allowed()),
    }
}

async fn list(state: &AppState) -> Result<ApiResponse, AppError> {
    let groups = Group::list_with_stats(&state.pool).await?;

    Ok(ApiResponse::json(
        StatusCode::OK,
        &serde_json::json!({"groups": groups}),
    ))
}

async fn create(state: &AppState, event: &Event) -> Result<ApiResponse, AppError> {
    let req: CreateGroupRequest = event.json_body()?;

    let group = Group::create(&state.pool, &req).await?;
    tracing::info!("Created group {} ({})", group.id, group.name);

    Ok(ApiResponse::json(
        StatusCode::CREATED,
        &serde_json::json!({"success": true, "group": group}),
    ))
}

async fn join(state: &AppState, event: &Event) -> Result<ApiResponse, AppError> {
    let req: JoinGroupRequest = event.json_body()?;

    Group::add_member(&state.pool, req.group_id, req.user_id).await?;

    Ok(ApiResponse::json(
        StatusCode::OK,
        &serde_json::json!({"success": true}),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn preflight_advertises_put() {
        let state = test_support::state();
        let reply = handle(State(state), Event::new(Method::OPTIONS))
            .await
            .unwrap();

        assert_eq!(reply.status_code, StatusCode::OK);
        assert_eq!(
            reply.header("access-control-allow-methods"),
            Some(ALLOWED_METHODS)
        );
    }

    #[tokio::test]
    async fn delete_is_rejected() {
        let state = test_support::state();
        let reply = handle(State(state), Event::new(Method::DELETE))
            .await
            .unwrap();

        assert_eq!(reply.status_code, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn put_without_action_is_a_bad_request() {
        let state = test_support::state();
        let event = Event::new(Method::PUT).with_json_body(serde_json::json!({}));
        let err = handle(State(state), event).await.unwrap_err();

        match err {
            AppError::BadRequest(message) => assert_eq!(message, "Unknown action"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn put_with_unknown_action_is_a_bad_request() {
        let state = test_support::state();
        let event = Event::new(Method::PUT)
            .with_json_body(serde_json::json!({"action": "leave", "group_id": 1}));
        let err = handle(State(state), event).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn create_without_admin_id_is_rejected_before_any_query() {
        let state = test_support::state();
        let event = Event::new(Method::POST).with_json_body(serde_json::json!({"name": "Algebra"}));
        let err = handle(State(state), event).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
