use axum::{
    extract::State,
    http::{Method, StatusCode},
};
use serde::Deserialize;

use crate::{
    AppState,
    error::AppError,
    event::{ApiResponse, Event},
    utils::{CredentialScheme, Sha256Hex},
};

use super::model::{LoginRequest, RegisterRequest, User};

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

#[derive(Debug, Deserialize)]
struct ActionEnvelope {
    #[serde(default)]
    action: Option<String>,
}

/// Registration and login. Dispatch runs on the `action` body field; an
/// absent action means login.
#[axum::debug_handler]
pub async fn handle(
    State(state): State<AppState>,
    event: Event,
) -> Result<ApiResponse, AppError> {
    if event.is_preflight() {
        return Ok(ApiResponse::preflight(ALLOWED_METHODS));
    }

    if event.method != Method::POST {
        return Ok(ApiResponse::method_not_allowed());
    }

    let envelope: ActionEnvelope = event.json_body()?;
    match envelope.action.as_deref().unwrap_or("login") {
        "register" => register(&state, &event).await,
        "login" => login(&state, &event).await,
        _ => Ok(ApiResponse::method_not_allowed()),
    }
}

async fn register(state: &AppState, event: &Event) -> Result<ApiResponse, AppError> {
    let req: RegisterRequest = event.json_body()?;

    if User::email_exists(&state.pool, &req.email).await? {
        return Ok(ApiResponse::json(
            StatusCode::BAD_REQUEST,
            &serde_json::json!({
                "success": false,
                "error": "Email already registered"
            }),
        ));
    }

    let password_hash = Sha256Hex.hash(&req.password);
    let user = User::create(&state.pool, &req, &password_hash).await?;
    tracing::info!("Registered user {} ({})", user.id, user.email);

    Ok(ApiResponse::json(
        StatusCode::CREATED,
        &serde_json::json!({"success": true, "user": user}),
    ))
}

async fn login(state: &AppState, event: &Event) -> Result<ApiResponse, AppError> {
    let req: LoginRequest = event.json_body()?;

    let password_hash = Sha256Hex.hash(&req.password);
    match User::find_by_credentials(&state.pool, &req.email, &password_hash).await? {
        Some(user) => Ok(ApiResponse::json(
            StatusCode::OK,
            &serde_json::json!({"success": true, "user": user}),
        )),
        None => Ok(ApiResponse::json(
            StatusCode::UNAUTHORIZED,
            &serde_json::json!({
                "success": false,
                "error": "Invalid credentials"
            }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn preflight_short_circuits_without_touching_the_database() {
        let state = test_support::state();
        let reply = handle(State(state), Event::new(Method::OPTIONS))
            .await
            .unwrap();

        assert_eq!(reply.status_code, StatusCode::OK);
        assert!(reply.body.is_empty());
        assert_eq!(
            reply.header("access-control-allow-methods"),
            Some(ALLOWED_METHODS)
        );
    }

    #[tokio::test]
    async fn non_post_methods_are_rejected() {
        let state = test_support::state();
        let reply = handle(State(state), Event::new(Method::GET)).await.unwrap();

        assert_eq!(reply.status_code, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(reply.body, r#"{"error":"Method not allowed"}"#);
    }

    #[tokio::test]
    async fn unknown_action_falls_through_to_method_not_allowed() {
        let state = test_support::state();
        let event = Event::new(Method::POST)
            .with_json_body(serde_json::json!({"action": "transmogrify"}));
        let reply = handle(State(state), event).await.unwrap();

        assert_eq!(reply.status_code, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn register_with_missing_fields_is_rejected_before_any_query() {
        let state = test_support::state();
        let event = Event::new(Method::POST)
            .with_json_body(serde_json::json!({"action": "register", "email": "a@x.com"}));
        let err = handle(State(state), event).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn login_with_missing_password_is_rejected_before_any_query() {
        let state = test_support::state();
        let event =
            Event::new(Method::POST).with_json_body(serde_json::json!({"email": "a@x.com"}));
        let err = handle(State(state), event).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
