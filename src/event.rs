use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{FromRequest, Query, Request},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

const MAX_BODY_BYTES: usize = 1 << 20;

/// Request headers every cross-origin caller is allowed to send.
const ALLOWED_REQUEST_HEADERS: &str = "Content-Type, X-User-Id, X-Auth-Token";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// Normalized description of one incoming request: method, flat query map,
/// raw body text and headers. All handlers consume this instead of touching
/// the transport directly.
#[derive(Debug)]
pub struct Event {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
    pub headers: HeaderMap,
}

impl Event {
    pub fn new(method: Method) -> Self {
        Event {
            method,
            query: HashMap::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_json_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn is_preflight(&self) -> bool {
        self.method == Method::OPTIONS
    }

    /// Parses the body as a JSON object of the given shape. An absent body
    /// counts as `{}`; anything malformed or incomplete is a 400 before any
    /// database work happens.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        let raw = self.body.as_deref().unwrap_or("{}");
        serde_json::from_str(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
    }

    /// Integer query parameter; `Ok(None)` when absent, 400 when unparsable.
    pub fn query_i32(&self, name: &str) -> Result<Option<i32>, AppError> {
        match self.query.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("{name} must be an integer"))),
        }
    }
}

impl<S> FromRequest<S> for Event
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();

        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|_| AppError::BadRequest("Invalid query string".into()))?
            .0;

        let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|_| AppError::BadRequest("Unreadable request body".into()))?;
        let body = if bytes.is_empty() {
            None
        } else {
            Some(
                String::from_utf8(bytes.to_vec())
                    .map_err(|_| AppError::BadRequest("Request body is not valid UTF-8".into()))?,
            )
        };

        Ok(Event {
            method: parts.method,
            query,
            body,
            headers: parts.headers,
        })
    }
}

/// Response envelope shared by every endpoint: status code, header list,
/// JSON body text and the never-set base64 flag.
#[derive(Debug)]
pub struct ApiResponse {
    pub status_code: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ApiResponse {
    /// JSON response with the shared CORS header attached.
    pub fn json<T: Serialize>(status_code: StatusCode, payload: &T) -> Self {
        let body = serde_json::to_string(payload).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize response body: {}", e);
            r#"{"error": "Internal server error"}"#.to_string()
        });
        ApiResponse {
            status_code,
            headers: vec![
                ("content-type", "application/json".to_string()),
                ("access-control-allow-origin", "*".to_string()),
            ],
            body,
            is_base64_encoded: false,
        }
    }

    /// CORS preflight: 200, empty body, the four negotiation headers and
    /// nothing else. Must never be preceded by database access.
    pub fn preflight(allowed_methods: &str) -> Self {
        ApiResponse {
            status_code: StatusCode::OK,
            headers: vec![
                ("access-control-allow-origin", "*".to_string()),
                ("access-control-allow-methods", allowed_methods.to_string()),
                ("access-control-allow-headers", ALLOWED_REQUEST_HEADERS.to_string()),
                ("access-control-max-age", PREFLIGHT_MAX_AGE.to_string()),
            ],
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    pub fn method_not_allowed() -> Self {
        ApiResponse::json(
            StatusCode::METHOD_NOT_ALLOWED,
            &serde_json::json!({"error": "Method not allowed"}),
        )
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| *header == name)
            .map(|(_, value)| value.as_str())
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut builder = axum::http::Response::builder().status(self.status_code);
        for (name, value) in &self.headers {
            builder = builder.header(*name, value);
        }
        builder
            .body(Body::from(self.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_body_parses_as_empty_object() {
        #[derive(serde::Deserialize)]
        struct Probe {
            #[serde(default)]
            action: Option<String>,
        }

        let event = Event::new(Method::POST);
        let probe: Probe = event.json_body().unwrap();
        assert!(probe.action.is_none());
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        let mut event = Event::new(Method::POST);
        event.body = Some("{not json".into());
        let err = event.json_body::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn query_i32_distinguishes_absent_from_invalid() {
        let event = Event::new(Method::GET).with_query("group_id", "7");
        assert_eq!(event.query_i32("group_id").unwrap(), Some(7));
        assert_eq!(event.query_i32("user_id").unwrap(), None);

        let bad = Event::new(Method::GET).with_query("group_id", "seven");
        assert!(bad.query_i32("group_id").is_err());
    }

    #[test]
    fn preflight_carries_exactly_the_negotiation_headers() {
        let reply = ApiResponse::preflight("GET, POST, OPTIONS");
        assert_eq!(reply.status_code, StatusCode::OK);
        assert!(reply.body.is_empty());
        assert!(!reply.is_base64_encoded);
        assert_eq!(reply.header("access-control-allow-origin"), Some("*"));
        assert_eq!(
            reply.header("access-control-allow-methods"),
            Some("GET, POST, OPTIONS")
        );
        assert_eq!(
            reply.header("access-control-allow-headers"),
            Some("Content-Type, X-User-Id, X-Auth-Token")
        );
        assert_eq!(reply.header("access-control-max-age"), Some("86400"));
        assert_eq!(reply.headers.len(), 4);
    }

    #[test]
    fn json_responses_carry_content_type_and_cors() {
        let reply = ApiResponse::json(StatusCode::OK, &serde_json::json!({"success": true}));
        assert_eq!(reply.header("content-type"), Some("application/json"));
        assert_eq!(reply.header("access-control-allow-origin"), Some("*"));
        assert_eq!(reply.body, r#"{"success":true}"#);
    }
}
