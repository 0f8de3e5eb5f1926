use crate::errors::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;

const API_KEY_REJECTION: &str =
    "You are not authorized to access this resource, please check your API key.";

pub(super) async fn authentication_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Extract the authorization header
    let auth_header = match request.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header,
        None => {
            warn!("Missing Authorization header");
            return ApiError::unauthorized("Missing Authorization header").into_response();
        }
    };

    // Extract the API key from the authorization header
    let api_key = match auth_header.to_str() {
        Ok(header_str) => match header_str.get(..7) {
            Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => header_str[7..].to_string(),
            _ => {
                warn!("Invalid Authorization header format, missing 'Bearer ' prefix");
                return ApiError::forbidden(API_KEY_REJECTION).into_response();
            }
        },
        Err(e) => {
            warn!("Failed to parse Authorization header to string: {}", e);
            return ApiError::forbidden(API_KEY_REJECTION).into_response();
        }
    };

    // Verify the API key
    if api_key != state.config.api_key {
        warn!("Authentication failed: Invalid API key");
        return ApiError::forbidden(API_KEY_REJECTION).into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthorizerConfig;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::MockServer;

    const TEST_ROUTE: &str = "/test";

    /// Helper function to set up a mock app with authentication middleware
    async fn setup_authn_mock_app(api_key: &str) -> Router {
        let issuer_mock = MockServer::start().await;
        let mut config = AuthorizerConfig::for_test_with_mocks(&issuer_mock);
        config.api_key = api_key.to_string();
        let state = AppState::new(config).expect("failed to build state");

        Router::new()
            .route(TEST_ROUTE, get(|| async { (StatusCode::OK, "Authenticated") }))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            ))
            .with_state(state)
    }

    /// Helper function to build a request with optional authorization header
    async fn send_request(app: &Router, auth_header: Option<&str>) -> (StatusCode, String) {
        let mut request_builder = Request::builder().uri(TEST_ROUTE);

        if let Some(auth) = auth_header {
            request_builder = request_builder.header("Authorization", auth);
        }

        let request = request_builder
            .body(Body::empty())
            .expect("Failed to build request");

        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        let body = String::from_utf8(body_bytes.to_vec())
            .expect("Failed to convert response body to string");

        (status, body)
    }

    fn rejection_body() -> Value {
        json!({ "detail": API_KEY_REJECTION })
    }

    #[tokio::test]
    async fn test_authentication_middleware() {
        let app = setup_authn_mock_app("test_api_key").await;
        let (status, body) = send_request(&app, Some("Bearer test_api_key")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Authenticated");
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let app = setup_authn_mock_app("test_api_key").await;
        let (status, body) = send_request(&app, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body).expect("body should be JSON");
        assert_eq!(body, json!({ "detail": "Missing Authorization header" }));
    }

    #[tokio::test]
    async fn test_invalid_authorization_format() {
        let app = setup_authn_mock_app("test_api_key").await;
        let (status, body) = send_request(&app, Some("test_api_key")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        let body: Value = serde_json::from_str(&body).expect("body should be JSON");
        assert_eq!(body, rejection_body());
    }

    #[tokio::test]
    async fn test_invalid_api_key() {
        let app = setup_authn_mock_app("test_api_key").await;
        let (status, body) = send_request(&app, Some("Bearer wrong_api_key")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        let body: Value = serde_json::from_str(&body).expect("body should be JSON");
        assert_eq!(body, rejection_body());
    }
}
