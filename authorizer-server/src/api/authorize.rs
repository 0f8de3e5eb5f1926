use crate::openapi::AUTHORIZATION_TAG;
use crate::state::AppState;
use authorizer_engine::{AuthorizeRequest, Decision};
use axum::extract::{Json, State};
use axum::routing::post;
use axum::Router;

#[utoipa::path(
    post,
    path = "/authorize",
    tag = AUTHORIZATION_TAG,
    request_body = AuthorizeRequest,
    params(
        ("Authorization" = String, Header, description = "API key as a bearer token"),
    ),
    responses(
        (status = 200, description = "Decision rendered, either Allow or Deny", body = Decision),
        (status = 401, description = "Missing API key"),
        (status = 403, description = "Invalid API key"),
        (status = 422, description = "Invalid request payload")
    )
)]
pub(crate) async fn authorize_handler(
    State(state): State<AppState>,
    Json(request): Json<AuthorizeRequest>,
) -> Json<Decision> {
    // Verification failures are decisions, not errors: a parseable request
    // always gets a 200 with an Allow or Deny document.
    Json(state.engine.authorize(request).await)
}

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/authorize", post(authorize_handler))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{mint_access_token, TestFixture, TEST_AUDIENCE};
    use authorizer_engine::Decision;
    use axum::body::Body;
    use http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_authorize_allows_valid_token() {
        let fixture = TestFixture::new().await;
        fixture.mount_jwks().await;

        let token = mint_access_token(&fixture.issuer_mock.uri(), TEST_AUDIENCE, "alice", 300);
        let response = fixture
            .post(
                "/authorize",
                &json!({
                    "token": token,
                    "username": "alice",
                    "request_context": {
                        "account_id": "111122223333",
                        "api_id": "myapi",
                        "stage": "prod",
                        "http_method": "GET",
                    },
                }),
            )
            .await;

        response.assert_ok();
        assert_eq!(
            response.json,
            json!({
                "principalId": "alice",
                "policyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": "execute-api:Invoke",
                        "Effect": "Allow",
                        "Resource": "arn:aws:execute-api:us-east-1:111122223333:myapi/prod/GET/*",
                    }],
                },
            })
        );
    }

    #[tokio::test]
    async fn test_authorize_denies_expired_token_with_200() {
        let fixture = TestFixture::new().await;
        fixture.mount_jwks().await;

        let token = mint_access_token(&fixture.issuer_mock.uri(), TEST_AUDIENCE, "alice", -300);
        let response = fixture
            .post(
                "/authorize",
                &json!({
                    "token": token,
                    "username": "alice",
                    "request_context": {
                        "account_id": "111122223333",
                        "api_id": "myapi",
                        "stage": "prod",
                        "http_method": "GET",
                    },
                }),
            )
            .await;

        // A denial is a successful authorization call
        response.assert_ok();
        assert_eq!(
            response.json,
            json!({
                "principalId": "alice",
                "policyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": "execute-api:Invoke",
                        "Effect": "Deny",
                        "Resource": "arn:aws:execute-api:us-east-1:111122223333:myapi/prod/GET/*",
                    }],
                },
            })
        );
    }

    #[tokio::test]
    async fn test_authorize_without_token_denies() {
        let fixture = TestFixture::new().await;

        let response = fixture
            .post(
                "/authorize",
                &json!({
                    "username": "bob",
                    "request_context": {
                        "account_id": "111122223333",
                        "api_id": "myapi",
                        "stage": "prod",
                        "http_method": "DELETE",
                    },
                }),
            )
            .await;

        response.assert_ok();
        let decision = response.json_as::<Decision>();
        assert_eq!(decision.principal_id, "bob");
        assert_eq!(
            decision.policy_document.statement[0].resource,
            "arn:aws:execute-api:us-east-1:111122223333:myapi/prod/DELETE/*"
        );
    }

    #[tokio::test]
    async fn test_authorize_rejects_body_without_request_context() {
        let fixture = TestFixture::new().await;

        let response = fixture
            .post("/authorize", &json!({ "username": "alice" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_authorize_requires_api_key() {
        let fixture = TestFixture::new().await;

        let body = json!({
            "request_context": {
                "account_id": "111122223333",
                "api_id": "myapi",
                "stage": "prod",
                "http_method": "GET",
            },
        });
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/authorize")
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .expect("Failed to build request");

        let response = fixture.send(request).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
