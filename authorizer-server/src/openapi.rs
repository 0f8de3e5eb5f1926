use crate::state::AppState;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const AUTHORIZATION_TAG: &str = "Authorization API";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = AUTHORIZATION_TAG, description = "Gateway authorization endpoints"),
    ),
    paths(
        crate::api::health::healthy_check,
        crate::api::authorize::authorize_handler,
    ),
    components(schemas(
        authorizer_engine::AuthorizeRequest,
        authorizer_engine::Decision,
        authorizer_engine::Effect,
        authorizer_engine::PolicyDocument,
        authorizer_engine::PolicyStatement,
        authorizer_engine::RequestContext,
    )),
    info(
        title = "Gateway Authorizer API",
        description = "Token authorization microservice for API gateways",
        version = "1.0.0"
    )
)]
pub(crate) struct ApiDoc;

/// Handler for the OpenAPI JSON specification endpoint
async fn openapi_json_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates a router for OpenAPI documentation routes
pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi_json_handler))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::TestFixture;

    #[tokio::test]
    async fn test_openapi_json_lists_endpoints() {
        let fixture = TestFixture::new().await;
        let response = fixture.get("/api-docs/openapi.json").await;

        response.assert_ok();
        let paths = response.json["paths"]
            .as_object()
            .expect("openapi document should have paths");
        assert!(paths.contains_key("/authorize"));
        assert!(paths.contains_key("/healthy"));
    }

    #[tokio::test]
    async fn test_scalar_docs_served() {
        let fixture = TestFixture::new().await;
        let response = fixture.get("/scalar").await;

        response.assert_ok();
    }
}
