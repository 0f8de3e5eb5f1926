use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Policy language version the gateway understands.
pub const POLICY_VERSION: &str = "2012-10-17";

/// The only action this authorizer ever grants or denies.
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Outcome of an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Effect {
    Allow,
    Deny,
}

/// Gateway request coordinates used to scope the policy resource.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct RequestContext {
    /// Account that owns the gateway API
    pub account_id: String,
    /// Gateway API identifier
    pub api_id: String,
    /// Deployment stage of the invoked API (e.g. "prod")
    pub stage: String,
    /// HTTP method of the invoked route
    pub http_method: String,
}

/// A single grant or denial inside a policy document.
///
/// Field names serialize in the capitalized form the gateway's policy
/// language expects.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct PolicyStatement {
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Resource")]
    pub resource: String,
}

/// The policy artifact a gateway enforces. Always exactly one statement in
/// this system; the effect mirrors the decision that produced it.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statement: Vec<PolicyStatement>,
}

/// Builds single-statement invoke policies scoped to a gateway method.
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    region: String,
}

impl PolicyBuilder {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    /// Assembles the policy document for a decided effect.
    ///
    /// The resource ends in `/*` on purpose: the grant covers the whole
    /// subtree under the invoked method, so the gateway can reuse the
    /// decision for sibling paths instead of re-authorizing each one.
    pub fn build(&self, effect: Effect, context: &RequestContext) -> PolicyDocument {
        let resource = format!(
            "arn:aws:execute-api:{}:{}:{}/{}/{}/*",
            self.region, context.account_id, context.api_id, context.stage, context.http_method
        );
        PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statement: vec![PolicyStatement {
                action: INVOKE_ACTION.to_string(),
                effect,
                resource,
            }],
        }
    }
}
