use chrono::Utc;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::VerifyError;
use crate::policy::{Effect, PolicyBuilder, PolicyDocument, RequestContext};
use crate::verifier::TokenVerifier;

/// One authorization question: who is calling, with what token, for which
/// gateway resource.
///
/// `username` is the caller's own claim of identity. It is never trusted for
/// an Allow; it only labels the Deny when verification fails, and when
/// present it must match the verified token subject.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorizeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    pub request_context: RequestContext,
}

/// The authorization verdict in the shape the gateway consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Decision {
    #[serde(rename = "principalId")]
    pub principal_id: String,

    #[serde(rename = "policyDocument")]
    pub policy_document: PolicyDocument,
}

/// Turns verification outcomes into gateway policy decisions.
///
/// Authorization is total: every input produces an Allow or Deny document,
/// never an error. On Allow the principal is the verified token subject; on
/// Deny it is the unverified username the caller supplied, so denied
/// attempts stay attributable in the gateway's logs.
pub struct DecisionEngine {
    verifier: TokenVerifier,
    policy: PolicyBuilder,
    issuer: String,
    audience: String,
}

impl DecisionEngine {
    pub fn new(
        verifier: TokenVerifier,
        policy: PolicyBuilder,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            policy,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Decides the request against the current clock.
    pub async fn authorize(&self, request: AuthorizeRequest) -> Decision {
        self.authorize_at(request, Utc::now().timestamp()).await
    }

    /// Decides the request as of `now` (seconds since the Unix epoch).
    pub async fn authorize_at(&self, request: AuthorizeRequest, now: i64) -> Decision {
        let token = request
            .token
            .as_deref()
            .map(strip_bearer_prefix)
            .unwrap_or("");

        let verified = self
            .verifier
            .verify(
                token,
                &self.issuer,
                &self.audience,
                request.username.as_deref(),
                now,
            )
            .await;

        let (effect, principal_id) = match verified {
            Ok(claims) => {
                debug!("authorization granted for subject '{}'", claims.sub);
                (Effect::Allow, claims.sub)
            }
            Err(err) => {
                let principal = request.username.clone().unwrap_or_default();
                // Every kind is listed on purpose: a new verification
                // failure must be mapped here deliberately, not swallowed
                // by a wildcard.
                match &err {
                    VerifyError::KeyFetchFailure(_) => {
                        error!(
                            "authorization denied for '{principal}', key resolution failed: {err}"
                        );
                    }
                    VerifyError::MalformedToken(_)
                    | VerifyError::SignatureInvalid
                    | VerifyError::TokenExpired { .. }
                    | VerifyError::IssuerMismatch { .. }
                    | VerifyError::AudienceMismatch { .. }
                    | VerifyError::SubjectMismatch { .. } => {
                        warn!("authorization denied for '{principal}': {err}");
                    }
                }
                (Effect::Deny, principal)
            }
        };

        Decision {
            principal_id,
            policy_document: self.policy.build(effect, &request.request_context),
        }
    }
}

/// Callers forward the Authorization header as-is often enough that the
/// scheme prefix is tolerated and stripped before verification.
fn strip_bearer_prefix(token: &str) -> &str {
    let trimmed = token.trim();
    match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => trimmed[7..].trim_start(),
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bearer_prefix_removes_scheme() {
        assert_eq!(strip_bearer_prefix("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer_prefix("bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer_prefix("BEARER abc.def.ghi"), "abc.def.ghi");
    }

    #[test]
    fn test_strip_bearer_prefix_keeps_bare_tokens() {
        assert_eq!(strip_bearer_prefix("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer_prefix(""), "");
        assert_eq!(strip_bearer_prefix("Bear"), "Bear");
    }

    #[test]
    fn test_strip_bearer_prefix_trims_whitespace() {
        assert_eq!(strip_bearer_prefix("  Bearer   abc.def.ghi "), "abc.def.ghi");
        assert_eq!(strip_bearer_prefix("  abc.def.ghi  "), "abc.def.ghi");
    }
}
