use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation, decode, decode_header};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::VerifyError;
use crate::keys::SigningKeyCache;

/// Signature algorithms accepted from the issuer. Asymmetric only; a token
/// signed with anything else is rejected before any key material is touched.
const ALLOWED_ALGORITHMS: &[Algorithm] = &[Algorithm::RS256];

/// The claims carried by a verified access token.
///
/// Access tokens from the issuer name their audience in `client_id` rather
/// than `aud`, so both are kept and either may satisfy the audience check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,

    pub iss: String,

    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_use: Option<String>,
}

/// Verifies access tokens against the issuer's published signing keys.
pub struct TokenVerifier {
    keys: Arc<SigningKeyCache>,
}

impl TokenVerifier {
    pub fn new(keys: Arc<SigningKeyCache>) -> Self {
        Self { keys }
    }

    /// Runs the full verification chain and returns the token's claims.
    ///
    /// Checks run in a fixed order and stop at the first failure: token
    /// structure, signing key lookup, signature, expiry, issuer, audience,
    /// then the optional expected subject. Claims are only trusted once the
    /// signature has been proven, which is why expiry and the identity
    /// checks come after it.
    pub async fn verify(
        &self,
        token: &str,
        expected_issuer: &str,
        expected_audience: &str,
        expected_subject: Option<&str>,
        now: i64,
    ) -> Result<Claims, VerifyError> {
        let header =
            decode_header(token).map_err(|err| VerifyError::MalformedToken(err.to_string()))?;
        if !ALLOWED_ALGORITHMS.contains(&header.alg) {
            return Err(VerifyError::SignatureInvalid);
        }
        let kid = header
            .kid
            .ok_or_else(|| VerifyError::MalformedToken("token header carries no key id".into()))?;

        let key = self.keys.get_key(&kid).await?;
        let claims = decode_signature_only(token, &key, header.alg)?.claims;

        if now >= claims.exp {
            return Err(VerifyError::TokenExpired {
                expired_at: claims.exp,
                now,
            });
        }
        if claims.iss != expected_issuer {
            return Err(VerifyError::IssuerMismatch {
                expected: expected_issuer.to_string(),
                actual: claims.iss,
            });
        }
        let audience_matches = claims.aud.as_deref() == Some(expected_audience)
            || claims.client_id.as_deref() == Some(expected_audience);
        if !audience_matches {
            return Err(VerifyError::AudienceMismatch {
                expected: expected_audience.to_string(),
            });
        }
        if let Some(expected) = expected_subject {
            if claims.sub != expected {
                return Err(VerifyError::SubjectMismatch {
                    expected: expected.to_string(),
                    actual: claims.sub,
                });
            }
        }

        debug!("token verified for subject '{}'", claims.sub);
        Ok(claims)
    }
}

/// Checks the signature and deserializes the claims, nothing else. Expiry,
/// issuer and audience are matched by the caller so each failure maps to its
/// own error.
fn decode_signature_only(
    token: &str,
    key: &DecodingKey,
    algorithm: Algorithm,
) -> Result<TokenData<Claims>, VerifyError> {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, key, &validation).map_err(|err| match err.kind() {
        ErrorKind::InvalidSignature => VerifyError::SignatureInvalid,
        _ => VerifyError::MalformedToken(err.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_parse_with_client_id_and_no_aud() {
        let claims: Claims = serde_json::from_str(
            r#"{
                "sub": "alice",
                "iss": "https://issuer.example.com",
                "exp": 1735689600,
                "client_id": "abc123",
                "token_use": "access"
            }"#,
        )
        .unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.aud, None);
        assert_eq!(claims.client_id.as_deref(), Some("abc123"));
        assert_eq!(claims.token_use.as_deref(), Some("access"));
    }

    #[test]
    fn test_claims_omit_absent_fields_when_serialized() {
        let claims = Claims {
            sub: "alice".to_string(),
            iss: "https://issuer.example.com".to_string(),
            exp: 1735689600,
            aud: None,
            client_id: None,
            token_use: None,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sub": "alice",
                "iss": "https://issuer.example.com",
                "exp": 1735689600
            })
        );
    }
}
