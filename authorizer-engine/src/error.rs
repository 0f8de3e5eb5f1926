use thiserror::Error;

/// Failures raised while resolving a signing key from the issuer's key set.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("signing key '{0}' is not present in the issuer's key set")]
    KeyNotFound(String),

    #[error("failed to fetch the issuer's key set: {0}")]
    FetchFailed(#[from] reqwest::Error),
}

/// The closed set of reasons a bearer token fails verification.
///
/// Every variant resolves to a Deny at the decision boundary; none of them
/// escapes the engine as an error to its caller.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token expired at {expired_at} (now {now})")]
    TokenExpired { expired_at: i64, now: i64 },

    #[error("token issuer '{actual}' does not match expected issuer '{expected}'")]
    IssuerMismatch { expected: String, actual: String },

    #[error("token audience does not match expected audience '{expected}'")]
    AudienceMismatch { expected: String },

    #[error("token subject '{actual}' does not match expected subject '{expected}'")]
    SubjectMismatch { expected: String, actual: String },

    #[error("could not resolve the token's signing key: {0}")]
    KeyFetchFailure(#[from] KeyError),
}

/// Failure initializing the keyed-hash primitive for the client secret proof.
///
/// This is a configuration fault, not an authorization outcome; callers must
/// abort the operation instead of converting it into a Deny.
#[derive(Error, Debug)]
pub enum SecretHashError {
    #[error("failed to initialize HMAC with the provided client secret: {0}")]
    CryptoFailure(#[from] hmac::digest::InvalidLength),
}
