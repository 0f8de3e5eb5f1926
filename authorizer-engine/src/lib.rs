//! # authorizer-engine
//!
//! A crate for deciding API gateway access from bearer tokens issued by an
//! OIDC-style identity provider.
//!
//! ## Components
//!
//! - **SigningKeyCache:** Lazily fetched, refetch-on-miss cache of the issuer's public keys.
//! - **TokenVerifier:** Ordered verification chain for access tokens (structure, key, signature, expiry, issuer, audience, subject).
//! - **PolicyBuilder:** Renders Allow/Deny IAM policy documents for gateway resources.
//! - **DecisionEngine:** Total authorization: every request becomes an Allow or Deny decision, never an error.
//! - **secret_hash:** The HMAC-SHA256 client secret hash some issuer APIs require alongside a username.

pub mod engine;
pub mod error;
pub mod keys;
pub mod policy;
pub mod secret_hash;
pub mod verifier;

pub use engine::{AuthorizeRequest, Decision, DecisionEngine};
pub use error::{KeyError, SecretHashError, VerifyError};
pub use keys::SigningKeyCache;
pub use policy::{Effect, PolicyBuilder, PolicyDocument, PolicyStatement, RequestContext};
pub use secret_hash::secret_hash;
pub use verifier::{Claims, TokenVerifier};
