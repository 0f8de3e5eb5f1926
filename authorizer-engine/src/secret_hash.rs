use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::SecretHashError;

type HmacSha256 = Hmac<Sha256>;

/// Computes the keyed proof that the caller holds the app client's secret.
///
/// HMAC-SHA256 keyed with the client secret, over the UTF-8 bytes of the
/// username followed by the client id, encoded with the standard base64
/// alphabet and no line wraps. The identity provider recomputes the same
/// value to admit the request, so the message layout (username first) is
/// part of the wire contract.
pub fn secret_hash(
    client_id: &str,
    client_secret: &str,
    username: &str,
) -> Result<String, SecretHashError> {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())?;
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
