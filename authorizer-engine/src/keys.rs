use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use log::{debug, info, warn};
use reqwest::Client;
use tokio::sync::RwLock;

use crate::error::KeyError;

/// One snapshot of the issuer's published key set, indexed by key id.
struct CachedKeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// Process-wide cache of the issuer's public signing keys.
///
/// Keys are fetched lazily and always as a whole set: a lookup that misses
/// (unknown key id or aged-out snapshot) triggers one refetch of the full
/// key set. Concurrent refetches are allowed and resolve by overwrite; the
/// last completed fetch wins. A failed refetch keeps whatever snapshot is
/// already cached, so a transient issuer outage does not invalidate keys
/// that are still good.
pub struct SigningKeyCache {
    client: Client,
    jwks_url: String,
    ttl: Duration,
    cached: RwLock<Option<CachedKeySet>>,
}

impl SigningKeyCache {
    /// The client carries the bounded fetch timeout; the cache never builds
    /// its own.
    pub fn new(client: Client, jwks_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client,
            jwks_url: jwks_url.into(),
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Resolves the public key for a key id, refetching the issuer's key set
    /// when the id is unknown or the cached snapshot has aged out.
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, KeyError> {
        {
            let cached = self.cached.read().await;
            if let Some(set) = cached.as_ref() {
                if set.fetched_at.elapsed() < self.ttl {
                    if let Some(key) = set.keys.get(kid) {
                        return Ok(key.clone());
                    }
                }
            }
        }

        match self.refresh().await {
            Ok(()) => {
                let cached = self.cached.read().await;
                match cached.as_ref().and_then(|set| set.keys.get(kid)) {
                    Some(key) => Ok(key.clone()),
                    None => Err(KeyError::KeyNotFound(kid.to_string())),
                }
            }
            Err(err) => {
                // Stale keys are better than none: serve the previous
                // snapshot if it still knows this key id.
                let cached = self.cached.read().await;
                if let Some(key) = cached.as_ref().and_then(|set| set.keys.get(kid)) {
                    warn!("serving stale signing key '{kid}' after failed key set fetch: {err}");
                    return Ok(key.clone());
                }
                Err(err)
            }
        }
    }

    /// Fetches the issuer's key set and replaces the cached snapshot.
    ///
    /// Entries without a key id or with unusable key material are skipped;
    /// symmetric keys never make it into the cache because only asymmetric
    /// key material converts.
    pub async fn refresh(&self) -> Result<(), KeyError> {
        debug!("fetching signing key set from {}", self.jwks_url);
        let jwks: JwkSet = self
            .client
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                warn!("skipping a published signing key without a key id");
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(err) => warn!("skipping unusable key material for '{kid}': {err}"),
            }
        }
        info!("signing key set refreshed, {} usable key(s)", keys.len());

        let mut cached = self.cached.write().await;
        *cached = Some(CachedKeySet {
            keys,
            fetched_at: Instant::now(),
        });
        Ok(())
    }
}
