use crate::config::AuthorizerConfig;
use authorizer_engine::{DecisionEngine, PolicyBuilder, SigningKeyCache, TokenVerifier};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AuthorizerConfig>,
    pub engine: Arc<DecisionEngine>,
}

impl AppState {
    /// Wires the decision engine from configuration. Fails when the issuer
    /// URL does not parse or the HTTP client cannot be built; both are fatal
    /// configuration problems, not per-request conditions.
    pub fn new(config: AuthorizerConfig) -> Result<Self, String> {
        Url::parse(&config.issuer.url)
            .map_err(|e| format!("Invalid issuer URL '{}': {}", config.issuer.url, e))?;

        let client = Self::create_issuer_client(config.issuer.fetch_timeout_secs)?;
        let keys = Arc::new(SigningKeyCache::new(
            client,
            config.issuer.jwks_url(),
            Duration::from_secs(config.issuer.keys_ttl_secs),
        ));

        // The expected iss claim is the issuer URL without a trailing slash,
        // so a slash in the configured value does not break the exact match.
        let engine = DecisionEngine::new(
            TokenVerifier::new(keys),
            PolicyBuilder::new(&config.gateway.region),
            config.issuer.url.trim_end_matches('/'),
            &config.issuer.audience,
        );

        Ok(Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
        })
    }

    fn create_issuer_client(timeout_secs: u64) -> Result<Client, String> {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(2))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| format!("Failed to create issuer client: {}", e))
    }
}
