use serde::Deserialize;

/// Configuration for the token issuer
#[derive(Debug, Deserialize, Clone)]
pub struct IssuerConfig {
    /// Base URL of the issuer, also the expected `iss` claim of every token
    #[serde(default)]
    pub url: String,

    /// The audience tokens must be scoped to, usually the app client id
    #[serde(default)]
    pub audience: String,

    /// How long a fetched signing key set stays fresh, in seconds (default: 600)
    #[serde(default = "default_keys_ttl_secs")]
    pub keys_ttl_secs: u64,

    /// The timeout for key set fetches in seconds (default: 5)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_keys_ttl_secs() -> u64 {
    600
}

fn default_fetch_timeout_secs() -> u64 {
    5
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            url: "".to_string(),
            audience: "".to_string(),
            keys_ttl_secs: default_keys_ttl_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl IssuerConfig {
    /// The issuer's published key set location, derived from the base URL.
    pub fn jwks_url(&self) -> String {
        format!(
            "{}/.well-known/jwks.json",
            self.url.trim_end_matches('/')
        )
    }
}
