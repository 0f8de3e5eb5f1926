pub(crate) use crate::config::gateway::GatewayConfig;
pub(crate) use crate::config::issuer::IssuerConfig;
use config::{Config as ConfigCrate, ConfigError};
use serde::Deserialize;

pub mod gateway;
pub mod issuer;

/// Main configuration structure for the authorizer server
#[derive(Debug, Deserialize, Clone)]
pub struct AuthorizerConfig {
    /// API Key for authentication - mandatory for all authorization calls
    #[serde(default)]
    pub api_key: String,

    /// The port the authorizer server will listen to (default: 7766)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Token issuer configuration
    #[serde(default)]
    pub issuer: IssuerConfig,

    /// API gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_port() -> u16 {
    7766
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            api_key: "".to_string(),
            port: default_port(),
            issuer: IssuerConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl AuthorizerConfig {
    /// Creates a new Config instance from environment variables.
    ///
    /// Nested sections use a double underscore, e.g. `AUTHZ_ISSUER__URL`
    /// maps to `issuer.url`. Fails when `AUTHZ_API_KEY` is unset or empty;
    /// a service that cannot authenticate its caller must not start.
    pub fn new() -> Result<Self, String> {
        let config: Self = ConfigCrate::builder()
            .add_source(
                config::Environment::with_prefix("AUTHZ")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(config::Case::Snake),
            )
            .build()
            .map_err(|e: ConfigError| e.to_string())?
            .try_deserialize()
            .map_err(|e| e.to_string())?;

        if config.api_key.is_empty() {
            return Err("AUTHZ_API_KEY must be set to a non-empty value".to_string());
        }
        Ok(config)
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(issuer_mock: &wiremock::MockServer) -> Self {
        Self {
            api_key: "test_api_key".to_string(),
            port: 0, // Let the OS choose a port
            issuer: IssuerConfig {
                url: issuer_mock.uri(),
                audience: crate::test_utils::TEST_AUDIENCE.to_string(),
                keys_ttl_secs: 600,
                fetch_timeout_secs: 5,
            },
            gateway: GatewayConfig {
                region: "us-east-1".to_string(),
            },
        }
    }
}
