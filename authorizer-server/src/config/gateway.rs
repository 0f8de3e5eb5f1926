use serde::Deserialize;

/// Configuration for the API gateway the policies are written for
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Region the gateway is deployed in, used in policy resource ARNs
    #[serde(default)]
    pub region: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            region: "".to_string(),
        }
    }
}
