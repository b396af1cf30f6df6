use std::{fmt, time::Duration};

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProvidersConfig {
    pub authn: ProviderConfig,
    pub user: ProviderConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderConfig {
    Local,
    Rest(RestProviderConfig),
}

#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct RestProviderConfig {
    pub base_url: String,
    pub api_key: String,
    /// Request timeout in seconds. `0` selects the default.
    #[serde(default)]
    pub timeout: u64,
}

impl RestProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl fmt::Debug for RestProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
