//! Provider configuration loading.
//!
//! Credentials and endpoint for the catalog provider come from a YAML file
//! so that deployments can mount them without rebuilding.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::CatalogResult;

/// Configuration for one catalog provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Provider name, e.g. "peps".
    pub name: String,

    /// Base URL of the provider's search API.
    pub endpoint: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Default value for a new tile's to-be-downloaded flag.
    #[serde(default = "default_to_be_downloaded")]
    pub to_be_downloaded: bool,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_to_be_downloaded() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    600
}

impl ProviderConfig {
    /// Load a provider configuration from a YAML file.
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ProviderConfig = serde_yaml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        debug!(provider = %config.name, path = %path.display(), "Loaded provider config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_yaml() {
        let yaml = r#"
name: peps
endpoint: "https://peps.cnes.fr/resto/api/collections"
username: curator
password: hunter2
"#;
        let config: ProviderConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.name, "peps");
        assert_eq!(config.username.as_deref(), Some("curator"));
        assert!(config.to_be_downloaded);
        assert_eq!(config.request_timeout_secs, 600);
    }
}
