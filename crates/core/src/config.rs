use serde::Deserialize;

use crate::tiers::TierDefinition;

/// Root application configuration. Loaded from environment variables
/// with the prefix `VOYAGE_PASSPORT__` and nested with `__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub crm: CrmConfig,
    #[serde(default)]
    pub cms: CmsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Tier ladder, injected rather than inlined at call sites. Defaults to
    /// the production ladder; validated once at startup via
    /// [`crate::tiers::TierTable::new`].
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrmConfig {
    #[serde(default = "default_crm_base_url")]
    pub base_url: String,
    /// Private app token. Required unless running with `--offline`.
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_crm_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CmsConfig {
    /// WordPress REST root of the marketing site.
    #[serde(default = "default_cms_base_url")]
    pub base_url: String,
    #[serde(default = "default_cms_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_node_id() -> String {
    "passport-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_crm_base_url() -> String {
    "https://api.hubapi.com".to_string()
}
fn default_crm_timeout_secs() -> u64 {
    30
}
fn default_cms_base_url() -> String {
    "https://www.voyageluxury.com/luxury".to_string()
}
fn default_cms_timeout_secs() -> u64 {
    15
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_tiers() -> Vec<TierDefinition> {
    crate::tiers::TierTable::default().tiers().to_vec()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: default_crm_base_url(),
            api_token: String::new(),
            timeout_secs: default_crm_timeout_secs(),
        }
    }
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            base_url: default_cms_base_url(),
            timeout_secs: default_cms_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            crm: CrmConfig::default(),
            cms: CmsConfig::default(),
            metrics: MetricsConfig::default(),
            tiers: default_tiers(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("VOYAGE_PASSPORT")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_carries_production_ladder() {
        let config = AppConfig::default();
        assert_eq!(config.tiers.len(), 5);
        assert_eq!(config.api.http_port, 8080);
        assert_eq!(config.crm.base_url, "https://api.hubapi.com");
    }
}
