use crate::constants;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub aws: AwsSettings,

    #[serde(default)]
    pub azure: AzureSettings,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AwsSettings {
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AzureSettings {
    #[serde(default = "default_installations")]
    pub installations: Vec<String>,

    pub location: Option<String>,

    pub subscription_id: Option<String>,

    pub tenant_id: Option<String>,

    #[serde(default = "default_dns_base_domain")]
    pub dns_base_domain: String,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            installations: default_installations(),
            location: None,
            subscription_id: None,
            tenant_id: None,
            dns_base_domain: default_dns_base_domain(),
        }
    }
}

fn default_installations() -> Vec<String> {
    constants::DEFAULT_INSTALLATIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_dns_base_domain() -> String {
    constants::DEFAULT_DNS_BASE_DOMAIN.to_string()
}

/// Splits a comma separated installation list as given on the command line.
pub fn parse_installations(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

impl AwsSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.region.as_deref() {
            Some(region) if !region.is_empty() => Ok(()),
            _ => Err(ConfigError::Invalid("aws.region must not be empty".into())),
        }
    }
}

impl AzureSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.installations.is_empty() {
            return Err(ConfigError::Invalid(
                "azure.installations must not be empty".into(),
            ));
        }
        if self.installations.iter().any(|i| i.is_empty()) {
            return Err(ConfigError::Invalid(
                "azure.installations must contain non empty items".into(),
            ));
        }
        for (field, value) in [
            ("location", &self.location),
            ("subscription_id", &self.subscription_id),
            ("tenant_id", &self.tenant_id),
        ] {
            if value.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::Invalid(format!(
                    "azure.{field} must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Zone holding the delegated NS record sets of one installation.
    pub fn dns_zone_name(&self, installation: &str) -> String {
        let location = self.location.as_deref().unwrap_or_default();
        format!("{}.{}.{}", installation, location, self.dns_base_domain)
    }
}

pub async fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        info!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let settings: Settings = toml::from_str(&content)?;

    Ok(settings)
}
