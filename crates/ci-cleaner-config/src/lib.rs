mod config;
pub mod constants;

pub use config::{
    AwsSettings, AzureSettings, ConfigError, Settings, load_settings, parse_installations,
};
