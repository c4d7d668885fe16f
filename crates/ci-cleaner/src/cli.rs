use ci_cleaner_config::constants;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ci-cleaner", version, about = "Cleanup leftover CI resources")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "CI_CLEANER_CONFIG",
        default_value = constants::DEFAULT_CONFIG_PATH,
        help = "Optional TOML settings file"
    )]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cleanup leftover AWS CI resources.
    Aws(AwsArgs),
    /// Cleanup leftover Azure CI resources.
    Azure(AzureArgs),
    /// Print version information.
    Version,
}

#[derive(Args, Debug)]
pub struct AwsArgs {
    #[arg(long, env = "AWS_ACCESS_KEY_ID", default_value = "", hide_env_values = true)]
    pub access_key_id: String,
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", default_value = "", hide_env_values = true)]
    pub secret_access_key: String,
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,
}

#[derive(Args, Debug)]
pub struct AzureArgs {
    #[arg(long, env = "AZURE_CLIENT_ID")]
    pub client_id: String,
    #[arg(long, env = "AZURE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,
    #[arg(long, env = "AZURE_TENANT_ID")]
    pub tenant_id: Option<String>,
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription_id: Option<String>,
    #[arg(long, env = "AZURE_LOCATION")]
    pub location: Option<String>,
    #[arg(
        long,
        env = "AZURE_INSTALLATIONS",
        help = "Comma separated list of installation names to cleanup"
    )]
    pub installations: Option<String>,
}
