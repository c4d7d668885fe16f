use crate::cli::AwsArgs;
use anyhow::Context;
use ci_cleaner_aws::{AwsCleanerConfig, AwsCredentials, load_sdk_config, new_orchestrator};
use ci_cleaner_config::AwsSettings;
use ci_cleaner_core::Orchestrator;
use tracing::info;

fn apply_overrides(args: &AwsArgs, settings: &mut AwsSettings) {
    if let Some(region) = &args.region {
        settings.region = Some(region.clone());
    }
}

pub async fn create_orchestrator(
    args: AwsArgs,
    mut settings: AwsSettings,
) -> anyhow::Result<Orchestrator> {
    apply_overrides(&args, &mut settings);
    settings.validate()?;

    let region = settings.region.context("aws.region must be set")?;
    info!("Using AWS region {}", region);

    let sdk_config = load_sdk_config(&AwsCredentials {
        access_key_id: args.access_key_id,
        secret_access_key: args.secret_access_key,
        region,
    })
    .await;

    Ok(new_orchestrator(AwsCleanerConfig::from_sdk_config(&sdk_config)))
}
