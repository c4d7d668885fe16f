use crate::cli::AzureArgs;
use anyhow::Context;
use ci_cleaner_azure::{ArmClient, ArmCredentials, AzureCleanerConfig, new_orchestrator};
use ci_cleaner_config::{AzureSettings, parse_installations};
use ci_cleaner_core::Orchestrator;
use tracing::info;

fn apply_overrides(args: &AzureArgs, settings: &mut AzureSettings) {
    if let Some(installations) = &args.installations {
        settings.installations = parse_installations(installations);
    }
    if let Some(location) = &args.location {
        settings.location = Some(location.clone());
    }
    if let Some(subscription_id) = &args.subscription_id {
        settings.subscription_id = Some(subscription_id.clone());
    }
    if let Some(tenant_id) = &args.tenant_id {
        settings.tenant_id = Some(tenant_id.clone());
    }
}

pub fn create_orchestrator(
    args: AzureArgs,
    mut settings: AzureSettings,
) -> anyhow::Result<Orchestrator> {
    apply_overrides(&args, &mut settings);
    settings.validate()?;

    info!(
        "Cleaning Azure installations {} in {}",
        settings.installations.join(","),
        settings.location.as_deref().unwrap_or_default()
    );

    let client = ArmClient::new(&ArmCredentials {
        tenant_id: settings.tenant_id.clone().context("azure.tenant_id must be set")?,
        client_id: args.client_id,
        client_secret: args.client_secret,
        subscription_id: settings
            .subscription_id
            .clone()
            .context("azure.subscription_id must be set")?,
    })?;

    Ok(new_orchestrator(AzureCleanerConfig::from_arm_client(
        client, &settings,
    ))?)
}
