//! Capability implementations backed by the AWS SDK.

use crate::provider::{InstanceClient, ObjectPage, ObjectStoreClient, StackClient};
use anyhow::Context;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_ec2::types::{AttributeBooleanValue, Filter};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::DateTime as SmithyDateTime;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use chrono::{DateTime, Utc};
use ci_cleaner_config::constants;
use ci_cleaner_core::{Bucket, CleanerError, Instance, Result, Stack, StackStatus};

const CREDENTIALS_PROVIDER_NAME: &str = "ci-cleaner";

pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

/// Static credentials are used when given; otherwise the default chain
/// (environment, profile, instance metadata) applies.
pub async fn load_sdk_config(credentials: &AwsCredentials) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(credentials.region.clone()));

    if !credentials.access_key_id.is_empty() {
        loader = loader.credentials_provider(Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        ));
    }

    loader.load().await
}

fn to_utc(time: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

pub struct CloudFormationStacks {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormationStacks {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudformation::Client::new(config),
        }
    }
}

fn convert_stack(stack: &aws_sdk_cloudformation::types::Stack) -> Stack {
    Stack {
        name: stack.stack_name().unwrap_or_default().to_string(),
        created_at: stack.creation_time().and_then(to_utc),
        status: stack
            .stack_status()
            .map(|s| StackStatus::from(s.as_str()))
            .unwrap_or_else(|| StackStatus::Other(String::new())),
        output_keys: stack
            .outputs()
            .iter()
            .filter_map(|o| o.output_key())
            .map(str::to_string)
            .collect(),
    }
}

#[async_trait]
impl StackClient for CloudFormationStacks {
    async fn list_stacks(&self) -> Result<Vec<Stack>> {
        let mut stacks = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_stacks()
                .set_next_token(next_token.take())
                .send()
                .await
                .context("describe stacks")?;

            stacks.extend(output.stacks().iter().map(convert_stack));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(stacks)
    }

    async fn disable_termination_protection(&self, stack_name: &str) -> Result<()> {
        self.client
            .update_termination_protection()
            .stack_name(stack_name)
            .enable_termination_protection(false)
            .send()
            .await
            .context("update termination protection")?;

        Ok(())
    }

    async fn delete_stack(&self, stack_name: &str) -> Result<()> {
        self.client
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .context("delete stack")?;

        Ok(())
    }
}

pub struct Ec2Instances {
    client: aws_sdk_ec2::Client,
}

impl Ec2Instances {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ec2::Client::new(config),
        }
    }
}

#[async_trait]
impl InstanceClient for Ec2Instances {
    async fn find_master_instances(&self, stack_name: &str) -> Result<Vec<Instance>> {
        let output = self
            .client
            .describe_instances()
            .filters(
                Filter::builder()
                    .name(constants::STACK_NAME_TAG)
                    .values(stack_name)
                    .build(),
            )
            .filters(
                Filter::builder()
                    .name(constants::MASTER_NAME_TAG)
                    .values(constants::MASTER_NAME_PATTERN)
                    .build(),
            )
            .send()
            .await
            .context("describe instances")?;

        let mut instances = Vec::new();
        for reservation in output.reservations() {
            if reservation.instances().len() != 1 {
                return Err(CleanerError::UnexpectedInstanceCount {
                    stack: stack_name.to_string(),
                    count: reservation.instances().len(),
                });
            }

            instances.extend(
                reservation
                    .instances()
                    .iter()
                    .filter_map(|i| i.instance_id())
                    .map(|id| Instance { id: id.to_string() }),
            );
        }

        Ok(instances)
    }

    async fn disable_termination_protection(&self, instance_id: &str) -> Result<()> {
        self.client
            .modify_instance_attribute()
            .instance_id(instance_id)
            .disable_api_termination(AttributeBooleanValue::builder().value(false).build())
            .send()
            .await
            .context("modify instance attribute")?;

        Ok(())
    }
}

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
        }
    }
}

#[async_trait]
impl ObjectStoreClient for S3ObjectStore {
    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .context("list buckets")?;

        Ok(output
            .buckets()
            .iter()
            .map(|b| Bucket {
                name: b.name().unwrap_or_default().to_string(),
                created_at: b.creation_date().and_then(to_utc),
            })
            .collect())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .context("list objects")?;

        Ok(ObjectPage {
            keys: output
                .contents()
                .iter()
                .filter_map(|o| o.key())
                .map(str::to_string)
                .collect(),
            is_truncated: output.is_truncated().unwrap_or(false),
            next_continuation_token: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("build object identifiers")?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .context("build delete request")?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .context("delete objects")?;

        if let Some(first) = output.errors().first() {
            return Err(anyhow::anyhow!(
                "{} objects were not deleted, first {:?}: {}",
                output.errors().len(),
                first.key().unwrap_or_default(),
                first.message().unwrap_or_default()
            )
            .into());
        }

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        match self.client.delete_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(e) if e.as_service_error().and_then(|se| se.code()) == Some("NoSuchBucket") => {
                Err(CleanerError::not_found("bucket", bucket))
            }
            Err(e) => Err(anyhow::Error::new(e).context("delete bucket").into()),
        }
    }
}
