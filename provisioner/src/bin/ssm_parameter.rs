//! Custom resource writing the weather API key to SSM Parameter Store.
//!
//! Create and Update put the key as a SecureString; Delete removes it.
//! The key name and value are echoed back as resource attributes so other
//! stack resources can reference them.

use std::sync::Arc;

use aws_sdk_ssm::types::ParameterType;
use aws_sdk_ssm::Client as SsmClient;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use shared::cfn::{property, run_custom_resource, CustomResourceEvent, RequestType, ResourceOutcome};
use shared::{Error, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct AppState {
    ssm: SsmClient,
    http: reqwest::Client,
}

impl AppState {
    async fn new() -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            ssm: SsmClient::new(&aws_config),
            http: reqwest::Client::new(),
        }
    }
}

async fn put_parameter(state: &AppState, event: &CustomResourceEvent) -> Result<ResourceOutcome> {
    let key_name = property(&event.resource_properties, "SSMKeyNameAPI")?;
    let api_key = property(&event.resource_properties, "APIKey")?;
    let overwrite = event.request_type == RequestType::Update;

    state
        .ssm
        .put_parameter()
        .name(key_name)
        .value(api_key)
        .r#type(ParameterType::SecureString)
        .overwrite(overwrite)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to put parameter {key_name}: {e}")))?;

    info!(parameter = key_name, overwrite, "wrote API key parameter");

    Ok(ResourceOutcome::with_id(key_name)
        .attribute("APIKey", api_key)
        .attribute("SSMKeyNameAPI", key_name))
}

async fn delete_parameter(state: &AppState, event: &CustomResourceEvent) -> Result<ResourceOutcome> {
    let key_name = property(&event.resource_properties, "SSMKeyNameAPI")?;

    state
        .ssm
        .delete_parameter()
        .name(key_name)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to delete parameter {key_name}: {e}")))?;

    info!(parameter = key_name, "deleted API key parameter");
    Ok(ResourceOutcome::with_id(key_name))
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<CustomResourceEvent>,
) -> std::result::Result<(), LambdaError> {
    let state_for_handler = state.clone();
    run_custom_resource(&state.http, event.payload, move |event| async move {
        match event.request_type {
            RequestType::Create | RequestType::Update => {
                put_parameter(&state_for_handler, &event).await
            }
            RequestType::Delete => delete_parameter(&state_for_handler, &event).await,
        }
    })
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> std::result::Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
