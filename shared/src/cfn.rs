//! CloudFormation custom-resource plumbing.
//!
//! A custom resource must report exactly one SUCCESS or FAILED signal to
//! the stack's callback URL for every lifecycle event, no matter what the
//! handler does. A missing signal leaves the deployment hung until the
//! stack times out; [`run_custom_resource`] owns that contract.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::{Error, Result};

/// Stack lifecycle event delivered to a custom-resource Lambda.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// What a resource handler hands back on success.
#[derive(Debug, Default)]
pub struct ResourceOutcome {
    /// Stable identifier for the provisioned resource. Defaults to one
    /// derived from the event when the handler has nothing better.
    pub physical_resource_id: Option<String>,
    /// Attributes readable via `Fn::GetAtt`.
    pub data: serde_json::Map<String, Value>,
}

impl ResourceOutcome {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            physical_resource_id: Some(id.into()),
            data: serde_json::Map::new(),
        }
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), Value::String(value.into()));
        self
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum SignalStatus {
    Success,
    Failed,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignalBody {
    status: SignalStatus,
    reason: String,
    physical_resource_id: String,
    stack_id: String,
    request_id: String,
    logical_resource_id: String,
    data: serde_json::Map<String, Value>,
}

/// Read a required string property from `ResourceProperties`.
pub fn property<'a>(properties: &'a Value, key: &str) -> Result<&'a str> {
    properties
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Validation(format!("missing resource property {key}")))
}

/// Read an optional string property from `ResourceProperties`.
pub fn optional_property<'a>(properties: &'a Value, key: &str) -> Option<&'a str> {
    properties.get(key).and_then(Value::as_str)
}

/// Run a resource handler and signal the outcome back to CloudFormation.
///
/// Handler failures are logged and reported as FAILED; only a failure to
/// deliver the signal itself propagates.
pub async fn run_custom_resource<F, Fut>(
    http: &reqwest::Client,
    event: CustomResourceEvent,
    handler: F,
) -> Result<()>
where
    F: FnOnce(CustomResourceEvent) -> Fut,
    Fut: Future<Output = Result<ResourceOutcome>>,
{
    let response_url = event.response_url.clone();
    let outcome = handler(event.clone()).await;
    let body = signal_body(&event, &outcome);

    match &outcome {
        Ok(_) => info!(
            request_type = ?event.request_type,
            logical_resource_id = %event.logical_resource_id,
            "custom resource handled"
        ),
        Err(e) => error!(
            request_type = ?event.request_type,
            logical_resource_id = %event.logical_resource_id,
            error = %e,
            "custom resource handler failed"
        ),
    }

    http.put(&response_url)
        .json(&body)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| Error::Aws(format!("failed to deliver CloudFormation signal: {e}")))?;

    Ok(())
}

fn signal_body(
    event: &CustomResourceEvent,
    outcome: &Result<ResourceOutcome>,
) -> SignalBody {
    let fallback_id = || {
        event
            .physical_resource_id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", event.logical_resource_id, event.request_id))
    };

    match outcome {
        Ok(outcome) => SignalBody {
            status: SignalStatus::Success,
            reason: "See the details in the CloudWatch log stream".to_string(),
            physical_resource_id: outcome.physical_resource_id.clone().unwrap_or_else(fallback_id),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            data: outcome.data.clone(),
        },
        Err(e) => SignalBody {
            status: SignalStatus::Failed,
            reason: e.to_string(),
            physical_resource_id: fallback_id(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            data: serde_json::Map::new(),
        },
    }
}
