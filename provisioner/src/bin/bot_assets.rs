//! Custom resource seeding the bot's S3 buckets with rendered configuration.
//!
//! Create and Update render the bundled config template by replacing its
//! `%%ANCHOR%%` placeholders from the resource properties and upload the
//! result to the brain bucket. Delete empties the brain and webclient
//! buckets so CloudFormation can remove them.

use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use shared::cfn::{
    optional_property, property, run_custom_resource, CustomResourceEvent, RequestType,
    ResourceOutcome,
};
use shared::{Error, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_TEMPLATE: &str = include_str!("../../assets/configs.json");
const CONFIG_KEY: &str = "configs.json";

/// Voice and UI labels per configured bot language.
struct SpeechParams {
    language_tag: &'static str,
    send_label: &'static str,
    male_voice: &'static str,
    female_voice: &'static str,
}

fn speech_params(language: &str) -> Result<&'static SpeechParams> {
    match language {
        "Portuguese" => Ok(&SpeechParams {
            language_tag: "pt-BR",
            send_label: "Enviar",
            male_voice: "Ricardo",
            female_voice: "Vitoria",
        }),
        "Spanish" => Ok(&SpeechParams {
            language_tag: "es-US",
            send_label: "Enviar",
            male_voice: "Miguel",
            female_voice: "Penelope",
        }),
        "English" => Ok(&SpeechParams {
            language_tag: "en-US",
            send_label: "Send",
            male_voice: "Joey",
            female_voice: "Joanna",
        }),
        "French" => Ok(&SpeechParams {
            language_tag: "fr-FR",
            send_label: "Envoyer",
            male_voice: "Mathieu",
            female_voice: "Celine",
        }),
        "Italian" => Ok(&SpeechParams {
            language_tag: "it-IT",
            send_label: "Inviare",
            male_voice: "Giorgio",
            female_voice: "Carla",
        }),
        "German" => Ok(&SpeechParams {
            language_tag: "de-DE",
            send_label: "Senden",
            male_voice: "Hans",
            female_voice: "Vicki",
        }),
        "Russian" => Ok(&SpeechParams {
            language_tag: "ru-RU",
            send_label: "послать",
            male_voice: "Maxim",
            female_voice: "Tatyana",
        }),
        other => Err(Error::Validation(format!("unknown bot language {other:?}"))),
    }
}

/// Replace every `%%ANCHOR%%` in the template from the resource properties.
fn render_config(template: &str, properties: &serde_json::Value) -> Result<String> {
    let required = [
        ("%%AWS_ID%%", "AwsId"),
        ("%%AWS_REGION%%", "AwsRegion"),
        ("%%BOT_NAME%%", "BotName"),
        ("%%API_URI%%", "ApiUri"),
        ("%%BRAIN_BUCKET_NAME%%", "BrainBucket"),
        ("%%CONVERSATION_LOGS_TABLE%%", "ConversationLogsTable"),
        ("%%ENTITIES_TABLE%%", "EntitiesTable"),
        ("%%CONTEXT_TABLE%%", "ContextTable"),
        ("%%SAMPLE_LEAVE_FEEDBACK_BOT_ARN%%", "SampleLeaveFeedbackBotArn"),
        ("%%SAMPLE_WEATHER_FORECAST_BOT_ARN%%", "SampleWeatherForecastBotArn"),
        ("%%SAMPLE_PIZZA_ORDER_BOT_ARN%%", "SampleOrderPizzaBotArn"),
        ("%%GENDER%%", "BotGender"),
    ];
    let optional = [
        ("%%COGNITO_IDENTITY_POOL%%", "CognitoIdentityPool"),
        ("%%COGNITO_USER_POOL_ID%%", "CognitoUserPoolId"),
        ("%%COGNITO_USER_POOL_CLIENT_ID%%", "CognitoUserPoolClientId"),
    ];

    let mut content = template.to_string();
    for (anchor, key) in required {
        content = content.replace(anchor, property(properties, key)?);
    }
    for (anchor, key) in optional {
        content = content.replace(anchor, optional_property(properties, key).unwrap_or(""));
    }

    let params = speech_params(property(properties, "BotLanguage")?)?;
    let voice = match property(properties, "BotGender")? {
        "Male" => params.male_voice,
        _ => params.female_voice,
    };
    content = content.replace("%%SEND_LABEL%%", params.send_label);
    content = content.replace("%%BOT_VOICE%%", voice);
    content = content.replace("%%LANGUAGE_TAG%%", params.language_tag);

    Ok(content)
}

struct AppState {
    s3: S3Client,
    http: reqwest::Client,
}

impl AppState {
    async fn new() -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            s3: S3Client::new(&aws_config),
            http: reqwest::Client::new(),
        }
    }
}

async fn seed_buckets(state: &AppState, event: &CustomResourceEvent) -> Result<ResourceOutcome> {
    let properties = &event.resource_properties;
    let brain_bucket = property(properties, "BrainBucket")?;
    let content = render_config(CONFIG_TEMPLATE, properties)?;

    state
        .s3
        .put_object()
        .bucket(brain_bucket)
        .key(CONFIG_KEY)
        .content_type("application/json")
        .body(content.into_bytes().into())
        .send()
        .await
        .map_err(|e| Error::Aws(format!("failed to upload {CONFIG_KEY}: {e}")))?;

    info!(bucket = brain_bucket, key = CONFIG_KEY, "uploaded bot configuration");
    Ok(ResourceOutcome::with_id(format!("{brain_bucket}/{CONFIG_KEY}")))
}

/// Delete every object in the bucket, logging and skipping objects that
/// fail so one bad key does not leave the rest behind.
async fn empty_bucket(state: &AppState, bucket: &str) -> Result<()> {
    let mut pages = state
        .s3
        .list_objects_v2()
        .bucket(bucket)
        .into_paginator()
        .send();

    while let Some(page) = pages.next().await {
        let page = page.map_err(|e| Error::Aws(format!("failed to list bucket {bucket}: {e}")))?;
        for object in page.contents() {
            let Some(key) = object.key() else { continue };
            if let Err(e) = state
                .s3
                .delete_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
            {
                warn!(bucket, key, error = %e, "failed to delete object");
            }
        }
    }

    info!(bucket, "emptied bucket");
    Ok(())
}

async fn clean_buckets(state: &AppState, event: &CustomResourceEvent) -> Result<ResourceOutcome> {
    let properties = &event.resource_properties;
    empty_bucket(state, property(properties, "BrainBucket")?).await?;
    if let Some(webclient_bucket) = optional_property(properties, "SampleWebClientBucket") {
        empty_bucket(state, webclient_bucket).await?;
    }
    Ok(ResourceOutcome::default())
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<CustomResourceEvent>,
) -> std::result::Result<(), LambdaError> {
    let state_for_handler = state.clone();
    run_custom_resource(&state.http, event.payload, move |event| async move {
        match event.request_type {
            RequestType::Create | RequestType::Update => {
                seed_buckets(&state_for_handler, &event).await
            }
            RequestType::Delete => clean_buckets(&state_for_handler, &event).await,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn properties() -> serde_json::Value {
        serde_json::json!({
            "AwsId": "123456789012",
            "AwsRegion": "us-east-1",
            "BotName": "Joanna",
            "ApiUri": "https://api.example.com/prod",
            "BrainBucket": "brain-bucket",
            "ConversationLogsTable": "conversation-logs",
            "EntitiesTable": "entities",
            "ContextTable": "context",
            "SampleLeaveFeedbackBotArn": "arn:aws:lambda:us-east-1:123456789012:function:feedback",
            "SampleWeatherForecastBotArn": "arn:aws:lambda:us-east-1:123456789012:function:weather",
            "SampleOrderPizzaBotArn": "arn:aws:lambda:us-east-1:123456789012:function:pizza",
            "BotLanguage": "English",
            "BotGender": "Female"
        })
    }

    #[test]
    fn renders_every_anchor() {
        let rendered = render_config(CONFIG_TEMPLATE, &properties()).unwrap();
        assert!(!rendered.contains("%%"), "unrendered anchors left: {rendered}");

        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["awsRegion"], "us-east-1");
        assert_eq!(parsed["voice"], "Joanna");
        assert_eq!(parsed["language"], "en-US");
        assert_eq!(parsed["sendLabel"], "Send");
        // Cognito anchors degrade to empty strings when absent.
        assert_eq!(parsed["cognito"]["identityPool"], "");
    }

    #[test]
    fn male_gender_picks_the_male_voice() {
        let mut props = properties();
        props["BotGender"] = "Male".into();
        props["BotLanguage"] = "German".into();
        let rendered = render_config(CONFIG_TEMPLATE, &props).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["voice"], "Hans");
        assert_eq!(parsed["language"], "de-DE");
    }

    #[test]
    fn missing_required_property_fails() {
        let mut props = properties();
        props.as_object_mut().unwrap().remove("BrainBucket");
        assert!(matches!(
            render_config(CONFIG_TEMPLATE, &props),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn unknown_language_fails() {
        assert!(matches!(
            speech_params("Klingon"),
            Err(Error::Validation(_))
        ));
    }
}
