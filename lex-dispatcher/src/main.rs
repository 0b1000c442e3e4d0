//! Lex v2 fulfillment Lambda.
//!
//! Routes each incoming event to the handler for its detected intent.

mod intents;
mod menu;

use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::lex::{LexEvent, LexResponse};
use shared::{DispatcherConfig, WeatherClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub struct AppState {
    pub dynamo: DynamoClient,
    pub weather: WeatherClient,
    pub config: DispatcherConfig,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = DispatcherConfig::from_env()?;
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let weather = WeatherClient::from_config(&config.weather).await;

        Ok(Self {
            dynamo: DynamoClient::new(&aws_config),
            weather,
            config,
        })
    }

    #[cfg(test)]
    pub fn stub(weather: WeatherClient) -> Self {
        use shared::{Provider, WeatherConfig};

        let dynamo_config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(aws_sdk_dynamodb::config::BehaviorVersion::latest())
            .build();

        Self {
            dynamo: DynamoClient::from_conf(dynamo_config),
            weather,
            config: DispatcherConfig {
                feedback_table: None,
                pizza_orders_table: None,
                pizza_orders_index: None,
                child_directed: true,
                weather: WeatherConfig {
                    provider: Provider::Stub,
                    api_key_parameter: None,
                },
            },
        }
    }
}

async fn handler(state: Arc<AppState>, event: LambdaEvent<LexEvent>) -> Result<LexResponse, Error> {
    let event = event.payload;
    let intent_name = event.session_state.intent.name.clone();
    info!(intent = %intent_name, locale = %event.bot.locale_id, "Lex event");

    let response = match intent_name.as_str() {
        "LeaveFeedback" => intents::feedback::save_feedback(&state, event).await?,
        "PizzaOrder" => intents::pizza::handle_order(&state, event).await?,
        "WeatherForecast" => intents::weather::handle_weather(&state, event).await?,
        other => return Err(shared::Error::UnsupportedIntent(other.to_string()).into()),
    };

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
