//! Weather-forecast sample bot Lambda.
//!
//! Single-turn handler: `{city, lang}` in, a localized forecast sentence
//! out. The provider API key is resolved from SSM once at cold start; a
//! failed upstream lookup turns into a localized error sentence, never an
//! invocation error.

use std::sync::Arc;

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use shared::forecast::{forecast_error_sentence, forecast_sentence};
use shared::{Locale, WeatherClient, WeatherConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct ForecastRequest {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpokenReply {
    text: String,
    speech: String,
    #[serde(rename = "persistEntities")]
    persist_entities: bool,
}

impl SpokenReply {
    fn say(text: String) -> Self {
        Self {
            speech: text.clone(),
            text,
            persist_entities: true,
        }
    }
}

struct AppState {
    weather: WeatherClient,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = WeatherConfig::from_env()?;
        Ok(Self {
            weather: WeatherClient::from_config(&config).await,
        })
    }
}

async fn localized_forecast(state: &AppState, request: &ForecastRequest) -> Result<String, String> {
    let locale = request
        .lang
        .as_deref()
        .and_then(|lang| Locale::parse(lang).ok());

    let Some(locale) = locale else {
        // No usable locale; nothing better to answer in.
        return Err("Oops! Error!".to_string());
    };

    let Some(city) = request.city.as_deref() else {
        return Err(forecast_error_sentence(locale).to_string());
    };

    match state.weather.daily_forecast(city).await {
        Ok(forecast) => Ok(forecast_sentence(locale, city, &forecast)),
        Err(e) => {
            error!(city, error = %e, "forecast lookup failed");
            Err(forecast_error_sentence(locale).to_string())
        }
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<ForecastRequest>,
) -> Result<SpokenReply, Error> {
    let text = match localized_forecast(&state, &event.payload).await {
        Ok(text) => text,
        Err(text) => text,
    };
    Ok(SpokenReply::say(text))
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

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Provider;

    fn stub_state() -> AppState {
        AppState {
            weather: WeatherClient::new(Provider::Stub, ""),
        }
    }

    #[tokio::test]
    async fn answers_with_a_localized_sentence() {
        let state = stub_state();
        let request = ForecastRequest {
            city: Some("Toronto".to_string()),
            lang: Some("en-US".to_string()),
        };
        let text = localized_forecast(&state, &request).await.unwrap();
        assert!(text.starts_with("The weather forecast for today in the city of Toronto"));
    }

    #[tokio::test]
    async fn missing_lang_falls_back_to_the_generic_error() {
        let state = stub_state();
        let request = ForecastRequest {
            city: Some("Toronto".to_string()),
            lang: None,
        };
        let text = localized_forecast(&state, &request).await.unwrap_err();
        assert_eq!(text, "Oops! Error!");
    }

    #[tokio::test]
    async fn missing_city_answers_in_the_request_locale() {
        let state = stub_state();
        let request = ForecastRequest {
            city: None,
            lang: Some("pt-BR".to_string()),
        };
        let text = localized_forecast(&state, &request).await.unwrap_err();
        assert_eq!(text, "Não econtrei o dado desejado.");
    }

    #[test]
    fn reply_persists_entities() {
        let reply = SpokenReply::say("hello".to_string());
        let rendered = serde_json::to_value(&reply).unwrap();
        assert_eq!(rendered["persistEntities"], true);
        assert_eq!(rendered["text"], rendered["speech"]);
    }
}
