//! WeatherForecast intent: resolve the City slot and close with a
//! localized forecast sentence.

use shared::forecast::{forecast_error_sentence, forecast_sentence};
use shared::lex::{resolved_slot, DialogActionType, FulfillmentState, LexEvent, LexResponse};
use shared::{Error, Locale, Result};
use tracing::error;

use crate::AppState;

pub async fn handle_weather(state: &AppState, event: LexEvent) -> Result<LexResponse> {
    let locale = Locale::parse(&event.bot.locale_id)?;

    match city_forecast(state, &event, locale).await {
        Ok(sentence) => Ok(event
            .reply(FulfillmentState::Fulfilled, DialogActionType::Close)
            .message(sentence)
            .build()),
        Err(e) => {
            error!(locale = %locale, error = %e, "weather lookup failed");
            Ok(event
                .reply(FulfillmentState::Failed, DialogActionType::Close)
                .message(forecast_error_sentence(locale))
                .build())
        }
    }
}

async fn city_forecast(state: &AppState, event: &LexEvent, locale: Locale) -> Result<String> {
    let city = resolved_slot(&event.session_state.intent, "City")
        .ok_or_else(|| Error::Validation("City slot has no resolved value".to_string()))?;

    let forecast = state.weather.daily_forecast(city).await?;
    Ok(forecast_sentence(locale, city, &forecast))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Provider, WeatherClient};

    fn weather_event(locale_id: &str, with_city: bool) -> LexEvent {
        let slots = if with_city {
            serde_json::json!({
                "City": {"value": {"interpretedValue": "toronto", "resolvedValues": ["Toronto"]}}
            })
        } else {
            serde_json::json!({"City": null})
        };

        serde_json::from_value(serde_json::json!({
            "sessionId": "session-1",
            "bot": {"localeId": locale_id},
            "sessionState": {
                "intent": {"name": "WeatherForecast", "slots": slots}
            }
        }))
        .unwrap()
    }

    fn stub_state() -> AppState {
        AppState::stub(WeatherClient::new(Provider::Stub, ""))
    }

    #[tokio::test]
    async fn closes_fulfilled_with_a_sentence() {
        let state = stub_state();
        let response = handle_weather(&state, weather_event("en_US", true))
            .await
            .unwrap();
        assert_eq!(
            response.session_state.intent.state,
            Some(FulfillmentState::Fulfilled)
        );
        let message = &response.messages.unwrap()[0];
        assert!(message.content.contains("Toronto"));
    }

    #[tokio::test]
    async fn missing_city_closes_failed_with_localized_error() {
        let state = stub_state();
        let response = handle_weather(&state, weather_event("fr_FR", false))
            .await
            .unwrap();
        assert_eq!(
            response.session_state.intent.state,
            Some(FulfillmentState::Failed)
        );
        assert_eq!(
            response.messages.unwrap()[0].content,
            "Je ne trouve pas les données souhaitées."
        );
    }

    #[tokio::test]
    async fn unknown_locale_is_an_error() {
        let state = stub_state();
        let err = handle_weather(&state, weather_event("xx_XX", true))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedLocale(_)));
    }
}
