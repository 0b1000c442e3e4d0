//! Weather forecast providers.
//!
//! Deployments pick a provider through `API_PROVIDER`; without one the
//! client produces plausible random temperatures so the sample bots work
//! out of the box without an API key.

use rand::Rng;
use serde::Deserialize;

use crate::locale::Locale;
use crate::{Error, Result};

/// Which upstream service answers forecast queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    AccuWeather,
    OpenWeather,
    /// No provider configured; generate random temperatures.
    Stub,
}

impl Provider {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "AccuWeather" => Ok(Provider::AccuWeather),
            "OpenWeather" => Ok(Provider::OpenWeather),
            other => Err(Error::Config(format!("invalid API_PROVIDER {other:?}"))),
        }
    }
}

/// Daily forecast, in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecast {
    pub temp_min: f64,
    pub temp_max: f64,
}

impl Forecast {
    /// Convert to degrees Fahrenheit.
    pub fn to_imperial(self) -> Forecast {
        Forecast {
            temp_min: celsius_to_fahrenheit(self.temp_min),
            temp_max: celsius_to_fahrenheit(self.temp_max),
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    (celsius * 9.0 / 5.0 + 32.0).round()
}

/// Client for the configured forecast provider.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    provider: Provider,
    api_key: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AccuCity {
    #[serde(rename = "Key")]
    key: String,
}

#[derive(Debug, Deserialize)]
struct AccuForecastBody {
    #[serde(rename = "DailyForecasts")]
    daily_forecasts: Vec<AccuDay>,
}

#[derive(Debug, Deserialize)]
struct AccuDay {
    #[serde(rename = "Temperature")]
    temperature: AccuTemperature,
}

#[derive(Debug, Deserialize)]
struct AccuTemperature {
    #[serde(rename = "Minimum")]
    minimum: AccuValue,
    #[serde(rename = "Maximum")]
    maximum: AccuValue,
}

#[derive(Debug, Deserialize)]
struct AccuValue {
    #[serde(rename = "Value")]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherBody {
    main: OpenWeatherMain,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp_min: f64,
    temp_max: f64,
}

impl WeatherClient {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Build a client for the configured provider, resolving the API key
    /// from SSM once at cold start. A missing parameter is logged and
    /// degrades to an empty key, matching how a deployment behaves before
    /// the key has been written.
    pub async fn from_config(config: &crate::config::WeatherConfig) -> Self {
        if config.provider == Provider::Stub {
            return Self::new(Provider::Stub, "");
        }

        let Some(parameter) = config.api_key_parameter.as_deref() else {
            tracing::error!("API_PROVIDER is set but SSM_REFERENCE_TO_API_KEY is not");
            return Self::new(config.provider, "");
        };

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ssm = aws_sdk_ssm::Client::new(&aws_config);

        let api_key = match ssm
            .get_parameter()
            .name(parameter)
            .with_decryption(true)
            .send()
            .await
        {
            Ok(response) => response
                .parameter()
                .and_then(|p| p.value())
                .unwrap_or_default()
                .to_string(),
            Err(e) => {
                tracing::error!(parameter, error = %e, "API key parameter not found in SSM");
                String::new()
            }
        };

        Self::new(config.provider, api_key)
    }

    /// Today's forecast for a city, in metric units.
    pub async fn daily_forecast(&self, city: &str) -> Result<Forecast> {
        match self.provider {
            Provider::AccuWeather => self.accuweather(city).await,
            Provider::OpenWeather => self.openweather(city).await,
            Provider::Stub => Ok(random_forecast()),
        }
    }

    async fn accuweather(&self, city: &str) -> Result<Forecast> {
        const BASE: &str = "https://dataservice.accuweather.com";

        let cities: Vec<AccuCity> = self
            .http
            .get(format!("{BASE}/locations/v1/cities/search"))
            .query(&[("apikey", self.api_key.as_str()), ("q", city)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let city_id = cities
            .first()
            .map(|c| c.key.clone())
            .ok_or_else(|| Error::Forecast(format!("no data for city {city:?}")))?;

        let body: AccuForecastBody = self
            .http
            .get(format!("{BASE}/forecasts/v1/daily/1day/{city_id}"))
            .query(&[("apikey", self.api_key.as_str()), ("metric", "true")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let day = body
            .daily_forecasts
            .first()
            .ok_or_else(|| Error::Forecast(format!("no daily forecast for city {city:?}")))?;

        Ok(Forecast {
            temp_min: day.temperature.minimum.value,
            temp_max: day.temperature.maximum.value,
        })
    }

    async fn openweather(&self, city: &str) -> Result<Forecast> {
        let body: OpenWeatherBody = self
            .http
            .get("https://api.openweathermap.org/data/2.5/weather")
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Forecast {
            temp_min: body.main.temp_min,
            temp_max: body.main.temp_max,
        })
    }
}

fn random_forecast() -> Forecast {
    let mut rng = rand::thread_rng();
    let min: i32 = rng.gen_range(15..=38);
    let max = min + rng.gen_range(1..=5);
    Forecast {
        temp_min: f64::from(min),
        temp_max: f64::from(max),
    }
}

/// Localized forecast sentence, already converted to the locale's units.
pub fn forecast_sentence(locale: Locale, city: &str, forecast: &Forecast) -> String {
    let forecast = if locale.uses_imperial_units() {
        forecast.to_imperial()
    } else {
        *forecast
    };
    let max = forecast.temp_max.round() as i64;
    let min = forecast.temp_min.round() as i64;

    match locale {
        Locale::PtBr => format!(
            "A previsão do tempo para hoje na cidade de {city} é de máxima de {max} e mínima de {min}."
        ),
        Locale::EsUs => format!(
            "La previsión del tiempo para hoy en la ciudad de {city} es de máxima de {max} y mínima de {min}."
        ),
        Locale::EnUs => format!(
            "The weather forecast for today in the city of {city} is maximum of {max} and minimum of {min}."
        ),
        Locale::FrFr => format!(
            "Les prévisions météo pour aujourd'hui dans la ville de {city} est le maximum {max} et un minimum {min}."
        ),
        Locale::ItIt => format!(
            "Le forecasti meteo per oggi nella città di {city} è il massimo: {max} e minimo di {min}."
        ),
        Locale::DeDe => format!(
            "Die Wettervorhersage für heute in der Stadt {city} ist das Maximum von {max} und mindestens {min}."
        ),
        Locale::RuRu => format!(
            "Прогноз погоды на сегодня в городе {city} есть максимум {max} и минимум {min}."
        ),
        Locale::JaJp => format!(
            "今日の{city}の予報は、最高気温が{max}度、最低気温が{min}度です。"
        ),
    }
}

/// Localized "could not find the data" sentence for failed lookups.
pub fn forecast_error_sentence(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Não econtrei o dado desejado.",
        Locale::EsUs => "No encontré el dado deseado.",
        Locale::EnUs => "I could not find the desired data.",
        Locale::FrFr => "Je ne trouve pas les données souhaitées.",
        Locale::ItIt => "Non ho trovato i dati desiderati.",
        Locale::DeDe => "Ich habe nicht die gewünschten Daten finden.",
        Locale::RuRu => "Я не нашел нужные данные",
        Locale::JaJp => "ご希望のデータが見つかりませんでした。",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_providers() {
        assert_eq!(Provider::parse("AccuWeather").unwrap(), Provider::AccuWeather);
        assert_eq!(Provider::parse("OpenWeather").unwrap(), Provider::OpenWeather);
        assert!(matches!(
            Provider::parse("WeatherUnderground"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn stub_forecast_stays_in_range() {
        for _ in 0..100 {
            let forecast = random_forecast();
            assert!((15.0..=38.0).contains(&forecast.temp_min));
            assert!(forecast.temp_max > forecast.temp_min);
            assert!(forecast.temp_max - forecast.temp_min <= 5.0);
        }
    }

    #[test]
    fn converts_to_fahrenheit() {
        let forecast = Forecast {
            temp_min: 0.0,
            temp_max: 20.0,
        };
        let imperial = forecast.to_imperial();
        assert_eq!(imperial.temp_min, 32.0);
        assert_eq!(imperial.temp_max, 68.0);
    }

    #[test]
    fn parses_accuweather_payloads() {
        let body: AccuForecastBody = serde_json::from_str(
            r#"{"DailyForecasts":[{"Temperature":{"Minimum":{"Value":12.5},"Maximum":{"Value":21.0}}}]}"#,
        )
        .unwrap();
        assert_eq!(body.daily_forecasts[0].temperature.minimum.value, 12.5);

        let cities: Vec<AccuCity> = serde_json::from_str(r#"[{"Key":"349727"}]"#).unwrap();
        assert_eq!(cities[0].key, "349727");
    }

    #[test]
    fn sentence_uses_imperial_units_for_en_us() {
        let forecast = Forecast {
            temp_min: 10.0,
            temp_max: 20.0,
        };
        let sentence = forecast_sentence(Locale::EnUs, "Toronto", &forecast);
        assert_eq!(
            sentence,
            "The weather forecast for today in the city of Toronto is maximum of 68 and minimum of 50."
        );
    }

    #[test]
    fn sentence_stays_metric_elsewhere() {
        let forecast = Forecast {
            temp_min: 10.0,
            temp_max: 20.0,
        };
        let sentence = forecast_sentence(Locale::PtBr, "Recife", &forecast);
        assert_eq!(
            sentence,
            "A previsão do tempo para hoje na cidade de Recife é de máxima de 20 e mínima de 10."
        );
    }

    #[test]
    fn parses_openweather_payloads() {
        let body: OpenWeatherBody =
            serde_json::from_str(r#"{"main":{"temp_min":9.3,"temp_max":17.8,"humidity":40}}"#)
                .unwrap();
        assert_eq!(body.main.temp_min, 9.3);
        assert_eq!(body.main.temp_max, 17.8);
    }
}
