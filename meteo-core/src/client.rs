use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    Config,
    error::{Service, WeatherError},
    model::{City, CurrentConditions, FORECAST_DAYS, ForecastDay, WeatherReport},
};

/// Anything that can geocode a city and fetch its weather.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn resolve_city(&self, name: &str) -> Result<City, WeatherError>;

    async fn fetch_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReport, WeatherError>;
}

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weathercode";
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,wind_speed_10m";

/// Open-Meteo geocoding + forecast client.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    geocoding_url: String,
    forecast_url: String,
    language: String,
    http: Client,
}

impl WeatherClient {
    pub fn new(geocoding_url: impl Into<String>, forecast_url: impl Into<String>) -> Self {
        Self {
            geocoding_url: trim_base(geocoding_url.into()),
            forecast_url: trim_base(forecast_url.into()),
            language: crate::config::DEFAULT_LANGUAGE.to_string(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut client = Self::new(config.geocoding_url.clone(), config.forecast_url.clone());
        client.language = config.language.clone();
        client
    }

    async fn get_body(
        &self,
        service: Service,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, WeatherError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| WeatherError::Network { service, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Network { service, source })?;

        if !status.is_success() {
            tracing::warn!("{service} request returned status {status}");
            return Err(WeatherError::Upstream {
                service,
                status,
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn resolve_city(&self, name: &str) -> Result<City, WeatherError> {
        let url = format!("{}/v1/search", self.geocoding_url);
        tracing::debug!("Geocoding '{name}'");

        let body = self
            .get_body(
                Service::Geocoding,
                &url,
                &[
                    ("name", name.to_string()),
                    ("count", "1".to_string()),
                    ("language", self.language.clone()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        let parsed: GeoResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Malformed {
                service: Service::Geocoding,
                reason: e.to_string(),
            })?;

        let first = parsed
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| WeatherError::NotFound {
                query: name.to_string(),
            })?;

        let city = City {
            name: first.name,
            country: first.country.unwrap_or_default(),
            region: first.admin1.unwrap_or_default(),
            latitude: first.latitude,
            longitude: first.longitude,
        };

        tracing::info!("Resolved '{name}' to {}, {}", city.name, city.country);
        Ok(city)
    }

    async fn fetch_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/v1/forecast", self.forecast_url);
        tracing::debug!("Fetching forecast for ({latitude}, {longitude})");

        let body = self
            .get_body(
                Service::Forecast,
                &url,
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("current_weather", "true".to_string()),
                    ("daily", DAILY_FIELDS.to_string()),
                    ("timezone", "auto".to_string()),
                    ("current", CURRENT_FIELDS.to_string()),
                ],
            )
            .await?;

        let parsed: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Malformed {
                service: Service::Forecast,
                reason: e.to_string(),
            })?;

        parsed.into_report()
    }
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: i32,
    time: String,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    weathercode: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: OmCurrentWeather,
    current: Option<OmCurrent>,
    daily: OmDaily,
}

impl ForecastResponse {
    fn into_report(self) -> Result<WeatherReport, WeatherError> {
        let malformed = |reason: String| WeatherError::Malformed {
            service: Service::Forecast,
            reason,
        };

        let temperature = round_half_up(self.current_weather.temperature);
        let current = self.current.as_ref();

        let conditions = CurrentConditions {
            temperature,
            wind_speed: self.current_weather.windspeed,
            weather_code: self.current_weather.weathercode,
            humidity: current
                .and_then(|c| c.relative_humidity_2m)
                .map(|h| h.round().clamp(0.0, 100.0) as u8),
            feels_like: current
                .and_then(|c| c.apparent_temperature)
                .map(round_half_up)
                .unwrap_or(temperature),
            observed_at: self.current_weather.time,
        };

        let daily = self.daily;
        let days = daily
            .time
            .len()
            .min(daily.temperature_2m_max.len())
            .min(daily.temperature_2m_min.len())
            .min(daily.weathercode.len());

        if days < FORECAST_DAYS + 1 {
            return Err(malformed(format!(
                "daily series has {days} complete days, need {}",
                FORECAST_DAYS + 1
            )));
        }

        // Day 0 is today; keep the following five.
        let mut forecast = Vec::with_capacity(FORECAST_DAYS);
        for i in 1..=FORECAST_DAYS {
            let date = NaiveDate::parse_from_str(&daily.time[i], "%Y-%m-%d")
                .map_err(|e| malformed(format!("bad daily date '{}': {e}", daily.time[i])))?;

            forecast.push(ForecastDay {
                date,
                max_temp: round_half_up(daily.temperature_2m_max[i]),
                min_temp: round_half_up(daily.temperature_2m_min[i]),
                weather_code: daily.weathercode[i],
            });
        }

        Ok(WeatherReport {
            current: conditions,
            forecast,
        })
    }
}

/// Nearest integer, with halves rounded towards positive infinity.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
