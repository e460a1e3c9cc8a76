use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A geocoded place. Identity is the exact `(name, country)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    /// First-level administrative area, empty when upstream has none.
    #[serde(default)]
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn matches(&self, name: &str, country: &str) -> bool {
        self.name == name && self.country == country
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature: i32,
    /// km/h
    pub wind_speed: f64,
    pub weather_code: i32,
    /// Relative humidity in percent, `None` when upstream omitted it.
    pub humidity: Option<u8>,
    pub feels_like: i32,
    /// Upstream local timestamp, e.g. `2024-05-01T14:00`.
    pub observed_at: String,
}

impl CurrentConditions {
    /// Calendar date of the observation, if the timestamp starts with one.
    pub fn observed_date(&self) -> Option<NaiveDate> {
        let date = self.observed_at.get(..10)?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }

    pub fn humidity_label(&self) -> String {
        match self.humidity {
            Some(pct) => format!("{pct}%"),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub max_temp: i32,
    pub min_temp: i32,
    pub weather_code: i32,
}

/// Number of days kept from the daily series (today is not one of them).
pub const FORECAST_DAYS: usize = 5;

/// Result of one forecast fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastDay>,
}

/// A pinned city plus the weather it had when last fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: i32,
    pub weather_code: i32,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl FavoriteEntry {
    pub fn snapshot(city: &City, current: &CurrentConditions, now: DateTime<Utc>) -> Self {
        Self {
            name: city.name.clone(),
            country: city.country.clone(),
            region: city.region.clone(),
            latitude: city.latitude,
            longitude: city.longitude,
            temperature: current.temperature,
            weather_code: current.weather_code,
            added_at: now,
            last_updated: None,
        }
    }

    pub fn matches(&self, name: &str, country: &str) -> bool {
        self.name == name && self.country == country
    }

    pub fn city(&self) -> City {
        City {
            name: self.name.clone(),
            country: self.country.clone(),
            region: self.region.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
