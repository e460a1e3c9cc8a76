//! WMO weather code lookup.
//! See: https://open-meteo.com/en/docs#weathervariables

/// Display text and icon for a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherInfo {
    pub description: &'static str,
    pub icon: &'static str,
}

impl WeatherInfo {
    const fn new(description: &'static str, icon: &'static str) -> Self {
        Self { description, icon }
    }
}

pub const UNKNOWN: WeatherInfo = WeatherInfo::new("Unknown", "🌡️");

/// Look up a weather code. Codes outside the table map to [`UNKNOWN`].
pub fn weather_info(code: i32) -> WeatherInfo {
    match code {
        0 => WeatherInfo::new("Clear Sky", "☀️"),
        1 => WeatherInfo::new("Mainly Clear", "🌤️"),
        2 => WeatherInfo::new("Partly Cloudy", "⛅"),
        3 => WeatherInfo::new("Overcast", "☁️"),
        45 => WeatherInfo::new("Foggy", "🌫️"),
        48 => WeatherInfo::new("Depositing Rime Fog", "🌫️"),
        51 => WeatherInfo::new("Light Drizzle", "🌦️"),
        53 => WeatherInfo::new("Moderate Drizzle", "🌦️"),
        55 => WeatherInfo::new("Dense Drizzle", "🌧️"),
        61 => WeatherInfo::new("Slight Rain", "🌧️"),
        63 => WeatherInfo::new("Moderate Rain", "🌧️"),
        65 => WeatherInfo::new("Heavy Rain", "⛈️"),
        71 => WeatherInfo::new("Slight Snow", "🌨️"),
        73 => WeatherInfo::new("Moderate Snow", "❄️"),
        75 => WeatherInfo::new("Heavy Snow", "❄️"),
        77 => WeatherInfo::new("Snow Grains", "🌨️"),
        80 => WeatherInfo::new("Slight Rain Showers", "🌦️"),
        81 => WeatherInfo::new("Moderate Rain Showers", "🌧️"),
        82 => WeatherInfo::new("Violent Rain Showers", "⛈️"),
        85 => WeatherInfo::new("Slight Snow Showers", "🌨️"),
        86 => WeatherInfo::new("Heavy Snow Showers", "❄️"),
        95 => WeatherInfo::new("Thunderstorm", "⛈️"),
        96 => WeatherInfo::new("Thunderstorm with Hail", "⛈️"),
        99 => WeatherInfo::new("Thunderstorm with Heavy Hail", "⛈️"),
        _ => UNKNOWN,
    }
}
