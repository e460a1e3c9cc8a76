//! Text rendering of the application context. Pure functions: the caller
//! prints the result.

use chrono::{DateTime, Local, NaiveDate};
use meteo_core::{AppContext, FavoriteEntry, ForecastDay, Screen, ViewState, weather_info};

pub const LOADING_TEXT: &str = "Loading weather data...";
pub const EMPTY_HOME_TEXT: &str = "Search for a city to see its weather.";
pub const EMPTY_FAVORITES_TEXT: &str =
    "No favorite cities yet. Search for a city and mark it with ★.";

/// Render whichever screen is active.
pub fn render(ctx: &AppContext, now: DateTime<Local>) -> String {
    match ctx.screen() {
        Screen::Home => render_home(ctx.view(), ctx.current_is_favorite(), now),
        Screen::Favorites => render_favorites(&ctx.favorites().list()),
    }
}

/// Loading wins over an error, an error wins over weather.
pub fn render_home(view: &ViewState, is_favorite: bool, now: DateTime<Local>) -> String {
    if view.is_loading() {
        return LOADING_TEXT.to_string();
    }

    if let Some(error) = view.error() {
        return format!("⚠ {error}");
    }

    let (Some(city), Some(current)) = (view.city(), view.current()) else {
        return EMPTY_HOME_TEXT.to_string();
    };

    let info = weather_info(current.weather_code);
    let star = if is_favorite { "★" } else { "☆" };

    let mut heading = format!("{}, {}", city.name, city.country);
    if !city.region.is_empty() {
        heading.push_str(&format!(" ({})", city.region));
    }

    let mut lines = vec![
        format!("{heading}  {star}"),
        format_long_date(now),
        format!("{} {}°C  {}", info.icon, current.temperature, info.description),
        format!(
            "Feels like {}°C · Wind {} km/h · Humidity {}",
            current.feels_like,
            current.wind_speed,
            current.humidity_label()
        ),
    ];

    if !view.forecast().is_empty() {
        lines.push(String::new());
        lines.push(format!("{}-day forecast", view.forecast().len()));
        lines.extend(view.forecast().iter().map(render_forecast_day));
    }

    lines.join("\n")
}

pub fn render_forecast_day(day: &ForecastDay) -> String {
    let info = weather_info(day.weather_code);
    format!(
        "{:<12} {}  {:>3}° / {:>3}°  {}",
        format_short_date(day.date),
        info.icon,
        day.max_temp,
        day.min_temp,
        info.description
    )
}

/// Numbered cards; the numbers are what `:open N` and `:remove N` refer to.
pub fn render_favorites(favorites: &[FavoriteEntry]) -> String {
    if favorites.is_empty() {
        return EMPTY_FAVORITES_TEXT.to_string();
    }

    let mut lines = vec![format!("Favorites ({})", favorites.len())];
    for (i, fav) in favorites.iter().enumerate() {
        let info = weather_info(fav.weather_code);
        lines.push(format!(
            "{:>2}. {}, {}  {}°C {} {}",
            i + 1,
            fav.name,
            fav.country,
            fav.temperature,
            info.icon,
            info.description
        ));
    }

    lines.join("\n")
}

/// e.g. `Thu, May 2`
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// e.g. `Wednesday, May 1, 2024, 02:05 PM`
pub fn format_long_date(now: DateTime<Local>) -> String {
    now.format("%A, %B %-d, %Y, %I:%M %p").to_string()
}
