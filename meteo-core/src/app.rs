//! Application context: the one place that ties the weather source, the
//! favorites list and the view together. The presentation layer owns one
//! `AppContext` and calls into it for every user event.

use anyhow::anyhow;
use std::{fmt, str::FromStr, sync::Arc};

use crate::{
    client::WeatherSource,
    error::WeatherError,
    favorites::FavoritesStore,
    model::{City, WeatherReport},
    view::{RequestTicket, ViewState},
};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a city name";
pub const FAVORITE_LOAD_FAILED_MESSAGE: &str = "Failed to load weather for this city";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Favorites,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Favorites => "favorites",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(Screen::Home),
            "favorites" => Ok(Screen::Favorites),
            _ => Err(anyhow!("Unknown screen '{s}'. Supported screens: home, favorites.")),
        }
    }
}

/// How a search or favorite selection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Weather for the city is now in the view.
    Shown,
    /// The view holds this error message.
    Failed(String),
    /// A newer request was started; this result was dropped.
    Stale,
    EmptyQuery,
    NotFavorite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
    /// Nothing is selected yet.
    NoSelection,
}

/// A search that has been registered with the view but not yet sent.
#[derive(Debug)]
pub struct PendingSearch {
    ticket: RequestTicket,
    query: String,
}

impl PendingSearch {
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Geocode, then fetch conditions for the match.
    pub async fn run(self, source: &dyn WeatherSource) -> CompletedSearch {
        tracing::info!("Searching for: {}", self.query);

        let result = match source.resolve_city(&self.query).await {
            Ok(city) => source
                .fetch_conditions(city.latitude, city.longitude)
                .await
                .map(|report| (city, report)),
            Err(e) => Err(e),
        };

        CompletedSearch {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug)]
pub struct CompletedSearch {
    ticket: RequestTicket,
    result: Result<(City, WeatherReport), WeatherError>,
}

#[derive(Debug)]
pub struct AppContext {
    source: Arc<dyn WeatherSource>,
    favorites: FavoritesStore,
    view: ViewState,
    screen: Screen,
}

impl AppContext {
    pub fn new(source: Arc<dyn WeatherSource>, favorites: FavoritesStore) -> Self {
        Self {
            source,
            favorites,
            view: ViewState::new(),
            screen: Screen::Home,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn source(&self) -> Arc<dyn WeatherSource> {
        Arc::clone(&self.source)
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        tracing::debug!("Switching to {screen} screen");
        self.screen = screen;
    }

    /// Whether the city currently on screen is a favorite.
    pub fn current_is_favorite(&self) -> bool {
        self.view
            .city()
            .is_some_and(|c| self.favorites.contains(&c.name, &c.country))
    }

    /// Register a search. Returns `None` (and sets an error) for a blank query.
    pub fn begin_search(&mut self, query: &str) -> Option<PendingSearch> {
        let query = query.trim();
        if query.is_empty() {
            self.view.set_error(EMPTY_QUERY_MESSAGE);
            return None;
        }

        let ticket = self.view.begin_request();
        self.view.set_loading(true);
        self.view.clear_error();

        Some(PendingSearch {
            ticket,
            query: query.to_string(),
        })
    }

    /// Apply a finished search unless a newer one has been started since.
    pub fn finish_search(&mut self, done: CompletedSearch) -> SearchOutcome {
        if !self.view.is_latest(done.ticket) {
            tracing::debug!("Dropping stale search #{}", done.ticket.sequence());
            return SearchOutcome::Stale;
        }

        let outcome = match done.result {
            Ok((city, report)) => {
                self.view.set_weather(city, report);
                SearchOutcome::Shown
            }
            Err(e) => {
                tracing::warn!("Search error: {e}");
                let message = e.user_message();
                self.view.set_error(message.clone());
                SearchOutcome::Failed(message)
            }
        };

        self.view.set_loading(false);
        outcome
    }

    pub async fn search(&mut self, query: &str) -> SearchOutcome {
        let Some(pending) = self.begin_search(query) else {
            return SearchOutcome::EmptyQuery;
        };

        let source = self.source();
        let done = pending.run(source.as_ref()).await;
        self.finish_search(done)
    }

    /// Add the city on screen to favorites, or remove it if it already is one.
    pub fn toggle_favorite(&mut self) -> FavoriteToggle {
        let (Some(city), Some(current)) = (self.view.city(), self.view.current()) else {
            tracing::warn!("No city data to favorite");
            return FavoriteToggle::NoSelection;
        };

        if self.favorites.contains(&city.name, &city.country) {
            let (name, country) = (city.name.clone(), city.country.clone());
            self.favorites.remove(&name, &country);
            FavoriteToggle::Removed
        } else {
            let (city, current) = (city.clone(), current.clone());
            self.favorites.add(&city, &current);
            FavoriteToggle::Added
        }
    }

    pub fn remove_favorite(&mut self, name: &str, country: &str) -> bool {
        self.favorites.remove(name, country)
    }

    pub fn clear_favorites(&mut self) -> bool {
        self.favorites.clear()
    }

    /// Re-fetch a favorite's weather, show it on the home screen and refresh
    /// its cached snapshot.
    pub async fn select_favorite(&mut self, name: &str, country: &str) -> SearchOutcome {
        let Some(city) = self.favorites.get(name, country).map(|e| e.city()) else {
            return SearchOutcome::NotFavorite;
        };

        let ticket = self.view.begin_request();
        self.view.set_loading(true);

        let source = self.source();
        let result = source.fetch_conditions(city.latitude, city.longitude).await;

        if !self.view.is_latest(ticket) {
            return SearchOutcome::Stale;
        }

        self.switch_screen(Screen::Home);
        let outcome = match result {
            Ok(report) => {
                self.favorites
                    .update_snapshot(&city.name, &city.country, &report.current);
                self.view.set_weather(city, report);
                SearchOutcome::Shown
            }
            Err(e) => {
                tracing::error!("Error loading favorite city: {e}");
                self.view.set_error(FAVORITE_LOAD_FAILED_MESSAGE);
                SearchOutcome::Failed(FAVORITE_LOAD_FAILED_MESSAGE.to_string())
            }
        };

        self.view.set_loading(false);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Service,
        model::{CurrentConditions, ForecastDay},
        storage::MemoryStore,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use parking_lot::Mutex;
    use reqwest::StatusCode;

    #[derive(Debug, Default)]
    struct FakeSource {
        forecast_down: Mutex<bool>,
    }

    fn city_named(name: &str) -> Option<City> {
        let (country, latitude, longitude) = match name {
            "Paris" => ("France", 48.85, 2.35),
            "Berlin" => ("Germany", 52.52, 13.41),
            _ => return None,
        };

        Some(City {
            name: name.to_string(),
            country: country.to_string(),
            region: String::new(),
            latitude,
            longitude,
        })
    }

    fn report_for(latitude: f64) -> WeatherReport {
        let start = NaiveDate::from_ymd_opt(2024, 5, 2).expect("date");
        WeatherReport {
            current: CurrentConditions {
                temperature: latitude.round() as i32 / 4,
                wind_speed: 10.0,
                weather_code: 3,
                humidity: Some(60),
                feels_like: 10,
                observed_at: "2024-05-01T12:00".into(),
            },
            forecast: start
                .iter_days()
                .take(5)
                .map(|date| ForecastDay {
                    date,
                    max_temp: 20,
                    min_temp: 10,
                    weather_code: 1,
                })
                .collect(),
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn resolve_city(&self, name: &str) -> Result<City, WeatherError> {
            city_named(name).ok_or_else(|| WeatherError::NotFound {
                query: name.to_string(),
            })
        }

        async fn fetch_conditions(
            &self,
            latitude: f64,
            _longitude: f64,
        ) -> Result<WeatherReport, WeatherError> {
            if *self.forecast_down.lock() {
                return Err(WeatherError::Upstream {
                    service: Service::Forecast,
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: String::new(),
                });
            }
            Ok(report_for(latitude))
        }
    }

    fn context() -> (AppContext, Arc<FakeSource>, MemoryStore) {
        let source = Arc::new(FakeSource::default());
        let backend = MemoryStore::new();
        let favorites = FavoritesStore::load(Box::new(backend.clone()));
        let ctx = AppContext::new(source.clone(), favorites);
        (ctx, source, backend)
    }

    #[tokio::test]
    async fn search_shows_weather_and_clears_loading() {
        let (mut ctx, _, _) = context();

        assert_eq!(ctx.search("  Paris ").await, SearchOutcome::Shown);

        let view = ctx.view();
        assert_eq!(view.city().map(|c| c.country.as_str()), Some("France"));
        assert_eq!(view.forecast().len(), 5);
        assert!(!view.is_loading());
        assert!(view.error().is_none());
    }

    #[tokio::test]
    async fn empty_query_sets_error_without_request() {
        let (mut ctx, _, _) = context();

        assert_eq!(ctx.search("   ").await, SearchOutcome::EmptyQuery);
        assert_eq!(ctx.view().error(), Some(EMPTY_QUERY_MESSAGE));
        assert!(!ctx.view().is_loading());
    }

    #[tokio::test]
    async fn unknown_city_surfaces_not_found_message() {
        let (mut ctx, _, _) = context();

        let outcome = ctx.search("Atlantis").await;

        let expected = "City not found. Please check spelling and try again.";
        assert_eq!(outcome, SearchOutcome::Failed(expected.to_string()));
        assert_eq!(ctx.view().error(), Some(expected));
        assert!(!ctx.view().is_loading());
    }

    #[tokio::test]
    async fn failed_search_keeps_previous_weather() {
        let (mut ctx, _, _) = context();
        ctx.search("Paris").await;

        ctx.search("Atlantis").await;

        assert_eq!(ctx.view().city().map(|c| c.name.as_str()), Some("Paris"));
        assert!(ctx.view().error().is_some());
    }

    #[tokio::test]
    async fn stale_search_result_is_dropped() {
        let (mut ctx, source, _) = context();

        let first = ctx.begin_search("Paris").expect("pending");
        let second = ctx.begin_search("Berlin").expect("pending");

        let first_done = first.run(source.as_ref()).await;
        let second_done = second.run(source.as_ref()).await;

        assert_eq!(ctx.finish_search(second_done), SearchOutcome::Shown);
        assert_eq!(ctx.finish_search(first_done), SearchOutcome::Stale);
        assert_eq!(ctx.view().city().map(|c| c.name.as_str()), Some("Berlin"));
    }

    #[tokio::test]
    async fn stale_result_does_not_clear_loading() {
        let (mut ctx, source, _) = context();

        let first = ctx.begin_search("Paris").expect("pending");
        let _second = ctx.begin_search("Berlin").expect("pending");

        let first_done = first.run(source.as_ref()).await;
        assert_eq!(ctx.finish_search(first_done), SearchOutcome::Stale);
        assert!(ctx.view().is_loading());
        assert!(!ctx.view().has_weather());
    }

    #[tokio::test]
    async fn toggle_favorite_adds_then_removes() {
        let (mut ctx, _, _) = context();
        assert_eq!(ctx.toggle_favorite(), FavoriteToggle::NoSelection);

        ctx.search("Paris").await;
        assert_eq!(ctx.toggle_favorite(), FavoriteToggle::Added);
        assert!(ctx.current_is_favorite());
        assert_eq!(ctx.favorites().len(), 1);

        assert_eq!(ctx.toggle_favorite(), FavoriteToggle::Removed);
        assert!(!ctx.current_is_favorite());
        assert!(ctx.favorites().is_empty());
    }

    #[tokio::test]
    async fn select_favorite_refreshes_snapshot_and_goes_home() {
        let (mut ctx, _, backend) = context();
        ctx.search("Berlin").await;
        ctx.toggle_favorite();
        ctx.search("Paris").await;
        ctx.switch_screen(Screen::Favorites);

        let outcome = ctx.select_favorite("Berlin", "Germany").await;

        assert_eq!(outcome, SearchOutcome::Shown);
        assert_eq!(ctx.screen(), Screen::Home);
        assert_eq!(ctx.view().city().map(|c| c.name.as_str()), Some("Berlin"));
        let entry = ctx.favorites().get("Berlin", "Germany").expect("favorite");
        assert!(entry.last_updated.is_some());

        let reloaded = FavoritesStore::load(Box::new(backend));
        assert!(reloaded.get("Berlin", "Germany").expect("persisted").last_updated.is_some());
    }

    #[tokio::test]
    async fn select_favorite_failure_sets_fixed_message() {
        let (mut ctx, source, _) = context();
        ctx.search("Paris").await;
        ctx.toggle_favorite();
        ctx.switch_screen(Screen::Favorites);
        *source.forecast_down.lock() = true;

        let outcome = ctx.select_favorite("Paris", "France").await;

        assert_eq!(
            outcome,
            SearchOutcome::Failed(FAVORITE_LOAD_FAILED_MESSAGE.to_string())
        );
        assert_eq!(ctx.screen(), Screen::Home);
        assert_eq!(ctx.view().error(), Some(FAVORITE_LOAD_FAILED_MESSAGE));
        assert!(!ctx.view().is_loading());
        let entry = ctx.favorites().get("Paris", "France").expect("favorite");
        assert!(entry.last_updated.is_none());
    }

    #[tokio::test]
    async fn select_unknown_favorite() {
        let (mut ctx, _, _) = context();

        assert_eq!(
            ctx.select_favorite("Paris", "France").await,
            SearchOutcome::NotFavorite
        );
    }

    #[test]
    fn screen_names_parse() {
        assert_eq!("home".parse::<Screen>().expect("home"), Screen::Home);
        assert_eq!(
            " Favorites ".parse::<Screen>().expect("favorites"),
            Screen::Favorites
        );
        let err = "settings".parse::<Screen>().unwrap_err();
        assert!(err.to_string().contains("Unknown screen"));
    }
}
