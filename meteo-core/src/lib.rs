//! Core library for the `meteo` weather lookup app.
//!
//! This crate defines:
//! - The Open-Meteo geocoding + forecast client
//! - The favorites list and its durable key-value storage
//! - View state and the application context that drives it
//! - Configuration handling
//!
//! Nothing here renders output; `meteo-cli` is the presentation layer.

pub mod app;
pub mod client;
pub mod codes;
pub mod config;
pub mod error;
pub mod favorites;
pub mod model;
pub mod storage;
pub mod view;

pub use app::{AppContext, FavoriteToggle, PendingSearch, Screen, SearchOutcome};
pub use client::{WeatherClient, WeatherSource};
pub use codes::{WeatherInfo, weather_info};
pub use config::Config;
pub use error::{Service, StorageError, WeatherError};
pub use favorites::{FAVORITES_KEY, FavoritesStore};
pub use model::{City, CurrentConditions, FavoriteEntry, ForecastDay, WeatherReport};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use view::{RequestTicket, ViewState};
