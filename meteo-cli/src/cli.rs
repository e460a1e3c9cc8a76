use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Text};
use meteo_core::{
    AppContext, Config, FavoriteToggle, FavoritesStore, FileStore, Screen, SearchOutcome,
    WeatherClient,
};
use std::{path::PathBuf, sync::Arc};

use crate::{render, shell};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather lookup with a favorites list")]
pub struct Cli {
    /// Override the directory the favorites list is stored in.
    #[arg(long, global = true)]
    pub favorites_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit API endpoints and storage location.
    Configure,

    /// Show current weather and the 5-day forecast for a city.
    Show {
        /// City name, e.g. "Paris".
        city: String,

        /// Also add the city to favorites (or remove it if it already is one).
        #[arg(long)]
        favorite: bool,
    },

    /// List favorite cities with their last-known weather.
    Favorites,

    /// Refresh and show the weather of a favorite city.
    Open { name: String, country: String },

    /// Remove a city from favorites.
    Remove { name: String, country: String },

    /// Remove every favorite.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Start an interactive session.
    Shell,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        if let Some(dir) = self.favorites_dir {
            config.favorites_dir = Some(dir);
        }

        let mut ctx = build_context(&config)?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Show { city, favorite } => {
                let outcome = ctx.search(&city).await;
                if favorite && outcome == SearchOutcome::Shown {
                    match ctx.toggle_favorite() {
                        FavoriteToggle::Added => println!("Added to favorites"),
                        FavoriteToggle::Removed => println!("Removed from favorites"),
                        FavoriteToggle::NoSelection => {}
                    }
                }
                print_screen(&ctx);
            }
            Command::Favorites => {
                ctx.switch_screen(Screen::Favorites);
                print_screen(&ctx);
            }
            Command::Open { name, country } => {
                if ctx.select_favorite(&name, &country).await == SearchOutcome::NotFavorite {
                    println!("{name}, {country} is not in your favorites");
                } else {
                    print_screen(&ctx);
                }
            }
            Command::Remove { name, country } => {
                if ctx.remove_favorite(&name, &country) {
                    println!("Removed {name}, {country} from favorites");
                } else {
                    println!("{name}, {country} is not in your favorites");
                }
            }
            Command::Clear { yes } => {
                let confirmed = yes
                    || Confirm::new("Remove all favorite cities?")
                        .with_default(false)
                        .prompt()?;
                if confirmed {
                    if ctx.clear_favorites() {
                        println!("Favorites cleared");
                    } else {
                        println!("Favorites cleared for this session, but the stored list could not be deleted");
                    }
                }
            }
            Command::Shell => shell::run(&mut ctx).await?,
        }

        Ok(())
    }
}

fn build_context(config: &Config) -> Result<AppContext> {
    let dir = config.favorites_dir()?;
    tracing::debug!("Favorites directory: {}", dir.display());

    let favorites = FavoritesStore::load(Box::new(FileStore::new(dir)));
    let client = WeatherClient::from_config(config);

    Ok(AppContext::new(Arc::new(client), favorites))
}

fn print_screen(ctx: &AppContext) {
    println!("{}", render::render(ctx, Local::now()));
}

fn configure(mut config: Config) -> Result<()> {
    config.geocoding_url = Text::new("Geocoding API base URL:")
        .with_default(&config.geocoding_url)
        .prompt()?;
    config.forecast_url = Text::new("Forecast API base URL:")
        .with_default(&config.forecast_url)
        .prompt()?;
    config.language = Text::new("Language for city names:")
        .with_default(&config.language)
        .prompt()?;

    let current_dir = config.favorites_dir()?.display().to_string();
    let dir = Text::new("Favorites directory:")
        .with_default(&current_dir)
        .prompt()?;
    config.favorites_dir = Some(PathBuf::from(dir.trim()));

    config.save()?;
    let path = Config::config_file_path().context("Config saved, but its path is unknown")?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
