//! Interactive session: one prompt per user event, re-render after each.

use anyhow::{Result, anyhow};
use chrono::Local;
use inquire::{InquireError, Text};
use meteo_core::{AppContext, FavoriteToggle, Screen, SearchOutcome};

use crate::render;

const HELP: &str = "\
Type a city name to search, or one of:
  :fav          add/remove the current city from favorites
  :favorites    show the favorites screen
  :home         show the home screen
  :open N       load favorite number N
  :remove N     remove favorite number N
  :help         show this help
  :quit         leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Search(String),
    ToggleFavorite,
    Switch(Screen),
    Open(usize),
    Remove(usize),
    Help,
    Quit,
}

impl ShellCommand {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Some(ShellCommand::Search(line.to_string())));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        let cmd = match (name, arg) {
            ("fav", None) => ShellCommand::ToggleFavorite,
            ("home", None) | ("favorites", None) => ShellCommand::Switch(name.parse()?),
            ("open", Some(n)) => ShellCommand::Open(parse_index(n)?),
            ("remove", Some(n)) => ShellCommand::Remove(parse_index(n)?),
            ("help", None) => ShellCommand::Help,
            ("quit", None) | ("q", None) => ShellCommand::Quit,
            _ => return Err(anyhow!("Unknown command ':{rest}'. Type :help for a list.")),
        };

        Ok(Some(cmd))
    }
}

fn parse_index(raw: &str) -> Result<usize> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(anyhow!("Expected a favorite number (1, 2, ...), got '{raw}'")),
    }
}

pub async fn run(ctx: &mut AppContext) -> Result<()> {
    println!("{HELP}\n");

    loop {
        let line = match Text::new("meteo>").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let cmd = match ShellCommand::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if cmd == ShellCommand::Quit {
            break;
        }

        if let Some(message) = apply(ctx, cmd).await {
            println!("{message}");
        }
        println!("{}\n", render::render(ctx, Local::now()));
    }

    Ok(())
}

/// Execute one command. Returns a status line to print before the re-render.
pub async fn apply(ctx: &mut AppContext, cmd: ShellCommand) -> Option<String> {
    match cmd {
        ShellCommand::Search(query) => {
            ctx.switch_screen(Screen::Home);
            ctx.search(&query).await;
            None
        }
        ShellCommand::ToggleFavorite => match ctx.toggle_favorite() {
            FavoriteToggle::Added => Some("Added to favorites".to_string()),
            FavoriteToggle::Removed => Some("Removed from favorites".to_string()),
            FavoriteToggle::NoSelection => Some("Search for a city first".to_string()),
        },
        ShellCommand::Switch(screen) => {
            ctx.switch_screen(screen);
            None
        }
        ShellCommand::Open(n) => {
            let Some(entry) = nth_favorite(ctx, n) else {
                return Some(format!("There is no favorite number {n}"));
            };
            match ctx.select_favorite(&entry.0, &entry.1).await {
                SearchOutcome::NotFavorite => Some(format!("There is no favorite number {n}")),
                _ => None,
            }
        }
        ShellCommand::Remove(n) => {
            let Some((name, country)) = nth_favorite(ctx, n) else {
                return Some(format!("There is no favorite number {n}"));
            };
            ctx.remove_favorite(&name, &country);
            Some(format!("Removed {name}, {country}"))
        }
        ShellCommand::Help => Some(HELP.to_string()),
        ShellCommand::Quit => None,
    }
}

fn nth_favorite(ctx: &AppContext, n: usize) -> Option<(String, String)> {
    ctx.favorites()
        .list()
        .into_iter()
        .nth(n.checked_sub(1)?)
        .map(|e| (e.name, e.country))
}
