use anyhow::{Context, Result};
use ballpark_core::{
    Config, Coordinates, FileStorage, ForecastBoard, ForecastCache, ForecastClient, ForecastScreen,
    LocationResolver, LocationSource, Stadium, StadiumSelector,
    location::{FixedLocation, LocationSourceId, source_from_config},
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Select, Text};
use tracing::debug;

use crate::{browse, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "ballpark", version, about = "KBO ballpark weather forecasts")]
pub struct Cli {
    /// Use the backend at http://localhost:8080.
    #[arg(long, global = true)]
    pub local: bool,

    /// Forecast API origin, e.g. https://ballpark.example.com.
    #[arg(long, global = true, env = "BALLPARK_API_BASE")]
    pub api_base: Option<String>,

    /// Verbose logging (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Explicit coordinates, used instead of the configured location source.
#[derive(Debug, Clone, Copy, Args)]
pub struct PositionArgs {
    /// Latitude in degrees.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude in degrees.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl PositionArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the supported stadiums.
    Stadiums {
        /// Ask the server which stadiums it has forecasts for.
        #[arg(long)]
        remote: bool,
    },

    /// Show the hourly forecast for a stadium.
    Forecast {
        /// Stadium short name, e.g. "대전" or "잠실". Defaults to the configured stadium.
        stadium: Option<String>,

        /// Date to show (YYYY-MM-DD); defaults to today or the next day with data.
        #[arg(long, conflicts_with = "all_dates")]
        date: Option<String>,

        /// Show every upcoming date.
        #[arg(long)]
        all_dates: bool,

        /// Bypass the local cache.
        #[arg(long)]
        refresh: bool,

        /// Pick the stadium nearest to you.
        #[arg(long, conflicts_with = "stadium")]
        near: bool,

        #[command(flatten)]
        position: PositionArgs,
    },

    /// Find the stadium nearest to you.
    Nearest {
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Interactive forecast browser.
    Browse {
        /// Stadium short name to start with.
        stadium: Option<String>,
    },

    /// Interactively edit the configuration.
    Configure,

    /// Manage the local forecast cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Drop cached forecasts for one stadium, or for all of them.
    Clear {
        /// Stadium short name.
        stadium: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        let api_base = config.api_base(self.local, self.api_base.as_deref());
        debug!(%api_base, local = self.local, "resolved forecast API origin");

        match self.command {
            Command::Stadiums { remote: false } => {
                print!("{}", render::stadium_table());
            }
            Command::Stadiums { remote: true } => {
                let client = open_client(&api_base)?;
                let names = client
                    .remote_stadiums()
                    .await
                    .with_context(|| format!("Failed to list stadiums from {}", client.api_base()))?;
                print!("{}", render::remote_stadiums(&names));
            }
            Command::Forecast { stadium, date, all_dates, refresh, near, position } => {
                let mut selector = build_selector(&config, position)?;

                if let Some(name) = stadium {
                    if let Err(err) = selector.select(&name) {
                        println!("{}", render::invalid_stadium(&err));
                        return Ok(());
                    }
                } else if near || position.coordinates().is_some() {
                    // Failure keeps the default stadium; the status says why.
                    let _ = selector.locate().await;
                    if let Some(status) = selector.status() {
                        println!("{status}");
                    }
                }

                let date = date.as_deref().map(parse_date).transpose()?;
                let mut board = open_board(&config, &api_base)?;
                show_forecast(&mut board, selector.selected(), date, all_dates, refresh).await;
            }
            Command::Nearest { position } => {
                let mut selector = build_selector(&config, position)?;
                match selector.locate().await {
                    Ok(located) => println!("{}", render::located(&located)),
                    Err(err) => println!("⚠️ {}", err.status_message()),
                }
            }
            Command::Browse { stadium } => {
                let mut selector = build_selector(&config, PositionArgs { lat: None, lon: None })?;
                if let Some(name) = stadium {
                    if let Err(err) = selector.select(&name) {
                        println!("{}", render::invalid_stadium(&err));
                        return Ok(());
                    }
                }

                let board = open_board(&config, &api_base)?;
                browse::run(selector, board).await?;
            }
            Command::Configure => {
                configure(config)?;
            }
            Command::Cache { action: CacheAction::Clear { stadium } } => {
                let mut cache = ForecastCache::new(FileStorage::open_default()?);
                match stadium {
                    Some(name) => match Stadium::find(&name) {
                        Ok(s) => {
                            cache.clear(s.full_name);
                            println!("Cleared cached forecast for {s}.");
                        }
                        Err(err) => println!("{}", render::invalid_stadium(&err)),
                    },
                    None => {
                        cache.clear_all();
                        println!("Cleared all cached forecasts.");
                    }
                }
            }
        }

        Ok(())
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))
}

fn open_client(api_base: &str) -> Result<ForecastClient<FileStorage>> {
    let storage = FileStorage::open_default()?;
    debug!(path = %storage.path().display(), "using forecast cache");
    Ok(ForecastClient::new(api_base, ForecastCache::new(storage)))
}

fn open_board(config: &Config, api_base: &str) -> Result<ForecastBoard<FileStorage>> {
    Ok(ForecastBoard::new(open_client(api_base)?, config.thresholds(), config.date_cap))
}

fn build_selector(config: &Config, position: PositionArgs) -> Result<StadiumSelector> {
    let source: Box<dyn LocationSource> = match position.coordinates() {
        Some(coordinates) => Box::new(FixedLocation::new(coordinates)),
        None => source_from_config(&config.location)?,
    };

    Ok(StadiumSelector::new(config.default_stadium()?).with_resolver(LocationResolver::new(source)))
}

async fn show_forecast(
    board: &mut ForecastBoard<FileStorage>,
    stadium: &'static Stadium,
    date: Option<NaiveDate>,
    all_dates: bool,
    refresh: bool,
) {
    let today = today();
    let screen = board.show(stadium, today, refresh).await;

    if let Some(date) = date {
        if !board.select_date(date) {
            println!("⚠️ No forecast for {date}; showing the default date.");
        }
        println!("{}", render::screen(&board.screen()));
        return;
    }

    if !all_dates {
        println!("{}", render::screen(&screen));
        return;
    }

    let dates = match &screen {
        ForecastScreen::Day(view) => view.dates.clone(),
        _ => Vec::new(),
    };
    if dates.is_empty() {
        println!("{}", render::screen(&screen));
    }
    for date in dates {
        board.select_date(date);
        println!("{}", render::screen(&board.screen()));
    }
}

/// Display wrapper for stadium pickers.
pub struct StadiumChoice(pub &'static Stadium);

impl std::fmt::Display for StadiumChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.0.label, self.0.full_name)
    }
}

pub fn stadium_choices() -> Vec<StadiumChoice> {
    Stadium::all().iter().map(StadiumChoice).collect()
}

fn configure(mut config: Config) -> Result<()> {
    let current_base = config.api_base.clone().unwrap_or_default();
    let api_base = Text::new("Forecast API origin (empty for the built-in default):")
        .with_default(&current_base)
        .prompt()?;
    config.api_base = Some(api_base.trim().to_string()).filter(|s| !s.is_empty());

    let start = Stadium::all()
        .iter()
        .position(|s| s.short_name == config.default_stadium)
        .unwrap_or(0);
    let stadium = Select::new("Default stadium:", stadium_choices()).with_starting_cursor(start).prompt()?;
    config.default_stadium = stadium.0.short_name.to_string();

    let sources: Vec<&str> = LocationSourceId::all().iter().map(|id| id.as_str()).collect();
    let start = config
        .location_source_id()
        .ok()
        .and_then(|current| LocationSourceId::all().iter().position(|id| *id == current))
        .unwrap_or(0);
    let source = Select::new("Location source:", sources).with_starting_cursor(start).prompt()?;
    config.location.source = source.to_string();

    config.rain_affected_mm = CustomType::<f64>::new("Rain amount (mm) that affects play:")
        .with_default(config.rain_affected_mm)
        .with_error_message("Please enter a number, e.g. 2.0")
        .prompt()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
