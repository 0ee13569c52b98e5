use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use dashboard_core::{
    App, City, Config, Coordinates, DashboardView, FixedPosition, Geolocator, Lang, Message,
    NoGeolocation, SearchResultsView, UiEvent, load_dashboard, provider_from_config,
    resolve_start_city,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc::UnboundedSender,
};

use crate::terminal::TerminalView;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Weather dashboard in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the user is; leave unset when no position is known.
#[derive(Debug, Args)]
pub struct Position {
    /// Latitude in decimal degrees.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl Position {
    fn geolocator(&self) -> Box<dyn Geolocator> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Box::new(FixedPosition(Coordinates::new(lat, lon))),
            _ => Box::new(NoGeolocation),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure {
        /// Display language, "es" or "en".
        #[arg(long)]
        lang: Option<String>,
    },

    /// Print the dashboard once.
    Show {
        /// City name to look up instead of the current position.
        #[arg(long)]
        city: Option<String>,

        #[command(flatten)]
        position: Position,
    },

    /// Search for a city and show its dashboard.
    Search {
        query: String,
    },

    /// Keep the dashboard open and search from stdin.
    ///
    /// Input is read a whole line at a time, so every line is submitted as if
    /// Enter were pressed: there is no search-as-you-type debounce here.
    /// A number picks a result, an empty line closes the results, `:q` quits.
    Interactive {
        #[command(flatten)]
        position: Position,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { lang } => configure(lang),
            Command::Show { city, position } => show(city, &position).await,
            Command::Search { query } => search(&query).await,
            Command::Interactive { position } => interactive(&position).await,
        }
    }
}

fn configure(lang: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    if let Some(lang) = lang {
        config.lang = Lang::try_from(lang.as_str())?;
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

async fn show(city: Option<String>, position: &Position) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let settings = config.dashboard_settings();

    let city = match city {
        Some(query) => provider
            .search_cities(&query, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No city matches '{query}'"))?,
        None => {
            resolve_start_city(
                provider.as_ref(),
                position.geolocator().as_ref(),
                &settings.default_city,
            )
            .await
        }
    };

    let snapshot = load_dashboard(provider.as_ref(), &city, &settings).await?;
    TerminalView::new(settings.lang).paint(&snapshot);

    Ok(())
}

async fn search(query: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let settings = config.dashboard_settings();
    let mut view = TerminalView::new(settings.lang);

    let cities: Vec<City> = provider.search_cities(query.trim(), settings.search_limit).await?;
    if cities.is_empty() {
        view.show_search_results(&SearchResultsView::NoResults);
        return Ok(());
    }

    let city = inquire::Select::new("Select a city:", cities)
        .prompt()
        .context("No city selected")?;

    let snapshot = load_dashboard(provider.as_ref(), &city, &settings).await?;
    view.paint(&snapshot);

    Ok(())
}

async fn interactive(position: &Position) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let settings = config.dashboard_settings();

    let view = TerminalView::new(settings.lang);
    let (mut app, rx) = App::new(provider, view, settings);

    println!("Type a city and press Enter to search, a number to pick a result,");
    println!("an empty line to close the results, :q to quit.");

    app.start(position.geolocator().as_ref()).await;
    tokio::spawn(forward_stdin(app.sender()));
    app.run(rx).await;

    Ok(())
}

/// Turn stdin lines into UI events until EOF or `:q`.
async fn forward_stdin(tx: UnboundedSender<Message>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let event = match lines.next_line().await {
            Ok(Some(line)) => parse_line(&line),
            Ok(None) => UiEvent::Quit,
            Err(err) => {
                tracing::error!(error = %err, "Failed to read stdin");
                UiEvent::Quit
            }
        };

        let quit = event == UiEvent::Quit;
        if tx.send(Message::Ui(event)).is_err() || quit {
            break;
        }
    }
}

/// Lines are complete submissions, never partial input, so no
/// `UiEvent::Input` is produced.
fn parse_line(line: &str) -> UiEvent {
    let line = line.trim();
    match line {
        ":q" | ":quit" => UiEvent::Quit,
        "" => UiEvent::ClickOutside,
        _ => match line.parse::<usize>() {
            Ok(n) if n >= 1 => UiEvent::SelectResult(n - 1),
            _ => UiEvent::Enter(line.to_string()),
        },
    }
}
