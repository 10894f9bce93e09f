use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use skycast_core::{
    Config, Granularity, LocationQuery, LocationState, PromptBuilder, WeatherRequest,
    WeatherService, provider::transport_from_config,
};
use tracing::{debug, error};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather forecasts from a search-grounded language model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key, model and defaults.
    Configure,

    /// Fetch and show weather for a location.
    Show {
        #[command(flatten)]
        query: QueryArgs,

        /// Print the response as JSON instead of formatted text.
        #[arg(long)]
        json: bool,
    },

    /// Print the prompt that would be sent, without contacting the model.
    Prompt {
        #[command(flatten)]
        query: QueryArgs,
    },
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Location name, e.g. "Shanghai". Defaults to the configured location.
    #[arg(conflicts_with_all = ["lat", "lon"])]
    pub location: Option<String>,

    /// Latitude in degrees; use together with --lon.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in degrees; use together with --lat.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Time range: week, month or year.
    #[arg(short, long, default_value = "week")]
    pub granularity: Granularity,

    /// Date to treat as today (YYYY-MM-DD); defaults to the local date.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

impl QueryArgs {
    /// Coordinates win, then an explicit name, then the configured default.
    pub fn location_query(&self, config: &Config) -> anyhow::Result<LocationQuery> {
        if let (Some(latitude), Some(longitude)) = (self.lat, self.lon) {
            if !(-90.0..=90.0).contains(&latitude) {
                bail!("Latitude {latitude} is out of range (-90..=90)");
            }
            if !(-180.0..=180.0).contains(&longitude) {
                bail!("Longitude {longitude} is out of range (-180..=180)");
            }
            return Ok(LocationQuery::coordinates(latitude, longitude));
        }

        let name = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| config.default_location());

        Ok(LocationQuery::name(name))
    }

    pub fn request(&self, config: &Config) -> anyhow::Result<WeatherRequest> {
        Ok(WeatherRequest { location: self.location_query(config)?, granularity: self.granularity })
    }

    pub fn today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { query, json } => show(&query, json).await,
            Command::Prompt { query } => {
                let config = Config::load()?;
                let request = query.request(&config)?;
                let prompt = PromptBuilder::new(config.language()).build(
                    &request.location,
                    request.granularity,
                    query.today(),
                );
                println!("{prompt}");
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Gemini API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let model = Text::new("Model name:")
        .with_default(config.model_name())
        .prompt()
        .context("Failed to read model name")?;
    config.model.name = Some(model.trim().to_string());

    let location = Text::new("Default location:")
        .with_default(config.default_location())
        .prompt()
        .context("Failed to read default location")?;
    config.default_location = Some(location.trim().to_string());

    let language = Text::new("Language for summaries:")
        .with_default(config.language())
        .prompt()
        .context("Failed to read language")?;
    config.language = Some(language.trim().to_string());

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(query: &QueryArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let request = query.request(&config)?;
    let mut location = LocationState::new(request.location.clone());

    let service = WeatherService::new(transport_from_config(&config)?)
        .with_prompt_builder(PromptBuilder::new(config.language()));

    let response = match service.fetch(&request, query.today()).await {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "fetch failed");
            let message = err.user_message();
            return Err(anyhow::Error::new(err).context(message));
        }
    };

    if location.apply(&response) {
        debug!(name = ?location.display_name(), "location resolved");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let Some(name) = location.display_name().filter(|_| request.location.is_coordinates()) {
        println!("Resolved {} to {name}\n", request.location);
    }

    let mut stdout = std::io::stdout().lock();
    render::render(&mut stdout, &response, request.granularity)?;

    Ok(())
}
