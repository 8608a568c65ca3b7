use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use std::sync::Arc;
use weather_core::{Config, Route, provider_from_config, run_strict};

use crate::{render, server};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "route-weather", version, about = "Weather forecast along a route of cities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web application.
    Serve {
        /// Address to listen on; defaults to `server.bind` from the config file.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store the AccuWeather API key and request language.
    Configure,

    /// Print the forecast for every city of a route.
    Route {
        /// Cities in travel order: start, intermediates, end.
        #[arg(required = true)]
        cities: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => {
                let config = Config::load()?;
                let bind = bind.unwrap_or_else(|| config.server.bind.clone());
                let provider = provider_from_config(&config.provider, config.api_key()?)?;

                server::serve(&bind, server::AppState::new(Arc::from(provider))).await
            }
            Command::Configure => configure(),
            Command::Route { cities } => {
                let config = Config::load()?;
                let provider = provider_from_config(&config.provider, config.api_key()?)?;

                let route = Route::new(cities);
                match run_strict(provider.as_ref(), &route).await {
                    Ok(result) => print!("{}", render::text_tables(&result)),
                    Err(err) => println!("{}", err.user_message()),
                }
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("AccuWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let current_language = config.provider.language.clone();
    let language = Text::new("Request language:")
        .with_default(&current_language)
        .prompt()
        .context("Failed to read language")?;

    config.set_api_key(api_key.trim().to_string());
    config.provider.language = language.trim().to_string();
    config.save()?;

    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}
