use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use weather_forecast_core::{Config, WeatherService, decode_weather_code};

use crate::server::{self, WeatherForecastServer};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-forecast-mcp", version, about = "Weather forecast MCP server")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Http,
    Stdio,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the MCP server.
    Serve {
        #[arg(long, value_enum, default_value_t = Transport::Http)]
        transport: Transport,

        /// Override the configured bind host.
        #[arg(long)]
        host: Option<String>,

        /// Override the configured bind port.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single weather query and print the JSON result.
    Query {
        city_name: String,

        /// "current" or "historical".
        #[arg(long, default_value = "current")]
        query_type: String,

        /// YYYY-MM-DD, historical only.
        #[arg(long)]
        start_date: Option<String>,

        /// YYYY-MM-DD, historical only.
        #[arg(long)]
        end_date: Option<String>,
    },

    /// Describe a WMO weather code.
    Code {
        #[arg(allow_negative_numbers = true)]
        code: i64,
    },

    /// Interactively set the server binding.
    Configure,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = self.load_config()?;

        match self.command {
            Command::Serve {
                transport,
                host,
                port,
            } => {
                if let Some(host) = host {
                    config.server.host = host;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }

                let handler = WeatherForecastServer::new(WeatherService::open_meteo(&config));
                match transport {
                    Transport::Http => server::serve_http(handler, &config.server).await?,
                    Transport::Stdio => server::serve_stdio(handler).await?,
                }
            }
            Command::Query {
                city_name,
                query_type,
                start_date,
                end_date,
            } => {
                let json = WeatherService::open_meteo(&config)
                    .get_weather_data_json(
                        &city_name,
                        Some(&query_type),
                        start_date.as_deref(),
                        end_date.as_deref(),
                    )
                    .await;
                println!("{json}");
            }
            Command::Code { code } => {
                println!("{}", decode_weather_code(code));
            }
            Command::Configure => {
                let host = inquire::Text::new("Bind host:")
                    .with_default(&config.server.host)
                    .prompt()
                    .context("Failed to read bind host")?;
                let port = inquire::CustomType::<u16>::new("Bind port:")
                    .with_default(config.server.port)
                    .with_error_message("Please type a valid port number")
                    .prompt()
                    .context("Failed to read bind port")?;

                config.server.host = host;
                config.server.port = port;

                match &self.config {
                    Some(path) => config.save_to(path)?,
                    None => config.save()?,
                }
                println!("Server will listen on {}", config.bind_address());
            }
        }

        Ok(())
    }
}
