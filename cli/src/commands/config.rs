//! Config commands

use crate::config::{mask, Config};
use crate::error::CliError;
use crate::output::OutputFormat;
use crate::ConfigCommands;
use clap::ValueEnum;

const NOT_SET: &str = "(not set)";

pub async fn handle(action: ConfigCommands, profile: Option<&str>) -> Result<(), CliError> {
    match action {
        ConfigCommands::Init => {
            let config = Config {
                api_url: Some("http://localhost:8000".into()),
                ..Config::default()
            };
            let path = config.save(profile)?;
            println!("Configuration initialized at {}", path.display());
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(profile)?;
            match key.as_str() {
                "api_url" => config.api_url = Some(value),
                "token" => config.token = Some(value),
                "default_format" => {
                    let format = OutputFormat::from_str(&value, true)
                        .map_err(|_| CliError::Config(format!("unknown format: {}", value)))?;
                    config.default_format = Some(format);
                }
                _ => return Err(CliError::Config(format!("unknown config key: {}", key))),
            }
            config.save(profile)?;
            println!("Set {} successfully", key);
        }
        ConfigCommands::Get { key } => {
            let config = Config::load(profile)?;
            let value = match key.as_str() {
                "api_url" => config.api_url,
                "token" => config.token.as_deref().map(mask),
                "default_format" => {
                    config.default_format.map(|f| format!("{:?}", f).to_lowercase())
                }
                _ => return Err(CliError::Config(format!("unknown config key: {}", key))),
            };
            println!("{}: {}", key, value.unwrap_or_else(|| NOT_SET.into()));
        }
        ConfigCommands::List => {
            let config = Config::load(profile)?;
            println!("api_url: {}", config.api_url.unwrap_or_else(|| NOT_SET.into()));
            println!(
                "token: {}",
                config.token.as_deref().map(mask).unwrap_or_else(|| NOT_SET.into())
            );
            println!(
                "default_format: {}",
                config
                    .default_format
                    .map(|f| format!("{:?}", f).to_lowercase())
                    .unwrap_or_else(|| NOT_SET.into())
            );
        }
    }
    Ok(())
}
