//! User commands

use super::ApiClient;
use crate::config::Config;
use crate::error::CliError;
use crate::{output::OutputFormat, UserCommands};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct NewUser {
    pub token: String,
}

pub async fn handle(
    action: UserCommands,
    client: &ApiClient,
    format: OutputFormat,
    profile: Option<&str>,
) -> Result<(), CliError> {
    match action {
        UserCommands::New { save } => {
            let user: NewUser = client.post_anonymous("/user/new").await?;
            format.print(&user);
            if save {
                let mut config = Config::load(profile)?;
                config.token = Some(user.token);
                if config.api_url.is_none() {
                    config.api_url = Some(client.base_url.clone());
                }
                let path = config.save(profile)?;
                eprintln!("Token saved to {}", path.display());
            }
        }
    }
    Ok(())
}
