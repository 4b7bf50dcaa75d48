//! Key-value commands

use super::ApiClient;
use crate::error::CliError;
use crate::{output::OutputFormat, KvCommands};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
    pub ttl: i64,
}

pub async fn handle(
    action: KvCommands,
    client: &ApiClient,
    format: OutputFormat,
) -> Result<(), CliError> {
    match action {
        KvCommands::Set { key, value, ttl } => {
            let mut body = json!({ "key": key, "value": value });
            if let Some(ttl) = ttl {
                body["ttl"] = json!(ttl);
            }
            client.post_empty("/kv/set", &body).await?;
            println!("Set {}", key);
        }
        KvCommands::Get { key } => {
            let body = json!({ "key": key });
            match client.post::<KeyValue, _>("/kv/get", &body).await {
                Ok(kv) => format.print(&kv),
                Err(e) if e.api_code() == Some("not_found") => {
                    println!("{} {}", "not found:".yellow(), key);
                }
                Err(e) => return Err(e),
            }
        }
        KvCommands::Delete { key } => {
            client.post_empty("/kv/delete", &json!({ "key": key })).await?;
            println!("Deleted {}", key);
        }
    }
    Ok(())
}
