//! Queue commands

use super::ApiClient;
use crate::error::CliError;
use crate::{output::OutputFormat, QueueCommands};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize)]
pub struct Sent {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Received {
    pub id: String,
    pub namespace: String,
    pub message: String,
}

pub async fn handle(
    action: QueueCommands,
    client: &ApiClient,
    format: OutputFormat,
) -> Result<(), CliError> {
    match action {
        QueueCommands::Send { namespace, message } => {
            let sent: Sent = client
                .post("/queue/send", &json!({ "namespace": namespace, "message": message }))
                .await?;
            format.print(&sent);
        }
        QueueCommands::Receive {
            namespace,
            visibility_timeout,
        } => {
            let mut body = json!({ "namespace": namespace });
            if let Some(ms) = visibility_timeout {
                body["visibilityTimeout"] = json!(ms);
            }
            match client.post::<Received, _>("/queue/receive", &body).await {
                Ok(msg) => format.print(&msg),
                Err(e) if e.api_code() == Some("queue_empty") => {
                    println!("{} {}", "queue empty:".yellow(), namespace);
                }
                Err(e) => return Err(e),
            }
        }
        QueueCommands::Delete { namespace, id } => {
            client
                .post_empty("/queue/delete", &json!({ "namespace": namespace, "id": id }))
                .await?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}
