//! CLI Commands

pub mod config;
pub mod kv;
pub mod queue;
pub mod user;

use crate::error::CliError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// API client
pub struct ApiClient {
    pub base_url: String,
    pub token: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            client: reqwest::Client::new(),
        }
    }

    /// POST and decode a JSON response
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CliError> {
        let resp = self.send(path, body, true).await?;
        Ok(resp.json().await?)
    }

    /// POST where success carries no body
    pub async fn post_empty<B: Serialize>(&self, path: &str, body: &B) -> Result<(), CliError> {
        self.send(path, body, true).await?;
        Ok(())
    }

    /// POST without credentials
    pub async fn post_anonymous<T: DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        let resp = self.send(path, &serde_json::json!({}), false).await?;
        Ok(resp.json().await?)
    }

    async fn send<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        auth: bool,
    ) -> Result<reqwest::Response, CliError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.post(&url).json(body);

        if auth {
            let token = self.token.as_deref().ok_or(CliError::MissingToken)?;
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => CliError::Api {
                status: status.as_u16(),
                code: body.code,
                message: body.message,
            },
            Err(_) => CliError::Api {
                status: status.as_u16(),
                code: "http_error".into(),
                message: status.canonical_reason().unwrap_or("request failed").into(),
            },
        })
    }
}
