use reqwest::Client;

use crate::api::types::{Command, Completion};
use crate::error::{BlockpadError, Result};

#[derive(Clone)]
pub struct CommandClient {
    client: Client,
    base_url: String,
    token: String,
}

impl CommandClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Sends one command and returns the backend's completion.
    ///
    /// A completion with a non-zero error code is still `Ok`; only transport
    /// and HTTP-level failures are errors.
    pub async fn call(&self, command: &Command) -> Result<Completion> {
        let resp = self
            .client
            .post(format!("{}/command/{}", self.base_url, command.name()))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&command.payload()?)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(BlockpadError::Api { status, message });
        }

        let body = resp.json::<Completion>().await?;
        Ok(body)
    }
}
