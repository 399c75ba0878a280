//! HTTP client for the Messenger Send API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::error::SendError;

use super::message::OutboundMessage;

/// Outbound message delivery. The dispatcher only knows this trait;
/// tests substitute a recording stub.
#[async_trait]
pub trait SendApi: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), SendError>;
}

/// Sends through the Graph API `/me/messages` endpoint.
pub struct GraphClient {
    client: reqwest::Client,
    graph_url: String,
    access_token: SecretString,
}

impl GraphClient {
    pub fn new(client: reqwest::Client, graph_url: String, access_token: SecretString) -> Self {
        Self {
            client,
            graph_url,
            access_token,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}{method}", self.graph_url)
    }
}

#[async_trait]
impl SendApi for GraphClient {
    async fn send(&self, message: &OutboundMessage) -> Result<(), SendError> {
        let resp = self
            .client
            .post(self.api_url("messages"))
            .query(&[("access_token", self.access_token.expose_secret())])
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SendError::Timeout
                } else {
                    SendError::RequestFailed(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = resp.json().await.unwrap_or_default();
        info!(
            message_id = body["message_id"].as_str().unwrap_or_default(),
            recipient_id = body["recipient_id"].as_str().unwrap_or_default(),
            "Message delivered"
        );
        Ok(())
    }
}
